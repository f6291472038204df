//! Initial database migration.
//!
//! Creates the tuition status enum, the responsibles, school_classes,
//! students and tuitions tables, their indexes and the `updated_at` trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS AND HELPERS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(UPDATED_AT_FN_SQL).await?;

        // ============================================================
        // PART 2: PEOPLE AND CLASSES
        // ============================================================
        db.execute_unprepared(RESPONSIBLES_SQL).await?;
        db.execute_unprepared(SCHOOL_CLASSES_SQL).await?;
        db.execute_unprepared(STUDENTS_SQL).await?;

        // ============================================================
        // PART 3: BILLING
        // ============================================================
        db.execute_unprepared(TUITIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE tuition_status AS ENUM ('pending', 'paid', 'late');
";

const UPDATED_AT_FN_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at() RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;
";

const RESPONSIBLES_SQL: &str = r"
CREATE TABLE responsibles (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(200) NOT NULL,
    phone VARCHAR(40) NOT NULL,
    email VARCHAR(254),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_responsible_name CHECK (length(trim(name)) > 0)
);

CREATE INDEX idx_responsibles_name ON responsibles(lower(name));

CREATE TRIGGER trg_responsibles_updated_at BEFORE UPDATE ON responsibles
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const SCHOOL_CLASSES_SQL: &str = r"
CREATE TABLE school_classes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(100) NOT NULL,
    year INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_school_classes_name_year UNIQUE (name, year)
);

CREATE TRIGGER trg_school_classes_updated_at BEFORE UPDATE ON school_classes
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const STUDENTS_SQL: &str = r"
-- A responsible cannot be removed while students still depend on them
CREATE TABLE students (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(200) NOT NULL,
    birth_date DATE,
    responsible_id UUID NOT NULL REFERENCES responsibles(id) ON DELETE RESTRICT,
    class_id UUID REFERENCES school_classes(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_students_responsible ON students(responsible_id);
CREATE INDEX idx_students_class ON students(class_id) WHERE class_id IS NOT NULL;

CREATE TRIGGER trg_students_updated_at BEFORE UPDATE ON students
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const TUITIONS_SQL: &str = r"
-- Tuitions are billing history: they survive removal of the payer or student
CREATE TABLE tuitions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    responsible_id UUID REFERENCES responsibles(id) ON DELETE SET NULL,
    student_id UUID REFERENCES students(id) ON DELETE SET NULL,
    amount NUMERIC(12, 2) NOT NULL,
    due_date DATE NOT NULL,
    payment_date DATE,
    status tuition_status NOT NULL DEFAULT 'pending',
    description VARCHAR(200),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_tuition_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_tuition_paid_has_date CHECK (status <> 'paid' OR payment_date IS NOT NULL),
    CONSTRAINT chk_tuition_unpaid_has_no_date CHECK (status = 'paid' OR payment_date IS NULL)
);

CREATE INDEX idx_tuitions_responsible ON tuitions(responsible_id);
CREATE INDEX idx_tuitions_due_date ON tuitions(due_date);
-- Status recompute scans pending rows by due date
CREATE INDEX idx_tuitions_pending_due ON tuitions(due_date) WHERE status = 'pending';

CREATE TRIGGER trg_tuitions_updated_at BEFORE UPDATE ON tuitions
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS tuitions CASCADE;
DROP TABLE IF EXISTS students CASCADE;
DROP TABLE IF EXISTS school_classes CASCADE;
DROP TABLE IF EXISTS responsibles CASCADE;
DROP FUNCTION IF EXISTS set_updated_at();
DROP TYPE IF EXISTS tuition_status;
";
