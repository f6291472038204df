//! Database seeder for Campus development and testing.
//!
//! Seeds classes, responsibles, students and a year of tuitions with a mix of
//! on-time, late and open payments, then marks overdue tuitions as late.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use fake::Fake;
use fake::faker::boolean::en::Boolean;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::raw::{FirstName, Name};
use fake::faker::phone_number::raw::CellNumber;
use fake::locales::PT_BR;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use campus_db::entities::responsibles;
use campus_db::repositories::{
    CreateResponsibleInput, CreateSchoolClassInput, CreateStudentInput, CreateTuitionInput,
};
use campus_db::{ResponsibleRepository, SchoolClassRepository, StudentRepository, TuitionRepository};
use campus_shared::types::{ResponsibleId, SchoolClassId, StudentId};

/// Responsibles to create.
const RESPONSIBLES: usize = 12;
/// Day of the month tuitions fall due.
const DUE_DAY: u32 = 10;
/// Class names created for the current year.
const CLASSES: [(&str, i64); 4] = [("1A", 450), ("1B", 450), ("2A", 520), ("3A", 610)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = campus_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let db = Arc::new(db);

    if responsibles::Entity::find().count(db.as_ref()).await? > 0 {
        println!("  Database already has responsibles, skipping...");
        return Ok(());
    }

    let today = Utc::now().date_naive();

    println!("Seeding classes...");
    let classes = seed_classes(&db, today.year()).await?;

    println!("Seeding responsibles and students...");
    let students = seed_families(&db, &classes).await?;

    println!("Seeding tuitions...");
    let billed = seed_tuitions(&db, &students, today).await?;
    println!("  {billed} tuitions billed");

    let late = TuitionRepository::new(Arc::clone(&db))
        .mark_overdue_as_late(today)
        .await?;
    println!("  {late} tuitions marked late");

    println!("Seeding complete!");
    Ok(())
}

/// A seeded student with what billing needs to know about them.
struct SeededStudent {
    id: StudentId,
    responsible_id: ResponsibleId,
    monthly_fee: Decimal,
}

async fn seed_classes(
    db: &Arc<DatabaseConnection>,
    year: i32,
) -> anyhow::Result<Vec<(SchoolClassId, Decimal)>> {
    let repo = SchoolClassRepository::new(Arc::clone(db));
    let mut classes = Vec::with_capacity(CLASSES.len());

    for (name, fee) in CLASSES {
        let class = repo
            .create(CreateSchoolClassInput {
                name: name.to_string(),
                year,
            })
            .await?;
        classes.push((SchoolClassId::from_uuid(class.id), Decimal::new(fee, 0)));
    }
    Ok(classes)
}

async fn seed_families(
    db: &Arc<DatabaseConnection>,
    classes: &[(SchoolClassId, Decimal)],
) -> anyhow::Result<Vec<SeededStudent>> {
    let responsibles = ResponsibleRepository::new(Arc::clone(db));
    let students = StudentRepository::new(Arc::clone(db));
    let mut seeded = Vec::new();

    for i in 0..RESPONSIBLES {
        let responsible = responsibles
            .create(CreateResponsibleInput {
                name: Name(PT_BR).fake(),
                phone: CellNumber(PT_BR).fake(),
                email: Some(SafeEmail().fake()),
            })
            .await?;
        let responsible_id = ResponsibleId::from_uuid(responsible.id);

        let children = if i % 3 == 0 { 2 } else { 1 };
        for _ in 0..children {
            let (class_id, monthly_fee) = classes[(0..classes.len()).fake::<usize>()];
            let age_days = (2200..4000).fake::<i64>();
            let student = students
                .create(CreateStudentInput {
                    name: format!(
                        "{} {}",
                        FirstName(PT_BR).fake::<String>(),
                        responsible.name.split_whitespace().last().unwrap_or_default()
                    ),
                    birth_date: Some(Utc::now().date_naive() - Duration::days(age_days)),
                    responsible_id,
                    class_id: Some(class_id),
                })
                .await?;
            seeded.push(SeededStudent {
                id: StudentId::from_uuid(student.id),
                responsible_id,
                monthly_fee,
            });
        }
    }
    Ok(seeded)
}

/// Bills every month of the year up to two months ahead. Past tuitions are
/// mostly settled, some after the due date.
async fn seed_tuitions(
    db: &Arc<DatabaseConnection>,
    students: &[SeededStudent],
    today: NaiveDate,
) -> anyhow::Result<usize> {
    let repo = TuitionRepository::new(Arc::clone(db));
    let last_month = (today.month() + 2).min(12);
    let mut billed = 0;

    for student in students {
        for month in 1..=last_month {
            let due_date = NaiveDate::from_ymd_opt(today.year(), month, DUE_DAY)
                .context("invalid due date")?;
            let tuition = repo
                .create(CreateTuitionInput {
                    responsible_id: student.responsible_id,
                    student_id: Some(student.id),
                    amount: student.monthly_fee,
                    due_date,
                    description: Some(format!("Tuition {month:02}/{}", today.year())),
                })
                .await?;
            billed += 1;

            if due_date >= today || !Boolean(85).fake::<bool>() {
                continue;
            }

            let paid_on_time = Boolean(75).fake::<bool>();
            let offset = if paid_on_time {
                -(0..5).fake::<i64>()
            } else {
                (1..20).fake::<i64>()
            };
            let payment_date = (due_date + Duration::days(offset)).min(today);
            repo.settle(tuition.id, payment_date).await?;
        }
    }
    Ok(billed)
}
