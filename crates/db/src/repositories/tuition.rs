//! Tuition repository.
//!
//! Rows are hydrated into `campus_core::tuition::Tuition` with the responsible
//! resolved, so the report engine never touches the database.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use campus_core::tuition::{Responsible, Tuition, TuitionError, TuitionLifecycle};
use campus_shared::AppError;
use campus_shared::types::{PageRequest, PageResponse, ResponsibleId, StudentId, TuitionId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use crate::entities::{responsibles, sea_orm_active_enums::TuitionStatus, students, tuitions};

/// Error types for tuition store operations.
#[derive(Debug, thiserror::Error)]
pub enum TuitionStoreError {
    /// Tuition not found.
    #[error("Tuition not found: {0}")]
    NotFound(TuitionId),

    /// Referenced responsible does not exist.
    #[error("Responsible not found: {0}")]
    ResponsibleNotFound(ResponsibleId),

    /// Referenced student does not exist.
    #[error("Student not found: {0}")]
    StudentNotFound(StudentId),

    /// A tuition rule was violated.
    #[error(transparent)]
    Rule(#[from] TuitionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TuitionStoreError> for AppError {
    fn from(err: TuitionStoreError) -> Self {
        match err {
            TuitionStoreError::NotFound(_) => Self::NotFound(err.to_string()),
            TuitionStoreError::ResponsibleNotFound(_) | TuitionStoreError::StudentNotFound(_) => {
                Self::Validation(err.to_string())
            }
            TuitionStoreError::Rule(e) => e.into(),
            TuitionStoreError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for billing a tuition.
#[derive(Debug, Clone)]
pub struct CreateTuitionInput {
    /// Responsible who pays.
    pub responsible_id: ResponsibleId,
    /// Student billed for.
    pub student_id: Option<StudentId>,
    /// Amount owed (must be positive).
    pub amount: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
    /// Free-form label.
    pub description: Option<String>,
}

/// Filter for listing tuitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TuitionFilter {
    /// Only tuitions with this status.
    pub status: Option<campus_core::tuition::TuitionStatus>,
    /// Only tuitions of this responsible.
    pub responsible_id: Option<ResponsibleId>,
}

impl TuitionFilter {
    fn apply(self, query: Select<tuitions::Entity>) -> Select<tuitions::Entity> {
        let mut query = query;
        if let Some(status) = self.status {
            query = query.filter(tuitions::Column::Status.eq(TuitionStatus::from(status)));
        }
        if let Some(responsible_id) = self.responsible_id {
            query = query.filter(tuitions::Column::ResponsibleId.eq(responsible_id.into_inner()));
        }
        query
    }
}

/// Converts a responsible row into the engine's view of it.
pub(crate) fn to_core_responsible(model: &responsibles::Model) -> Responsible {
    Responsible {
        id: ResponsibleId::from_uuid(model.id),
        name: model.name.clone(),
        phone: model.phone.clone(),
        email: model.email.clone(),
    }
}

/// Builds an engine tuition from a row, resolving the responsible from
/// `responsibles`. A dangling or cleared reference leaves it `None`.
pub(crate) fn hydrate(
    model: tuitions::Model,
    responsibles: &HashMap<Uuid, Responsible>,
) -> Tuition {
    Tuition {
        id: TuitionId::from_uuid(model.id),
        amount: model.amount,
        due_date: model.due_date,
        payment_date: model.payment_date,
        status: model.status.into(),
        responsible: model
            .responsible_id
            .and_then(|id| responsibles.get(&id).cloned()),
        student_id: model.student_id.map(StudentId::from_uuid),
        description: model.description,
    }
}

/// Tuition repository.
#[derive(Debug, Clone)]
pub struct TuitionRepository {
    db: Arc<DatabaseConnection>,
}

impl TuitionRepository {
    /// Creates a new tuition repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Bills a new pending tuition.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, a reference does not
    /// exist, or the insert fails.
    pub async fn create(&self, input: CreateTuitionInput) -> Result<Tuition, TuitionStoreError> {
        TuitionLifecycle::validate_amount(input.amount)?;

        let responsible = responsibles::Entity::find_by_id(input.responsible_id.into_inner())
            .one(self.db.as_ref())
            .await?
            .ok_or(TuitionStoreError::ResponsibleNotFound(input.responsible_id))?;

        if let Some(student_id) = input.student_id {
            let student_exists = students::Entity::find_by_id(student_id.into_inner())
                .count(self.db.as_ref())
                .await?
                > 0;
            if !student_exists {
                return Err(TuitionStoreError::StudentNotFound(student_id));
            }
        }

        let now = chrono::Utc::now().into();
        let tuition = tuitions::ActiveModel {
            id: Set(TuitionId::new().into_inner()),
            responsible_id: Set(Some(responsible.id)),
            student_id: Set(input.student_id.map(StudentId::into_inner)),
            amount: Set(input.amount),
            due_date: Set(input.due_date),
            payment_date: Set(None),
            status: Set(TuitionStatus::Pending),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = tuition.insert(self.db.as_ref()).await?;
        tracing::info!(
            tuition_id = %model.id,
            responsible_id = %responsible.id,
            amount = %model.amount,
            due_date = %model.due_date,
            "Tuition billed"
        );

        let known = HashMap::from([(responsible.id, to_core_responsible(&responsible))]);
        Ok(hydrate(model, &known))
    }

    /// Finds a tuition by ID with its responsible resolved.
    ///
    /// # Errors
    ///
    /// Returns `TuitionStoreError::NotFound` if no row matches.
    pub async fn find_by_id(&self, id: TuitionId) -> Result<Tuition, TuitionStoreError> {
        let model = tuitions::Entity::find_by_id(id.into_inner())
            .one(self.db.as_ref())
            .await?
            .ok_or(TuitionStoreError::NotFound(id))?;

        let known = self.resolve_responsibles(std::slice::from_ref(&model)).await?;
        Ok(hydrate(model, &known))
    }

    /// Lists tuitions by due date, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: TuitionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Tuition>, TuitionStoreError> {
        let page = page.normalized();

        let total = filter.apply(tuitions::Entity::find()).count(self.db.as_ref()).await?;
        let models = filter
            .apply(tuitions::Entity::find())
            .order_by_asc(tuitions::Column::DueDate)
            .order_by_asc(tuitions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await?;

        let known = self.resolve_responsibles(&models).await?;
        let data = models.into_iter().map(|m| hydrate(m, &known)).collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Loads every tuition with its responsible resolved, ordered by due
    /// date. This is the input the report engine works on.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_snapshot(&self) -> Result<Vec<Tuition>, TuitionStoreError> {
        let models = tuitions::Entity::find()
            .order_by_asc(tuitions::Column::DueDate)
            .order_by_asc(tuitions::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let known = self.resolve_responsibles(&models).await?;
        let snapshot: Vec<Tuition> = models.into_iter().map(|m| hydrate(m, &known)).collect();

        let unresolved = snapshot.iter().filter(|t| t.responsible.is_none()).count();
        if unresolved > 0 {
            tracing::warn!(unresolved, "Tuitions without a responsible in snapshot");
        }
        tracing::debug!(tuitions = snapshot.len(), "Tuition snapshot loaded");

        Ok(snapshot)
    }

    /// Settles a tuition on `payment_date`.
    ///
    /// # Errors
    ///
    /// Returns `TuitionError::AlreadyPaid` (wrapped) if the tuition was
    /// already settled, including by a concurrent request.
    pub async fn settle(
        &self,
        id: TuitionId,
        payment_date: NaiveDate,
    ) -> Result<Tuition, TuitionStoreError> {
        let current = self.find_by_id(id).await?;
        let settled = TuitionLifecycle::settle(&current, payment_date)?;

        let result = tuitions::Entity::update_many()
            .col_expr(tuitions::Column::Status, TuitionStatus::Paid.as_enum())
            .col_expr(tuitions::Column::PaymentDate, Expr::value(payment_date))
            .col_expr(
                tuitions::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(
                    chrono::Utc::now(),
                )),
            )
            .filter(tuitions::Column::Id.eq(id.into_inner()))
            .filter(tuitions::Column::Status.ne(TuitionStatus::Paid))
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(TuitionError::AlreadyPaid(id).into());
        }

        tracing::info!(tuition_id = %id, %payment_date, "Tuition settled");
        Ok(settled)
    }

    /// Moves every overdue pending tuition to `late` as of `today`.
    ///
    /// Returns the number of tuitions updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn mark_overdue_as_late(&self, today: NaiveDate) -> Result<u64, TuitionStoreError> {
        let candidates = tuitions::Entity::find()
            .filter(tuitions::Column::Status.eq(TuitionStatus::Pending))
            .filter(tuitions::Column::DueDate.lt(today))
            .all(self.db.as_ref())
            .await?;

        let no_responsibles = HashMap::new();
        let ids: Vec<Uuid> = candidates
            .into_iter()
            .map(|m| hydrate(m, &no_responsibles))
            .filter(|t| {
                TuitionLifecycle::recomputed_status(t, today)
                    == Some(campus_core::tuition::TuitionStatus::Late)
            })
            .map(|t| t.id.into_inner())
            .collect();

        if ids.is_empty() {
            tracing::debug!(%today, "No overdue tuitions to mark");
            return Ok(0);
        }

        let result = tuitions::Entity::update_many()
            .col_expr(tuitions::Column::Status, TuitionStatus::Late.as_enum())
            .col_expr(
                tuitions::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(
                    chrono::Utc::now(),
                )),
            )
            .filter(tuitions::Column::Id.is_in(ids))
            .filter(tuitions::Column::Status.eq(TuitionStatus::Pending))
            .exec(self.db.as_ref())
            .await?;

        tracing::info!(%today, updated = result.rows_affected, "Overdue tuitions marked late");
        Ok(result.rows_affected)
    }

    async fn resolve_responsibles(
        &self,
        models: &[tuitions::Model],
    ) -> Result<HashMap<Uuid, Responsible>, DbErr> {
        let ids: HashSet<Uuid> = models.iter().filter_map(|m| m.responsible_id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = responsibles::Entity::find()
            .filter(responsibles::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .iter()
            .map(|r| (r.id, to_core_responsible(r)))
            .collect())
    }
}

#[cfg(test)]
#[path = "tuition_tests.rs"]
mod tests;
