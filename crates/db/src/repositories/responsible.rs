//! Responsible repository for payer database operations.

use std::sync::Arc;

use campus_shared::AppError;
use campus_shared::types::{PageRequest, PageResponse, ResponsibleId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{responsibles, students};

/// Error types for responsible operations.
#[derive(Debug, thiserror::Error)]
pub enum ResponsibleError {
    /// Responsible not found.
    #[error("Responsible not found: {0}")]
    NotFound(ResponsibleId),

    /// Cannot delete a responsible that still has enrolled students.
    #[error("Cannot delete responsible: {0} students still reference it")]
    HasStudents(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ResponsibleError> for AppError {
    fn from(err: ResponsibleError) -> Self {
        match err {
            ResponsibleError::NotFound(_) => Self::NotFound(err.to_string()),
            ResponsibleError::HasStudents(_) => Self::Conflict(err.to_string()),
            ResponsibleError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a responsible.
#[derive(Debug, Clone)]
pub struct CreateResponsibleInput {
    /// Full name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: Option<String>,
}

/// Responsible repository.
#[derive(Debug, Clone)]
pub struct ResponsibleRepository {
    db: Arc<DatabaseConnection>,
}

impl ResponsibleRepository {
    /// Creates a new responsible repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates a responsible.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        input: CreateResponsibleInput,
    ) -> Result<responsibles::Model, ResponsibleError> {
        let now = chrono::Utc::now().into();

        let responsible = responsibles::ActiveModel {
            id: Set(ResponsibleId::new().into_inner()),
            name: Set(input.name),
            phone: Set(input.phone),
            email: Set(input.email),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = responsible.insert(self.db.as_ref()).await?;
        tracing::info!(responsible_id = %model.id, "Responsible created");
        Ok(model)
    }

    /// Finds a responsible by ID.
    ///
    /// # Errors
    ///
    /// Returns `ResponsibleError::NotFound` if no row matches.
    pub async fn find_by_id(
        &self,
        id: ResponsibleId,
    ) -> Result<responsibles::Model, ResponsibleError> {
        responsibles::Entity::find_by_id(id.into_inner())
            .one(self.db.as_ref())
            .await?
            .ok_or(ResponsibleError::NotFound(id))
    }

    /// Lists responsibles by name, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<responsibles::Model>, ResponsibleError> {
        let page = page.normalized();

        let total = responsibles::Entity::find().count(self.db.as_ref()).await?;
        let data = responsibles::Entity::find()
            .order_by_asc(responsibles::Column::Name)
            .order_by_asc(responsibles::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Lists every responsible by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<responsibles::Model>, ResponsibleError> {
        Ok(responsibles::Entity::find()
            .order_by_asc(responsibles::Column::Name)
            .order_by_asc(responsibles::Column::Id)
            .all(self.db.as_ref())
            .await?)
    }

    /// Deletes a responsible.
    ///
    /// Tuitions billed to the responsible are kept with the reference cleared.
    ///
    /// # Errors
    ///
    /// Returns `ResponsibleError::HasStudents` if students still reference it.
    pub async fn delete(&self, id: ResponsibleId) -> Result<(), ResponsibleError> {
        let txn = self.db.begin().await?;

        // Row lock blocks concurrent enrollments until the delete commits.
        let locked = responsibles::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?;
        if locked.is_none() {
            return Err(ResponsibleError::NotFound(id));
        }

        let student_count = students::Entity::find()
            .filter(students::Column::ResponsibleId.eq(id.into_inner()))
            .count(&txn)
            .await?;
        if student_count > 0 {
            return Err(ResponsibleError::HasStudents(student_count));
        }

        responsibles::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!(responsible_id = %id, "Responsible deleted");
        Ok(())
    }
}
