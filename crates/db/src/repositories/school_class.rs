//! School class repository.

use std::sync::Arc;

use campus_shared::AppError;
use campus_shared::types::SchoolClassId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{school_classes, students};

/// Error types for class operations.
#[derive(Debug, thiserror::Error)]
pub enum SchoolClassError {
    /// Class not found.
    #[error("Class not found: {0}")]
    NotFound(SchoolClassId),

    /// A class with the same name already exists for the year.
    #[error("Class '{name}' already exists for {year}")]
    Duplicate {
        /// Class name.
        name: String,
        /// School year.
        year: i32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SchoolClassError> for AppError {
    fn from(err: SchoolClassError) -> Self {
        match err {
            SchoolClassError::NotFound(_) => Self::NotFound(err.to_string()),
            SchoolClassError::Duplicate { .. } => Self::Conflict(err.to_string()),
            SchoolClassError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a class.
#[derive(Debug, Clone)]
pub struct CreateSchoolClassInput {
    /// Class name (e.g. "5th grade A").
    pub name: String,
    /// School year.
    pub year: i32,
}

/// A class with its enrolled students.
#[derive(Debug, Clone)]
pub struct SchoolClassWithStudents {
    /// The class record.
    pub class: school_classes::Model,
    /// Students enrolled in the class.
    pub students: Vec<students::Model>,
}

/// School class repository.
#[derive(Debug, Clone)]
pub struct SchoolClassRepository {
    db: Arc<DatabaseConnection>,
}

impl SchoolClassRepository {
    /// Creates a new class repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates a class.
    ///
    /// # Errors
    ///
    /// Returns `SchoolClassError::Duplicate` if the name is taken for the year.
    pub async fn create(
        &self,
        input: CreateSchoolClassInput,
    ) -> Result<school_classes::Model, SchoolClassError> {
        let taken = school_classes::Entity::find()
            .filter(school_classes::Column::Name.eq(input.name.as_str()))
            .filter(school_classes::Column::Year.eq(input.year))
            .count(self.db.as_ref())
            .await?
            > 0;
        if taken {
            return Err(SchoolClassError::Duplicate {
                name: input.name,
                year: input.year,
            });
        }

        let now = chrono::Utc::now().into();
        let class = school_classes::ActiveModel {
            id: Set(SchoolClassId::new().into_inner()),
            name: Set(input.name),
            year: Set(input.year),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = class.insert(self.db.as_ref()).await?;
        tracing::info!(class_id = %model.id, year = model.year, "Class created");
        Ok(model)
    }

    /// Lists every class, newest year first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<school_classes::Model>, SchoolClassError> {
        Ok(school_classes::Entity::find()
            .order_by_desc(school_classes::Column::Year)
            .order_by_asc(school_classes::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    /// Lists every class together with its students.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_with_students(&self) -> Result<Vec<SchoolClassWithStudents>, SchoolClassError> {
        let classes = self.list_all().await?;
        let ids: Vec<_> = classes.iter().map(|c| c.id).collect();

        let enrolled = if ids.is_empty() {
            Vec::new()
        } else {
            students::Entity::find()
                .filter(students::Column::ClassId.is_in(ids))
                .order_by_asc(students::Column::Name)
                .all(self.db.as_ref())
                .await?
        };

        Ok(classes
            .into_iter()
            .map(|class| {
                let students = enrolled
                    .iter()
                    .filter(|s| s.class_id == Some(class.id))
                    .cloned()
                    .collect();
                SchoolClassWithStudents { class, students }
            })
            .collect())
    }

    /// Deletes a class. Enrolled students keep their records without a class.
    ///
    /// # Errors
    ///
    /// Returns `SchoolClassError::NotFound` if no row matches.
    pub async fn delete(&self, id: SchoolClassId) -> Result<(), SchoolClassError> {
        let result = school_classes::Entity::delete_by_id(id.into_inner())
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(SchoolClassError::NotFound(id));
        }

        tracing::info!(class_id = %id, "Class deleted");
        Ok(())
    }
}
