//! Student repository for enrollment database operations.

use std::sync::Arc;

use campus_shared::AppError;
use campus_shared::types::{PageRequest, PageResponse, ResponsibleId, SchoolClassId, StudentId};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::entities::{responsibles, school_classes, students};

/// Error types for student operations.
#[derive(Debug, thiserror::Error)]
pub enum StudentError {
    /// Student not found.
    #[error("Student not found: {0}")]
    NotFound(StudentId),

    /// Referenced responsible does not exist.
    #[error("Responsible not found: {0}")]
    ResponsibleNotFound(ResponsibleId),

    /// Referenced class does not exist.
    #[error("Class not found: {0}")]
    ClassNotFound(SchoolClassId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<StudentError> for AppError {
    fn from(err: StudentError) -> Self {
        match err {
            StudentError::NotFound(_) => Self::NotFound(err.to_string()),
            StudentError::ResponsibleNotFound(_) | StudentError::ClassNotFound(_) => {
                Self::Validation(err.to_string())
            }
            StudentError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for enrolling a student.
#[derive(Debug, Clone)]
pub struct CreateStudentInput {
    /// Full name.
    pub name: String,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Responsible paying for the student.
    pub responsible_id: ResponsibleId,
    /// Class the student attends.
    pub class_id: Option<SchoolClassId>,
}

/// Filter for listing students.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentFilter {
    /// Only students of this class.
    pub class_id: Option<SchoolClassId>,
    /// Only students of this responsible.
    pub responsible_id: Option<ResponsibleId>,
}

impl StudentFilter {
    fn apply(self, query: Select<students::Entity>) -> Select<students::Entity> {
        let mut query = query;
        if let Some(class_id) = self.class_id {
            query = query.filter(students::Column::ClassId.eq(class_id.into_inner()));
        }
        if let Some(responsible_id) = self.responsible_id {
            query = query.filter(students::Column::ResponsibleId.eq(responsible_id.into_inner()));
        }
        query
    }
}

/// Student repository.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    db: Arc<DatabaseConnection>,
}

impl StudentRepository {
    /// Creates a new student repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Enrolls a student.
    ///
    /// # Errors
    ///
    /// Returns an error if the responsible or class does not exist, or the
    /// insert fails.
    pub async fn create(&self, input: CreateStudentInput) -> Result<students::Model, StudentError> {
        let responsible_exists = responsibles::Entity::find_by_id(input.responsible_id.into_inner())
            .count(self.db.as_ref())
            .await?
            > 0;
        if !responsible_exists {
            return Err(StudentError::ResponsibleNotFound(input.responsible_id));
        }

        if let Some(class_id) = input.class_id {
            let class_exists = school_classes::Entity::find_by_id(class_id.into_inner())
                .count(self.db.as_ref())
                .await?
                > 0;
            if !class_exists {
                return Err(StudentError::ClassNotFound(class_id));
            }
        }

        let now = chrono::Utc::now().into();
        let student = students::ActiveModel {
            id: Set(StudentId::new().into_inner()),
            name: Set(input.name),
            birth_date: Set(input.birth_date),
            responsible_id: Set(input.responsible_id.into_inner()),
            class_id: Set(input.class_id.map(SchoolClassId::into_inner)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = student.insert(self.db.as_ref()).await?;
        tracing::info!(student_id = %model.id, "Student enrolled");
        Ok(model)
    }

    /// Finds a student by ID.
    ///
    /// # Errors
    ///
    /// Returns `StudentError::NotFound` if no row matches.
    pub async fn find_by_id(&self, id: StudentId) -> Result<students::Model, StudentError> {
        students::Entity::find_by_id(id.into_inner())
            .one(self.db.as_ref())
            .await?
            .ok_or(StudentError::NotFound(id))
    }

    /// Lists students by name, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: StudentFilter,
        page: PageRequest,
    ) -> Result<PageResponse<students::Model>, StudentError> {
        let page = page.normalized();

        let total = filter.apply(students::Entity::find()).count(self.db.as_ref()).await?;
        let data = filter
            .apply(students::Entity::find())
            .order_by_asc(students::Column::Name)
            .order_by_asc(students::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Lists every student by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<students::Model>, StudentError> {
        Ok(students::Entity::find()
            .order_by_asc(students::Column::Name)
            .order_by_asc(students::Column::Id)
            .all(self.db.as_ref())
            .await?)
    }

    /// Deletes a student. Their tuitions are kept with the reference cleared.
    ///
    /// # Errors
    ///
    /// Returns `StudentError::NotFound` if no row matches.
    pub async fn delete(&self, id: StudentId) -> Result<(), StudentError> {
        let result = students::Entity::delete_by_id(id.into_inner())
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(StudentError::NotFound(id));
        }

        tracing::info!(student_id = %id, "Student deleted");
        Ok(())
    }
}
