//! School class routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use campus_db::{
    SchoolClassRepository,
    repositories::{CreateSchoolClassInput, SchoolClassWithStudents},
};
use campus_shared::types::SchoolClassId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiError};

/// Creates the class routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/classes", get(list_classes).post(create_class))
        .route("/classes/{id}", delete(delete_class))
}

/// Request body for creating a class.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassRequest {
    /// Class name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// School year.
    #[validate(range(min = 1900, max = 2200))]
    pub year: i32,
}

/// Student summary inside a class.
#[derive(Debug, Serialize)]
pub struct ClassStudentResponse {
    /// Student ID.
    pub id: Uuid,
    /// Full name.
    pub name: String,
}

/// Class in responses.
#[derive(Debug, Serialize)]
pub struct ClassResponse {
    /// Class ID.
    pub id: Uuid,
    /// Class name.
    pub name: String,
    /// School year.
    pub year: i32,
    /// Enrolled students.
    pub students: Vec<ClassStudentResponse>,
}

impl From<SchoolClassWithStudents> for ClassResponse {
    fn from(entry: SchoolClassWithStudents) -> Self {
        Self {
            id: entry.class.id,
            name: entry.class.name,
            year: entry.class.year,
            students: entry
                .students
                .into_iter()
                .map(|s| ClassStudentResponse {
                    id: s.id,
                    name: s.name,
                })
                .collect(),
        }
    }
}

/// GET /classes
async fn list_classes(State(state): State<AppState>) -> Result<Json<Vec<ClassResponse>>, ApiError> {
    let repo = SchoolClassRepository::new(Arc::clone(&state.db));
    let classes = repo.list_with_students().await?;
    Ok(Json(classes.into_iter().map(ClassResponse::from).collect()))
}

/// POST /classes
async fn create_class(
    State(state): State<AppState>,
    Json(request): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let repo = SchoolClassRepository::new(Arc::clone(&state.db));
    let class = repo
        .create(CreateSchoolClassInput {
            name: request.name.trim().to_string(),
            year: request.year,
        })
        .await?;

    let response = ClassResponse::from(SchoolClassWithStudents {
        class,
        students: Vec::new(),
    });
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /classes/{id}
async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<SchoolClassId>,
) -> Result<StatusCode, ApiError> {
    let repo = SchoolClassRepository::new(Arc::clone(&state.db));
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
