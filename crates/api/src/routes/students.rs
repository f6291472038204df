//! Student routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use campus_db::{
    StudentRepository,
    entities::students,
    repositories::{CreateStudentInput, StudentFilter},
};
use campus_shared::types::{PageResponse, ResponsibleId, SchoolClassId, StudentId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::PageQuery;
use crate::{AppState, error::ApiError};

/// Creates the student routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/{id}", get(get_student).delete(delete_student))
}

/// Query parameters for listing students.
#[derive(Debug, Deserialize)]
pub struct ListStudentsQuery {
    /// Only students of this class.
    pub class_id: Option<SchoolClassId>,
    /// Only students of this responsible.
    pub responsible_id: Option<ResponsibleId>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Request body for enrolling a student.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    /// Full name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Responsible paying for the student.
    pub responsible_id: ResponsibleId,
    /// Class the student attends.
    pub class_id: Option<SchoolClassId>,
}

/// Student in responses.
#[derive(Debug, Serialize)]
pub struct StudentResponse {
    /// Student ID.
    pub id: Uuid,
    /// Full name.
    pub name: String,
    /// Date of birth.
    pub birth_date: Option<String>,
    /// Responsible ID.
    pub responsible_id: Uuid,
    /// Class ID.
    pub class_id: Option<Uuid>,
}

impl From<students::Model> for StudentResponse {
    fn from(model: students::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            birth_date: model.birth_date.map(|d| d.to_string()),
            responsible_id: model.responsible_id,
            class_id: model.class_id,
        }
    }
}

/// GET /students
async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListStudentsQuery>,
) -> Result<Json<PageResponse<StudentResponse>>, ApiError> {
    let filter = StudentFilter {
        class_id: query.class_id,
        responsible_id: query.responsible_id,
    };
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .to_request();

    let repo = StudentRepository::new(Arc::clone(&state.db));
    let result = repo.list(filter, page).await?;
    Ok(Json(result.map(StudentResponse::from)))
}

/// POST /students
async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let repo = StudentRepository::new(Arc::clone(&state.db));
    let model = repo
        .create(CreateStudentInput {
            name: request.name.trim().to_string(),
            birth_date: request.birth_date,
            responsible_id: request.responsible_id,
            class_id: request.class_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(StudentResponse::from(model))))
}

/// GET /students/{id}
async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<StudentResponse>, ApiError> {
    let repo = StudentRepository::new(Arc::clone(&state.db));
    Ok(Json(repo.find_by_id(id).await?.into()))
}

/// DELETE /students/{id}
async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<StatusCode, ApiError> {
    let repo = StudentRepository::new(Arc::clone(&state.db));
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
