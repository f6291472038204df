//! Responsible routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use campus_db::{
    ResponsibleRepository, entities::responsibles, repositories::CreateResponsibleInput,
};
use campus_shared::types::{PageResponse, ResponsibleId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::PageQuery;
use crate::{AppState, error::ApiError};

/// Creates the responsible routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/responsibles",
            get(list_responsibles).post(create_responsible),
        )
        .route(
            "/responsibles/{id}",
            get(get_responsible).delete(delete_responsible),
        )
}

/// Request body for creating a responsible.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateResponsibleRequest {
    /// Full name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Contact phone.
    #[validate(length(min = 5, max = 30))]
    pub phone: String,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
}

/// Responsible in responses.
#[derive(Debug, Serialize)]
pub struct ResponsibleResponse {
    /// Responsible ID.
    pub id: Uuid,
    /// Full name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<responsibles::Model> for ResponsibleResponse {
    fn from(model: responsibles::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            email: model.email,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// GET /responsibles
async fn list_responsibles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<ResponsibleResponse>>, ApiError> {
    let repo = ResponsibleRepository::new(Arc::clone(&state.db));
    let page = repo.list(query.to_request()).await?;
    Ok(Json(page.map(ResponsibleResponse::from)))
}

/// POST /responsibles
async fn create_responsible(
    State(state): State<AppState>,
    Json(request): Json<CreateResponsibleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let repo = ResponsibleRepository::new(Arc::clone(&state.db));
    let model = repo
        .create(CreateResponsibleInput {
            name: request.name.trim().to_string(),
            phone: request.phone.trim().to_string(),
            email: request.email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ResponsibleResponse::from(model))))
}

/// GET /responsibles/{id}
async fn get_responsible(
    State(state): State<AppState>,
    Path(id): Path<ResponsibleId>,
) -> Result<Json<ResponsibleResponse>, ApiError> {
    let repo = ResponsibleRepository::new(Arc::clone(&state.db));
    Ok(Json(repo.find_by_id(id).await?.into()))
}

/// DELETE /responsibles/{id}
async fn delete_responsible(
    State(state): State<AppState>,
    Path(id): Path<ResponsibleId>,
) -> Result<StatusCode, ApiError> {
    let repo = ResponsibleRepository::new(Arc::clone(&state.db));
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
