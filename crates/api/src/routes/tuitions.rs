//! Tuition routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use campus_core::tuition::{Tuition, TuitionLifecycle, TuitionStatus};
use campus_db::{
    TuitionRepository,
    repositories::{CreateTuitionInput, TuitionFilter},
};
use campus_shared::types::{PageResponse, ResponsibleId, StudentId, TuitionId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{PageQuery, format_money, reports::resolve_as_of};
use crate::{AppState, error::ApiError};

/// Creates the tuition routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tuitions", get(list_tuitions).post(create_tuition))
        .route("/tuitions/recompute-status", post(recompute_status))
        .route("/tuitions/{id}", get(get_tuition))
        .route("/tuitions/{id}/settle", post(settle_tuition))
}

// ============================================================================
// Query Parameters & Requests
// ============================================================================

/// Query parameters for listing tuitions.
#[derive(Debug, Deserialize)]
pub struct ListTuitionsQuery {
    /// Status filter (`pending`, `paid`, `late`).
    pub status: Option<String>,
    /// Only tuitions of this responsible.
    pub responsible_id: Option<ResponsibleId>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Query parameters carrying a reference date.
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    /// Reference date (YYYY-MM-DD or RFC 3339). Defaults to today.
    pub as_of: Option<String>,
}

/// Request body for billing a tuition.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTuitionRequest {
    /// Responsible who pays.
    pub responsible_id: ResponsibleId,
    /// Student billed for.
    pub student_id: Option<StudentId>,
    /// Amount owed.
    pub amount: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
    /// Free-form label.
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request body for settling a tuition.
#[derive(Debug, Default, Deserialize)]
pub struct SettleTuitionRequest {
    /// Payment date. Defaults to today.
    pub payment_date: Option<NaiveDate>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Responsible summary in tuition responses.
#[derive(Debug, Serialize)]
pub struct ResponsibleSummary {
    /// Responsible ID.
    pub id: Uuid,
    /// Full name.
    pub name: String,
}

/// Tuition in responses.
#[derive(Debug, Serialize)]
pub struct TuitionResponse {
    /// Tuition ID.
    pub id: Uuid,
    /// Amount owed.
    pub amount: String,
    /// Due date.
    pub due_date: String,
    /// Payment date.
    pub payment_date: Option<String>,
    /// Status.
    pub status: TuitionStatus,
    /// Payer, `null` when unresolved.
    pub responsible: Option<ResponsibleSummary>,
    /// Student billed for.
    pub student_id: Option<Uuid>,
    /// Free-form label.
    pub description: Option<String>,
}

impl From<&Tuition> for TuitionResponse {
    fn from(tuition: &Tuition) -> Self {
        Self {
            id: tuition.id.into_inner(),
            amount: format_money(tuition.amount),
            due_date: tuition.due_date.to_string(),
            payment_date: tuition.payment_date.map(|d| d.to_string()),
            status: tuition.status,
            responsible: tuition.responsible.as_ref().map(|r| ResponsibleSummary {
                id: r.id.into_inner(),
                name: r.name.clone(),
            }),
            student_id: tuition.student_id.map(StudentId::into_inner),
            description: tuition.description.clone(),
        }
    }
}

/// Response for a status recompute.
#[derive(Debug, Serialize)]
pub struct RecomputeResponse {
    /// Reference date used.
    pub as_of: String,
    /// Tuitions moved to `late`.
    pub updated: u64,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /tuitions
async fn list_tuitions(
    State(state): State<AppState>,
    Query(query): Query<ListTuitionsQuery>,
) -> Result<Json<PageResponse<TuitionResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<TuitionStatus>)
        .transpose()?;
    let filter = TuitionFilter {
        status,
        responsible_id: query.responsible_id,
    };
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .to_request();

    let repo = TuitionRepository::new(Arc::clone(&state.db));
    let result = repo.list(filter, page).await?;
    Ok(Json(result.map(|t| TuitionResponse::from(&t))))
}

/// POST /tuitions
async fn create_tuition(
    State(state): State<AppState>,
    Json(request): Json<CreateTuitionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    TuitionLifecycle::validate_amount(request.amount)?;

    let repo = TuitionRepository::new(Arc::clone(&state.db));
    let tuition = repo
        .create(CreateTuitionInput {
            responsible_id: request.responsible_id,
            student_id: request.student_id,
            amount: request.amount,
            due_date: request.due_date,
            description: request.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TuitionResponse::from(&tuition))))
}

/// GET /tuitions/{id}
async fn get_tuition(
    State(state): State<AppState>,
    Path(id): Path<TuitionId>,
) -> Result<Json<TuitionResponse>, ApiError> {
    let repo = TuitionRepository::new(Arc::clone(&state.db));
    let tuition = repo.find_by_id(id).await?;
    Ok(Json(TuitionResponse::from(&tuition)))
}

/// POST /tuitions/{id}/settle
async fn settle_tuition(
    State(state): State<AppState>,
    Path(id): Path<TuitionId>,
    request: Option<Json<SettleTuitionRequest>>,
) -> Result<Json<TuitionResponse>, ApiError> {
    let Json(request) = request.unwrap_or_default();
    let payment_date = match request.payment_date {
        Some(date) => date,
        None => state.today()?,
    };

    let repo = TuitionRepository::new(Arc::clone(&state.db));
    let tuition = repo.settle(id, payment_date).await?;
    Ok(Json(TuitionResponse::from(&tuition)))
}

/// POST /tuitions/recompute-status
async fn recompute_status(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<RecomputeResponse>, ApiError> {
    let as_of = resolve_as_of(&state, query.as_of.as_deref())?;

    let repo = TuitionRepository::new(Arc::clone(&state.db));
    let updated = repo.mark_overdue_as_late(as_of).await?;

    Ok(Json(RecomputeResponse {
        as_of: as_of.to_string(),
        updated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mock_db, send};
    use axum::http::Method;
    use campus_db::entities::{sea_orm_active_enums::TuitionStatus as DbStatus, tuitions};
    use rust_decimal_macros::dec;
    use sea_orm::MockExecResult;
    use serde_json::json;

    fn row(status: DbStatus, payment_date: Option<NaiveDate>) -> tuitions::Model {
        let ts = chrono::Utc::now().into();
        tuitions::Model {
            id: Uuid::now_v7(),
            responsible_id: None,
            student_id: None,
            amount: dec!(350),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            payment_date,
            status,
            description: Some("March".to_string()),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn test_get_tuition_formats_amount() {
        let tuition = row(DbStatus::Pending, None);
        let db = mock_db().append_query_results([vec![tuition.clone()]]).into_connection();

        let (status, body) =
            send(db, Method::GET, &format!("/api/v1/tuitions/{}", tuition.id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["amount"], "350.00");
        assert_eq!(body["status"], "pending");
        assert_eq!(body["due_date"], "2024-03-10");
        assert_eq!(body["responsible"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_settle_tuition() {
        let tuition = row(DbStatus::Pending, None);
        let db = mock_db()
            .append_query_results([vec![tuition.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let (status, body) = send(
            db,
            Method::POST,
            &format!("/api/v1/tuitions/{}/settle", tuition.id),
            Some(json!({"payment_date": "2024-03-08"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "paid");
        assert_eq!(body["payment_date"], "2024-03-08");
    }

    #[tokio::test]
    async fn test_settle_without_body_pays_today() {
        let tuition = row(DbStatus::Late, None);
        let db = mock_db()
            .append_query_results([vec![tuition.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let school = campus_shared::SchoolConfig::default();
        let before = school.today(chrono::Utc::now()).unwrap();

        let (status, body) = send(
            db,
            Method::POST,
            &format!("/api/v1/tuitions/{}/settle", tuition.id),
            None,
        )
        .await;

        let after = school.today(chrono::Utc::now()).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "paid");
        let paid_on = body["payment_date"].as_str().unwrap();
        assert!(paid_on == before.to_string() || paid_on == after.to_string());
    }

    #[tokio::test]
    async fn test_settle_paid_tuition_is_rejected() {
        let tuition = row(DbStatus::Paid, NaiveDate::from_ymd_opt(2024, 3, 1));
        let db = mock_db().append_query_results([vec![tuition.clone()]]).into_connection();

        let (status, body) = send(
            db,
            Method::POST,
            &format!("/api/v1/tuitions/{}/settle", tuition.id),
            Some(json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "business_rule_violation");
    }

    #[tokio::test]
    async fn test_create_rejects_zero_amount() {
        let (status, body) = send(
            mock_db().into_connection(),
            Method::POST,
            "/api/v1/tuitions",
            Some(json!({
                "responsible_id": Uuid::now_v7(),
                "amount": "0",
                "due_date": "2024-03-10"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("positive"));
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let (status, _) = send(
            mock_db().into_connection(),
            Method::GET,
            "/api/v1/tuitions?status=overdue",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recompute_status() {
        let overdue = row(DbStatus::Pending, None);
        let db = mock_db()
            .append_query_results([vec![overdue]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let (status, body) = send(
            db,
            Method::POST,
            "/api/v1/tuitions/recompute-status?as_of=2024-03-15",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["as_of"], "2024-03-15");
        assert_eq!(body["updated"], 1);
    }
}
