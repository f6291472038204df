//! Tuition report routes.
//!
//! Every report loads one snapshot from the store and runs the pure
//! `TuitionReportService` transforms on it for the requested reference date.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use campus_core::tuition::{
    IntegrityIssue, IntegrityIssueKind, MonthlyGroup, PayerRankingEntry, Tuition,
    TuitionReportService,
};
use campus_db::TuitionRepository;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{
    format_money,
    tuitions::{AsOfQuery, ResponsibleSummary, TuitionResponse},
};
use crate::{AppState, error::ApiError};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/tuitions/monthly", get(get_monthly))
        .route("/reports/tuitions/late", get(get_late))
        .route(
            "/reports/tuitions/current-month-estimate",
            get(get_current_month_estimate),
        )
        .route("/reports/tuitions/on-time-payers", get(get_on_time_payers))
        .route("/reports/tuitions/late-payers", get(get_late_payers))
        .route("/reports/tuitions/overview", get(get_overview))
}

// ============================================================================
// Response Types
// ============================================================================

/// A tuition left out of a report.
#[derive(Debug, Serialize)]
pub struct SkippedResponse {
    /// Tuition ID.
    pub tuition_id: Uuid,
    /// Why it was left out.
    pub kind: IntegrityIssueKind,
}

/// One month/responsible group.
#[derive(Debug, Serialize)]
pub struct MonthlyGroupResponse {
    /// Due-date year.
    pub year: i32,
    /// Due-date month (1-12).
    pub month: u32,
    /// The responsible.
    pub responsible: ResponsibleSummary,
    /// Number of tuitions in the group.
    pub tuition_count: usize,
    /// Sum of the amounts.
    pub total_amount: String,
    /// Tuitions in the group.
    pub tuitions: Vec<TuitionResponse>,
}

/// Response for the monthly grouping.
#[derive(Debug, Serialize)]
pub struct MonthlyReportResponse {
    /// Report type.
    pub report_type: String,
    /// Reference date.
    pub as_of: String,
    /// Groups in order of first appearance.
    pub groups: Vec<MonthlyGroupResponse>,
    /// Tuitions left out.
    pub skipped: Vec<SkippedResponse>,
}

/// Response for the late tuitions report.
#[derive(Debug, Serialize)]
pub struct LateReportResponse {
    /// Report type.
    pub report_type: String,
    /// Reference date.
    pub as_of: String,
    /// Overdue tuitions.
    pub tuitions: Vec<TuitionResponse>,
    /// Sum of the overdue amounts.
    pub total_amount: String,
}

/// Response for the current month estimate.
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    /// Report type.
    pub report_type: String,
    /// Reference date.
    pub as_of: String,
    /// Reference year.
    pub year: i32,
    /// Reference month.
    pub month: u32,
    /// Amount due in the month.
    pub total_estimated: String,
}

/// One ranking line.
#[derive(Debug, Serialize)]
pub struct RankingEntryResponse {
    /// Responsible ID.
    pub responsible_id: Uuid,
    /// Full name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: Option<String>,
    /// Number of matching tuitions.
    pub count: usize,
}

/// Response for payer rankings.
#[derive(Debug, Serialize)]
pub struct RankingResponse {
    /// Report type.
    pub report_type: String,
    /// Reference date.
    pub as_of: String,
    /// Ranked entries.
    pub entries: Vec<RankingEntryResponse>,
    /// Tuitions left out.
    pub skipped: Vec<SkippedResponse>,
}

/// Response for the overview.
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    /// Report type.
    pub report_type: String,
    /// Reference date.
    pub as_of: String,
    /// Groups by month and responsible.
    pub monthly: Vec<MonthlyGroupResponse>,
    /// Overdue tuitions.
    pub late: Vec<TuitionResponse>,
    /// Amount due in the reference month.
    pub current_month_estimate: String,
    /// Responsibles ranked by tuitions paid on time.
    pub on_time_payers: Vec<RankingEntryResponse>,
    /// Responsibles ranked by overdue tuitions.
    pub late_payers: Vec<RankingEntryResponse>,
    /// Every tuition left out of any view.
    pub skipped: Vec<SkippedResponse>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the `as_of` parameter, defaulting to today in the school timezone.
pub(crate) fn resolve_as_of(state: &AppState, as_of: Option<&str>) -> Result<NaiveDate, ApiError> {
    match as_of.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Ok(TuitionReportService::parse_reference_date(raw)?),
        None => state.today(),
    }
}

/// Loads the snapshot and reference date every report needs.
async fn load(state: &AppState, query: &AsOfQuery) -> Result<(Vec<Tuition>, NaiveDate), ApiError> {
    let as_of = resolve_as_of(state, query.as_of.as_deref())?;
    let repo = TuitionRepository::new(Arc::clone(&state.db));
    let snapshot = repo.load_snapshot().await?;
    Ok((snapshot, as_of))
}

fn skipped_to_response(issues: &[IntegrityIssue]) -> Vec<SkippedResponse> {
    issues
        .iter()
        .map(|issue| SkippedResponse {
            tuition_id: issue.tuition_id.into_inner(),
            kind: issue.kind,
        })
        .collect()
}

fn group_to_response(group: &MonthlyGroup) -> MonthlyGroupResponse {
    MonthlyGroupResponse {
        year: group.key.year,
        month: group.key.month,
        responsible: ResponsibleSummary {
            id: group.responsible.id.into_inner(),
            name: group.responsible.name.clone(),
        },
        tuition_count: group.tuitions.len(),
        total_amount: format_money(group.total_amount),
        tuitions: group.tuitions.iter().map(TuitionResponse::from).collect(),
    }
}

fn entries_to_response(entries: &[PayerRankingEntry]) -> Vec<RankingEntryResponse> {
    entries
        .iter()
        .map(|entry| RankingEntryResponse {
            responsible_id: entry.responsible.id.into_inner(),
            name: entry.responsible.name.clone(),
            phone: entry.responsible.phone.clone(),
            email: entry.responsible.email.clone(),
            count: entry.count,
        })
        .collect()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /reports/tuitions/monthly
async fn get_monthly(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<MonthlyReportResponse>, ApiError> {
    let (snapshot, as_of) = load(&state, &query).await?;
    let grouping = TuitionReportService::group_by_month_and_responsible(&snapshot);

    Ok(Json(MonthlyReportResponse {
        report_type: "tuitions_monthly".to_string(),
        as_of: as_of.to_string(),
        groups: grouping.groups.iter().map(group_to_response).collect(),
        skipped: skipped_to_response(&grouping.skipped),
    }))
}

/// GET /reports/tuitions/late
async fn get_late(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<LateReportResponse>, ApiError> {
    let (snapshot, as_of) = load(&state, &query).await?;
    let late = TuitionReportService::late_tuitions(&snapshot, as_of);
    let total: Decimal = late.iter().map(|t| t.amount).sum();

    Ok(Json(LateReportResponse {
        report_type: "tuitions_late".to_string(),
        as_of: as_of.to_string(),
        tuitions: late.iter().map(TuitionResponse::from).collect(),
        total_amount: format_money(total),
    }))
}

/// GET /reports/tuitions/current-month-estimate
async fn get_current_month_estimate(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let (snapshot, as_of) = load(&state, &query).await?;
    let total = TuitionReportService::total_estimated_for_current_month(&snapshot, as_of);

    Ok(Json(EstimateResponse {
        report_type: "tuitions_current_month_estimate".to_string(),
        as_of: as_of.to_string(),
        year: as_of.year(),
        month: as_of.month(),
        total_estimated: format_money(total),
    }))
}

/// GET /reports/tuitions/on-time-payers
async fn get_on_time_payers(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<RankingResponse>, ApiError> {
    let (snapshot, as_of) = load(&state, &query).await?;
    let ranking = TuitionReportService::on_time_payers(&snapshot);

    Ok(Json(RankingResponse {
        report_type: "tuitions_on_time_payers".to_string(),
        as_of: as_of.to_string(),
        entries: entries_to_response(&ranking.entries),
        skipped: skipped_to_response(&ranking.skipped),
    }))
}

/// GET /reports/tuitions/late-payers
async fn get_late_payers(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<RankingResponse>, ApiError> {
    let (snapshot, as_of) = load(&state, &query).await?;
    let ranking = TuitionReportService::most_late_payers(&snapshot, as_of);

    Ok(Json(RankingResponse {
        report_type: "tuitions_late_payers".to_string(),
        as_of: as_of.to_string(),
        entries: entries_to_response(&ranking.entries),
        skipped: skipped_to_response(&ranking.skipped),
    }))
}

/// GET /reports/tuitions/overview
async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<OverviewResponse>, ApiError> {
    let (snapshot, as_of) = load(&state, &query).await?;
    let overview = TuitionReportService::overview(&snapshot, as_of);

    tracing::debug!(
        %as_of,
        tuitions = snapshot.len(),
        skipped = overview.skipped.len(),
        "Tuition overview computed"
    );

    Ok(Json(OverviewResponse {
        report_type: "tuitions_overview".to_string(),
        as_of: overview.as_of.to_string(),
        monthly: overview.monthly.iter().map(group_to_response).collect(),
        late: overview.late.iter().map(TuitionResponse::from).collect(),
        current_month_estimate: format_money(overview.current_month_estimate),
        on_time_payers: entries_to_response(&overview.on_time_payers),
        late_payers: entries_to_response(&overview.late_payers),
        skipped: skipped_to_response(&overview.skipped),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mock_db, send};
    use axum::http::{Method, StatusCode};
    use campus_db::entities::{
        responsibles, sea_orm_active_enums::TuitionStatus as DbStatus, tuitions,
    };
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use sea_orm::DatabaseConnection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        ana: responsibles::Model,
        orphan_id: Uuid,
        rows: Vec<tuitions::Model>,
    }

    /// Ana has a paid-on-time, a late and a pending tuition; one more tuition
    /// points at a responsible that no longer exists.
    fn fixture() -> Fixture {
        let ts = chrono::Utc::now().into();
        let ana = responsibles::Model {
            id: Uuid::now_v7(),
            name: "Ana".to_string(),
            phone: "+55 11 90000-0000".to_string(),
            email: None,
            created_at: ts,
            updated_at: ts,
        };
        let tuition = |amount, due, payment: Option<NaiveDate>, status, responsible_id| {
            tuitions::Model {
                id: Uuid::now_v7(),
                responsible_id,
                student_id: None,
                amount,
                due_date: due,
                payment_date: payment,
                status,
                description: None,
                created_at: ts,
                updated_at: ts,
            }
        };
        let orphan = tuition(
            dec!(80),
            date(2024, 3, 5),
            None,
            DbStatus::Pending,
            Some(Uuid::now_v7()),
        );
        let orphan_id = orphan.id;
        let rows = vec![
            tuition(
                dec!(100),
                date(2024, 2, 10),
                Some(date(2024, 2, 9)),
                DbStatus::Paid,
                Some(ana.id),
            ),
            tuition(dec!(200), date(2024, 3, 1), None, DbStatus::Late, Some(ana.id)),
            tuition(dec!(300), date(2024, 3, 20), None, DbStatus::Pending, Some(ana.id)),
            orphan,
        ];
        Fixture {
            ana,
            orphan_id,
            rows,
        }
    }

    fn snapshot_db(fixture: &Fixture) -> DatabaseConnection {
        mock_db()
            .append_query_results([fixture.rows.clone()])
            .append_query_results([vec![fixture.ana.clone()]])
            .into_connection()
    }

    #[tokio::test]
    async fn test_monthly_report_skips_orphans() {
        let fixture = fixture();
        let (status, body) = send(
            snapshot_db(&fixture),
            Method::GET,
            "/api/v1/reports/tuitions/monthly?as_of=2024-03-15",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let groups = body["groups"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["month"], 2);
        assert_eq!(groups[0]["total_amount"], "100.00");
        assert_eq!(groups[1]["month"], 3);
        assert_eq!(groups[1]["tuition_count"], 2);
        assert_eq!(groups[1]["total_amount"], "500.00");
        assert_eq!(body["skipped"][0]["tuition_id"], fixture.orphan_id.to_string());
        assert_eq!(body["skipped"][0]["kind"], "missing_responsible");
    }

    #[tokio::test]
    async fn test_late_report() {
        let fixture = fixture();
        let (status, body) = send(
            snapshot_db(&fixture),
            Method::GET,
            "/api/v1/reports/tuitions/late?as_of=2024-03-15",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        // Stored late tuition plus the orphan pending one past due.
        assert_eq!(body["tuitions"].as_array().unwrap().len(), 2);
        assert_eq!(body["total_amount"], "280.00");
    }

    #[tokio::test]
    async fn test_current_month_estimate() {
        let fixture = fixture();
        let (status, body) = send(
            snapshot_db(&fixture),
            Method::GET,
            "/api/v1/reports/tuitions/current-month-estimate?as_of=2024-03-15",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["month"], 3);
        assert_eq!(body["total_estimated"], "580.00");
    }

    #[tokio::test]
    async fn test_payer_rankings() {
        let fixture = fixture();
        let (_, on_time) = send(
            snapshot_db(&fixture),
            Method::GET,
            "/api/v1/reports/tuitions/on-time-payers?as_of=2024-03-15",
            None,
        )
        .await;
        assert_eq!(on_time["entries"][0]["name"], "Ana");
        assert_eq!(on_time["entries"][0]["count"], 1);

        let (_, late) = send(
            snapshot_db(&fixture),
            Method::GET,
            "/api/v1/reports/tuitions/late-payers?as_of=2024-03-15",
            None,
        )
        .await;
        assert_eq!(late["entries"][0]["count"], 1);
        assert_eq!(late["skipped"][0]["tuition_id"], fixture.orphan_id.to_string());
    }

    #[tokio::test]
    async fn test_overview() {
        let fixture = fixture();
        let (status, body) = send(
            snapshot_db(&fixture),
            Method::GET,
            "/api/v1/reports/tuitions/overview?as_of=2024-03-15",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["as_of"], "2024-03-15");
        assert_eq!(body["current_month_estimate"], "580.00");
        assert_eq!(body["skipped"].as_array().unwrap().len(), 1);
    }

    #[rstest]
    #[case("15/03/2024")]
    #[case("2024-13-01")]
    #[case("yesterday")]
    #[tokio::test]
    async fn test_invalid_as_of_is_rejected(#[case] as_of: &str) {
        let (status, body) = send(
            mock_db().into_connection(),
            Method::GET,
            &format!("/api/v1/reports/tuitions/late?as_of={as_of}"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[rstest]
    #[case("2024-03-15", date(2024, 3, 15))]
    #[case(" 2024-03-15 ", date(2024, 3, 15))]
    #[case("2024-03-15T23:30:00-03:00", date(2024, 3, 15))]
    #[case("2024-03-01T00:10:00+00:00", date(2024, 3, 1))]
    fn test_resolve_as_of(#[case] raw: &str, #[case] expected: NaiveDate) {
        let state = crate::test_support::state(mock_db().into_connection());
        assert_eq!(resolve_as_of(&state, Some(raw)).unwrap(), expected);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn test_missing_as_of_uses_school_today(#[case] raw: Option<&str>) {
        let state = crate::test_support::state(mock_db().into_connection());
        let before = state.today().unwrap();
        let resolved = resolve_as_of(&state, raw).unwrap();
        let after = state.today().unwrap();
        assert!(resolved == before || resolved == after);
    }
}
