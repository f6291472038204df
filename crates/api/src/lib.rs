//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for the school roster and tuitions
//! - Tuition report endpoints backed by `campus_core::tuition`
//! - Table endpoints backed by `campus_core::listing`
//! - JSON error responses

pub mod error;
pub mod routes;

use axum::Router;
use campus_shared::{AppError, ListingConfig, SchoolConfig};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// School settings (timezone for "today").
    pub school: Arc<SchoolConfig>,
    /// Table rendering settings.
    pub listing: Arc<ListingConfig>,
}

impl AppState {
    /// Creates the state from a connection and configuration sections.
    #[must_use]
    pub fn new(db: DatabaseConnection, school: SchoolConfig, listing: ListingConfig) -> Self {
        Self {
            db: Arc::new(db),
            school: Arc::new(school),
            listing: Arc::new(listing),
        }
    }

    /// Today's date in the school timezone.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the configured timezone is unknown.
    pub fn today(&self) -> Result<chrono::NaiveDate, ApiError> {
        self.school
            .today(chrono::Utc::now())
            .map_err(|e| ApiError::from(AppError::Internal(e.to_string())))
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router harness over a mock database.

    use super::{AppState, create_router};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use campus_shared::{ListingConfig, SchoolConfig};
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serde_json::Value;
    use tower::ServiceExt;

    /// A mock Postgres connection with no queued results.
    pub fn mock_db() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    /// State over `db` with default settings.
    pub fn state(db: DatabaseConnection) -> AppState {
        AppState::new(db, SchoolConfig::default(), ListingConfig::default())
    }

    /// Sends one request through the full router.
    pub async fn send(
        db: DatabaseConnection,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = create_router(state(db)).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
