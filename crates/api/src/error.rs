//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campus_core::listing::ListingError;
use campus_core::tuition::TuitionError;
use campus_db::repositories::{ResponsibleError, SchoolClassError, StudentError, TuitionStoreError};
use campus_shared::AppError;
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

/// Error returned by handlers, rendered as `{"error", "message"}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Status code of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.error_code().to_lowercase();

        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            error!(error = %self.0, "Request failed");
            "An error occurred".to_string()
        };

        (
            status,
            Json(json!({
                "error": code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

macro_rules! into_api_error {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for ApiError {
                fn from(err: $source) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

into_api_error!(
    TuitionError,
    ListingError,
    ResponsibleError,
    StudentError,
    SchoolClassError,
    TuitionStoreError,
);
