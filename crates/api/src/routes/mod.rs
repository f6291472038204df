//! API route definitions.

use axum::Router;
use campus_shared::types::PageRequest;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::AppState;

pub mod classes;
pub mod health;
pub mod reports;
pub mod responsibles;
pub mod students;
pub mod tables;
pub mod tuitions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(responsibles::routes())
        .merge(students::routes())
        .merge(classes::routes())
        .merge(tuitions::routes())
        .merge(reports::routes())
        .merge(tables::routes())
}

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Converts to a normalized page request.
    #[must_use]
    pub fn to_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
        .normalized()
    }
}

/// Formats a Decimal as a string with 2 decimal places.
pub(crate) fn format_money(amount: Decimal) -> String {
    format!("{amount:.2}")
}
