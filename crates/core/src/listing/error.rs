//! Listing error types.

use campus_shared::AppError;
use thiserror::Error;

/// Errors raised when building a table from raw rows.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Rows were not a JSON array.
    #[error("Expected an array of rows, got {0}")]
    NotAnArray(&'static str),

    /// A row was not a JSON object.
    #[error("Row {0} is not an object")]
    RowNotObject(usize),
}

impl From<ListingError> for AppError {
    fn from(err: ListingError) -> Self {
        Self::Internal(err.to_string())
    }
}
