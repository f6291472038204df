//! Tuition error types.

use campus_shared::AppError;
use campus_shared::types::TuitionId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by tuition rules and report inputs.
#[derive(Debug, Error)]
pub enum TuitionError {
    /// The reference date could not be parsed.
    #[error("Invalid reference date: {0:?} (expected YYYY-MM-DD or RFC 3339)")]
    InvalidReferenceDate(String),

    /// Unknown status name.
    #[error("Unknown tuition status: {0}")]
    UnknownStatus(String),

    /// Tuition was already settled.
    #[error("Tuition {0} is already paid")]
    AlreadyPaid(TuitionId),

    /// Amount must be greater than zero.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
}

impl From<TuitionError> for AppError {
    fn from(err: TuitionError) -> Self {
        match err {
            TuitionError::InvalidReferenceDate(_)
            | TuitionError::UnknownStatus(_)
            | TuitionError::NonPositiveAmount(_) => Self::Validation(err.to_string()),
            TuitionError::AlreadyPaid(_) => Self::BusinessRule(err.to_string()),
        }
    }
}
