//! Tuition state transitions.
//!
//! `pending -> paid` on settlement, `pending -> late` once the due date has
//! passed. `late -> paid` is also a settlement.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::TuitionError;
use super::types::{Tuition, TuitionStatus};

/// Tuition lifecycle rules.
pub struct TuitionLifecycle;

impl TuitionLifecycle {
    /// Validates a new tuition amount.
    ///
    /// # Errors
    ///
    /// Returns `TuitionError::NonPositiveAmount` if the amount is zero or negative.
    pub fn validate_amount(amount: Decimal) -> Result<(), TuitionError> {
        if amount <= Decimal::ZERO {
            return Err(TuitionError::NonPositiveAmount(amount));
        }
        Ok(())
    }

    /// Returns the settled version of a tuition.
    ///
    /// # Errors
    ///
    /// Returns `TuitionError::AlreadyPaid` if the tuition is already settled.
    pub fn settle(tuition: &Tuition, payment_date: NaiveDate) -> Result<Tuition, TuitionError> {
        if tuition.status == TuitionStatus::Paid {
            return Err(TuitionError::AlreadyPaid(tuition.id));
        }

        Ok(Tuition {
            status: TuitionStatus::Paid,
            payment_date: Some(payment_date),
            ..tuition.clone()
        })
    }

    /// Status a scheduled recompute should move the tuition to, if any.
    #[must_use]
    pub fn recomputed_status(tuition: &Tuition, today: NaiveDate) -> Option<TuitionStatus> {
        (tuition.status == TuitionStatus::Pending
            && tuition.payment_date.is_none()
            && tuition.due_date < today)
            .then_some(TuitionStatus::Late)
    }
}
