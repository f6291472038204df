//! Tuition data types.

use campus_shared::types::{ResponsibleId, StudentId, TuitionId};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::TuitionError;

/// Settlement status of a tuition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TuitionStatus {
    /// Not yet paid and not yet overdue (as of the last recompute).
    Pending,
    /// Settled.
    Paid,
    /// Overdue and unpaid.
    Late,
}

impl TuitionStatus {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Late => "late",
        }
    }
}

impl std::fmt::Display for TuitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TuitionStatus {
    type Err = TuitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "late" => Ok(Self::Late),
            _ => Err(TuitionError::UnknownStatus(s.to_string())),
        }
    }
}

/// A parent or guardian who pays tuitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Responsible {
    /// Responsible ID.
    pub id: ResponsibleId,
    /// Full name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: Option<String>,
}

/// A single billing obligation with its responsible already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuition {
    /// Tuition ID.
    pub id: TuitionId,
    /// Amount owed.
    pub amount: Decimal,
    /// Date the amount is owed.
    pub due_date: NaiveDate,
    /// Date it was actually paid.
    pub payment_date: Option<NaiveDate>,
    /// Current status.
    pub status: TuitionStatus,
    /// Payer. `None` when the store could not resolve the reference.
    pub responsible: Option<Responsible>,
    /// Student the tuition bills for.
    pub student_id: Option<StudentId>,
    /// Free-form label (e.g. "March tuition").
    pub description: Option<String>,
}

impl Tuition {
    /// Unpaid and past due as of `today`, whether or not the stored status
    /// has been recomputed yet.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.status {
            TuitionStatus::Late => true,
            TuitionStatus::Pending => self.due_date < today,
            TuitionStatus::Paid => false,
        }
    }

    /// `Some(true)` when settled on or before the due date. `None` when the
    /// tuition is not paid or the payment date is missing.
    #[must_use]
    pub fn paid_on_time(&self) -> Option<bool> {
        if self.status != TuitionStatus::Paid {
            return None;
        }
        self.payment_date.map(|paid| paid <= self.due_date)
    }

    /// Whether the due date falls in the same calendar month as `date`.
    #[must_use]
    pub fn is_due_in_month_of(&self, date: NaiveDate) -> bool {
        self.due_date.year() == date.year() && self.due_date.month() == date.month()
    }

    /// Responsible ID, if resolved.
    #[must_use]
    pub fn responsible_id(&self) -> Option<ResponsibleId> {
        self.responsible.as_ref().map(|r| r.id)
    }
}

/// Kind of data-integrity problem found in a tuition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityIssueKind {
    /// The responsible reference could not be resolved.
    MissingResponsible,
    /// Status is `paid` but no payment date was recorded.
    MissingPaymentDate,
}

/// A tuition left out of a responsible-keyed view, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegrityIssue {
    /// The skipped tuition.
    pub tuition_id: TuitionId,
    /// What is wrong with it.
    pub kind: IntegrityIssueKind,
}

impl IntegrityIssue {
    /// Issue for a tuition with no responsible.
    #[must_use]
    pub const fn missing_responsible(tuition_id: TuitionId) -> Self {
        Self {
            tuition_id,
            kind: IntegrityIssueKind::MissingResponsible,
        }
    }

    /// Issue for a paid tuition with no payment date.
    #[must_use]
    pub const fn missing_payment_date(tuition_id: TuitionId) -> Self {
        Self {
            tuition_id,
            kind: IntegrityIssueKind::MissingPaymentDate,
        }
    }
}

/// Grouping key: due-date year and month plus the responsible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    /// Calendar year of the due date.
    pub year: i32,
    /// Calendar month of the due date (1-12).
    pub month: u32,
    /// Responsible owning the tuitions.
    pub responsible_id: ResponsibleId,
}

/// Tuitions of one responsible due in one month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyGroup {
    /// Group key.
    pub key: MonthKey,
    /// The responsible.
    pub responsible: Responsible,
    /// Tuitions in the group, in input order.
    pub tuitions: Vec<Tuition>,
    /// Sum of the tuition amounts.
    pub total_amount: Decimal,
}

/// Result of grouping by month and responsible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyGrouping {
    /// Groups in order of first appearance.
    pub groups: Vec<MonthlyGroup>,
    /// Tuitions left out.
    pub skipped: Vec<IntegrityIssue>,
}

/// One line of a payer ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerRankingEntry {
    /// The responsible.
    pub responsible: Responsible,
    /// Number of matching tuitions.
    pub count: usize,
}

/// Responsibles ranked by a tuition count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayerRanking {
    /// Entries, highest count first, ties by responsible ID ascending.
    pub entries: Vec<PayerRankingEntry>,
    /// Tuitions left out.
    pub skipped: Vec<IntegrityIssue>,
}

/// Every tuition report for one reference date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuitionOverview {
    /// Reference date the reports were computed for.
    pub as_of: NaiveDate,
    /// Groups by month and responsible.
    pub monthly: Vec<MonthlyGroup>,
    /// Overdue tuitions.
    pub late: Vec<Tuition>,
    /// Amount due in the reference month.
    pub current_month_estimate: Decimal,
    /// Responsibles ranked by tuitions paid on time.
    pub on_time_payers: Vec<PayerRankingEntry>,
    /// Responsibles ranked by overdue tuitions.
    pub late_payers: Vec<PayerRankingEntry>,
    /// Every tuition left out of any view, without duplicates.
    pub skipped: Vec<IntegrityIssue>,
}
