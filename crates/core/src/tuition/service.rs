//! Tuition report generation.
//!
//! Every function here is a pure transform over a snapshot of tuitions. The
//! reference date is always passed in by the caller.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use campus_shared::types::ResponsibleId;
use chrono::{DateTime, Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::error::TuitionError;
use super::types::{
    IntegrityIssue, MonthKey, MonthlyGroup, MonthlyGrouping, PayerRanking, PayerRankingEntry,
    Responsible, Tuition, TuitionOverview, TuitionStatus,
};

/// How a single tuition counts towards a ranking.
enum Tally {
    Count,
    Ignore,
    Skip(IntegrityIssue),
}

/// Service for generating tuition reports.
pub struct TuitionReportService;

impl TuitionReportService {
    /// Parses a caller-supplied reference date.
    ///
    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; a timestamp is reduced to
    /// the calendar date in its own offset.
    pub fn parse_reference_date(input: &str) -> Result<NaiveDate, TuitionError> {
        let trimmed = input.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.date_naive())
            .map_err(|_| TuitionError::InvalidReferenceDate(input.to_string()))
    }

    /// Groups tuitions by due-date month and responsible.
    ///
    /// Groups come out in the order their key is first seen. Tuitions without
    /// a responsible are reported in `skipped`.
    #[must_use]
    pub fn group_by_month_and_responsible(tuitions: &[Tuition]) -> MonthlyGrouping {
        let mut index: HashMap<MonthKey, usize> = HashMap::new();
        let mut grouping = MonthlyGrouping::default();

        for tuition in tuitions {
            let Some(responsible) = &tuition.responsible else {
                grouping
                    .skipped
                    .push(IntegrityIssue::missing_responsible(tuition.id));
                continue;
            };

            let key = MonthKey {
                year: tuition.due_date.year(),
                month: tuition.due_date.month(),
                responsible_id: responsible.id,
            };

            match index.entry(key) {
                Entry::Occupied(slot) => {
                    let group = &mut grouping.groups[*slot.get()];
                    group.total_amount += tuition.amount;
                    group.tuitions.push(tuition.clone());
                }
                Entry::Vacant(slot) => {
                    slot.insert(grouping.groups.len());
                    grouping.groups.push(MonthlyGroup {
                        key,
                        responsible: responsible.clone(),
                        tuitions: vec![tuition.clone()],
                        total_amount: tuition.amount,
                    });
                }
            }
        }

        grouping
    }

    /// Tuitions that are late, or pending with a due date before `today`.
    ///
    /// Stored statuses are not touched; input order is preserved.
    #[must_use]
    pub fn late_tuitions(tuitions: &[Tuition], today: NaiveDate) -> Vec<Tuition> {
        tuitions
            .iter()
            .filter(|t| t.is_overdue(today))
            .cloned()
            .collect()
    }

    /// Sum of every tuition due in `today`'s calendar month, any status.
    #[must_use]
    pub fn total_estimated_for_current_month(tuitions: &[Tuition], today: NaiveDate) -> Decimal {
        tuitions
            .iter()
            .filter(|t| t.is_due_in_month_of(today))
            .map(|t| t.amount)
            .sum()
    }

    /// Responsibles ranked by how many tuitions they paid on or before the
    /// due date.
    #[must_use]
    pub fn on_time_payers(tuitions: &[Tuition]) -> PayerRanking {
        Self::rank_responsibles(tuitions, |t| match t.paid_on_time() {
            Some(true) => Tally::Count,
            Some(false) => Tally::Ignore,
            None if t.status == TuitionStatus::Paid => {
                Tally::Skip(IntegrityIssue::missing_payment_date(t.id))
            }
            None => Tally::Ignore,
        })
    }

    /// Responsibles ranked by how many of their tuitions are overdue.
    #[must_use]
    pub fn most_late_payers(tuitions: &[Tuition], today: NaiveDate) -> PayerRanking {
        Self::rank_responsibles(tuitions, |t| {
            if t.is_overdue(today) {
                Tally::Count
            } else {
                Tally::Ignore
            }
        })
    }

    /// Runs every report for one reference date.
    #[must_use]
    pub fn overview(tuitions: &[Tuition], today: NaiveDate) -> TuitionOverview {
        let monthly = Self::group_by_month_and_responsible(tuitions);
        let on_time = Self::on_time_payers(tuitions);
        let late_payers = Self::most_late_payers(tuitions, today);

        let mut seen = HashSet::new();
        let skipped = monthly
            .skipped
            .iter()
            .chain(&on_time.skipped)
            .chain(&late_payers.skipped)
            .filter(|issue| seen.insert(**issue))
            .copied()
            .collect();

        TuitionOverview {
            as_of: today,
            monthly: monthly.groups,
            late: Self::late_tuitions(tuitions, today),
            current_month_estimate: Self::total_estimated_for_current_month(tuitions, today),
            on_time_payers: on_time.entries,
            late_payers: late_payers.entries,
            skipped,
        }
    }

    fn rank_responsibles<F>(tuitions: &[Tuition], tally: F) -> PayerRanking
    where
        F: Fn(&Tuition) -> Tally,
    {
        let mut counts: HashMap<ResponsibleId, (Responsible, usize)> = HashMap::new();
        let mut skipped = Vec::new();

        for tuition in tuitions {
            let Some(responsible) = &tuition.responsible else {
                skipped.push(IntegrityIssue::missing_responsible(tuition.id));
                continue;
            };

            match tally(tuition) {
                Tally::Count => {
                    counts
                        .entry(responsible.id)
                        .or_insert_with(|| (responsible.clone(), 0))
                        .1 += 1;
                }
                Tally::Ignore => {}
                Tally::Skip(issue) => skipped.push(issue),
            }
        }

        let mut entries: Vec<PayerRankingEntry> = counts
            .into_values()
            .map(|(responsible, count)| PayerRankingEntry { responsible, count })
            .collect();
        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.responsible.id.cmp(&b.responsible.id))
        });

        PayerRanking { entries, skipped }
    }
}
