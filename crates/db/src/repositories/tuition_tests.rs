use std::collections::HashMap;

use campus_core::tuition::{TuitionReportService, TuitionStatus as CoreStatus};
use chrono::{FixedOffset, TimeZone};
use rust_decimal_macros::dec;

use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn timestamp() -> sea_orm::prelude::DateTimeWithTimeZone {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .unwrap()
}

fn responsible_row(name: &str) -> responsibles::Model {
    responsibles::Model {
        id: Uuid::now_v7(),
        name: name.to_string(),
        phone: "+55 11 90000-0000".to_string(),
        email: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn tuition_row(responsible_id: Option<Uuid>, status: TuitionStatus) -> tuitions::Model {
    tuitions::Model {
        id: Uuid::now_v7(),
        responsible_id,
        student_id: None,
        amount: dec!(420.00),
        due_date: date(2024, 3, 10),
        payment_date: (status == TuitionStatus::Paid).then(|| date(2024, 3, 9)),
        status,
        description: Some("March".to_string()),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

#[test]
fn test_hydrate_resolves_responsible() {
    let ana = responsible_row("Ana");
    let known = HashMap::from([(ana.id, to_core_responsible(&ana))]);
    let row = tuition_row(Some(ana.id), TuitionStatus::Paid);
    let row_id = row.id;

    let tuition = hydrate(row, &known);

    assert_eq!(tuition.id.into_inner(), row_id);
    assert_eq!(tuition.status, CoreStatus::Paid);
    assert_eq!(tuition.payment_date, Some(date(2024, 3, 9)));
    assert_eq!(tuition.paid_on_time(), Some(true));
    let responsible = tuition.responsible.unwrap();
    assert_eq!(responsible.id.into_inner(), ana.id);
    assert_eq!(responsible.name, "Ana");
}

#[test]
fn test_hydrate_leaves_dangling_reference_unresolved() {
    let row = tuition_row(Some(Uuid::now_v7()), TuitionStatus::Pending);
    assert!(hydrate(row, &HashMap::new()).responsible.is_none());

    let cleared = tuition_row(None, TuitionStatus::Late);
    assert!(hydrate(cleared, &HashMap::new()).responsible.is_none());
}

#[test]
fn test_hydrated_orphan_is_reported_by_engine() {
    let ana = responsible_row("Ana");
    let known = HashMap::from([(ana.id, to_core_responsible(&ana))]);
    let snapshot = vec![
        hydrate(tuition_row(Some(ana.id), TuitionStatus::Pending), &known),
        hydrate(tuition_row(None, TuitionStatus::Pending), &known),
    ];

    let grouping = TuitionReportService::group_by_month_and_responsible(&snapshot);

    assert_eq!(grouping.groups.len(), 1);
    assert_eq!(grouping.skipped.len(), 1);
    assert_eq!(grouping.skipped[0].tuition_id, snapshot[1].id);
}

#[test]
fn test_filter_defaults_to_everything() {
    let filter = TuitionFilter::default();
    assert!(filter.status.is_none());
    assert!(filter.responsible_id.is_none());
}

#[test]
fn test_store_errors_map_to_app_errors() {
    let id = TuitionId::new();
    assert_eq!(
        AppError::from(TuitionStoreError::NotFound(id)).status_code(),
        404
    );
    assert_eq!(
        AppError::from(TuitionStoreError::Rule(TuitionError::AlreadyPaid(id))).status_code(),
        422
    );
    assert_eq!(
        AppError::from(TuitionStoreError::ResponsibleNotFound(ResponsibleId::new())).status_code(),
        400
    );
    assert_eq!(
        AppError::from(TuitionStoreError::Database(DbErr::Custom("boom".into()))).status_code(),
        500
    );
}
