//! Table routes.
//!
//! One renderer serves every resource: rows are shaped as JSON objects and
//! handed to `campus_core::listing::TableView`, which owns columns, cells,
//! filtering, pagination and the delete action.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use campus_core::listing::{RenderOptions, TablePage, TableView};
use campus_db::{
    ResponsibleRepository, SchoolClassRepository, StudentRepository, TuitionRepository,
};
use campus_shared::AppError;
use campus_shared::types::{ResponsibleId, SchoolClassId, StudentId};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::format_money;
use crate::{AppState, error::ApiError};

/// Creates the table routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tables/{resource}", get(get_table))
        .route("/tables/{resource}/{id}", delete(delete_row))
}

/// Resources that can be rendered as a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableResource {
    /// Responsibles.
    Responsibles,
    /// Students.
    Students,
    /// School classes.
    Classes,
    /// Tuitions.
    Tuitions,
}

impl TableResource {
    /// Route segment, also used as the entity name for row links.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Responsibles => "responsibles",
            Self::Students => "students",
            Self::Classes => "classes",
            Self::Tuitions => "tuitions",
        }
    }
}

impl fmt::Display for TableResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableResource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "responsibles" => Ok(Self::Responsibles),
            "students" => Ok(Self::Students),
            "classes" => Ok(Self::Classes),
            "tuitions" => Ok(Self::Tuitions),
            other => Err(AppError::NotFound(format!("Unknown table: {other}"))),
        }
    }
}

/// Query parameters for a table page.
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    /// Case-insensitive filter over the rendered cells.
    pub q: Option<String>,
    /// Page number (1-indexed, clamped).
    pub page: Option<usize>,
}

// ============================================================================
// Row Loading
// ============================================================================

fn link(id: Uuid, name: &str) -> Value {
    json!({ "id": id, "name": name })
}

async fn load_rows(state: &AppState, resource: TableResource) -> Result<Vec<Value>, ApiError> {
    let db = Arc::clone(&state.db);

    let rows = match resource {
        TableResource::Responsibles => ResponsibleRepository::new(db)
            .list_all()
            .await?
            .into_iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "name": r.name,
                    "phone": r.phone,
                    "email": r.email,
                    "created_at": r.created_at.to_rfc3339(),
                })
            })
            .collect(),
        TableResource::Students => {
            let students = StudentRepository::new(Arc::clone(&db)).list_all().await?;
            let responsibles: HashMap<Uuid, String> = ResponsibleRepository::new(Arc::clone(&db))
                .list_all()
                .await?
                .into_iter()
                .map(|r| (r.id, r.name))
                .collect();
            let classes: HashMap<Uuid, String> = SchoolClassRepository::new(db)
                .list_all()
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect();

            students
                .into_iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "name": s.name,
                        "birth_date": s.birth_date.map(|d| d.to_string()),
                        "responsible": responsibles
                            .get(&s.responsible_id)
                            .map(|name| link(s.responsible_id, name)),
                        "class": s
                            .class_id
                            .and_then(|id| classes.get(&id).map(|name| link(id, name))),
                    })
                })
                .collect()
        }
        TableResource::Classes => SchoolClassRepository::new(db)
            .list_with_students()
            .await?
            .into_iter()
            .map(|entry| {
                json!({
                    "id": entry.class.id,
                    "name": entry.class.name,
                    "year": entry.class.year,
                    "students": entry
                        .students
                        .iter()
                        .map(|s| link(s.id, &s.name))
                        .collect::<Vec<_>>(),
                })
            })
            .collect(),
        TableResource::Tuitions => {
            let tuitions = TuitionRepository::new(Arc::clone(&db)).load_snapshot().await?;
            let students: HashMap<Uuid, String> = StudentRepository::new(db)
                .list_all()
                .await?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect();

            tuitions
                .into_iter()
                .map(|t| {
                    let student = t.student_id.map(StudentId::into_inner).and_then(|id| {
                        students.get(&id).map(|name| link(id, name))
                    });
                    json!({
                        "id": t.id,
                        "description": t.description,
                        "amount": format_money(t.amount),
                        "due_date": t.due_date.to_string(),
                        "payment_date": t.payment_date.map(|d| d.to_string()),
                        "status": t.status,
                        "responsible": t.responsible.map(|r| link(r.id.into_inner(), &r.name)),
                        "student": student,
                    })
                })
                .collect()
        }
    };

    Ok(rows)
}

async fn build_view(
    state: &AppState,
    resource: TableResource,
    query: &TableQuery,
) -> Result<TableView, ApiError> {
    let rows = load_rows(state, resource).await?;
    let options = RenderOptions::from(state.listing.as_ref());
    let mut view = TableView::from_json(resource.as_str(), Value::Array(rows), &options)?;

    view.set_filter(query.q.as_deref().unwrap_or_default());
    view.set_page(query.page.unwrap_or(1));
    Ok(view)
}

async fn delete_record(state: AppState, resource: TableResource, id: String) -> Result<(), ApiError> {
    let uuid = Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation(format!("Invalid row id: {id}")))?;
    let db = Arc::clone(&state.db);

    match resource {
        TableResource::Responsibles => {
            ResponsibleRepository::new(db)
                .delete(ResponsibleId::from_uuid(uuid))
                .await?;
        }
        TableResource::Students => {
            StudentRepository::new(db)
                .delete(StudentId::from_uuid(uuid))
                .await?;
        }
        TableResource::Classes => {
            SchoolClassRepository::new(db)
                .delete(SchoolClassId::from_uuid(uuid))
                .await?;
        }
        TableResource::Tuitions => {
            return Err(AppError::BusinessRule("Tuitions cannot be deleted".to_string()).into());
        }
    }
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /tables/{resource}
async fn get_table(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(query): Query<TableQuery>,
) -> Result<Json<TablePage>, ApiError> {
    let resource: TableResource = resource.parse()?;
    let view = build_view(&state, resource, &query).await?;
    Ok(Json(view.current_page()))
}

/// DELETE /tables/{resource}/{id}
async fn delete_row(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    Query(query): Query<TableQuery>,
) -> Result<Json<TablePage>, ApiError> {
    let resource: TableResource = resource.parse()?;
    let mut view = build_view(&state, resource, &query).await?;

    let removed = view
        .remove_row_with(&id, |row_id| delete_record(state.clone(), resource, row_id))
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!("No row {id} in {resource}")).into());
    }

    tracing::info!(%resource, row_id = %id, "Table row deleted");
    Ok(Json(view.current_page()))
}
