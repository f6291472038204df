//! Filterable, paginated table view.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::cell::{Cell, RenderOptions, render_cell};
use super::column::{infer_columns, row_id};
use super::error::ListingError;

/// A rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row identifier, used by the delete action.
    pub id: Option<String>,
    /// One cell per column.
    pub cells: Vec<Cell>,
}

impl TableRow {
    fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self
                .cells
                .iter()
                .any(|cell| cell.text().to_lowercase().contains(needle))
    }
}

/// One page of a table, ready to serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablePage {
    /// Entity route name (e.g. `students`).
    pub entity: String,
    /// Column headers.
    pub columns: Vec<String>,
    /// Rows on this page.
    pub rows: Vec<TableRow>,
    /// Active filter.
    pub filter: String,
    /// Current page (1-indexed).
    pub page: usize,
    /// Page count for the filtered rows; at least 1.
    pub total_pages: usize,
    /// Number of rows matching the filter.
    pub total_rows: usize,
}

/// Table state: rendered rows plus filter and page position.
#[derive(Debug, Clone)]
pub struct TableView {
    entity: String,
    columns: Vec<String>,
    rows: Vec<TableRow>,
    filter: String,
    page: usize,
    page_size: usize,
}

impl TableView {
    /// Renders `rows` for the entity route `entity`.
    #[must_use]
    pub fn new(
        entity: impl Into<String>,
        rows: &[Map<String, Value>],
        options: &RenderOptions,
    ) -> Self {
        let entity = entity.into();
        let columns = infer_columns(rows);
        let rows = rows
            .iter()
            .map(|row| {
                let id = row_id(row);
                let cells = columns
                    .iter()
                    .map(|column| {
                        render_cell(
                            &entity,
                            column,
                            row.get(column).unwrap_or(&Value::Null),
                            id.as_deref(),
                            options,
                        )
                    })
                    .collect();
                TableRow { id, cells }
            })
            .collect();

        Self {
            entity,
            columns,
            rows,
            filter: String::new(),
            page: 1,
            page_size: options.page_size.max(1),
        }
    }

    /// Renders a JSON array of objects.
    ///
    /// # Errors
    ///
    /// Fails if `value` is not an array or any element is not an object.
    pub fn from_json(
        entity: impl Into<String>,
        value: Value,
        options: &RenderOptions,
    ) -> Result<Self, ListingError> {
        let Value::Array(items) = value else {
            return Err(ListingError::NotAnArray(json_kind(&value)));
        };
        let rows = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(map),
                _ => Err(ListingError::RowNotObject(index)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entity, &rows, options))
    }

    /// Column headers.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Sets the filter and goes back to the first page.
    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.trim().to_lowercase();
        self.page = 1;
    }

    /// Rows matching the filter, in original order.
    #[must_use]
    pub fn filtered_rows(&self) -> Vec<&TableRow> {
        self.rows
            .iter()
            .filter(|row| row.matches(&self.filter))
            .collect()
    }

    /// Page count for the filtered rows; at least 1.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.filtered_rows().len().div_ceil(self.page_size).max(1)
    }

    /// Moves to `page`, clamped to the valid range. Returns the page chosen.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.page_count());
        self.page
    }

    /// The current page.
    #[must_use]
    pub fn current_page(&self) -> TablePage {
        let filtered = self.filtered_rows();
        let total_rows = filtered.len();
        let start = (self.page - 1) * self.page_size;

        TablePage {
            entity: self.entity.clone(),
            columns: self.columns.clone(),
            rows: filtered
                .into_iter()
                .skip(start)
                .take(self.page_size)
                .cloned()
                .collect(),
            filter: self.filter.clone(),
            page: self.page,
            total_pages: total_rows.div_ceil(self.page_size).max(1),
            total_rows,
        }
    }

    /// Runs `delete` for the row and drops it from the view once it succeeds.
    ///
    /// Returns `Ok(false)` without calling `delete` when no row has that id.
    /// On error the view is left untouched.
    pub async fn remove_row_with<F, Fut, E>(&mut self, id: &str, delete: F) -> Result<bool, E>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let Some(position) = self
            .rows
            .iter()
            .position(|row| row.id.as_deref() == Some(id))
        else {
            return Ok(false);
        };

        delete(id.to_string()).await?;

        self.rows.remove(position);
        self.page = self.page.min(self.page_count());
        Ok(true)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn students(count: usize) -> Value {
        Value::Array(
            (1..=count)
                .map(|n| {
                    let parent = if n % 2 == 0 { "Maria" } else { "Joao" };
                    json!({
                        "id": format!("s{n}"),
                        "name": format!("Student {n}"),
                        "birth_date": "2015-06-01",
                        "responsible": {"id": "r1", "name": parent},
                    })
                })
                .collect(),
        )
    }

    fn view(count: usize) -> TableView {
        TableView::from_json("students", students(count), &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_columns_and_cells() {
        let table = view(1);
        assert_eq!(table.columns(), ["name", "birth_date", "responsible"]);

        let page = table.current_page();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].id.as_deref(), Some("s1"));
        assert_eq!(
            page.rows[0].cells,
            vec![
                Cell::Link {
                    href: "/students/s1".into(),
                    label: "Student 1".into()
                },
                Cell::Date {
                    value: "01/06/2015".into()
                },
                Cell::Link {
                    href: "/responsibles/r1".into(),
                    label: "Joao".into()
                },
            ]
        );
    }

    #[test]
    fn test_missing_key_renders_empty() {
        let rows = json!([
            {"id": "1", "name": "A", "email": "a@x"},
            {"id": "2", "name": "B"}
        ]);
        let table = TableView::from_json("responsibles", rows, &RenderOptions::default()).unwrap();
        let page = table.current_page();
        assert_eq!(page.rows[1].cells[1].text(), "");
    }

    #[test]
    fn test_rejects_non_arrays_and_non_objects() {
        let options = RenderOptions::default();
        assert!(matches!(
            TableView::from_json("x", json!({"a": 1}), &options),
            Err(ListingError::NotAnArray("object"))
        ));
        assert!(matches!(
            TableView::from_json("x", json!([{"id": 1}, 2]), &options),
            Err(ListingError::RowNotObject(1))
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = view(0);
        let page = table.current_page();
        assert!(table.columns().is_empty());
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_pagination_ten_per_page() {
        let mut table = view(25);
        assert_eq!(table.page_count(), 3);
        assert_eq!(table.current_page().rows.len(), 10);

        assert_eq!(table.set_page(3), 3);
        let last = table.current_page();
        assert_eq!(last.rows.len(), 5);
        assert_eq!(last.rows[0].id.as_deref(), Some("s21"));

        assert_eq!(table.set_page(99), 3);
        assert_eq!(table.set_page(0), 1);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_resets_page() {
        let mut table = view(25);
        table.set_page(2);
        table.set_filter("  MARIA ");

        let page = table.current_page();
        assert_eq!(page.page, 1);
        assert_eq!(page.filter, "maria");
        assert_eq!(page.total_rows, 12);
        assert_eq!(page.total_pages, 2);
        assert!(page.rows.iter().all(|r| r.cells[2].text() == "Maria"));
    }

    #[test]
    fn test_filter_matches_rendered_dates() {
        let mut table = view(3);
        table.set_filter("01/06/2015");
        assert_eq!(table.current_page().total_rows, 3);
        table.set_filter("2015-06-01");
        assert_eq!(table.current_page().total_rows, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_row_after_success() {
        let mut table = view(3);
        let removed = table
            .remove_row_with("s2", |id| async move {
                assert_eq!(id, "s2");
                Ok::<(), String>(())
            })
            .await
            .unwrap();
        assert!(removed);
        let ids: Vec<_> = table
            .current_page()
            .rows
            .iter()
            .filter_map(|r| r.id.clone())
            .collect();
        assert_eq!(ids, vec!["s1", "s3"]);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_row() {
        let mut table = view(3);
        let result = table
            .remove_row_with("s2", |_| async { Err::<(), _>("backend down") })
            .await;
        assert_eq!(result, Err("backend down"));
        assert_eq!(table.current_page().total_rows, 3);
    }

    #[tokio::test]
    async fn test_delete_unknown_row_skips_call() {
        let mut table = view(3);
        let mut called = false;
        let removed = table
            .remove_row_with("nope", |_| {
                called = true;
                async { Ok::<(), String>(()) }
            })
            .await
            .unwrap();
        assert!(!removed);
        assert!(!called);
        assert_eq!(table.current_page().total_rows, 3);
    }

    #[tokio::test]
    async fn test_delete_last_row_on_last_page_moves_back() {
        let mut table = view(11);
        table.set_page(2);
        table
            .remove_row_with("s11", |_| async { Ok::<(), String>(()) })
            .await
            .unwrap();
        let page = table.current_page();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
    }
}
