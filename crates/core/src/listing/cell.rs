//! Cell rendering rules.

use std::fmt::Write as _;

use campus_shared::ListingConfig;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::column::{pluralize, row_id};

/// A rendered table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    /// Navigable link to an entity page.
    Link {
        /// Target path.
        href: String,
        /// Link text.
        label: String,
    },
    /// Localized date.
    Date {
        /// Formatted date.
        value: String,
    },
    /// Comma-joined names of nested entities.
    Names {
        /// Joined names.
        value: String,
    },
    /// Anything else, as text.
    Text {
        /// String form of the value.
        value: String,
    },
}

impl Cell {
    /// The text a reader sees in this cell.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Link { label, .. } => label,
            Self::Date { value } | Self::Names { value } | Self::Text { value } => value,
        }
    }
}

/// Rendering settings.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// `chrono` format string for date cells.
    pub date_format: String,
    /// Rows per page.
    pub page_size: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&ListingConfig::default())
    }
}

impl From<&ListingConfig> for RenderOptions {
    fn from(config: &ListingConfig) -> Self {
        Self {
            date_format: config.date_format.clone(),
            page_size: config.page_size.max(1),
        }
    }
}

/// Renders one cell of a row belonging to `entity` (plural route name).
#[must_use]
pub fn render_cell(
    entity: &str,
    column: &str,
    value: &Value,
    row_id_value: Option<&str>,
    options: &RenderOptions,
) -> Cell {
    if column == "name"
        && let Some(id) = row_id_value
    {
        return Cell::Link {
            href: format!("/{entity}/{id}"),
            label: plain_text(value),
        };
    }

    match value {
        Value::String(s) => match parse_date(s) {
            Some(date) => Cell::Date {
                value: format_date(date, &options.date_format),
            },
            None => Cell::Text { value: s.clone() },
        },
        Value::Array(items) if items.iter().all(|item| name_of(item).is_some()) => Cell::Names {
            value: items
                .iter()
                .filter_map(name_of)
                .collect::<Vec<_>>()
                .join(", "),
        },
        Value::Object(object) => match (name_of(value), row_id(object)) {
            (Some(name), Some(id)) => Cell::Link {
                href: format!("/{}/{id}", pluralize(column)),
                label: name.to_string(),
            },
            (Some(name), None) => Cell::Text {
                value: name.to_string(),
            },
            (None, _) => Cell::Text {
                value: plain_text(value),
            },
        },
        _ => Cell::Text {
            value: plain_text(value),
        },
    }
}

fn name_of(value: &Value) -> Option<&str> {
    value.as_object()?.get("name")?.as_str()
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn format_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        // Bad format strings fall back to ISO.
        return date.to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn render(column: &str, value: &Value, id: Option<&str>) -> Cell {
        render_cell("students", column, value, id, &RenderOptions::default())
    }

    #[test]
    fn test_name_column_links_to_row() {
        assert_eq!(
            render("name", &json!("Ana"), Some("42")),
            Cell::Link {
                href: "/students/42".into(),
                label: "Ana".into()
            }
        );
    }

    #[test]
    fn test_name_without_row_id_is_text() {
        assert_eq!(
            render("name", &json!("Ana"), None),
            Cell::Text {
                value: "Ana".into()
            }
        );
    }

    #[rstest]
    #[case("2024-03-05", "05/03/2024")]
    #[case("2024-03-05T12:00:00Z", "05/03/2024")]
    #[case("2024-03-05T12:00:00.125", "05/03/2024")]
    fn test_dates_are_localized(#[case] raw: &str, #[case] shown: &str) {
        assert_eq!(
            render("due_date", &json!(raw), Some("1")),
            Cell::Date {
                value: shown.into()
            }
        );
    }

    #[test]
    fn test_custom_date_format() {
        let options = RenderOptions {
            date_format: "%Y/%m/%d".into(),
            page_size: 10,
        };
        let cell = render_cell("tuitions", "due_date", &json!("2024-03-05"), None, &options);
        assert_eq!(cell.text(), "2024/03/05");
    }

    #[test]
    fn test_name_list() {
        let value = json!([{"id": "1", "name": "Ana"}, {"id": "2", "name": "Bia"}]);
        assert_eq!(
            render("students", &value, Some("c1")),
            Cell::Names {
                value: "Ana, Bia".into()
            }
        );
    }

    #[test]
    fn test_mixed_array_is_plain_text() {
        let value = json!([{"name": "Ana"}, 3]);
        assert_eq!(render("tags", &value, None).text(), r#"[{"name":"Ana"},3]"#);
    }

    #[test]
    fn test_nested_object_links_to_its_own_page() {
        let value = json!({"id": "r9", "name": "Carla"});
        assert_eq!(
            render("responsible", &value, Some("s1")),
            Cell::Link {
                href: "/responsibles/r9".into(),
                label: "Carla".into()
            }
        );
        let class = json!({"id": "c2", "name": "5A"});
        assert_eq!(
            render("class", &class, Some("s1")),
            Cell::Link {
                href: "/classes/c2".into(),
                label: "5A".into()
            }
        );
    }

    #[rstest]
    #[case(json!(null), "")]
    #[case(json!(350.5), "350.5")]
    #[case(json!(true), "true")]
    #[case(json!("pending"), "pending")]
    #[case(json!("350.00"), "350.00")]
    #[case(json!({"code": 1}), r#"{"code":1}"#)]
    fn test_fallback_text(#[case] value: Value, #[case] shown: &str) {
        assert_eq!(
            render("other", &value, Some("1")),
            Cell::Text {
                value: shown.into()
            }
        );
    }
}
