//! Column inference.

use serde_json::{Map, Value};

/// Keys that identify a record rather than describe it.
pub const BOOKKEEPING_KEYS: &[&str] = &["id", "_id", "__v"];

/// Column names: the keys of the first row, minus bookkeeping keys, in the
/// row's own key order.
#[must_use]
pub fn infer_columns(rows: &[Map<String, Value>]) -> Vec<String> {
    rows.first()
        .map(|first| {
            first
                .keys()
                .filter(|key| !BOOKKEEPING_KEYS.contains(&key.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Identifier of a row or nested object, as a string.
#[must_use]
pub fn row_id(object: &Map<String, Value>) -> Option<String> {
    ["id", "_id"]
        .iter()
        .find_map(|key| match object.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
}

/// Route segment for an entity name (`responsible` -> `responsibles`,
/// `class` -> `classes`).
#[must_use]
pub fn pluralize(name: &str) -> String {
    if name.ends_with('s') || name.ends_with('x') || name.ends_with("ch") || name.ends_with("sh") {
        format!("{name}es")
    } else {
        format!("{name}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_columns_follow_first_row_without_bookkeeping() {
        let rows = vec![
            object(json!({"_id": "a", "name": "Ana", "phone": "1", "__v": 0, "id": "a"})),
            object(json!({"id": "b", "name": "Bia", "email": "b@x"})),
        ];
        assert_eq!(infer_columns(&rows), vec!["name", "phone"]);
    }

    #[test]
    fn test_no_rows_no_columns() {
        assert!(infer_columns(&[]).is_empty());
    }

    #[test]
    fn test_row_id_prefers_id_then_underscore_id() {
        assert_eq!(row_id(&object(json!({"id": "x", "_id": "y"}))), Some("x".into()));
        assert_eq!(row_id(&object(json!({"_id": "y"}))), Some("y".into()));
        assert_eq!(row_id(&object(json!({"id": 7}))), Some("7".into()));
        assert_eq!(row_id(&object(json!({"id": ""}))), None);
        assert_eq!(row_id(&object(json!({"name": "n"}))), None);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("responsible"), "responsibles");
        assert_eq!(pluralize("class"), "classes");
        assert_eq!(pluralize("student"), "students");
    }
}
