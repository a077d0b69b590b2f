//! Infers a pseudo-struct from sample JSON, as a starting point for hand-written models.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKeys {
    Yes,
    No,
}

/// Renders `data` as `struct <name>:` followed by one `key: Type` line per field.
///
/// Non-empty objects, and objects found first in a list, are expanded one level
/// deeper. Only the first element of a list is inspected.
pub fn sketch(name: &str, data: &Map<String, Value>, sort: SortKeys) -> String {
    let mut s = format!("struct {name}:\n");
    write_fields(&mut s, data, 1, sort);
    s
}

fn type_name(value: &Value) -> String {
    match value {
        Value::Null => "Null".into(),
        Value::Bool(_) => "bool".into(),
        Value::Number(n) if n.is_f64() => "f64".into(),
        Value::Number(_) => "i64".into(),
        Value::String(_) => "String".into(),
        Value::Array(items) => match items.first() {
            Some(first) => format!("Vec<{}>", type_name(first)),
            None => "Vec".into(),
        },
        Value::Object(_) => "Map".into(),
    }
}

fn write_fields(s: &mut String, data: &Map<String, Value>, depth: usize, sort: SortKeys) {
    let indent = " ".repeat(depth * 4);
    let mut entries = data.iter().collect::<Vec<_>>();
    if sort == SortKeys::Yes {
        entries.sort_by(|a, b| a.0.cmp(b.0));
    }
    for (key, value) in entries {
        let key = if key == "type" { "r#type" } else { key.as_str() };
        s.push_str(&format!("{indent}{key}: {}\n", type_name(value)));
        let nested = match value {
            Value::Array(items) => items.first().and_then(Value::as_object),
            Value::Object(map) if !map.is_empty() => Some(map),
            _ => None,
        };
        if let Some(nested) = nested {
            write_fields(s, nested, depth + 1, sort);
        }
    }
}
