//! Entity records as returned by one query page

use serde_json::{Map, Value};

/// Field name to value mapping with no fixed schema.
pub type Record = Map<String, Value>;

/// Typed accessors for GraphQL records.
///
/// The subgraph encodes `BigInt` fields as strings, so the numeric accessors accept
/// both JSON numbers and numeric strings.
pub trait RecordExt {
    fn str_field(&self, key: &str) -> Option<&str>;
    fn i64_field(&self, key: &str) -> Option<i64>;
    fn f64_field(&self, key: &str) -> Option<f64>;
}

impl RecordExt for Record {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn i64_field(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    fn f64_field(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

/// Extracts the records stored under `result_key` in a `data` object.
///
/// A missing key, or a value that is not an array, yields an empty page.
pub fn extract_page(data: &Record, result_key: &str) -> Vec<Record> {
    data.get(result_key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect()
        })
        .unwrap_or_default()
}
