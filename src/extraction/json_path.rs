//! JSON path resolution over aggregation responses.
//!
//! Resolves segment paths like `["by_project", "buckets"]` and reads the
//! scalar shapes the store uses for bucket keys, counts and metric values.

use serde_json::Value;

/// Resolve a segment path to a value in JSON.
///
/// Object segments are looked up by key; array segments must be indices.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use buildlens_core::extraction::resolve_path;
/// let data = json!({"total_pass": {"value": 3.0}});
/// assert_eq!(resolve_path(&data, &["total_pass", "value"]), Some(&json!(3.0)));
/// ```
pub fn resolve_path<'a>(data: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = data;
    for part in path {
        current = match current {
            Value::Object(obj) => obj.get(*part)?,
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// The `buckets` array of a named multi-bucket aggregation under `node`.
///
/// `None` when the aggregation is absent; callers decide whether that is a
/// fault or an empty level.
pub fn buckets<'a>(node: &'a Value, agg_name: &str) -> Option<&'a [Value]> {
    resolve_path(node, &[agg_name, "buckets"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// Bucket key as a string; numeric keys are stringified.
pub fn bucket_key(bucket: &Value) -> Option<String> {
    match bucket.get("key")? {
        Value::Null => None,
        key => Some(value_to_string(key)),
    }
}

/// Document count of a bucket, zero when absent.
pub fn doc_count(bucket: &Value) -> u64 {
    bucket.get("doc_count").and_then(value_to_u64).unwrap_or(0)
}

/// Convert a JSON value to a plain string.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(), // Arrays and objects as JSON strings
    }
}

/// Convert a JSON value to a non-negative count if possible.
///
/// Pipeline aggregations report sums as floats; they are rounded.
pub fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
