//! Tolerant extraction of JSON payloads from free-form model output.
//!
//! Both entry points are total: malformed text degrades to an empty array or
//! an empty object instead of an error.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("static regex"));

static ITEMS_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{\s*"items"\s*:\s*\[[\s\S]*\]\s*\}"#).expect("static regex"));

/// Removes Markdown code-fence markers, keeping the fenced content.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Narrows `text` to the span between the first `open` and the last `close`.
fn outermost_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start < end).then(|| &text[start..=end])
}

/// Extracts a JSON array from model output.
///
/// Accepts fenced JSON, prose around the array, and an object wrapping the
/// array under any key (the first array-valued key wins).
pub fn parse_array(text: &str) -> Vec<Value> {
    let cleaned = strip_code_fences(text);
    let candidate = outermost_span(&cleaned, '[', ']').unwrap_or(&cleaned);

    let parsed = serde_json::from_str::<Value>(candidate)
        .or_else(|_| serde_json::from_str::<Value>(&cleaned));

    match parsed {
        Ok(Value::Array(items)) => items,
        Ok(Value::Object(map)) => unwrap_object(map),
        Ok(Value::Null) => Vec::new(),
        Ok(other) => vec![other],
        Err(e) => match recover_items(&cleaned) {
            Some(items) => {
                tracing::warn!(
                    len = text.len(),
                    "Recovered items array from malformed response: {}",
                    e
                );
                items
            }
            None => {
                tracing::warn!(
                    len = text.len(),
                    "Unparseable array response, returning empty list: {}",
                    e
                );
                Vec::new()
            }
        },
    }
}

fn unwrap_object(map: Map<String, Value>) -> Vec<Value> {
    let first_array = map.iter().find_map(|(_, v)| match v {
        Value::Array(items) => Some(items.clone()),
        _ => None,
    });
    first_array.unwrap_or_else(|| vec![Value::Object(map)])
}

fn recover_items(text: &str) -> Option<Vec<Value>> {
    let fragment = ITEMS_OBJECT.find(text)?;
    match serde_json::from_str::<Value>(fragment.as_str()).ok()? {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Extracts a JSON object from model output.
///
/// Accepts fenced JSON, prose around the object, and an array wrapping the
/// object (its first element is used).
pub fn parse_object(text: &str) -> Map<String, Value> {
    let cleaned = strip_code_fences(text);
    let candidate = outermost_span(&cleaned, '{', '}').unwrap_or(&cleaned);

    let parsed = serde_json::from_str::<Value>(candidate)
        .or_else(|_| serde_json::from_str::<Value>(&cleaned));

    match parsed {
        Ok(Value::Object(map)) => map,
        Ok(Value::Array(items)) => match items.into_iter().next() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        },
        Ok(_) => Map::new(),
        Err(e) => {
            tracing::warn!(
                len = text.len(),
                "Unparseable object response, returning empty object: {}",
                e
            );
            Map::new()
        }
    }
}
