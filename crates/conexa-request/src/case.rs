//! Key case conversion at the serialization boundary
//!
//! The API speaks camelCase; callers and the resource model use snake_case.
//! Only object keys are rewritten; values are left alone, arrays are walked.

use serde_json::{Map, Value};

/// `first_name` -> `firstName`.
///
/// Leading underscores are kept (`_links` stays `_links`). Empty segments
/// from repeated or trailing underscores are dropped.
pub fn to_camel(key: &str) -> String {
    let body = key.trim_start_matches('_');
    let mut out = String::with_capacity(key.len());
    out.push_str(&key[..key.len() - body.len()]);
    for (i, part) in body.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// `companyId` -> `company_id`.
///
/// A run of capitals is one word: `URL` -> `url`, `customerURL` ->
/// `customer_url`, `URLValue` -> `url_value`.
pub fn to_snake(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            out.push(c);
            continue;
        }
        if i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let starts_word = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if starts_word {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Recursively camel-case every object key.
pub fn camelize_keys(value: Value) -> Value {
    transform_keys(value, &to_camel)
}

/// Recursively snake-case every object key.
pub fn snake_keys(value: Value) -> Value {
    transform_keys(value, &to_snake)
}

pub fn camelize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (to_camel(&k), camelize_keys(v)))
        .collect()
}

fn transform_keys(value: Value, f: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (f(&k), transform_keys(v, f)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| transform_keys(v, f)).collect())
        }
        other => other,
    }
}
