//! camelCase ⇄ snake_case key translation at the transport boundary.
//!
//! The server speaks snake_case on the wire; the client's canonical JSON
//! shape is camelCase. Translation is applied to whole decoded bodies and
//! outgoing payloads, recursively through nested objects and arrays.
//!
//! Both directions are pure, never fail, and are idempotent on keys already
//! in the target case. Keys that fit neither convention pass through
//! unchanged.

use serde_json::Value;

/// Convert one camelCase key to snake_case: `firstName` → `first_name`.
///
/// Already-snake input comes back unchanged.
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convert one snake_case key to camelCase: `first_name` → `firstName`.
///
/// An underscore is a word boundary only when it sits between an
/// alphanumeric character and a lowercase ASCII letter; anything else
/// (leading underscores, `__`, trailing underscores) is kept as-is so
/// unrecognized key shapes survive a round trip.
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(ch) = chars.next() {
        let boundary = ch == '_'
            && out.chars().last().is_some_and(|prev| prev.is_ascii_alphanumeric())
            && chars.peek().is_some_and(|next| next.is_ascii_lowercase());
        if boundary {
            // unwrap is safe: peeked above
            let next = chars.next().unwrap();
            out.push(next.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Recursively snake_case every mapping key — the outgoing (server) shape.
pub fn to_server_keys(value: Value) -> Value {
    map_keys(value, &camel_to_snake)
}

/// Recursively camelCase every mapping key — the incoming (client) shape.
pub fn to_client_keys(value: Value) -> Value {
    map_keys(value, &snake_to_camel)
}

fn map_keys(value: Value, rekey: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (rekey(&key), map_keys(inner, rekey)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|inner| map_keys(inner, rekey)).collect())
        }
        leaf => leaf,
    }
}
