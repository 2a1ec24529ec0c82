//! Default Resolution
//!
//! Templates never abort on missing data: an absent or empty value resolves
//! to the caller's fallback. Absent and present-but-empty are not told apart.

use crate::value::{is_empty, Value};

/// Returns `given` unless it is absent or empty, in which case `fallback`.
pub fn default_value(fallback: Value, given: Option<Value>) -> Value {
    match given {
        Some(v) if !is_empty(&v) => v,
        _ => fallback,
    }
}

/// First non-empty value, or nil when every candidate is empty.
pub fn coalesce(candidates: &[Value]) -> Value {
    candidates
        .iter()
        .find(|v| !is_empty(v))
        .cloned()
        .unwrap_or(Value::Nil)
}
