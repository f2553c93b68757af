//! Weights documents and the transforms that collapse them.
//!
//! A document is an ordered mapping. Under each option key sits either a
//! scalar, a sequence (uniform choice) or a weighted map (candidate to
//! integer weight). Linked options and triggers layer deltas on top of a
//! private copy of the document before anything is rolled.

mod choice;
mod linked;
mod merge;
mod triggers;

pub use choice::{convert_to_on_off, get_choice, get_choice_legacy, interpret_on_off, WeightedEntry};
pub use linked::roll_linked_options;
pub use merge::{update_weights, MergeError};
pub use triggers::roll_triggers;

use serde_json::{Map, Value};

use crate::error::GenerateError;

/// One parsed weights document.
pub type Document = Map<String, Value>;

/// Integer weight of a weighted-map entry.
///
/// Accepts integers, floats (truncated), booleans and numeric strings.
pub(crate) fn weight_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// Percentage used by linked options and triggers.
pub(crate) fn percentage_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Textual form of a scalar, as it would appear as a mapping key.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Equality between a rolled value and an expected one.
///
/// Weighted-map candidates are always strings, so scalars compare by their
/// key text: a rolled `"true"` matches an expected `true`.
pub(crate) fn values_match(a: &Value, b: &Value) -> bool {
    match (scalar_text(a), scalar_text(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Sub-tree addressed by a category name; the empty name is the document itself.
pub(crate) fn target_mut<'a>(
    document: &'a mut Document,
    category: &str,
) -> Result<&'a mut Document, GenerateError> {
    if category.is_empty() {
        return Ok(document);
    }
    match document.get_mut(category) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(GenerateError::config(format!(
            "Category {} is not a mapping of options",
            category
        ))),
        None => Err(GenerateError::config(format!("Category {} not found", category))),
    }
}

/// Category named by a linked-option or trigger field; null and missing are empty.
pub(crate) fn category_name(value: Option<&Value>) -> String {
    value.and_then(scalar_text).unwrap_or_default()
}
