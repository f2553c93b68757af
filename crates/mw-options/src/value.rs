//! Typed option values stored in a resolved settings record.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A concrete, typed option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    Toggle(bool),
    Choice(String),
    Range(i64),
    Text(String),
    List(Vec<String>),
    Set(BTreeSet<String>),
    Counter(IndexMap<String, i64>),
    Raw(Value),
}

impl OptionValue {
    /// True when the value carries no content (empty text, list, set, counter, null raw).
    pub fn is_empty(&self) -> bool {
        match self {
            OptionValue::Toggle(_) | OptionValue::Choice(_) | OptionValue::Range(_) => false,
            OptionValue::Text(s) => s.is_empty(),
            OptionValue::List(items) => items.is_empty(),
            OptionValue::Set(items) => items.is_empty(),
            OptionValue::Counter(items) => items.is_empty(),
            OptionValue::Raw(value) => match value {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                Value::Array(a) => a.is_empty(),
                Value::Object(o) => o.is_empty(),
                _ => false,
            },
        }
    }

    /// Names referenced by collection-shaped values.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            OptionValue::List(items) => items.iter().map(String::as_str).collect(),
            OptionValue::Set(items) => items.iter().map(String::as_str).collect(),
            OptionValue::Counter(items) => items.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Toggle(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Range(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Choice(s) | OptionValue::Text(s) => Some(s),
            _ => None,
        }
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
