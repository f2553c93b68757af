//! Weighted choice over a single option key.

use serde_json::{Map, Value};

use super::{weight_value, Document};
use crate::error::GenerateError;
use crate::rng::RollRng;

/// Borrowed view of the value stored under one option key.
#[derive(Debug, Clone, Copy)]
pub enum WeightedEntry<'a> {
    /// Returned as-is, no draw.
    Scalar(&'a Value),
    /// Uniform choice, one draw.
    Sequence(&'a [Value]),
    /// Candidate to integer weight, one draw.
    WeightedMap(&'a Map<String, Value>),
}

impl<'a> WeightedEntry<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => WeightedEntry::Sequence(items),
            Value::Object(map) => WeightedEntry::WeightedMap(map),
            other => WeightedEntry::Scalar(other),
        }
    }

    /// Collapse this entry into one concrete value.
    pub fn roll(
        self,
        option: &str,
        default: Value,
        rng: &mut RollRng,
    ) -> Result<Value, GenerateError> {
        match self {
            WeightedEntry::Scalar(value) => Ok(value.clone()),
            WeightedEntry::Sequence(items) => {
                if items.is_empty() {
                    return Err(GenerateError::config(format!(
                        "No options specified in \"{}\".",
                        option
                    )));
                }
                Ok(items[rng.pick_index(items.len())].clone())
            }
            WeightedEntry::WeightedMap(map) => {
                if map.is_empty() {
                    return Ok(default);
                }
                let weights = map_weights(option, map)?;
                match rng.pick_weighted(&weights) {
                    Some(index) => Ok(map
                        .keys()
                        .nth(index)
                        .map(|k| Value::String(k.clone()))
                        .unwrap_or(default)),
                    None => Err(GenerateError::config(format!(
                        "All options specified in \"{}\" are weighted as zero.",
                        option
                    ))),
                }
            }
        }
    }
}

fn map_weights(option: &str, map: &Map<String, Value>) -> Result<Vec<u64>, GenerateError> {
    map.iter()
        .map(|(candidate, raw)| match weight_value(raw) {
            Some(w) if w >= 0 => Ok(w as u64),
            Some(w) => Err(GenerateError::config(format!(
                "Weight {} for \"{}\" in \"{}\" is negative.",
                w, candidate, option
            ))),
            None => Err(GenerateError::config(format!(
                "Weight {} for \"{}\" in \"{}\" is not a number.",
                raw, candidate, option
            ))),
        })
        .collect()
}

/// Resolve `option` in `root`, falling back to `default` when it is absent.
pub fn get_choice(
    option: &str,
    root: &Document,
    default: Value,
    rng: &mut RollRng,
) -> Result<Value, GenerateError> {
    match root.get(option) {
        None => Ok(default),
        Some(value) => WeightedEntry::classify(value).roll(option, default, rng),
    }
}

/// [`get_choice`] for documents written with `on`/`off` toggles.
pub fn get_choice_legacy(
    option: &str,
    root: &Document,
    default: Value,
    rng: &mut RollRng,
) -> Result<Value, GenerateError> {
    if !root.contains_key(option) {
        return Ok(default);
    }
    get_choice(option, root, default, rng).map(interpret_on_off)
}

/// `"on"`/`"off"` become booleans, anything else is unchanged.
pub fn interpret_on_off(value: Value) -> Value {
    match value.as_str() {
        Some("on") => Value::Bool(true),
        Some("off") => Value::Bool(false),
        _ => value,
    }
}

/// Booleans become `"on"`/`"off"`, anything else is unchanged.
pub fn convert_to_on_off(value: Value) -> Value {
    match value {
        Value::Bool(true) => Value::String("on".into()),
        Value::Bool(false) => Value::String("off".into()),
        other => other,
    }
}
