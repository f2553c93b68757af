//! `+`/`-` deltas between two weights trees.
//!
//! A delta key without a prefix replaces the base value. `+name` and
//! `-name` combine with the base value of `name` according to the shape
//! of the delta: sets (null-valued mappings) union/difference, sequences
//! concatenate/remove, weighted maps add/subtract weights keeping only
//! positive results. The prefix always strips, so a literal base key that
//! begins with `+` or `-` cannot be addressed by a delta.

use serde_json::{Map, Value};

use super::{weight_value, Document};

/// Failure applying a delta to a base tree.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("Cannot apply merge to non-dict, set, or list type {option}, received {received}.")]
    UnsupportedMerge { option: String, received: String },

    #[error("Cannot apply remove to non-dict, set, or list type {option}, received {received}.")]
    UnsupportedRemove { option: String, received: String },

    #[error("Cannot combine {delta} delta with {option}, which is a {base}.")]
    TypeMismatch {
        option: String,
        base: String,
        delta: String,
    },

    #[error("Cannot remove {element} from {option}: element not present.")]
    MissingElement { option: String, element: String },

    #[error("Weight {weight} of {candidate} in {option} is not an integer.")]
    InvalidWeight {
        option: String,
        candidate: String,
        weight: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Remove,
}

/// Apply `delta` on top of `base`.
///
/// `base` is left untouched when an error is returned.
pub fn update_weights(base: &mut Document, delta: &Document) -> Result<(), MergeError> {
    let mut staged = Map::new();

    for (raw_key, new_value) in delta {
        let name = raw_key.trim_start_matches(['+', '-']);
        let op = if raw_key.starts_with('+') {
            Some(Op::Add)
        } else if raw_key.starts_with('-') {
            Some(Op::Remove)
        } else {
            None
        };

        let current = staged.get(name).or_else(|| base.get(name)).cloned();
        let merged = match (op, current) {
            (Some(op), Some(current)) => combine(op, name, current, new_value)?,
            _ => new_value.clone(),
        };
        staged.insert(name.to_string(), merged);
    }

    for (name, value) in staged {
        base.insert(name, value);
    }
    Ok(())
}

fn combine(op: Op, option: &str, current: Value, delta: &Value) -> Result<Value, MergeError> {
    let mismatch = |current: &Value| MergeError::TypeMismatch {
        option: option.to_string(),
        base: type_name(current).to_string(),
        delta: type_name(delta).to_string(),
    };

    match delta {
        Value::Object(items) if is_set(items) => match current {
            Value::Object(mut set) if set.values().all(Value::is_null) => {
                match op {
                    Op::Add => {
                        for key in items.keys() {
                            set.entry(key.clone()).or_insert(Value::Null);
                        }
                    }
                    Op::Remove => {
                        for key in items.keys() {
                            set.remove(key);
                        }
                    }
                }
                Ok(Value::Object(set))
            }
            other => Err(mismatch(&other)),
        },
        Value::Array(items) => match current {
            Value::Array(mut list) => {
                match op {
                    Op::Add => list.extend(items.iter().cloned()),
                    Op::Remove => {
                        for element in items {
                            let position = list.iter().position(|v| v == element).ok_or_else(|| {
                                MergeError::MissingElement {
                                    option: option.to_string(),
                                    element: element.to_string(),
                                }
                            })?;
                            list.remove(position);
                        }
                    }
                }
                Ok(Value::Array(list))
            }
            other => Err(mismatch(&other)),
        },
        Value::Object(weights) => match current {
            Value::Object(base) => combine_counters(op, option, &base, weights).map(Value::Object),
            other => Err(mismatch(&other)),
        },
        other => {
            let received = type_name(other).to_string();
            let option = option.to_string();
            Err(match op {
                Op::Add => MergeError::UnsupportedMerge { option, received },
                Op::Remove => MergeError::UnsupportedRemove { option, received },
            })
        }
    }
}

/// Element-wise weight arithmetic; zero and negative results are dropped.
fn combine_counters(
    op: Op,
    option: &str,
    base: &Map<String, Value>,
    delta: &Map<String, Value>,
) -> Result<Map<String, Value>, MergeError> {
    let weight = |candidate: &str, raw: &Value| {
        weight_value(raw).ok_or_else(|| MergeError::InvalidWeight {
            option: option.to_string(),
            candidate: candidate.to_string(),
            weight: raw.to_string(),
        })
    };

    let mut totals: Vec<(String, i64)> = Vec::with_capacity(base.len() + delta.len());
    for (candidate, raw) in base {
        totals.push((candidate.clone(), weight(candidate, raw)?));
    }
    for (candidate, raw) in delta {
        let amount = weight(candidate, raw)?;
        let signed = match op {
            Op::Add => amount,
            Op::Remove => -amount,
        };
        match totals.iter_mut().find(|(k, _)| k == candidate) {
            Some((_, total)) => *total += signed,
            None => totals.push((candidate.clone(), signed)),
        }
    }

    Ok(totals
        .into_iter()
        .filter(|(_, total)| *total > 0)
        .map(|(candidate, total)| (candidate, Value::from(total)))
        .collect())
}

fn is_set(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.values().all(Value::is_null)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(map) if is_set(map) => "set",
        Value::Object(_) => "dict",
    }
}
