//! Meta documents: one option value broadcast into every loaded document.

use mw_options::WorldRegistry;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::GenerateError;
use crate::generate::WeightsCache;
use crate::rng::RollRng;
use crate::weights::{get_choice, Document};

/// Resolve one meta option.
///
/// An empty `category` rolls the value directly. A game category requires
/// the game to declare `key`; options that cannot be weighted pass their
/// raw value through once it converts cleanly.
pub fn roll_meta_option(
    key: &str,
    category: &str,
    category_weights: &Document,
    registry: &dyn WorldRegistry,
    rng: &mut RollRng,
) -> Result<Value, GenerateError> {
    if category.is_empty() {
        return get_choice(key, category_weights, Value::Null, rng);
    }
    let meta_error = |source: Option<GenerateError>| GenerateError::MetaOption {
        key: key.to_string(),
        category: category.to_string(),
        source: source.map(Box::new),
    };

    let option = registry
        .options_for(category)
        .and_then(|table| table.get(key))
        .ok_or_else(|| meta_error(None))?;
    if option.supports_weighting() {
        return get_choice(key, category_weights, Value::Null, rng);
    }

    let raw = category_weights.get(key).cloned().unwrap_or(Value::Null);
    option
        .from_any(&raw, rng)
        .map_err(|e| meta_error(Some(e.into())))?;
    Ok(raw)
}

/// Roll every option of `meta` and write it into every cached document.
///
/// The empty category broadcasts into each game section whose game is
/// registered and declares the key.
pub fn apply_meta_options(
    meta: &Document,
    cache: &mut WeightsCache,
    registry: &dyn WorldRegistry,
    rng: &mut RollRng,
) -> Result<(), GenerateError> {
    for (category, category_weights) in meta {
        let category_weights = match category_weights {
            Value::Object(map) => map,
            Value::Null => continue,
            _ => {
                return Err(GenerateError::config(format!(
                    "Meta category {} must be a mapping of options.",
                    category
                )))
            }
        };

        for key in category_weights.keys() {
            let value = roll_meta_option(key, category, category_weights, registry, rng)?;
            if value.is_null() {
                continue;
            }
            debug!(category = %category, option = %key, value = %value, "meta option rolled");

            for (source, documents) in cache.iter_mut() {
                for document in documents.iter_mut() {
                    if category.is_empty() {
                        broadcast(document, key, &value, registry);
                    } else if let Some(Value::Object(section)) = document.get_mut(category) {
                        section.insert(key.clone(), value.clone());
                    } else {
                        warn!(category = %category, source = %source, "meta category not present");
                    }
                }
            }
        }
    }
    Ok(())
}

fn broadcast(document: &mut Document, key: &str, value: &Value, registry: &dyn WorldRegistry) {
    for (category, section) in document.iter_mut() {
        let declares_key = registry
            .options_for(category)
            .map_or(false, |table| table.contains_key(key));
        if !declares_key {
            continue;
        }
        if let Value::Object(section) = section {
            section.insert(key.to_string(), value.clone());
        }
    }
}
