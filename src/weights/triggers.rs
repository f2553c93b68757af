//! Conditional overlays listed under `triggers`.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use super::{
    category_name, get_choice, percentage_value, scalar_text, target_mut, update_weights,
    values_match, Document,
};
use crate::error::GenerateError;
use crate::rng::RollRng;
use crate::version::{GENERATOR_VERSION, GENERATOR_VERSION_KEY};

/// Run `triggers` in order against a copy of `document`.
///
/// `scope` names the category an empty `option_category` (or an empty
/// category inside `options`) refers to; `None` means the document root.
/// Every watched option name is added to `valid_keys`.
pub fn roll_triggers(
    document: &Document,
    triggers: &[Value],
    scope: Option<&str>,
    valid_keys: &mut HashSet<String>,
    rng: &mut RollRng,
) -> Result<Document, GenerateError> {
    let mut weights = document.clone();
    weights.insert(GENERATOR_VERSION_KEY.to_string(), Value::from(GENERATOR_VERSION));

    for (i, trigger) in triggers.iter().enumerate() {
        apply_trigger(&mut weights, trigger, scope.unwrap_or(""), valid_keys, rng).map_err(
            |source| GenerateError::Trigger {
                index: i + 1,
                source: Box::new(source),
            },
        )?;
    }
    Ok(weights)
}

fn apply_trigger(
    weights: &mut Document,
    trigger: &Value,
    scope: &str,
    valid_keys: &mut HashSet<String>,
    rng: &mut RollRng,
) -> Result<(), GenerateError> {
    let trigger = trigger
        .as_object()
        .ok_or_else(|| GenerateError::config("Trigger must be a mapping."))?;

    let category = category_name(trigger.get("option_category"));
    let category = if category.is_empty() { scope.to_string() } else { category };

    let key = get_choice("option_name", trigger, Value::Null, rng)?;
    let key = scalar_text(&key)
        .ok_or_else(|| GenerateError::config("Trigger does not name an option."))?;
    let expected = get_choice("option_result", trigger, Value::Null, rng)?;

    let target = target_mut(weights, &category)?;
    let result = get_choice(&key, target, Value::Null, rng)?;
    target.insert(key.clone(), result.clone());

    if values_match(&result, &expected) {
        let percentage = get_choice("percentage", trigger, Value::from(100), rng)?;
        let percentage = percentage_value(&percentage)
            .ok_or_else(|| GenerateError::config("percentage must be a number."))?;
        if rng.roll_percentage(percentage) {
            debug!(option = %key, result = %result, "trigger applied");
            let options = match trigger.get("options") {
                Some(Value::Object(options)) => options,
                _ => return Err(GenerateError::config("options must be a mapping of categories.")),
            };
            for (delta_category, delta) in options {
                let delta = delta.as_object().ok_or_else(|| {
                    GenerateError::config(format!(
                        "Options for category \"{}\" must be a mapping.",
                        delta_category
                    ))
                })?;
                let delta_category = if delta_category.is_empty() { scope } else { delta_category.as_str() };
                update_weights(target_mut(weights, delta_category)?, delta)?;
            }
        } else {
            debug!(option = %key, percentage, "trigger matched but not rolled");
        }
    }

    valid_keys.insert(key);
    Ok(())
}
