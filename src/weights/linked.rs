//! Percentage-gated overlays listed under `linked_options`.

use serde_json::Value;
use tracing::debug;

use super::{percentage_value, scalar_text, target_mut, update_weights, Document};
use crate::error::GenerateError;
use crate::rng::RollRng;

/// Apply every linked option set to a copy of `document`, in order.
///
/// Later sets see the effect of earlier ones. The input document is never
/// modified.
pub fn roll_linked_options(
    document: &Document,
    rng: &mut RollRng,
) -> Result<Document, GenerateError> {
    let mut weights = document.clone();
    let sets = match document.get("linked_options") {
        None | Some(Value::Null) => return Ok(weights),
        Some(Value::Array(sets)) => sets,
        Some(_) => return Err(GenerateError::config("linked_options must be a list.")),
    };

    for set in sets {
        let name = set
            .get("name")
            .and_then(scalar_text)
            .ok_or_else(|| GenerateError::config("One of your linked options does not have a name."))?;

        apply_set(&mut weights, set, &name, rng).map_err(|source| GenerateError::LinkedOption {
            name: name.clone(),
            source: Box::new(source),
        })?;
    }
    Ok(weights)
}

fn apply_set(
    weights: &mut Document,
    set: &Value,
    name: &str,
    rng: &mut RollRng,
) -> Result<(), GenerateError> {
    let percentage = set
        .get("percentage")
        .and_then(percentage_value)
        .ok_or_else(|| GenerateError::config("percentage must be a number."))?;

    if !rng.roll_percentage(percentage) {
        debug!(linked_option = name, percentage, "linked option not rolled");
        return Ok(());
    }
    debug!(linked_option = name, percentage, "applying linked option");

    let options = match set.get("options") {
        Some(Value::Object(options)) => options,
        _ => return Err(GenerateError::config("options must be a mapping of categories.")),
    };
    for (category, delta) in options {
        let delta = delta.as_object().ok_or_else(|| {
            GenerateError::config(format!("Options for category \"{}\" must be a mapping.", category))
        })?;
        update_weights(target_mut(weights, category)?, delta)?;
    }
    Ok(())
}
