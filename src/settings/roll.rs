use std::collections::HashSet;

use indexmap::IndexMap;
use mw_options::{GameOption, OptionValue, PlandoOptions, VerifyContext, WorldRegistry};
use serde_json::Value;
use tracing::{debug, warn};

use super::RolledSettings;
use crate::error::GenerateError;
use crate::rng::RollRng;
use crate::version::{Version, GENERATOR_VERSION};
use crate::weights::{get_choice, roll_linked_options, roll_triggers, scalar_text, Document};

/// Resolve one weights document into concrete settings.
///
/// The document is never modified; overlays work on private copies. Draws
/// happen in a fixed order: linked options, root triggers, `game`, game
/// triggers, `name`, common options, then the game's options in declaration
/// order.
pub fn roll_settings(
    document: &Document,
    plando: &PlandoOptions,
    registry: &dyn WorldRegistry,
    rng: &mut RollRng,
) -> Result<RolledSettings, GenerateError> {
    let mut weights = if document.contains_key("linked_options") {
        roll_linked_options(document, rng)?
    } else {
        document.clone()
    };

    let mut valid_keys: HashSet<String> = HashSet::from(["triggers".to_string()]);
    if let Some(triggers) = trigger_list(&weights)? {
        weights = roll_triggers(&weights, &triggers, None, &mut valid_keys, rng)?;
    }

    check_requirements(&weights, plando)?;

    let common = registry.common_options();
    for key in registry.per_game_common_options().keys() {
        if weights.contains_key(key) && !common.contains_key(key) {
            return Err(GenerateError::config(format!(
                "Option {} has to be in a game's section, not on its own.",
                key
            )));
        }
    }

    let game = match get_choice("game", &weights, Value::Null, rng)? {
        Value::String(game) => game,
        Value::Null => return Err(GenerateError::config("\"game\" not specified")),
        other => return Err(GenerateError::config(format!("Invalid game: {}", other))),
    };
    ensure_registered(&game, registry)?;

    let game_weights = match weights.get(&game) {
        Some(Value::Object(section)) => section,
        _ => {
            return Err(GenerateError::config(format!(
                "No game options for selected game \"{}\" found.",
                game
            )))
        }
    };

    for key in game_weights.keys().chain(weights.keys()) {
        if key.starts_with('+') {
            return Err(GenerateError::config(format!(
                "Merge tag cannot be used outside of trigger contexts. Found {}",
                key
            )));
        }
        if key.starts_with('-') {
            return Err(GenerateError::config(format!(
                "Remove tag cannot be used outside of trigger contexts. Found {}",
                key
            )));
        }
    }

    if let Some(triggers) = trigger_list(game_weights)? {
        weights = roll_triggers(&weights, &triggers, Some(&game), &mut valid_keys, rng)?;
    }
    let game_weights = match weights.get(&game) {
        Some(Value::Object(section)) => section,
        _ => {
            return Err(GenerateError::config(format!(
                "No game options for selected game \"{}\" found.",
                game
            )))
        }
    };

    let name = get_choice("name", &weights, Value::Null, rng)?;
    let name = scalar_text(&name);
    debug!(game = %game, name = ?name, "rolling options");

    let mut options: IndexMap<String, OptionValue> = IndexMap::new();
    for (key, option) in common {
        let raw = get_choice(key, &weights, option.default_value(), rng)?;
        let value = option
            .from_any(&raw, rng)
            .map_err(|e| option_error(key, &game, e.into()))?;
        options.insert(key.clone(), value);
    }

    let table = registry
        .options_for(&game)
        .ok_or_else(|| GenerateError::config(format!("No options registered for {}", game)))?;
    let ctx = VerifyContext {
        game: &game,
        player: name.as_deref().unwrap_or_default(),
        plando,
    };
    for (key, option) in table {
        let value = handle_option(game_weights, key, option.as_ref(), &game, rng)?;
        option.verify(&value, &ctx)?;
        options.insert(key.clone(), value);
        valid_keys.insert(key.clone());
    }

    let unused_options: Vec<String> = game_weights
        .keys()
        .filter(|key| !valid_keys.contains(*key))
        .cloned()
        .collect();
    for key in &unused_options {
        warn!(game = %game, option = %key, "option is not recognized and will be ignored");
    }

    Ok(RolledSettings {
        game,
        name,
        options,
        unused_options,
    })
}

fn handle_option(
    game_weights: &Document,
    key: &str,
    option: &dyn GameOption,
    game: &str,
    rng: &mut RollRng,
) -> Result<OptionValue, GenerateError> {
    let raw = match game_weights.get(key) {
        Some(raw) if !option.supports_weighting() => raw.clone(),
        Some(_) => get_choice(key, game_weights, Value::Null, rng)
            .map_err(|e| option_error(key, game, e))?,
        // from_any on the default so a default of "random" still rolls
        None => option.default_value(),
    };
    option
        .from_any(&raw, rng)
        .map_err(|e| option_error(key, game, e.into()))
}

fn option_error(key: &str, game: &str, source: GenerateError) -> GenerateError {
    GenerateError::OptionGeneration {
        key: key.to_string(),
        game: game.to_string(),
        source: Box::new(source),
    }
}

fn trigger_list(section: &Document) -> Result<Option<Vec<Value>>, GenerateError> {
    match section.get("triggers") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(triggers)) => Ok(Some(triggers.clone())),
        Some(_) => Err(GenerateError::config("triggers must be a list.")),
    }
}

fn check_requirements(weights: &Document, enabled: &PlandoOptions) -> Result<(), GenerateError> {
    let requires = match weights.get("requires") {
        Some(Value::Object(requires)) if !requires.is_empty() => requires,
        _ => return Ok(()),
    };

    let required = requires
        .get("version")
        .and_then(scalar_text)
        .unwrap_or_else(|| GENERATOR_VERSION.to_string());
    if Version::parse(&required) > Version::current() {
        return Err(GenerateError::VersionIncompatible {
            required,
            running: GENERATOR_VERSION.to_string(),
        });
    }

    let plando = requires.get("plando").and_then(scalar_text).unwrap_or_default();
    let plando = PlandoOptions::from_option_string(&plando)?;
    if !plando.is_empty() && !plando.is_subset_of(enabled) {
        return Err(GenerateError::PlandoRequired {
            required: plando.to_string(),
        });
    }
    Ok(())
}

fn ensure_registered(game: &str, registry: &dyn WorldRegistry) -> Result<(), GenerateError> {
    if registry.is_registered_game(game) {
        return Ok(());
    }
    match registry.fuzzy_match(game) {
        Some(pick) if registry.failed_loads().contains(&pick.candidate) => {
            Err(GenerateError::FailedGame {
                game: game.to_string(),
                suggestion: pick.candidate,
                score: pick.score,
            })
        }
        Some(pick) => Err(GenerateError::UnknownGame {
            game: game.to_string(),
            suggestion: pick.candidate,
            score: pick.score,
        }),
        None => Err(GenerateError::config(format!(
            "No world found to handle game {}.",
            game
        ))),
    }
}
