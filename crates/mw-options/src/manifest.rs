//! World manifests: TOML descriptions of games and their options.
//!
//! ```toml
//! failed = ["Some Broken Game"]
//!
//! [[game]]
//! name = "Example"
//!
//! [[game.option]]
//! kind = "choice"
//! key = "goal"
//! choices = ["boss", "collect"]
//! default = "boss"
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ManifestError;
use crate::kinds::{Choice, FreeText, ItemCounter, ItemList, ItemSet, Passthrough, Range, Toggle};
use crate::option::GameOption;
use crate::plando::PlandoCapability;

/// Top level of a world manifest file.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldManifest {
    #[serde(default, rename = "game")]
    pub games: Vec<GameManifest>,

    /// Games known to exist but which failed to load.
    #[serde(default)]
    pub failed: Vec<String>,
}

/// One game and its declared options.
#[derive(Debug, Clone, Deserialize)]
pub struct GameManifest {
    pub name: String,

    #[serde(default, rename = "option")]
    pub options: Vec<OptionSpec>,
}

/// Declarative option definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionSpec {
    Toggle {
        key: String,
        #[serde(default)]
        default: bool,
    },
    Choice {
        key: String,
        choices: Vec<String>,
        #[serde(default)]
        aliases: IndexMap<String, String>,
        default: Option<String>,
    },
    Range {
        key: String,
        min: i64,
        max: i64,
        default: Option<i64>,
        #[serde(default)]
        special: IndexMap<String, i64>,
    },
    FreeText {
        key: String,
        #[serde(default)]
        default: String,
    },
    ItemList {
        key: String,
        valid_keys: Option<Vec<String>>,
    },
    ItemSet {
        key: String,
        valid_keys: Option<Vec<String>>,
    },
    ItemCounter {
        key: String,
        valid_keys: Option<Vec<String>>,
    },
    Passthrough {
        key: String,
        plando: Option<PlandoCapability>,
    },
}

impl WorldManifest {
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }
}

impl OptionSpec {
    pub fn key(&self) -> &str {
        match self {
            OptionSpec::Toggle { key, .. }
            | OptionSpec::Choice { key, .. }
            | OptionSpec::Range { key, .. }
            | OptionSpec::FreeText { key, .. }
            | OptionSpec::ItemList { key, .. }
            | OptionSpec::ItemSet { key, .. }
            | OptionSpec::ItemCounter { key, .. }
            | OptionSpec::Passthrough { key, .. } => key,
        }
    }

    /// Validate the definition and build the option.
    pub fn build(self, game: &str) -> Result<Box<dyn GameOption>, ManifestError> {
        let invalid = |key: &str, reason: &str| ManifestError::InvalidOption {
            game: game.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        };

        let option: Box<dyn GameOption> = match self {
            OptionSpec::Toggle { key, default } => Box::new(Toggle { key, default }),
            OptionSpec::Choice { key, choices, aliases, default } => {
                if choices.is_empty() {
                    return Err(invalid(&key, "choice needs at least one option"));
                }
                let default = default.unwrap_or_else(|| choices[0].clone());
                if !choices.contains(&default) {
                    return Err(invalid(&key, "default is not one of the choices"));
                }
                if let Some((alias, _)) = aliases.iter().find(|(_, target)| !choices.contains(target)) {
                    return Err(invalid(&key, format!("alias {} targets an unknown choice", alias).as_str()));
                }
                Box::new(Choice { key, choices, aliases, default })
            }
            OptionSpec::Range { key, min, max, default, special } => {
                if min > max {
                    return Err(invalid(&key, "min is greater than max"));
                }
                let default = default.unwrap_or(min);
                if default < min || default > max {
                    return Err(invalid(&key, "default is outside [min, max]"));
                }
                Box::new(Range { key, min, max, default, special })
            }
            OptionSpec::FreeText { key, default } => Box::new(FreeText { key, default }),
            OptionSpec::ItemList { key, valid_keys } => Box::new(ItemList { key, valid_keys }),
            OptionSpec::ItemSet { key, valid_keys } => Box::new(ItemSet { key, valid_keys }),
            OptionSpec::ItemCounter { key, valid_keys } => Box::new(ItemCounter { key, valid_keys }),
            OptionSpec::Passthrough { key, plando } => Box::new(Passthrough { key, plando }),
        };
        Ok(option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
failed = ["Broken Game"]

[[game]]
name = "Example"

[[game.option]]
kind = "choice"
key = "goal"
choices = ["boss", "collect"]

[[game.option]]
kind = "range"
key = "stars"
min = 1
max = 7
default = 3
special = { all = 7 }

[[game.option]]
kind = "passthrough"
key = "plando_bosses"
plando = "bosses"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = WorldManifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.failed, vec!["Broken Game".to_string()]);
        assert_eq!(manifest.games.len(), 1);
        let keys: Vec<&str> = manifest.games[0].options.iter().map(|o| o.key()).collect();
        assert_eq!(keys, vec!["goal", "stars", "plando_bosses"]);
    }

    #[test]
    fn test_choice_default_is_first() {
        let manifest = WorldManifest::parse(SAMPLE).unwrap();
        let option = manifest.games[0].options[0].clone().build("Example").unwrap();
        assert_eq!(option.default_value(), serde_json::json!("boss"));
    }

    #[test]
    fn test_invalid_range_rejected() {
        let spec = OptionSpec::Range {
            key: "stars".into(),
            min: 5,
            max: 1,
            default: None,
            special: IndexMap::new(),
        };
        let err = spec.build("Example").unwrap_err();
        assert!(err.to_string().contains("min is greater than max"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let bad = "[[game]]\nname = \"X\"\n[[game.option]]\nkind = \"slider\"\nkey = \"k\"\n";
        assert!(matches!(WorldManifest::parse(bad), Err(ManifestError::Parse(_))));
    }
}
