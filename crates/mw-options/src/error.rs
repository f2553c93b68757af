//! Error types for option parsing and world manifests.

use std::path::PathBuf;

/// Errors raised while converting or verifying an option value.
#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    #[error("Option {option}: invalid value {value}: {reason}")]
    InvalidValue {
        option: String,
        value: String,
        reason: String,
    },

    #[error("Option {option}: value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        option: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Option {option} requires plando module {capability}, which is not enabled")]
    PlandoDisabled { option: String, capability: String },

    #[error("Option {option} for {player} in {game} contains unknown keys: {}", keys.join(", "))]
    UnknownKeys {
        option: String,
        game: String,
        player: String,
        keys: Vec<String>,
    },

    #[error("{0} is not a recognized name for a plando module. Known options: items, connections, texts, bosses")]
    UnknownPlandoModule(String),
}

impl OptionError {
    pub(crate) fn invalid(option: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        OptionError::InvalidValue {
            option: option.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading a world manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read world manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse world manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate game name: '{0}'")]
    DuplicateGame(String),

    #[error("Game '{game}': duplicate option key '{key}'")]
    DuplicateOption { game: String, key: String },

    #[error("Game '{game}': option '{key}' is invalid: {reason}")]
    InvalidOption {
        game: String,
        key: String,
        reason: String,
    },
}
