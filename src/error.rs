//! Error taxonomy for settings resolution.

use std::path::PathBuf;

use mw_options::{ManifestError, OptionError};

use crate::config::SettingsError;
use crate::weights::MergeError;

/// Any failure while loading documents or resolving settings.
///
/// Every variant is fatal for the run; wrapping variants keep their cause
/// as a `source` so the full chain can be printed.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Failed to read weights ({path}): {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{problem} on line {line}:\n{context}\n{pointer}")]
    DocumentSyntax {
        problem: String,
        line: usize,
        context: String,
        pointer: String,
    },

    #[error("Failed to parse weights: {0}")]
    DocumentParse(String),

    #[error("Invalid JSON player configuration: {0}")]
    JsonConfig(String),

    #[error("File {file} is invalid. Please fix your yaml.")]
    InvalidFile {
        file: String,
        #[source]
        source: Box<GenerateError>,
    },

    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Linked option {name} is invalid. Please fix your linked option.")]
    LinkedOption {
        name: String,
        #[source]
        source: Box<GenerateError>,
    },

    #[error("Your trigger number {index} is invalid. Please fix your triggers.")]
    Trigger {
        index: usize,
        #[source]
        source: Box<GenerateError>,
    },

    #[error("No world found to handle game {game}. Did you mean '{suggestion}' ({score}% sure)? Check your spelling or installation of that world.")]
    UnknownGame {
        game: String,
        suggestion: String,
        score: u8,
    },

    #[error("No functional world found to handle game {game}. Did you mean '{suggestion}' ({score}% sure)? If so, it appears the world failed to initialize correctly.")]
    FailedGame {
        game: String,
        suggestion: String,
        score: u8,
    },

    #[error("Settings reports required version of generator is at least {required}, however generator is of version {running}")]
    VersionIncompatible { required: String, running: String },

    #[error("Settings reports required plando module {required}, which is not enabled.")]
    PlandoRequired { required: String },

    #[error("Error generating option {key} in {game}")]
    OptionGeneration {
        key: String,
        game: String,
        #[source]
        source: Box<GenerateError>,
    },

    #[error("Error generating meta option {key} for {category}")]
    MetaOption {
        key: String,
        category: String,
        #[source]
        source: Option<Box<GenerateError>>,
    },

    #[error("Names have to be unique. Names: {counts}")]
    NameCollision { counts: String },

    #[error("You cannot name yourself \"{0}\"")]
    ReservedName(String),

    #[error("No weights specified for player {0}")]
    MissingWeights(usize),

    #[error("Failed to scan player files: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to canonicalize settings record: {0}")]
    Digest(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    InvalidOption(#[from] OptionError),
}

impl GenerateError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        GenerateError::Configuration(message.into())
    }

    pub(crate) fn in_file(self, file: impl Into<String>) -> Self {
        GenerateError::InvalidFile {
            file: file.into(),
            source: Box::new(self),
        }
    }
}

/// Render an error and all of its causes, one per line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut lines = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        lines.push(format!("  caused by: {}", cause));
        current = cause.source();
    }
    lines.join("\n")
}
