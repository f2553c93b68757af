//! Effective generator settings with provenance
//!
//! The effective settings capture the merged configuration plus
//! information about where each layer came from.

use chrono::{DateTime, Utc};
use mw_options::PlandoOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::GeneratorDefaults;
use super::merge::merge_layers;

/// Default host settings file name
pub const HOST_SETTINGS_FILE: &str = "generator.toml";

/// Origin of a settings source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    Host,
    Cli,
}

/// A contributing settings source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Typed generator settings after all layers are merged
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSettings {
    pub player_files_path: PathBuf,
    pub weights_file_path: PathBuf,
    pub meta_file_path: PathBuf,
    pub players: usize,
    pub seed: Option<u64>,
    pub race: bool,
    pub plando_options: String,
    pub same_options: bool,
    pub spoiler: u8,
    pub output_path: PathBuf,
    pub log_level: String,
    pub log_time: bool,
    pub skip_prog_balancing: bool,
    pub skip_output: bool,
    pub spoiler_only: bool,
    /// JSON player configuration, inline or a path to a JSON file
    pub json_config: Option<String>,
}

impl GeneratorSettings {
    /// Weights file, relative paths resolved against the player directory
    pub fn weights_path(&self) -> PathBuf {
        self.player_files_path.join(&self.weights_file_path)
    }

    /// Meta file, relative paths resolved against the player directory
    pub fn meta_path(&self) -> PathBuf {
        self.player_files_path.join(&self.meta_file_path)
    }

    /// Enabled plando capabilities
    pub fn plando(&self) -> Result<PlandoOptions, SettingsError> {
        PlandoOptions::from_option_string(&self.plando_options)
            .map_err(|e| SettingsError::ValidationError(e.to_string()))
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        let defaults = GeneratorDefaults::default();
        Self {
            player_files_path: PathBuf::from(defaults.player_files_path),
            weights_file_path: PathBuf::from(defaults.weights_file_path),
            meta_file_path: PathBuf::from(defaults.meta_file_path),
            players: defaults.players as usize,
            seed: None,
            race: false,
            plando_options: defaults.plando_options,
            same_options: false,
            spoiler: defaults.spoiler as u8,
            output_path: PathBuf::from(defaults.output_path),
            log_level: defaults.log_level,
            log_time: false,
            skip_prog_balancing: false,
            skip_output: false,
            spoiler_only: false,
            json_config: None,
        }
    }
}

/// Effective settings with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    /// When these settings were computed
    pub created_at: DateTime<Utc>,

    /// The merged settings object
    pub config: Value,

    /// Typed view of `config`
    pub settings: GeneratorSettings,

    /// Contributing sources in precedence order
    pub sources: Vec<SettingsSource>,
}

impl EffectiveSettings {
    /// Build effective settings from layers
    pub fn build(
        host_settings_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, SettingsError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        layers.push(GeneratorDefaults::default().to_value());
        sources.push(SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        });

        if let Some(path) = host_settings_path {
            if path.exists() {
                let (value, digest) = Self::load_toml_file(path)?;
                layers.push(value);
                sources.push(SettingsSource {
                    origin: SettingsOrigin::Host,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            }
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let settings: GeneratorSettings = serde_json::from_value(merged.clone())
            .map_err(|e| SettingsError::ParseError(format!("Invalid settings: {}", e)))?;
        Self::validate(&settings)?;

        Ok(Self {
            created_at: Utc::now(),
            config: merged,
            settings,
            sources,
        })
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), SettingsError> {
        let bytes = fs::read(path).map_err(|e| SettingsError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| SettingsError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((toml_to_json(toml_value), digest))
    }

    fn validate(settings: &GeneratorSettings) -> Result<(), SettingsError> {
        if settings.spoiler > 3 {
            return Err(SettingsError::ValidationError(
                "spoiler must be in 0..=3".to_string(),
            ));
        }
        if settings.skip_output && settings.spoiler_only {
            return Err(SettingsError::ValidationError(
                "skip_output and spoiler_only cannot both be set".to_string(),
            ));
        }
        if settings.spoiler_only && settings.spoiler == 0 {
            return Err(SettingsError::ValidationError(
                "spoiler_only requires a spoiler level above 0".to_string(),
            ));
        }
        settings.plando()?;
        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a merged value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }
}

/// Convert TOML Value to JSON Value
pub(crate) fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
