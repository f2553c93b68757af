//! Generator settings
//!
//! Settings are merged from three layers:
//! 1. Built-in defaults
//! 2. Host settings file (generator.toml)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::GeneratorDefaults;
pub use effective::{
    EffectiveSettings, GeneratorSettings, SettingsError, SettingsOrigin, SettingsSource,
    HOST_SETTINGS_FILE,
};
pub use merge::{deep_merge, merge_layers};
