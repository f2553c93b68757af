//! Multiworld settings generator
//!
//! Resolves weighted settings documents (YAML trees of scalars, lists and
//! weighted maps, layered with linked options and triggers) into one
//! concrete, reproducible settings record per participant of a run.

pub mod config;
pub mod document;
pub mod error;
pub mod generate;
pub mod meta;
pub mod name;
pub mod rng;
pub mod settings;
pub mod version;
pub mod weights;

pub use config::{EffectiveSettings, GeneratorSettings, SettingsError};
pub use document::{read_documents, read_documents_str};
pub use error::{error_chain, GenerateError};
pub use generate::{roll_documents, GenerationPlan, Generator, PlayerSettingsRecord, WeightsCache};
pub use meta::{apply_meta_options, roll_meta_option};
pub use name::{ensure_unique_names, handle_name, NameCounter};
pub use rng::RollRng;
pub use settings::{roll_settings, RolledSettings};
pub use version::{Version, GENERATOR_VERSION};
pub use weights::{get_choice, roll_linked_options, roll_triggers, update_weights, Document, MergeError};
