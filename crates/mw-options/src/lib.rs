//! Option kinds, plando capabilities and the world registry.
//!
//! A weights document only says which raw value a participant rolled for an
//! option. This crate turns those raw values into typed [`OptionValue`]s and
//! knows which games exist and which options each game declares.

mod common;
mod error;
mod fuzzy;
mod kinds;
mod manifest;
mod option;
mod plando;
mod registry;
mod value;

pub use common::{common_options, per_game_common_options};
pub use error::{ManifestError, OptionError};
pub use fuzzy::{best_match, jaro_winkler, FuzzyMatch};
pub use kinds::{Choice, FreeText, ItemCounter, ItemList, ItemSet, Passthrough, Range, Toggle};
pub use manifest::{GameManifest, OptionSpec, WorldManifest};
pub use option::{GameOption, OptionTable, VerifyContext};
pub use plando::{PlandoCapability, PlandoOptions};
pub use registry::{StaticRegistry, WorldRegistry, BUILTIN_GAME};
pub use value::OptionValue;
