//! Per-participant settings resolution.

mod roll;

pub use roll::roll_settings;

use indexmap::IndexMap;
use mw_options::OptionValue;
use serde::{Deserialize, Serialize};

/// Settings rolled from one weights document.
///
/// `name` is the raw rolled name; templating and defaulting happen once the
/// participant's slot is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolledSettings {
    pub game: String,
    pub name: Option<String>,
    /// Typed values in roll order: common options first, then the game's.
    pub options: IndexMap<String, OptionValue>,
    /// Keys of the game section that no option or trigger consumed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unused_options: Vec<String>,
}
