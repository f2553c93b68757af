//! The option capability contract.

use std::fmt;

use indexmap::IndexMap;
use rand::RngCore;
use serde_json::Value;

use crate::error::OptionError;
use crate::plando::PlandoOptions;
use crate::value::OptionValue;

/// Options declared by a game, in declaration order.
///
/// Declaration order is the order options are rolled in, so it is part of
/// the reproducibility contract of a run.
pub type OptionTable = IndexMap<String, Box<dyn GameOption>>;

/// Context handed to [`GameOption::verify`].
#[derive(Debug, Clone, Copy)]
pub struct VerifyContext<'a> {
    pub game: &'a str,
    pub player: &'a str,
    pub plando: &'a PlandoOptions,
}

/// A single option kind as declared by a game.
pub trait GameOption: fmt::Debug + Send + Sync {
    /// Option key, used in error messages.
    fn key(&self) -> &str;

    /// Raw value used when a document does not mention the option.
    fn default_value(&self) -> Value;

    /// Whether a weighted map or sequence in a document should be rolled
    /// before conversion. Collection kinds take the raw value verbatim.
    fn supports_weighting(&self) -> bool {
        true
    }

    /// Convert a raw document value into a typed value.
    ///
    /// `random` forms draw from `rng`; deterministic inputs never touch it.
    fn from_any(&self, raw: &Value, rng: &mut dyn RngCore) -> Result<OptionValue, OptionError>;

    /// Check a converted value against run-wide policy.
    fn verify(&self, _value: &OptionValue, _ctx: &VerifyContext<'_>) -> Result<(), OptionError> {
        Ok(())
    }
}
