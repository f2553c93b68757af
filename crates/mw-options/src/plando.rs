//! Plando capability set.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptionError;

/// A category of manual override a run may allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlandoCapability {
    Items,
    Connections,
    Texts,
    Bosses,
}

impl PlandoCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlandoCapability::Items => "items",
            PlandoCapability::Connections => "connections",
            PlandoCapability::Texts => "texts",
            PlandoCapability::Bosses => "bosses",
        }
    }
}

impl fmt::Display for PlandoCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlandoCapability {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "items" => Ok(PlandoCapability::Items),
            "connections" => Ok(PlandoCapability::Connections),
            "texts" => Ok(PlandoCapability::Texts),
            "bosses" => Ok(PlandoCapability::Bosses),
            other => Err(OptionError::UnknownPlandoModule(other.to_string())),
        }
    }
}

/// Set of enabled plando capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlandoOptions {
    capabilities: BTreeSet<PlandoCapability>,
}

impl PlandoOptions {
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse a comma or space separated module list such as `"bosses, items"`.
    ///
    /// Empty segments are ignored; an unknown module name is an error.
    pub fn from_option_string(option_string: &str) -> Result<Self, OptionError> {
        let mut capabilities = BTreeSet::new();
        for part in option_string.split(|c: char| c == ',' || c.is_whitespace()) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            capabilities.insert(part.parse()?);
        }
        Ok(Self { capabilities })
    }

    pub fn with(mut self, capability: PlandoCapability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn contains(&self, capability: PlandoCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// True when every capability in `self` is also enabled in `enabled`.
    pub fn is_subset_of(&self, enabled: &PlandoOptions) -> bool {
        self.capabilities.is_subset(&enabled.capabilities)
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PlandoCapability> + '_ {
        self.capabilities.iter().copied()
    }
}

impl fmt::Display for PlandoOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.capabilities.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(|c| c.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}
