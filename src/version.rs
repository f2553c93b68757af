//! Generator version and `requires.version` comparison.

use std::cmp::Ordering;
use std::fmt;

/// Version of this generator, checked against `requires.version`.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Key stamped into a document copy when triggers are applied.
pub const GENERATOR_VERSION_KEY: &str = "_Generator_Version";

/// Dotted numeric version such as `0.6.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(Vec<u32>);

impl Version {
    /// Parse a dotted version, ignoring non-numeric segments.
    pub fn parse(text: &str) -> Self {
        Version(
            text.trim()
                .split('.')
                .filter_map(|s| s.trim().parse::<u32>().ok())
                .collect(),
        )
    }

    pub fn current() -> Self {
        Self::parse(GENERATOR_VERSION)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        f.write_str(&parts.join("."))
    }
}
