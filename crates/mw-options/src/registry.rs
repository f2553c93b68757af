//! Game/world registry.

use indexmap::IndexMap;

use crate::common::{common_options, per_game_common_options};
use crate::error::ManifestError;
use crate::fuzzy::{best_match, FuzzyMatch};
use crate::manifest::WorldManifest;
use crate::option::OptionTable;

/// Name of the game defined by the built-in manifest.
pub const BUILTIN_GAME: &str = "Paper Mario: The Thousand-Year Door";

const BUILTIN_MANIFEST: &str = include_str!("../worlds/ttyd.toml");

/// Lookup surface the settings engine needs from the set of installed games.
pub trait WorldRegistry {
    /// True when `name` has a working implementation.
    fn is_registered_game(&self, name: &str) -> bool;

    /// Full option table of a registered game, per-game common options included.
    fn options_for(&self, game: &str) -> Option<&OptionTable>;

    /// Options resolved from the document root.
    fn common_options(&self) -> &OptionTable;

    /// Options that are only legal inside a game section (plus the common ones).
    fn per_game_common_options(&self) -> &OptionTable;

    /// Registered games in registration order.
    fn game_names(&self) -> Vec<&str>;

    /// Games that exist but failed to load.
    fn failed_loads(&self) -> &[String];

    /// Closest registered or failed game name.
    fn fuzzy_match(&self, name: &str) -> Option<FuzzyMatch> {
        let mut candidates = self.game_names();
        candidates.extend(self.failed_loads().iter().map(String::as_str));
        best_match(name, candidates)
    }
}

/// Registry built from world manifests.
#[derive(Debug)]
pub struct StaticRegistry {
    common: OptionTable,
    per_game_common: OptionTable,
    games: IndexMap<String, OptionTable>,
    failed: Vec<String>,
}

impl Default for StaticRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl StaticRegistry {
    /// Registry with the common options but no games.
    pub fn empty() -> Self {
        Self {
            common: common_options(),
            per_game_common: per_game_common_options(),
            games: IndexMap::new(),
            failed: Vec::new(),
        }
    }

    /// Registry with the built-in world.
    pub fn builtin() -> Result<Self, ManifestError> {
        let mut registry = Self::empty();
        registry.register(WorldManifest::parse(BUILTIN_MANIFEST)?)?;
        Ok(registry)
    }

    /// Add every game from a manifest.
    ///
    /// Game options are appended after the per-game common options; a game
    /// may redefine a common key, which keeps its position but takes the
    /// game's definition.
    pub fn register(&mut self, manifest: WorldManifest) -> Result<(), ManifestError> {
        for game in manifest.games {
            if self.games.contains_key(&game.name) {
                return Err(ManifestError::DuplicateGame(game.name));
            }
            let mut table = per_game_common_options();
            let mut declared = std::collections::HashSet::new();
            for spec in game.options {
                if !declared.insert(spec.key().to_string()) {
                    return Err(ManifestError::DuplicateOption {
                        game: game.name.clone(),
                        key: spec.key().to_string(),
                    });
                }
                let key = spec.key().to_string();
                table.insert(key, spec.build(&game.name)?);
            }
            self.failed.retain(|name| name != &game.name);
            self.games.insert(game.name, table);
        }
        for name in manifest.failed {
            if !self.games.contains_key(&name) && !self.failed.contains(&name) {
                self.failed.push(name);
            }
        }
        Ok(())
    }
}

impl WorldRegistry for StaticRegistry {
    fn is_registered_game(&self, name: &str) -> bool {
        self.games.contains_key(name)
    }

    fn options_for(&self, game: &str) -> Option<&OptionTable> {
        self.games.get(game)
    }

    fn common_options(&self) -> &OptionTable {
        &self.common
    }

    fn per_game_common_options(&self) -> &OptionTable {
        &self.per_game_common
    }

    fn game_names(&self) -> Vec<&str> {
        self.games.keys().map(String::as_str).collect()
    }

    fn failed_loads(&self) -> &[String] {
        &self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = StaticRegistry::builtin().unwrap();
        assert!(registry.is_registered_game(BUILTIN_GAME));
        let options = registry.options_for(BUILTIN_GAME).unwrap();
        assert!(options.contains_key("goal"));
        assert!(options.contains_key("local_items"));
        // Common options come first, in declaration order.
        assert_eq!(options.keys().next().map(String::as_str), Some("progression_balancing"));
    }

    #[test]
    fn test_fuzzy_match_includes_failed_loads() {
        let mut registry = StaticRegistry::builtin().unwrap();
        registry
            .register(WorldManifest::parse("failed = [\"Super Metroid\"]").unwrap())
            .unwrap();
        let found = registry.fuzzy_match("Super Metriod").unwrap();
        assert_eq!(found.candidate, "Super Metroid");
        assert!(!registry.is_registered_game("Super Metroid"));
    }

    #[test]
    fn test_duplicate_game_rejected() {
        let mut registry = StaticRegistry::builtin().unwrap();
        let manifest = WorldManifest::parse(&format!("[[game]]\nname = \"{}\"\n", BUILTIN_GAME)).unwrap();
        assert!(matches!(registry.register(manifest), Err(ManifestError::DuplicateGame(_))));
    }

    #[test]
    fn test_duplicate_option_rejected() {
        let mut registry = StaticRegistry::empty();
        let manifest = WorldManifest::parse(
            "[[game]]\nname = \"G\"\n[[game.option]]\nkind = \"toggle\"\nkey = \"a\"\n[[game.option]]\nkind = \"toggle\"\nkey = \"a\"\n",
        )
        .unwrap();
        assert!(matches!(registry.register(manifest), Err(ManifestError::DuplicateOption { .. })));
    }
}
