//! Built-in generator defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default settings values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorDefaults {
    /// Directory scanned for player files (default: "Players")
    pub player_files_path: String,

    /// Weights file for slots without a player file (default: "weights.yaml")
    pub weights_file_path: String,

    /// Meta file (default: "meta.yaml")
    pub meta_file_path: String,

    /// Minimum number of players (default: 0)
    pub players: u64,

    /// Enabled plando modules (default: "bosses")
    pub plando_options: String,

    /// Spoiler level 0..=3 (default: 3)
    pub spoiler: u64,

    /// Output directory (default: "output")
    pub output_path: String,

    /// Log filter (default: "info")
    pub log_level: String,
}

impl Default for GeneratorDefaults {
    fn default() -> Self {
        Self {
            player_files_path: "Players".to_string(),
            weights_file_path: "weights.yaml".to_string(),
            meta_file_path: "meta.yaml".to_string(),
            players: 0,
            plando_options: "bosses".to_string(),
            spoiler: 3,
            output_path: "output".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl GeneratorDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "player_files_path": self.player_files_path,
            "weights_file_path": self.weights_file_path,
            "meta_file_path": self.meta_file_path,
            "players": self.players,
            "seed": null,
            "race": false,
            "plando_options": self.plando_options,
            "same_options": false,
            "spoiler": self.spoiler,
            "output_path": self.output_path,
            "log_level": self.log_level,
            "log_time": false,
            "skip_prog_balancing": false,
            "skip_output": false,
            "spoiler_only": false,
            "json_config": null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = GeneratorDefaults::default();
        assert_eq!(defaults.player_files_path, "Players");
        assert_eq!(defaults.weights_file_path, "weights.yaml");
        assert_eq!(defaults.plando_options, "bosses");
        assert_eq!(defaults.spoiler, 3);
    }

    #[test]
    fn test_to_value() {
        let value = GeneratorDefaults::default().to_value();

        assert_eq!(value["meta_file_path"], "meta.yaml");
        assert_eq!(value["players"], 0);
        assert!(value["seed"].is_null());
        assert_eq!(value["race"], false);
    }
}
