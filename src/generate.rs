//! Run orchestration: load every document, roll every slot, name everyone.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use mw_options::{OptionValue, PlandoOptions, WorldRegistry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::GeneratorSettings;
use crate::document::{json_to_document, load_json_config, read_source, sha256_hex};
use crate::error::GenerateError;
use crate::meta::apply_meta_options;
use crate::name::{ensure_unique_names, handle_name, NameCounter};
use crate::rng::RollRng;
use crate::settings::{roll_settings, RolledSettings};
use crate::weights::Document;

/// Loaded documents keyed by source, in slot-assignment order.
pub type WeightsCache = IndexMap<String, Vec<Document>>;

/// Cache key of a JSON player configuration.
pub const JSON_CONFIG_SOURCE: &str = "json_config";

const META_DESCRIPTION_KEY: &str = "meta_description";

/// Final settings of one participant slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettingsRecord {
    /// 1-based slot number
    pub slot: usize,

    /// Cache key of the document the slot was rolled from
    pub source: String,

    pub game: String,

    /// Final display name, unique ignoring case
    pub name: String,

    pub options: IndexMap<String, OptionValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unused_options: Vec<String>,
}

impl PlayerSettingsRecord {
    /// SHA-256 of the record's canonical (RFC 8785) JSON form
    pub fn digest(&self) -> Result<String, GenerateError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(self)
            .map_err(|e| GenerateError::Digest(e.to_string()))?;
        Ok(sha256_hex(&jcs_bytes))
    }
}

/// Digest of a source file that contributed documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDigest {
    pub source: String,
    pub sha256: String,
}

/// Everything the world-generation stage needs for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationPlan {
    pub seed: u64,
    pub seed_name: String,
    pub race: bool,
    pub plando: PlandoOptions,
    pub spoiler: u8,
    pub output_path: PathBuf,
    pub skip_prog_balancing: bool,
    pub skip_output: bool,
    pub spoiler_only: bool,
    pub created_at: DateTime<Utc>,
    pub inputs: Vec<InputDigest>,
    pub players: Vec<PlayerSettingsRecord>,
}

impl GenerationPlan {
    /// Serialize to JSON (pretty printed)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Drives a full resolution run.
pub struct Generator<'a> {
    settings: &'a GeneratorSettings,
    registry: &'a dyn WorldRegistry,
}

struct LoadedInputs {
    cache: WeightsCache,
    inputs: Vec<InputDigest>,
    weights_source: Option<String>,
    meta: Option<Document>,
    slot_sources: Vec<String>,
}

impl<'a> Generator<'a> {
    pub fn new(settings: &'a GeneratorSettings, registry: &'a dyn WorldRegistry) -> Self {
        Self { settings, registry }
    }

    /// Resolve every participant slot.
    pub fn run(&self) -> Result<GenerationPlan, GenerateError> {
        let settings = self.settings;
        let plando = settings.plando()?;

        let seed = settings.seed.unwrap_or_else(RollRng::random_seed);
        let mut rng = RollRng::from_seed(seed);
        let seed_name = rng.seed_name();
        if settings.race {
            rng = RollRng::from_entropy();
        }
        info!(seed, seed_name = %seed_name, race = settings.race, "starting generation");

        let LoadedInputs {
            mut cache,
            inputs,
            weights_source,
            meta,
            slot_sources,
        } = self.load_inputs()?;

        let players = slot_sources.len().max(settings.players);
        if players == 0 {
            return Err(GenerateError::config(
                "No individual player files found and number of players is 0. \
                 Provide individual player files or specify the number of players via generator.toml or --multi.",
            ));
        }
        if cache.is_empty() {
            return Err(GenerateError::config(format!(
                "No weights found. Provide a general weights file ({}) or individual player files. \
                 A mix is also permitted.",
                settings.weights_path().display()
            )));
        }
        info!(players, files = cache.len(), "documents loaded");

        let mut settings_cache: IndexMap<String, Vec<RolledSettings>> = IndexMap::new();
        if settings.same_options {
            for (source, documents) in &cache {
                let rolled = self
                    .roll_all(documents, &plando, &mut rng)
                    .map_err(|e| e.in_file(source.as_str()))?;
                settings_cache.insert(source.clone(), rolled);
            }
        }

        if let Some(meta) = &meta {
            apply_meta_options(meta, &mut cache, self.registry, &mut rng)?;
        }

        let mut counter = NameCounter::new();
        let mut records: Vec<PlayerSettingsRecord> = Vec::with_capacity(players);
        let mut slot = 1;
        while slot <= players {
            let source = slot_sources
                .get(slot - 1)
                .or(weights_source.as_ref())
                .cloned()
                .ok_or(GenerateError::MissingWeights(slot))?;

            let rolled = match settings_cache.get(&source) {
                Some(rolled) => rolled.clone(),
                None => {
                    let documents = cache.get(&source).map(Vec::as_slice).unwrap_or_default();
                    self.roll_all(documents, &plando, &mut rng)
                        .map_err(|e| e.in_file(source.as_str()))?
                }
            };
            if rolled.is_empty() {
                return Err(GenerateError::config("No documents found.").in_file(source.as_str()));
            }

            for rolled in rolled {
                let raw_name = match rolled.name {
                    Some(name) => name,
                    None if Some(&source) == weights_source.as_ref() => format!("Player{}", slot),
                    None => file_stem(&source),
                };
                let name = handle_name(&raw_name, slot, &mut counter)
                    .map_err(|e| e.in_file(source.as_str()))?;
                debug!(slot, name = %name, game = %rolled.game, source = %source, "slot resolved");

                records.push(PlayerSettingsRecord {
                    slot,
                    source: source.clone(),
                    game: rolled.game,
                    name,
                    options: rolled.options,
                    unused_options: rolled.unused_options,
                });
                slot += 1;
            }
        }

        ensure_unique_names(records.iter().map(|r| r.name.as_str()))?;

        Ok(GenerationPlan {
            seed,
            seed_name,
            race: settings.race,
            plando,
            spoiler: settings.spoiler,
            output_path: settings.output_path.clone(),
            skip_prog_balancing: settings.skip_prog_balancing,
            skip_output: settings.skip_output,
            spoiler_only: settings.spoiler_only,
            created_at: Utc::now(),
            inputs,
            players: records,
        })
    }

    fn roll_all(
        &self,
        documents: &[Document],
        plando: &PlandoOptions,
        rng: &mut RollRng,
    ) -> Result<Vec<RolledSettings>, GenerateError> {
        documents
            .iter()
            .map(|document| roll_settings(document, plando, self.registry, rng))
            .collect()
    }

    fn load_inputs(&self) -> Result<LoadedInputs, GenerateError> {
        let settings = self.settings;
        let mut cache = WeightsCache::new();
        let mut inputs = Vec::new();

        let weights_path = settings.weights_path();
        let mut weights_source = None;
        if weights_path.is_file() {
            let key = weights_path.to_string_lossy().to_string();
            let file = read_source(&weights_path).map_err(|e| e.in_file(key.as_str()))?;
            inputs.push(InputDigest {
                source: key.clone(),
                sha256: file.digest,
            });
            cache.insert(key.clone(), file.documents);
            weights_source = Some(key);
        }

        let meta_path = settings.meta_path();
        let meta = if meta_path.is_file() {
            let key = meta_path.to_string_lossy().to_string();
            let file = read_source(&meta_path).map_err(|e| e.in_file(key.as_str()))?;
            let mut meta = file
                .documents
                .into_iter()
                .last()
                .ok_or_else(|| GenerateError::config("No documents found.").in_file(key.as_str()))?;
            if meta.remove(META_DESCRIPTION_KEY).is_none() {
                return Err(GenerateError::config(format!(
                    "No meta description found for {}. Unable to verify.",
                    key
                )));
            }
            if settings.same_options {
                return Err(GenerateError::config("Cannot mix same_options with a meta file"));
            }
            inputs.push(InputDigest {
                source: key,
                sha256: file.digest,
            });
            Some(meta)
        } else {
            None
        };

        let mut player_sources = Vec::new();
        if let Some(json_config) = &settings.json_config {
            let document = json_to_document(&load_json_config(json_config)?)?;
            cache.insert(JSON_CONFIG_SOURCE.to_string(), vec![document]);
            player_sources.push(JSON_CONFIG_SOURCE.to_string());
        } else {
            for (name, path) in self.player_files(&weights_path, &meta_path)? {
                let file = read_source(&path).map_err(|e| e.in_file(name.as_str()))?;
                inputs.push(InputDigest {
                    source: name.clone(),
                    sha256: file.digest,
                });
                cache.insert(name.clone(), file.documents);
                player_sources.push(name);
            }
        }

        // case-folded order keeps slot assignment stable across platforms
        cache.sort_by(|a, _, b, _| a.to_lowercase().cmp(&b.to_lowercase()));
        inputs.sort_by(|a, b| a.source.to_lowercase().cmp(&b.source.to_lowercase()));

        let mut slot_sources = Vec::new();
        for (source, documents) in &cache {
            if player_sources.contains(source) {
                slot_sources.extend(std::iter::repeat(source.clone()).take(documents.len()));
            }
        }

        Ok(LoadedInputs {
            cache,
            inputs,
            weights_source,
            meta,
            slot_sources,
        })
    }

    /// Player files directly inside the player directory.
    fn player_files(
        &self,
        weights_path: &Path,
        meta_path: &Path,
    ) -> Result<Vec<(String, PathBuf)>, GenerateError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.settings.player_files_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || name.to_lowercase().ends_with(".ini") {
                continue;
            }
            let path = entry.path();
            if path == weights_path || path == meta_path {
                continue;
            }
            files.push((name, path.to_path_buf()));
        }
        Ok(files)
    }
}

/// Resolve every document of one file with a fixed seed.
pub fn roll_documents(
    documents: &[Document],
    plando: &PlandoOptions,
    registry: &dyn WorldRegistry,
    seed: u64,
) -> Result<Vec<RolledSettings>, GenerateError> {
    let mut rng = RollRng::from_seed(seed);
    documents
        .iter()
        .map(|document| roll_settings(document, plando, registry, &mut rng))
        .collect()
}

fn file_stem(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mw_options::BUILTIN_GAME;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Mario.yaml"), "Mario");
        assert_eq!(file_stem("Players/weights.yaml"), "weights");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_record_digest_stable() {
        let record = PlayerSettingsRecord {
            slot: 1,
            source: "a.yaml".into(),
            game: BUILTIN_GAME.into(),
            name: "Mario".into(),
            options: IndexMap::from([
                ("goal".to_string(), OptionValue::Choice("bonetail".into())),
                ("starting_coins".to_string(), OptionValue::Range(100)),
            ]),
            unused_options: Vec::new(),
        };
        let digest = record.digest().unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, record.clone().digest().unwrap());

        let mut changed = record.clone();
        changed.name = "Luigi".into();
        assert_ne!(digest, changed.digest().unwrap());
    }
}
