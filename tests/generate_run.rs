//! Full generation run tests
//!
//! Each test lays out a player directory in a TempDir and runs the
//! generator over it with the built-in world.

use std::fs;
use std::path::Path;

use mw_generate::{GenerateError, GenerationPlan, Generator, GeneratorSettings};
use mw_options::{OptionValue, StaticRegistry, BUILTIN_GAME};
use tempfile::TempDir;

fn registry() -> StaticRegistry {
    StaticRegistry::builtin().unwrap()
}

/// Write `yaml` to `dir/name`, with `GAME` standing in for the built-in game name.
fn write_yaml(dir: &Path, name: &str, yaml: &str) {
    let yaml = yaml.replace("GAME", &format!("\"{}\"", BUILTIN_GAME));
    fs::write(dir.join(name), yaml).unwrap();
}

fn settings(dir: &Path, seed: u64) -> GeneratorSettings {
    GeneratorSettings {
        player_files_path: dir.to_path_buf(),
        seed: Some(seed),
        ..Default::default()
    }
}

fn run(settings: &GeneratorSettings) -> Result<GenerationPlan, GenerateError> {
    let registry = registry();
    Generator::new(settings, &registry).run()
}

fn player(dir: &Path, file: &str, name: &str) {
    write_yaml(
        dir,
        file,
        &format!(
            "name: {name}\ngame: GAME\nGAME:\n  goal:\n    bonetail: 1\n    shadow_queen: 1\n  starting_coins: random\n"
        ),
    );
}

// =============================================================================
// Slot assignment
// =============================================================================

#[test]
fn test_player_files_sorted_case_insensitively() {
    let dir = TempDir::new().unwrap();
    player(dir.path(), "Mario.yaml", "Mario");
    player(dir.path(), "luigi.yaml", "Luigi");

    let plan = run(&settings(dir.path(), 5)).unwrap();
    let slots: Vec<(usize, &str, &str)> = plan
        .players
        .iter()
        .map(|p| (p.slot, p.source.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(slots, [(1, "luigi.yaml", "Luigi"), (2, "Mario.yaml", "Mario")]);
    assert!(plan.players.iter().all(|p| p.game == BUILTIN_GAME));
    assert_eq!(plan.inputs.len(), 2);
    assert!(plan.inputs.iter().all(|input| input.sha256.len() == 64));
}

#[test]
fn test_hidden_and_ini_files_skipped() {
    let dir = TempDir::new().unwrap();
    player(dir.path(), "Mario.yaml", "Mario");
    fs::write(dir.path().join(".hidden.yaml"), "not: [valid").unwrap();
    fs::write(dir.path().join("host.ini"), "[section]\nkey=value\n").unwrap();

    let plan = run(&settings(dir.path(), 5)).unwrap();
    assert_eq!(plan.players.len(), 1);
}

#[test]
fn test_multi_document_file_takes_consecutive_slots() {
    let dir = TempDir::new().unwrap();
    write_yaml(
        dir.path(),
        "duo.yaml",
        "name: Koops\ngame: GAME\nGAME: {}\n---\nname: Koopie\ngame: GAME\nGAME: {}\n",
    );
    player(dir.path(), "zess.yaml", "Zess");

    let plan = run(&settings(dir.path(), 1)).unwrap();
    let names: Vec<&str> = plan.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Koops", "Koopie", "Zess"]);
    assert_eq!(plan.players[1].slot, 2);
    assert_eq!(plan.players[1].source, "duo.yaml");
}

#[test]
fn test_weights_file_fills_remaining_slots() {
    let dir = TempDir::new().unwrap();
    write_yaml(dir.path(), "weights.yaml", "game: GAME\nGAME: {}\n");
    player(dir.path(), "Mario.yaml", "Mario");

    let settings = GeneratorSettings {
        players: 3,
        ..settings(dir.path(), 2)
    };
    let plan = run(&settings).unwrap();
    let names: Vec<&str> = plan.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Mario", "Player2", "Player3"]);
    assert!(plan.players[2].source.ends_with("weights.yaml"));
}

#[test]
fn test_name_defaults_to_file_stem() {
    let dir = TempDir::new().unwrap();
    write_yaml(dir.path(), "Goombella.yaml", "game: GAME\nGAME: {}\n");

    let plan = run(&settings(dir.path(), 2)).unwrap();
    assert_eq!(plan.players[0].name, "Goombella");
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_same_seed_same_records() {
    let dir = TempDir::new().unwrap();
    player(dir.path(), "Mario.yaml", "Mario");
    player(dir.path(), "luigi.yaml", "Luigi");

    let first = run(&settings(dir.path(), 42)).unwrap();
    let second = run(&settings(dir.path(), 42)).unwrap();
    assert_eq!(first.seed_name, second.seed_name);
    for (a, b) in first.players.iter().zip(&second.players) {
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    }
}

#[test]
fn test_race_keeps_seed_name() {
    let dir = TempDir::new().unwrap();
    player(dir.path(), "Mario.yaml", "Mario");

    let plain = run(&settings(dir.path(), 7)).unwrap();
    let race = run(&GeneratorSettings {
        race: true,
        ..settings(dir.path(), 7)
    })
    .unwrap();
    assert_eq!(plain.seed_name, race.seed_name);
    assert!(race.race);
    assert!(!plain.race);
}

#[test]
fn test_same_options_reuses_roll() {
    let dir = TempDir::new().unwrap();
    write_yaml(
        dir.path(),
        "weights.yaml",
        "game: GAME\nGAME:\n  starting_coins: random\n  yoshi_color:\n    red: 1\n    blue: 1\n    pink: 1\n",
    );
    let settings = GeneratorSettings {
        players: 4,
        same_options: true,
        ..settings(dir.path(), 11)
    };

    let plan = run(&settings).unwrap();
    assert_eq!(plan.players.len(), 4);
    for record in &plan.players[1..] {
        assert_eq!(record.options, plan.players[0].options);
    }
    let names: Vec<&str> = plan.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Player1", "Player2", "Player3", "Player4"]);
}

// =============================================================================
// Meta and JSON configuration
// =============================================================================

#[test]
fn test_meta_file_overrides_every_document() {
    let dir = TempDir::new().unwrap();
    player(dir.path(), "Mario.yaml", "Mario");
    player(dir.path(), "luigi.yaml", "Luigi");
    write_yaml(
        dir.path(),
        "meta.yaml",
        "meta_description: tournament\nGAME:\n  goal: crystal_stars\n",
    );

    let plan = run(&settings(dir.path(), 3)).unwrap();
    assert_eq!(plan.players.len(), 2);
    for record in &plan.players {
        assert_eq!(record.options["goal"], OptionValue::Choice("crystal_stars".into()));
    }
    assert_eq!(plan.inputs.len(), 3);
}

#[test]
fn test_meta_file_requires_description() {
    let dir = TempDir::new().unwrap();
    player(dir.path(), "Mario.yaml", "Mario");
    write_yaml(dir.path(), "meta.yaml", "GAME:\n  goal: crystal_stars\n");

    let err = run(&settings(dir.path(), 3)).unwrap_err();
    assert!(err.to_string().starts_with("No meta description found"));
}

#[test]
fn test_meta_with_same_options_rejected() {
    let dir = TempDir::new().unwrap();
    player(dir.path(), "Mario.yaml", "Mario");
    write_yaml(dir.path(), "meta.yaml", "meta_description: x\nGAME: {}\n");

    let settings = GeneratorSettings {
        same_options: true,
        ..settings(dir.path(), 3)
    };
    let err = run(&settings).unwrap_err();
    assert_eq!(err.to_string(), "Cannot mix same_options with a meta file");
}

#[test]
fn test_json_config_replaces_player_files() {
    let dir = TempDir::new().unwrap();
    player(dir.path(), "Mario.yaml", "Mario");

    let settings = GeneratorSettings {
        json_config: Some(r#"{"name": "Vivian", "options": {"goal": "bonetail"}}"#.to_string()),
        ..settings(dir.path(), 8)
    };
    let plan = run(&settings).unwrap();
    assert_eq!(plan.players.len(), 1);
    assert_eq!(plan.players[0].source, "json_config");
    assert_eq!(plan.players[0].name, "Vivian");
    assert_eq!(plan.players[0].options["goal"], OptionValue::Choice("bonetail".into()));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_no_players_rejected() {
    let dir = TempDir::new().unwrap();
    let err = run(&settings(dir.path(), 1)).unwrap_err();
    assert!(err.to_string().starts_with("No individual player files found"));
}

#[test]
fn test_players_without_weights_rejected() {
    let dir = TempDir::new().unwrap();
    let settings = GeneratorSettings {
        players: 2,
        ..settings(dir.path(), 1)
    };
    let err = run(&settings).unwrap_err();
    assert!(err.to_string().starts_with("No weights found"));
}

#[test]
fn test_case_insensitive_name_collision() {
    let dir = TempDir::new().unwrap();
    player(dir.path(), "a.yaml", "Bob");
    player(dir.path(), "b.yaml", "bob");

    let err = run(&settings(dir.path(), 1)).unwrap_err();
    assert_eq!(err.to_string(), "Names have to be unique. Names: bob: 2");
}

#[test]
fn test_invalid_file_named_in_error() {
    let dir = TempDir::new().unwrap();
    write_yaml(dir.path(), "broken.yaml", "name: Broken\ngame: GAME\n");

    let err = run(&settings(dir.path(), 1)).unwrap_err();
    assert_eq!(err.to_string(), "File broken.yaml is invalid. Please fix your yaml.");
    match err {
        GenerateError::InvalidFile { source, .. } => {
            assert!(source.to_string().starts_with("No game options for selected game"));
        }
        other => panic!("unexpected {other:?}"),
    }
}
