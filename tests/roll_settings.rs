//! Settings resolution tests
//!
//! Drive `roll_settings` and `roll_documents` with YAML documents the way
//! players write them, against the built-in world.

use mw_generate::{read_documents_str, roll_documents, roll_settings, Document, GenerateError, RollRng};
use mw_options::{OptionValue, PlandoOptions, StaticRegistry, BUILTIN_GAME};

fn registry() -> StaticRegistry {
    StaticRegistry::builtin().unwrap()
}

/// Parse a single YAML document, with `GAME` standing in for the built-in game name.
fn document(yaml: &str) -> Document {
    let yaml = yaml.replace("GAME", &format!("\"{}\"", BUILTIN_GAME));
    let mut documents = read_documents_str(&yaml).unwrap();
    assert_eq!(documents.len(), 1);
    documents.remove(0)
}

fn plando() -> PlandoOptions {
    PlandoOptions::from_option_string("bosses").unwrap()
}

fn trigger_document(percentage: u32) -> Document {
    document(&format!(
        r#"
name: Mario
game: GAME
GAME:
  goal: bonetail
  goal_stars: 7
  triggers:
    - option_name: goal
      option_result: bonetail
      percentage: {percentage}
      options:
        GAME:
          goal_stars: 3
"#
    ))
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_roll_fills_defaults() {
    let doc = document("name: Mario\ngame: GAME\nGAME:\n  goal: crystal_stars\n");
    let rolled = roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(1)).unwrap();

    assert_eq!(rolled.game, BUILTIN_GAME);
    assert_eq!(rolled.name.as_deref(), Some("Mario"));
    assert_eq!(rolled.options["goal"], OptionValue::Choice("crystal_stars".into()));
    assert_eq!(rolled.options["goal_stars"], OptionValue::Range(7));
    assert_eq!(rolled.options["starting_coins"], OptionValue::Range(100));
    assert!(rolled.options.contains_key("progression_balancing"));
    assert!(rolled.unused_options.is_empty());
}

#[test]
fn test_weighted_choice_respects_zero_weights() {
    let doc = document(
        "name: Mario\ngame: GAME\nGAME:\n  goal:\n    bonetail: 1\n    shadow_queen: 0\n    crystal_stars: 0\n",
    );
    for seed in 0..20 {
        let rolled = roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(seed)).unwrap();
        assert_eq!(rolled.options["goal"], OptionValue::Choice("bonetail".into()));
    }
}

#[test]
fn test_same_seed_reproducible() {
    let text = format!(
        "name: A\ngame: \"{g}\"\n\"{g}\":\n  goal:\n    bonetail: 1\n    shadow_queen: 1\n    crystal_stars: 1\n  starting_coins: random\n---\nname: B\ngame: \"{g}\"\n\"{g}\":\n  yoshi_color:\n    red: 1\n    blue: 1\n",
        g = BUILTIN_GAME
    );
    let documents = read_documents_str(&text).unwrap();
    let first = roll_documents(&documents, &plando(), &registry(), 99).unwrap();
    let second = roll_documents(&documents, &plando(), &registry(), 99).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

// =============================================================================
// Triggers
// =============================================================================

#[test]
fn test_trigger_always_applies_at_100() {
    let doc = trigger_document(100);
    for seed in 0..10 {
        let rolled = roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(seed)).unwrap();
        assert_eq!(rolled.options["goal_stars"], OptionValue::Range(3));
    }
}

#[test]
fn test_trigger_never_applies_at_0() {
    let doc = trigger_document(0);
    for seed in 0..10 {
        let rolled = roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(seed)).unwrap();
        assert_eq!(rolled.options["goal_stars"], OptionValue::Range(7));
    }
}

#[test]
fn test_trigger_error_names_index() {
    let doc = document(
        r#"
name: Mario
game: GAME
GAME:
  goal: bonetail
  goal_stars: 7
  triggers:
    - option_name: goal
      option_result: shadow_queen
      options: {}
    - option_name: goal
      option_result: bonetail
      options:
        GAME:
          +goal_stars: [1]
"#,
    );
    let err = roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(3)).unwrap_err();
    assert!(matches!(err, GenerateError::Trigger { index: 2, .. }));
    assert_eq!(
        err.to_string(),
        "Your trigger number 2 is invalid. Please fix your triggers."
    );
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_future_version_rejected() {
    let doc = document("name: Mario\ngame: GAME\nrequires:\n  version: 99.0.0\nGAME: {}\n");
    let err = roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(1)).unwrap_err();
    assert!(matches!(err, GenerateError::VersionIncompatible { .. }));
    assert!(err.to_string().contains("at least 99.0.0"));
}

#[test]
fn test_older_version_accepted() {
    let doc = document("name: Mario\ngame: GAME\nrequires:\n  version: 0.1.0\nGAME: {}\n");
    assert!(roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(1)).is_ok());
}

#[test]
fn test_merge_tag_outside_trigger_rejected() {
    let doc = document("name: Mario\ngame: GAME\nGAME:\n  +start_inventory:\n    Hammer: 1\n");
    let err = roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(1)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Merge tag cannot be used outside of trigger contexts. Found +start_inventory"
    );
}

#[test]
fn test_misspelled_game_suggests_builtin() {
    let doc = document(
        "name: Mario\ngame: Paper Mario The Thousand Year Door\nPaper Mario The Thousand Year Door: {}\n",
    );
    let err = roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(1)).unwrap_err();
    match err {
        GenerateError::UnknownGame { suggestion, .. } => assert_eq!(suggestion, BUILTIN_GAME),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_missing_game_section() {
    let doc = document("name: Mario\ngame: GAME\n");
    let err = roll_settings(&doc, &plando(), &registry(), &mut RollRng::from_seed(1)).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("No game options for selected game \"{}\" found.", BUILTIN_GAME)
    );
}
