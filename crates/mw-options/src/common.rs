//! Options shared by every game.

use indexmap::IndexMap;

use crate::kinds::{Choice, ItemCounter, ItemList, ItemSet, Passthrough, Range};
use crate::option::{GameOption, OptionTable};
use crate::plando::PlandoCapability;

fn table(options: Vec<Box<dyn GameOption>>) -> OptionTable {
    options
        .into_iter()
        .map(|option| (option.key().to_string(), option))
        .collect()
}

/// Options resolved from the document root for every participant.
pub fn common_options() -> OptionTable {
    table(vec![
        Box::new(Range {
            key: "progression_balancing".to_string(),
            min: 0,
            max: 99,
            default: 50,
            special: IndexMap::from([
                ("disabled".to_string(), 0),
                ("normal".to_string(), 50),
                ("extreme".to_string(), 99),
            ]),
        }),
        Box::new(Choice {
            key: "accessibility".to_string(),
            choices: vec!["full".to_string(), "minimal".to_string()],
            aliases: IndexMap::from([("locations".to_string(), "full".to_string())]),
            default: "full".to_string(),
        }),
    ])
}

/// Options every game accepts inside its own section.
///
/// Includes the [`common_options`], which a game section may override.
pub fn per_game_common_options() -> OptionTable {
    let mut options = common_options();
    let sets = [
        "local_items",
        "non_local_items",
        "start_hints",
        "start_location_hints",
        "exclude_locations",
        "priority_locations",
    ];
    for key in sets {
        options.insert(
            key.to_string(),
            Box::new(ItemSet { key: key.to_string(), valid_keys: None }),
        );
    }
    options.insert(
        "start_inventory".to_string(),
        Box::new(ItemCounter { key: "start_inventory".to_string(), valid_keys: None }),
    );
    options.insert(
        "item_links".to_string(),
        Box::new(Passthrough { key: "item_links".to_string(), plando: None }),
    );
    options.insert(
        "plando_items".to_string(),
        Box::new(Passthrough {
            key: "plando_items".to_string(),
            plando: Some(PlandoCapability::Items),
        }),
    );
    options.insert(
        "start_inventory_from_pool".to_string(),
        Box::new(ItemList { key: "start_inventory_from_pool".to_string(), valid_keys: None }),
    );
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_is_subset_of_per_game() {
        let common = common_options();
        let per_game = per_game_common_options();
        for key in common.keys() {
            assert!(per_game.contains_key(key));
        }
        assert!(per_game.contains_key("local_items"));
        assert!(!common.contains_key("local_items"));
    }

    #[test]
    fn test_collection_options_not_weighted() {
        let per_game = per_game_common_options();
        assert!(!per_game["start_inventory"].supports_weighting());
        assert!(!per_game["plando_items"].supports_weighting());
        assert!(per_game["accessibility"].supports_weighting());
    }
}
