//! Settings merge logic
//!
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deep merge two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive), existing keys keep their position
/// - Arrays: REPLACE (second wins entirely)
/// - Scalars: override (second wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => {
                        let base_value = slot.take();
                        *slot = deep_merge(base_value, overlay_value);
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Value::Object(base_map)
        }

        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        (_, overlay) => overlay,
    }
}

/// Merge settings layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"spoiler": 3}), json!({"spoiler": 1}));
        assert_eq!(result["spoiler"], 1);
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({"paths": {"players": "Players", "output": "output"}});
        let overlay = json!({"paths": {"players": "/srv/players"}});
        let result = deep_merge(base, overlay);

        assert_eq!(result["paths"]["players"], "/srv/players");
        assert_eq!(result["paths"]["output"], "output");
    }

    #[test]
    fn test_array_replace() {
        let result = deep_merge(json!({"worlds": ["a", "b", "c"]}), json!({"worlds": ["x"]}));
        assert_eq!(result["worlds"], json!(["x"]));
    }

    #[test]
    fn test_null_override() {
        let result = deep_merge(json!({"seed": 42}), json!({"seed": null}));
        assert!(result["seed"].is_null());
    }

    #[test]
    fn test_key_order_kept() {
        let result = deep_merge(json!({"a": 1, "b": 2, "c": 3}), json!({"a": 9, "d": 4}));
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_merge_layers() {
        let builtin = json!({"players": 0, "race": false, "spoiler": 3});
        let host = json!({"players": 4, "spoiler": 2});
        let cli = json!({"spoiler": 0});

        let result = merge_layers(vec![builtin, host, cli]);

        assert_eq!(result["players"], 4);
        assert_eq!(result["race"], false);
        assert_eq!(result["spoiler"], 0);
    }
}
