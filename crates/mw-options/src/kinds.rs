//! Built-in option kinds.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use rand::{Rng, RngCore};
use serde_json::Value;

use crate::error::OptionError;
use crate::option::{GameOption, VerifyContext};
use crate::plando::PlandoCapability;
use crate::value::{scalar_text, OptionValue};

/// On/off option.
#[derive(Debug, Clone)]
pub struct Toggle {
    pub key: String,
    pub default: bool,
}

impl GameOption for Toggle {
    fn key(&self) -> &str {
        &self.key
    }

    fn default_value(&self) -> Value {
        Value::Bool(self.default)
    }

    fn from_any(&self, raw: &Value, rng: &mut dyn RngCore) -> Result<OptionValue, OptionError> {
        let value = match raw {
            Value::Bool(b) => *b,
            Value::Number(n) => match n.as_i64() {
                Some(0) => false,
                Some(1) => true,
                _ => return Err(OptionError::invalid(&self.key, n, "expected 0 or 1")),
            },
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "on" | "1" => true,
                "false" | "off" | "0" => false,
                "random" => rng.gen_range(0..2) == 1,
                _ => return Err(OptionError::invalid(&self.key, s, "expected true or false")),
            },
            other => return Err(OptionError::invalid(&self.key, other, "expected true or false")),
        };
        Ok(OptionValue::Toggle(value))
    }
}

/// One of a fixed list of named values.
#[derive(Debug, Clone)]
pub struct Choice {
    pub key: String,
    pub choices: Vec<String>,
    pub aliases: IndexMap<String, String>,
    pub default: String,
}

impl Choice {
    fn lookup(&self, name: &str) -> Option<&str> {
        let lowered = name.trim().to_lowercase();
        if let Some(found) = self.choices.iter().find(|c| c.to_lowercase() == lowered) {
            return Some(found);
        }
        self.aliases
            .iter()
            .find(|(alias, _)| alias.to_lowercase() == lowered)
            .map(|(_, target)| target.as_str())
    }
}

impl GameOption for Choice {
    fn key(&self) -> &str {
        &self.key
    }

    fn default_value(&self) -> Value {
        Value::String(self.default.clone())
    }

    fn from_any(&self, raw: &Value, rng: &mut dyn RngCore) -> Result<OptionValue, OptionError> {
        if let Some(index) = raw.as_u64() {
            return self
                .choices
                .get(index as usize)
                .map(|name| OptionValue::Choice(name.clone()))
                .ok_or_else(|| OptionError::invalid(&self.key, index, "no choice with this value"));
        }
        let text = scalar_text(raw)
            .ok_or_else(|| OptionError::invalid(&self.key, raw, "expected a choice name"))?;
        if text.trim().eq_ignore_ascii_case("random") {
            let index = rng.gen_range(0..self.choices.len());
            return Ok(OptionValue::Choice(self.choices[index].clone()));
        }
        self.lookup(&text)
            .map(|name| OptionValue::Choice(name.to_string()))
            .ok_or_else(|| {
                OptionError::invalid(
                    &self.key,
                    &text,
                    format!("valid choices are {}", self.choices.join(", ")),
                )
            })
    }
}

/// Bounded integer option with optional named values.
#[derive(Debug, Clone)]
pub struct Range {
    pub key: String,
    pub min: i64,
    pub max: i64,
    pub default: i64,
    pub special: IndexMap<String, i64>,
}

impl Range {
    fn checked(&self, value: i64) -> Result<OptionValue, OptionError> {
        if value < self.min || value > self.max {
            return Err(OptionError::OutOfRange {
                option: self.key.clone(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(OptionValue::Range(value))
    }

    /// Triangular distribution over `[low, high]`, one draw.
    fn triangular(&self, low: i64, high: i64, mode: Option<i64>, rng: &mut dyn RngCore) -> i64 {
        let mut u: f64 = rng.gen();
        if high == low {
            return low;
        }
        let (mut low_f, mut high_f) = (low as f64, high as f64);
        let mut c = match mode {
            Some(m) => (m as f64 - low_f) / (high_f - low_f),
            None => 0.5,
        };
        if u > c {
            u = 1.0 - u;
            c = 1.0 - c;
            std::mem::swap(&mut low_f, &mut high_f);
        }
        (low_f + (high_f - low_f) * (u * c).sqrt()).round() as i64
    }

    fn from_text(&self, text: &str, rng: &mut dyn RngCore) -> Result<OptionValue, OptionError> {
        let lowered = text.trim().to_lowercase();
        if let Some((_, value)) = self.special.iter().find(|(name, _)| name.to_lowercase() == lowered) {
            return Ok(OptionValue::Range(*value));
        }
        match lowered.as_str() {
            "random" => return Ok(OptionValue::Range(rng.gen_range(self.min..=self.max))),
            "random-low" => {
                return Ok(OptionValue::Range(self.triangular(self.min, self.max, Some(self.min), rng)))
            }
            "random-high" => {
                return Ok(OptionValue::Range(self.triangular(self.min, self.max, Some(self.max), rng)))
            }
            "random-middle" => {
                return Ok(OptionValue::Range(self.triangular(self.min, self.max, None, rng)))
            }
            _ => {}
        }
        if let Some(bounds) = lowered.strip_prefix("random-range-") {
            let parts: Vec<&str> = bounds.split('-').collect();
            let parsed: Option<Vec<i64>> = parts.iter().map(|p| p.parse().ok()).collect();
            return match parsed.as_deref() {
                Some([a, b]) => {
                    let (low, high) = if a <= b { (*a, *b) } else { (*b, *a) };
                    let low = low.max(self.min);
                    let high = high.min(self.max);
                    if low > high {
                        return Err(OptionError::invalid(&self.key, text, "random range outside option bounds"));
                    }
                    Ok(OptionValue::Range(rng.gen_range(low..=high)))
                }
                _ => Err(OptionError::invalid(&self.key, text, "expected random-range-<low>-<high>")),
            };
        }
        match lowered.parse::<i64>() {
            Ok(value) => self.checked(value),
            Err(_) => Err(OptionError::invalid(&self.key, text, "expected an integer")),
        }
    }
}

impl GameOption for Range {
    fn key(&self) -> &str {
        &self.key
    }

    fn default_value(&self) -> Value {
        Value::from(self.default)
    }

    fn from_any(&self, raw: &Value, rng: &mut dyn RngCore) -> Result<OptionValue, OptionError> {
        match raw {
            Value::Number(n) => match n.as_i64() {
                Some(value) => self.checked(value),
                None => match n.as_f64() {
                    Some(f) if f.is_finite() => self.checked(f.trunc() as i64),
                    _ => Err(OptionError::invalid(&self.key, n, "expected an integer")),
                },
            },
            Value::String(s) => self.from_text(s, rng),
            other => Err(OptionError::invalid(&self.key, other, "expected an integer")),
        }
    }
}

/// Arbitrary text.
#[derive(Debug, Clone)]
pub struct FreeText {
    pub key: String,
    pub default: String,
}

impl GameOption for FreeText {
    fn key(&self) -> &str {
        &self.key
    }

    fn default_value(&self) -> Value {
        Value::String(self.default.clone())
    }

    fn from_any(&self, raw: &Value, _rng: &mut dyn RngCore) -> Result<OptionValue, OptionError> {
        scalar_text(raw)
            .map(OptionValue::Text)
            .ok_or_else(|| OptionError::invalid(&self.key, raw, "expected text"))
    }
}

fn check_valid_keys(
    key: &str,
    valid_keys: &Option<Vec<String>>,
    value: &OptionValue,
    ctx: &VerifyContext<'_>,
) -> Result<(), OptionError> {
    let Some(valid) = valid_keys else {
        return Ok(());
    };
    let unknown: Vec<String> = value
        .keys()
        .into_iter()
        .filter(|k| !valid.iter().any(|v| v == k))
        .map(str::to_string)
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(OptionError::UnknownKeys {
            option: key.to_string(),
            game: ctx.game.to_string(),
            player: ctx.player.to_string(),
            keys: unknown,
        })
    }
}

fn sequence_names(key: &str, items: &[Value]) -> Result<Vec<String>, OptionError> {
    items
        .iter()
        .map(|item| scalar_text(item).ok_or_else(|| OptionError::invalid(key, item, "expected a list of names")))
        .collect()
}

/// Ordered list of names.
#[derive(Debug, Clone)]
pub struct ItemList {
    pub key: String,
    pub valid_keys: Option<Vec<String>>,
}

impl GameOption for ItemList {
    fn key(&self) -> &str {
        &self.key
    }

    fn default_value(&self) -> Value {
        Value::Array(Vec::new())
    }

    fn supports_weighting(&self) -> bool {
        false
    }

    fn from_any(&self, raw: &Value, _rng: &mut dyn RngCore) -> Result<OptionValue, OptionError> {
        match raw {
            Value::Array(items) => Ok(OptionValue::List(sequence_names(&self.key, items)?)),
            Value::Null => Ok(OptionValue::List(Vec::new())),
            other => Err(OptionError::invalid(&self.key, other, "expected a list")),
        }
    }

    fn verify(&self, value: &OptionValue, ctx: &VerifyContext<'_>) -> Result<(), OptionError> {
        check_valid_keys(&self.key, &self.valid_keys, value, ctx)
    }
}

/// Unordered set of names.
#[derive(Debug, Clone)]
pub struct ItemSet {
    pub key: String,
    pub valid_keys: Option<Vec<String>>,
}

impl GameOption for ItemSet {
    fn key(&self) -> &str {
        &self.key
    }

    fn default_value(&self) -> Value {
        Value::Array(Vec::new())
    }

    fn supports_weighting(&self) -> bool {
        false
    }

    fn from_any(&self, raw: &Value, _rng: &mut dyn RngCore) -> Result<OptionValue, OptionError> {
        match raw {
            Value::Array(items) => Ok(OptionValue::Set(
                sequence_names(&self.key, items)?.into_iter().collect::<BTreeSet<_>>(),
            )),
            // A YAML set arrives as a mapping whose values are all null.
            Value::Object(map) if map.values().all(Value::is_null) => {
                Ok(OptionValue::Set(map.keys().cloned().collect()))
            }
            Value::Null => Ok(OptionValue::Set(BTreeSet::new())),
            other => Err(OptionError::invalid(&self.key, other, "expected a list or set")),
        }
    }

    fn verify(&self, value: &OptionValue, ctx: &VerifyContext<'_>) -> Result<(), OptionError> {
        check_valid_keys(&self.key, &self.valid_keys, value, ctx)
    }
}

/// Mapping of name to count.
#[derive(Debug, Clone)]
pub struct ItemCounter {
    pub key: String,
    pub valid_keys: Option<Vec<String>>,
}

impl GameOption for ItemCounter {
    fn key(&self) -> &str {
        &self.key
    }

    fn default_value(&self) -> Value {
        Value::Object(serde_json::Map::new())
    }

    fn supports_weighting(&self) -> bool {
        false
    }

    fn from_any(&self, raw: &Value, _rng: &mut dyn RngCore) -> Result<OptionValue, OptionError> {
        let map = match raw {
            Value::Object(map) => map,
            Value::Null => return Ok(OptionValue::Counter(IndexMap::new())),
            other => return Err(OptionError::invalid(&self.key, other, "expected a mapping of counts")),
        };
        let mut counts = IndexMap::new();
        for (name, count) in map {
            let parsed = match count {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            match parsed {
                Some(n) if n >= 0 => {
                    counts.insert(name.clone(), n);
                }
                _ => return Err(OptionError::invalid(&self.key, count, format!("bad count for {}", name))),
            }
        }
        Ok(OptionValue::Counter(counts))
    }

    fn verify(&self, value: &OptionValue, ctx: &VerifyContext<'_>) -> Result<(), OptionError> {
        check_valid_keys(&self.key, &self.valid_keys, value, ctx)
    }
}

/// Structured value handed to the world untouched, optionally gated by a
/// plando capability.
#[derive(Debug, Clone)]
pub struct Passthrough {
    pub key: String,
    pub plando: Option<PlandoCapability>,
}

impl GameOption for Passthrough {
    fn key(&self) -> &str {
        &self.key
    }

    fn default_value(&self) -> Value {
        Value::Array(Vec::new())
    }

    fn supports_weighting(&self) -> bool {
        false
    }

    fn from_any(&self, raw: &Value, _rng: &mut dyn RngCore) -> Result<OptionValue, OptionError> {
        Ok(OptionValue::Raw(raw.clone()))
    }

    fn verify(&self, value: &OptionValue, ctx: &VerifyContext<'_>) -> Result<(), OptionError> {
        match self.plando {
            Some(capability) if !value.is_empty() && !ctx.plando.contains(capability) => {
                Err(OptionError::PlandoDisabled {
                    option: self.key.clone(),
                    capability: capability.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plando::PlandoOptions;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn goal() -> Choice {
        Choice {
            key: "goal".to_string(),
            choices: vec!["shadow_queen".into(), "crystal_stars".into(), "bonetail".into()],
            aliases: IndexMap::from([("sq".to_string(), "shadow_queen".to_string())]),
            default: "shadow_queen".to_string(),
        }
    }

    fn stars() -> Range {
        Range {
            key: "goal_stars".to_string(),
            min: 0,
            max: 7,
            default: 7,
            special: IndexMap::from([("all".to_string(), 7)]),
        }
    }

    #[test]
    fn test_toggle_forms() {
        let toggle = Toggle { key: "palace_skip".into(), default: false };
        let mut rng = rng();
        assert_eq!(toggle.from_any(&json!(true), &mut rng).unwrap(), OptionValue::Toggle(true));
        assert_eq!(toggle.from_any(&json!("off"), &mut rng).unwrap(), OptionValue::Toggle(false));
        assert_eq!(toggle.from_any(&json!(1), &mut rng).unwrap(), OptionValue::Toggle(true));
        assert!(toggle.from_any(&json!("maybe"), &mut rng).is_err());
        assert!(toggle.from_any(&json!(2), &mut rng).is_err());
    }

    #[test]
    fn test_choice_by_name_alias_and_index() {
        let goal = goal();
        let mut rng = rng();
        assert_eq!(goal.from_any(&json!("Bonetail"), &mut rng).unwrap(), OptionValue::Choice("bonetail".into()));
        assert_eq!(goal.from_any(&json!("sq"), &mut rng).unwrap(), OptionValue::Choice("shadow_queen".into()));
        assert_eq!(goal.from_any(&json!(1), &mut rng).unwrap(), OptionValue::Choice("crystal_stars".into()));
        let err = goal.from_any(&json!("grodus"), &mut rng).unwrap_err();
        assert!(err.to_string().contains("valid choices"));
    }

    #[test]
    fn test_choice_random_is_seeded() {
        let goal = goal();
        let a = goal.from_any(&json!("random"), &mut rng()).unwrap();
        let b = goal.from_any(&json!("random"), &mut rng()).unwrap();
        assert_eq!(a, b);
        assert!(matches!(a, OptionValue::Choice(ref name) if goal.choices.contains(name)));
    }

    #[test]
    fn test_range_forms() {
        let stars = stars();
        let mut rng = rng();
        assert_eq!(stars.from_any(&json!(5), &mut rng).unwrap(), OptionValue::Range(5));
        assert_eq!(stars.from_any(&json!("3"), &mut rng).unwrap(), OptionValue::Range(3));
        assert_eq!(stars.from_any(&json!("ALL"), &mut rng).unwrap(), OptionValue::Range(7));
        assert!(matches!(
            stars.from_any(&json!(9), &mut rng),
            Err(OptionError::OutOfRange { value: 9, .. })
        ));
    }

    #[test]
    fn test_range_random_forms_stay_in_bounds() {
        let stars = stars();
        let mut rng = rng();
        for form in ["random", "random-low", "random-high", "random-middle", "random-range-2-4"] {
            for _ in 0..50 {
                let value = stars.from_any(&json!(form), &mut rng).unwrap().as_i64().unwrap();
                assert!((0..=7).contains(&value), "{} produced {}", form, value);
                if form == "random-range-2-4" {
                    assert!((2..=4).contains(&value));
                }
            }
        }
        assert!(stars.from_any(&json!("random-range-9-12"), &mut rng).is_err());
    }

    #[test]
    fn test_item_set_from_yaml_set_shape() {
        let set = ItemSet { key: "local_items".into(), valid_keys: None };
        let value = set.from_any(&json!({"Hammer": null, "Boots": null}), &mut rng()).unwrap();
        assert_eq!(value.keys(), vec!["Boots", "Hammer"]);
    }

    #[test]
    fn test_valid_keys_verified() {
        let list = ItemList {
            key: "start_hints".into(),
            valid_keys: Some(vec!["Hammer".into()]),
        };
        let plando = PlandoOptions::none();
        let ctx = VerifyContext { game: "TTYD", player: "Mario", plando: &plando };
        let value = list.from_any(&json!(["Hammer", "Sword"]), &mut rng()).unwrap();
        let err = list.verify(&value, &ctx).unwrap_err();
        assert!(err.to_string().contains("Sword"));
    }

    #[test]
    fn test_counter_rejects_negative() {
        let counter = ItemCounter { key: "start_inventory".into(), valid_keys: None };
        let ok = counter.from_any(&json!({"Mushroom": 2, "Honey Syrup": "1"}), &mut rng()).unwrap();
        assert_eq!(ok.keys(), vec!["Mushroom", "Honey Syrup"]);
        assert!(counter.from_any(&json!({"Mushroom": -1}), &mut rng()).is_err());
    }

    #[test]
    fn test_passthrough_plando_gate() {
        let option = Passthrough { key: "plando_items".into(), plando: Some(PlandoCapability::Items) };
        let value = option.from_any(&json!([{"item": "Hammer"}]), &mut rng()).unwrap();

        let bosses = PlandoOptions::none().with(PlandoCapability::Bosses);
        let ctx = VerifyContext { game: "TTYD", player: "Mario", plando: &bosses };
        assert!(matches!(option.verify(&value, &ctx), Err(OptionError::PlandoDisabled { .. })));

        let empty = option.from_any(&json!([]), &mut rng()).unwrap();
        assert!(option.verify(&empty, &ctx).is_ok());

        let items = PlandoOptions::none().with(PlandoCapability::Items);
        let ctx = VerifyContext { game: "TTYD", player: "Mario", plando: &items };
        assert!(option.verify(&value, &ctx).is_ok());
    }
}
