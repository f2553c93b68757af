//! Display names: templating, truncation and uniqueness.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::GenerateError;

/// Name no participant may take.
pub const RESERVED_NAME: &str = "Archipelago";

/// Maximum display name length in characters.
pub const MAX_NAME_CHARS: usize = 16;

/// How often each case-folded raw name has been handed out in this run.
#[derive(Debug, Default, Clone)]
pub struct NameCounter {
    counts: HashMap<String, usize>,
}

impl NameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more use of `name`, returning the new count.
    pub fn increment(&mut self, name: &str) -> usize {
        let count = self.counts.entry(name.to_lowercase()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn get(&self, name: &str) -> usize {
        self.counts.get(&name.to_lowercase()).copied().unwrap_or(0)
    }
}

/// Turn a raw name template into the final display name of `player`.
///
/// `%%` is a literal percent sign. `%number%` is how often this raw name has
/// been used so far (including this use), `%player%` the slot number;
/// the upper-case forms are empty for the first use / first slot. Unknown
/// `{placeholders}` are kept verbatim.
pub fn handle_name(
    name: &str,
    player: usize,
    counter: &mut NameCounter,
) -> Result<String, GenerateError> {
    let number = counter.increment(name);

    let template = name
        .split("%%")
        .map(|segment| {
            segment
                .replace("%number%", "{number}")
                .replace("%player%", "{player}")
                .replace("%NUMBER%", "{NUMBER}")
                .replace("%PLAYER%", "{PLAYER}")
        })
        .collect::<Vec<_>>()
        .join("%");

    let fields = [
        ("number", number.to_string()),
        ("NUMBER", if number > 1 { number.to_string() } else { String::new() }),
        ("player", player.to_string()),
        ("PLAYER", if player > 1 { player.to_string() } else { String::new() }),
    ];
    let formatted = safe_format(&template, &fields);

    let truncated: String = formatted.trim().chars().take(MAX_NAME_CHARS).collect();
    let final_name = truncated.trim().to_string();

    if final_name == RESERVED_NAME {
        return Err(GenerateError::ReservedName(final_name));
    }
    Ok(final_name)
}

/// Brace formatting that never fails: `{{`/`}}` escape, known fields are
/// substituted, everything else is copied through.
fn safe_format(template: &str, fields: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }
        match tail.find('}') {
            Some(end) => {
                let field = &tail[1..end];
                match fields.iter().find(|(key, _)| *key == field) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Fail when two display names collide ignoring case.
pub fn ensure_unique_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<(), GenerateError> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for name in names {
        *counts.entry(name.to_lowercase()).or_insert(0) += 1;
    }
    if counts.values().all(|&count| count == 1) {
        return Ok(());
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    let rendered: Vec<String> = counts
        .iter()
        .map(|(name, count)| format!("{}: {}", name, count))
        .collect();
    Err(GenerateError::NameCollision {
        counts: rendered.join(", "),
    })
}
