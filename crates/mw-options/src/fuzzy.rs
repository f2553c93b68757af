//! Fuzzy matching for game-name suggestions.

/// Best candidate for a misspelled name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub candidate: String,
    /// Similarity as a rounded percentage.
    pub score: u8,
}

fn jaro(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if b_matched[j] || b[j] != *ca {
                continue;
            }
            a_matched[i] = true;
            b_matched[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut k = 0usize;
    for (i, ca) in a.iter().enumerate() {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[k] {
            k += 1;
        }
        if *ca != b[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = (transpositions / 2) as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler similarity in `[0, 1]`, case-insensitive.
///
/// The common-prefix boost (up to four characters) only applies once the
/// plain Jaro similarity exceeds 0.7.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let weight = jaro(&a, &b);
    if weight <= 0.7 {
        return weight;
    }
    let prefix = a
        .iter()
        .zip(b.iter())
        .take(4)
        .take_while(|(x, y)| x == y)
        .count();
    weight + prefix as f64 * 0.1 * (1.0 - weight)
}

/// Highest scoring candidate; ties keep candidate order.
pub fn best_match<'a, I>(name: &str, candidates: I) -> Option<FuzzyMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(f64, &str)> = None;
    for candidate in candidates {
        let score = jaro_winkler(name, candidate);
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, candidate));
        }
    }
    best.map(|(score, candidate)| FuzzyMatch {
        candidate: candidate.to_string(),
        score: (score * 100.0).round() as u8,
    })
}
