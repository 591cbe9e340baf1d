//! Primitive comparators shared by the matcher and the path scorer.
//!
//! Every function here is pure and returns a score on a 0-100 scale. Missing
//! data never fails: it maps to [`NEUTRAL_SCORE`] or 0 as documented per
//! function.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Score used when either side of an ordinal or geographic comparison is unknown.
pub const NEUTRAL_SCORE: f64 = 30.0;

static AMOUNT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\$?([0-9][0-9,]*(?:\.[0-9]+)?)([kmb])?\+?$").ok());

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Fuzzy string similarity.
///
/// exact = 100, substring containment = 80, shared words = 20 each capped at
/// 60, otherwise 0. Comparison is case-insensitive; an empty side scores 0.
pub fn fuzzy_match(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 100.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 80.0;
    }

    let left: HashSet<&str> = a.unicode_words().collect();
    let right: HashSet<&str> = b.unicode_words().collect();
    let overlap = left.intersection(&right).count();
    (overlap as f64 * 20.0).min(60.0)
}

/// Lower-cased word tokens across all entries.
pub fn token_set<'a>(entries: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    entries
        .into_iter()
        .flat_map(|entry| {
            entry
                .unicode_words()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Jaccard similarity scaled to 0-100. Two empty sets score 0.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64 * 100.0
}

/// Geographic proximity of two `"city, region, country"` strings.
///
/// Shared components score `50 + 20 × shared` (capped at 100), disjoint
/// locations 20, and a missing side [`NEUTRAL_SCORE`].
pub fn geography_score(a: Option<&str>, b: Option<&str>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return NEUTRAL_SCORE;
    };
    let left = location_components(a);
    let right = location_components(b);
    if left.is_empty() || right.is_empty() {
        return NEUTRAL_SCORE;
    }

    let shared = left.intersection(&right).count();
    if shared > 0 {
        (50.0 + 20.0 * shared as f64).min(100.0)
    } else {
        20.0
    }
}

fn location_components(location: &str) -> HashSet<String> {
    location
        .split(',')
        .map(normalize)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Revenue-stage similarity: three orders of magnitude apart scores 0.
pub fn revenue_score(a: Option<&str>, b: Option<&str>, buckets: &BucketTable) -> f64 {
    match (buckets.resolve(a), buckets.resolve(b)) {
        (Some(a), Some(b)) => {
            let diff = (a.log10() - b.log10()).abs();
            (100.0 - diff / 3.0 * 100.0).max(0.0)
        }
        _ => NEUTRAL_SCORE,
    }
}

/// Team-size similarity: a ten-fold headcount ratio scores 0.
pub fn team_size_score(a: Option<&str>, b: Option<&str>, buckets: &BucketTable) -> f64 {
    match (buckets.resolve(a), buckets.resolve(b)) {
        (Some(a), Some(b)) => {
            let ratio = a.max(b) / a.min(b);
            (100.0 - (ratio - 1.0) / 9.0 * 100.0).max(0.0)
        }
        _ => NEUTRAL_SCORE,
    }
}

/// Maps ordinal bucket labels to a representative value.
///
/// Labels are normalized (lower-case, whitespace and `$` removed) before
/// lookup. Labels missing from the table are parsed as amounts (`750k`,
/// `$2.5M`, `1,200,000`) or ranges of amounts (`2m-4m`, midpoint).
#[derive(Debug, Clone, PartialEq)]
pub struct BucketTable {
    values: HashMap<String, f64>,
}

impl BucketTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let values = entries
            .into_iter()
            .map(|(label, value)| (normalize_label(label.as_ref()), value))
            .collect();
        Self { values }
    }

    /// Revenue buckets used by the intake forms, in dollars.
    pub fn revenue() -> Self {
        Self::new([
            ("pre-revenue", 10_000.0),
            ("0-100k", 50_000.0),
            ("under-100k", 50_000.0),
            ("100k-500k", 300_000.0),
            ("500k-1m", 750_000.0),
            ("1m-5m", 3_000_000.0),
            ("5m-10m", 7_500_000.0),
            ("10m-50m", 30_000_000.0),
            ("50m+", 75_000_000.0),
        ])
    }

    /// Team-size buckets used by the intake forms, in people.
    pub fn team_size() -> Self {
        Self::new([
            ("solo", 1.0),
            ("2-5", 3.0),
            ("6-10", 8.0),
            ("11-25", 18.0),
            ("26-50", 38.0),
            ("50+", 75.0),
            ("51-200", 125.0),
            ("200+", 300.0),
        ])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Representative positive value for a label, or `None` when unknown.
    pub fn resolve(&self, label: Option<&str>) -> Option<f64> {
        let key = normalize_label(label?);
        if key.is_empty() {
            return None;
        }
        let value = match self.values.get(&key) {
            Some(value) => Some(*value),
            None => parse_range(&key),
        }?;
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_range(key: &str) -> Option<f64> {
    match key.split_once('-') {
        Some((low, high)) => {
            let low = parse_amount(low)?;
            let high = parse_amount(high)?;
            Some((low + high) / 2.0)
        }
        None => parse_amount(key),
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    let re = AMOUNT_RE.as_ref()?;
    let caps = re.captures(raw)?;
    let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let scale = match caps.get(2).map(|m| m.as_str()) {
        Some("k") => 1_000.0,
        Some("m") => 1_000_000.0,
        Some("b") => 1_000_000_000.0,
        _ => 1.0,
    };
    Some(number * scale)
}
