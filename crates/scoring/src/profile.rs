use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use futuretree_protocol::{BudgetFlexibility, RiskTolerance, TimelinePreference};
use serde::{Deserialize, Serialize};

use crate::ScoringError;

const BUILTIN_DEFAULT: &str = include_str!("../../../profiles/default.json");

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Injected lookup tables and weights for path scoring.
///
/// Loaded once (built-in JSON or a caller-supplied JSON/TOML file) and passed
/// into [`crate::PathScorer`], so alternate weighting schemes need no code
/// changes.
#[derive(Clone, Debug)]
pub struct ScoringProfile {
    name: String,
    description: Option<String>,
    weights: AlignmentWeights,
    flexibility: FlexibilityMultipliers,
    tolerance: ToleranceFactors,
    timeline_ranges: TimelineRanges,
    default_affinity: f64,
    industry_affinity: AffinityTable,
    stage_affinity: AffinityTable,
}

/// Weights of the four context-alignment components. Must sum to 1.0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentWeights {
    pub industry: f64,
    pub capital_fit: f64,
    pub timeline_match: f64,
    pub stage_alignment: f64,
}

impl Default for AlignmentWeights {
    fn default() -> Self {
        Self {
            industry: 0.25,
            capital_fit: 0.30,
            timeline_match: 0.25,
            stage_alignment: 0.20,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexibilityMultipliers {
    pub fixed: f64,
    pub flexible: f64,
    pub unlimited: f64,
}

impl Default for FlexibilityMultipliers {
    fn default() -> Self {
        Self {
            fixed: 1.0,
            flexible: 1.2,
            unlimited: 1.5,
        }
    }
}

impl FlexibilityMultipliers {
    #[must_use]
    pub const fn for_flexibility(&self, flexibility: BudgetFlexibility) -> f64 {
        match flexibility {
            BudgetFlexibility::Fixed => self.fixed,
            BudgetFlexibility::Flexible => self.flexible,
            BudgetFlexibility::Unlimited => self.unlimited,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToleranceFactors {
    pub conservative: f64,
    pub moderate: f64,
    pub aggressive: f64,
}

impl Default for ToleranceFactors {
    fn default() -> Self {
        Self {
            conservative: 0.2,
            moderate: 0.5,
            aggressive: 0.8,
        }
    }
}

impl ToleranceFactors {
    #[must_use]
    pub const fn for_tolerance(&self, tolerance: RiskTolerance) -> f64 {
        match tolerance {
            RiskTolerance::Conservative => self.conservative,
            RiskTolerance::Moderate => self.moderate,
            RiskTolerance::Aggressive => self.aggressive,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthRange {
    pub min_months: f64,
    pub max_months: f64,
}

impl MonthRange {
    #[must_use]
    pub const fn new(min_months: f64, max_months: f64) -> Self {
        Self {
            min_months,
            max_months,
        }
    }

    #[must_use]
    pub fn len(&self) -> f64 {
        self.max_months - self.min_months
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.min_months + self.max_months) / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineRanges {
    pub quick: MonthRange,
    pub moderate: MonthRange,
    pub patient: MonthRange,
}

impl Default for TimelineRanges {
    fn default() -> Self {
        Self {
            quick: MonthRange::new(0.0, 6.0),
            moderate: MonthRange::new(6.0, 12.0),
            patient: MonthRange::new(12.0, 24.0),
        }
    }
}

impl TimelineRanges {
    #[must_use]
    pub const fn for_preference(&self, preference: TimelinePreference) -> MonthRange {
        match preference {
            TimelinePreference::Quick => self.quick,
            TimelinePreference::Moderate => self.moderate,
            TimelinePreference::Patient => self.patient,
        }
    }
}

/// `path slug -> key -> affinity`, all keys lower-cased.
type AffinityTable = HashMap<String, HashMap<String, f64>>;

#[derive(Clone, Debug, Default, Deserialize)]
struct RawProfile {
    #[serde(default)]
    schema_version: Option<u32>,
    name: Option<String>,
    description: Option<String>,
    weights: Option<AlignmentWeights>,
    flexibility_multipliers: Option<FlexibilityMultipliers>,
    tolerance_factors: Option<ToleranceFactors>,
    timeline_ranges: Option<TimelineRanges>,
    default_affinity: Option<f64>,
    #[serde(default)]
    industry_affinity: AffinityTable,
    #[serde(default)]
    stage_affinity: AffinityTable,
}

impl ScoringProfile {
    /// The bundled default profile.
    pub fn default_profile() -> Result<Self> {
        Self::from_bytes("default", BUILTIN_DEFAULT.as_bytes())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read scoring profile {}", path.display()))?;
        let fallback_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom")
            .to_string();
        Self::from_bytes(&fallback_name, &bytes)
    }

    pub fn from_bytes(profile_name: &str, bytes: &[u8]) -> Result<Self> {
        let raw = parse_raw(bytes).with_context(|| {
            format!("Scoring profile '{profile_name}' is not valid JSON/TOML configuration")
        })?;
        Self::from_raw(raw, profile_name)
    }

    fn from_raw(raw: RawProfile, fallback_name: &str) -> Result<Self> {
        if let Some(schema_version) = raw.schema_version {
            if schema_version != 1 {
                return Err(anyhow!(
                    "profile.schema_version {schema_version} is not supported (expected 1)"
                ));
            }
        }

        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());

        let profile = Self {
            name,
            description: raw.description,
            weights: raw.weights.unwrap_or_default(),
            flexibility: raw.flexibility_multipliers.unwrap_or_default(),
            tolerance: raw.tolerance_factors.unwrap_or_default(),
            timeline_ranges: raw.timeline_ranges.unwrap_or_default(),
            default_affinity: raw.default_affinity.unwrap_or(0.7),
            industry_affinity: normalize_table(raw.industry_affinity),
            stage_affinity: normalize_table(raw.stage_affinity),
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> crate::Result<()> {
        let w = &self.weights;
        let weights = [w.industry, w.capital_fit, w.timeline_match, w.stage_alignment];
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid("alignment weights must be non-negative numbers"));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(invalid(format!(
                "alignment weights must sum to 1.0 (got {sum:.4})"
            )));
        }

        let f = &self.flexibility;
        if [f.fixed, f.flexible, f.unlimited]
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
        {
            return Err(invalid("flexibility multipliers must be > 0"));
        }

        let t = &self.tolerance;
        if [t.conservative, t.moderate, t.aggressive]
            .iter()
            .any(|v| !unit_interval(*v))
        {
            return Err(invalid("tolerance factors must be within [0, 1]"));
        }

        let r = &self.timeline_ranges;
        for (label, range) in [
            ("quick", r.quick),
            ("moderate", r.moderate),
            ("patient", r.patient),
        ] {
            if !range.min_months.is_finite()
                || !range.max_months.is_finite()
                || range.min_months < 0.0
                || range.min_months > range.max_months
            {
                return Err(invalid(format!(
                    "timeline range '{label}' must satisfy 0 <= min_months <= max_months"
                )));
            }
        }

        if !unit_interval(self.default_affinity) {
            return Err(invalid("default_affinity must be within [0, 1]"));
        }
        for (table_name, table) in [
            ("industry_affinity", &self.industry_affinity),
            ("stage_affinity", &self.stage_affinity),
        ] {
            for (slug, entries) in table {
                for (key, value) in entries {
                    if !unit_interval(*value) {
                        return Err(invalid(format!(
                            "{table_name}.{slug}.{key} = {value} is outside [0, 1]"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn weights(&self) -> &AlignmentWeights {
        &self.weights
    }

    #[must_use]
    pub const fn flexibility(&self) -> &FlexibilityMultipliers {
        &self.flexibility
    }

    #[must_use]
    pub const fn tolerance(&self) -> &ToleranceFactors {
        &self.tolerance
    }

    #[must_use]
    pub const fn timeline_ranges(&self) -> &TimelineRanges {
        &self.timeline_ranges
    }

    #[must_use]
    pub const fn default_affinity(&self) -> f64 {
        self.default_affinity
    }

    /// Affinity of a path for an industry, or the default when either is unknown.
    #[must_use]
    pub fn industry_affinity(&self, path_slug: &str, industry: &str) -> f64 {
        lookup(&self.industry_affinity, path_slug, industry).unwrap_or(self.default_affinity)
    }

    /// Affinity of a path for a business stage, or the default when either is unknown.
    #[must_use]
    pub fn stage_affinity(&self, path_slug: &str, stage: &str) -> f64 {
        lookup(&self.stage_affinity, path_slug, stage).unwrap_or(self.default_affinity)
    }
}

fn invalid(message: impl Into<String>) -> ScoringError {
    ScoringError::InvalidProfile(message.into())
}

fn unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

fn normalize_table(table: AffinityTable) -> AffinityTable {
    table
        .into_iter()
        .map(|(slug, entries)| {
            let entries = entries
                .into_iter()
                .map(|(key, value)| (normalize_key(&key), value))
                .collect();
            (normalize_key(&slug), entries)
        })
        .collect()
}

fn lookup(table: &AffinityTable, path_slug: &str, key: &str) -> Option<f64> {
    table
        .get(&normalize_key(path_slug))?
        .get(&normalize_key(key))
        .copied()
}

fn parse_raw(bytes: &[u8]) -> Result<RawProfile> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                anyhow!(
                    "Profile is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                )
            })?;
            serde_json::to_value(toml_value)
                .map_err(|err| anyhow!("Failed to convert TOML profile to JSON: {err}"))?
        }
    };

    serde_json::from_value(value).map_err(|err| anyhow!("Profile parse error: {err}"))
}
