use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named growth strategy together with its aggregate statistics.
///
/// The aggregates are written only by the learning loop; scorers treat the
/// record as read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct StrategicPath {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Percentage of successful cases, 0-100
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub case_count: u32,

    /// Months
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_p25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_p75: Option<f64>,

    /// Dollars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_p25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_p75: Option<f64>,

    /// 0 (safe) to 1 (every case failed)
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
    #[serde(default)]
    pub model_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_aggregated: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Default for StrategicPath {
    fn default() -> Self {
        Self {
            id: String::new(),
            slug: String::new(),
            name: String::new(),
            is_active: default_active(),
            success_rate: 0.0,
            case_count: 0,
            timeline_p25: None,
            timeline_p75: None,
            capital_p25: None,
            capital_p75: None,
            risk_score: 0.0,
            confidence_level: ConfidenceLevel::default(),
            model_version: 0,
            last_aggregated: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Confidence grows with the number of observed cases behind the aggregates.
    #[must_use]
    pub const fn from_case_count(case_count: u32) -> Self {
        if case_count < 10 {
            Self::Low
        } else if case_count < 30 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// The slice of a [`StrategicPath`] recomputed from reported outcomes.
///
/// A percentile is `None` when no outcome reported the underlying actual, so
/// the path keeps no range for it and scorers fall back to their neutral fit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PathAggregates {
    pub success_rate: f64,
    pub case_count: u32,
    #[serde(default)]
    pub timeline_p25: Option<f64>,
    #[serde(default)]
    pub timeline_p75: Option<f64>,
    #[serde(default)]
    pub capital_p25: Option<f64>,
    #[serde(default)]
    pub capital_p75: Option<f64>,
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathInvariantError {
    TimelineRange { p25: f64, p75: f64 },
    CapitalRange { p25: f64, p75: f64 },
    RiskOutOfRange(f64),
    SuccessRateOutOfRange(f64),
}

impl fmt::Display for PathInvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimelineRange { p25, p75 } => {
                write!(f, "timeline_p25 ({p25}) exceeds timeline_p75 ({p75})")
            }
            Self::CapitalRange { p25, p75 } => {
                write!(f, "capital_p25 ({p25}) exceeds capital_p75 ({p75})")
            }
            Self::RiskOutOfRange(v) => write!(f, "risk_score {v} is outside [0, 1]"),
            Self::SuccessRateOutOfRange(v) => write!(f, "success_rate {v} is outside [0, 100]"),
        }
    }
}

impl std::error::Error for PathInvariantError {}

impl StrategicPath {
    /// Check the ordering and range invariants of the aggregate fields.
    pub fn validate(&self) -> Result<(), PathInvariantError> {
        if let (Some(p25), Some(p75)) = (self.timeline_p25, self.timeline_p75) {
            if p25 > p75 {
                return Err(PathInvariantError::TimelineRange { p25, p75 });
            }
        }
        if let (Some(p25), Some(p75)) = (self.capital_p25, self.capital_p75) {
            if p25 > p75 {
                return Err(PathInvariantError::CapitalRange { p25, p75 });
            }
        }
        if !(0.0..=1.0).contains(&self.risk_score) {
            return Err(PathInvariantError::RiskOutOfRange(self.risk_score));
        }
        if !(0.0..=100.0).contains(&self.success_rate) {
            return Err(PathInvariantError::SuccessRateOutOfRange(self.success_rate));
        }
        Ok(())
    }

    #[must_use]
    pub fn aggregates(&self) -> PathAggregates {
        PathAggregates {
            success_rate: self.success_rate,
            case_count: self.case_count,
            timeline_p25: self.timeline_p25,
            timeline_p75: self.timeline_p75,
            capital_p25: self.capital_p25,
            capital_p75: self.capital_p75,
            risk_score: self.risk_score,
        }
    }

    /// Overwrite the aggregate fields and bump the model version.
    pub fn apply_aggregates(&mut self, aggregates: &PathAggregates, now: DateTime<Utc>) {
        self.success_rate = aggregates.success_rate;
        self.case_count = aggregates.case_count;
        self.timeline_p25 = aggregates.timeline_p25;
        self.timeline_p75 = aggregates.timeline_p75;
        self.capital_p25 = aggregates.capital_p25;
        self.capital_p75 = aggregates.capital_p75;
        self.risk_score = aggregates.risk_score;
        self.confidence_level = ConfidenceLevel::from_case_count(aggregates.case_count);
        self.model_version = self.model_version.saturating_add(1);
        self.last_aggregated = Some(now);
    }

    /// Midpoint of the capital range, if the path carries one.
    #[must_use]
    pub fn capital_midpoint(&self) -> Option<f64> {
        match (self.capital_p25, self.capital_p75) {
            (Some(p25), Some(p75)) => Some((p25 + p75) / 2.0),
            (Some(v), None) | (None, Some(v)) => Some(v),
            (None, None) => None,
        }
    }
}
