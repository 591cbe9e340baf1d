use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A real-world result reported against a path. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PathOutcome {
    pub id: String,
    pub path_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploration_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_timeline_months: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_timeline_months: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,

    /// `None` until the user reports how it went
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<OutcomeResult>,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeResult {
    Success,
    Partial,
    Failure,
    Pivoted,
    Abandoned,
}

impl OutcomeResult {
    /// Success and partial success both count toward a path's success rate.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::Partial)
    }

    /// Failure, abandonment and pivots all count toward a path's risk score.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Failure | Self::Pivoted | Self::Abandoned)
    }
}
