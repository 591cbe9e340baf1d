use crate::comparators::BucketTable;
use crate::{Result, SearchError};
use serde::{Deserialize, Serialize};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Weights of the six matching sub-scores. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub industry: f64,
    pub revenue_stage: f64,
    pub team_size: f64,
    pub challenge_overlap: f64,
    pub capability_overlap: f64,
    pub geography: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            industry: 0.30,
            revenue_stage: 0.20,
            team_size: 0.15,
            challenge_overlap: 0.15,
            capability_overlap: 0.10,
            geography: 0.10,
        }
    }
}

impl MatchWeights {
    fn as_array(&self) -> [(&'static str, f64); 6] {
        [
            ("industry", self.industry),
            ("revenue_stage", self.revenue_stage),
            ("team_size", self.team_size),
            ("challenge_overlap", self.challenge_overlap),
            ("capability_overlap", self.capability_overlap),
            ("geography", self.geography),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let mut sum = 0.0;
        for (name, weight) in self.as_array() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SearchError::InvalidConfig(format!(
                    "weight {name} must be a non-negative number (got {weight})"
                )));
            }
            sum += weight;
        }
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(SearchError::InvalidConfig(format!(
                "weights must sum to 1.0 (got {sum:.4})"
            )));
        }
        Ok(())
    }
}

/// Configuration for the similarity matcher
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    pub weights: MatchWeights,

    /// Revenue bucket label → representative dollars
    pub revenue_buckets: BucketTable,

    /// Team-size bucket label → representative headcount
    pub team_size_buckets: BucketTable,

    /// How many top matches vote on the recommended strategy
    pub recommendation_window: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: MatchWeights::default(),
            revenue_buckets: BucketTable::revenue(),
            team_size_buckets: BucketTable::team_size(),
            recommendation_window: 20,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if self.recommendation_window == 0 {
            return Err(SearchError::InvalidConfig(
                "recommendation_window must be > 0".to_string(),
            ));
        }
        if self.revenue_buckets.is_empty() || self.team_size_buckets.is_empty() {
            return Err(SearchError::InvalidConfig(
                "bucket tables must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-request matching options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Minimum overall score (0-100) a candidate needs to be returned
    pub threshold: f64,

    pub max_results: usize,

    /// Only consider case studies with this strategy type (case-insensitive)
    pub strategy_filter: Option<String>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 40.0,
            max_results: 50,
            strategy_filter: None,
        }
    }
}
