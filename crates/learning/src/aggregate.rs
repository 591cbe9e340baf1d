use futuretree_protocol::{PathAggregates, PathOutcome};
use serde::{Deserialize, Serialize};

use crate::{LearningError, Result};

/// Risk assigned to a path with no reported results.
const UNKNOWN_RISK: f64 = 0.5;

/// Aggregate statistics over the outcomes that carry a result.
///
/// Outcomes with `result: None` are ignored. Timeline and capital percentiles
/// use the nearest-rank method over the reported actual values; a metric with
/// no reported values has no percentiles.
pub fn compute_aggregates(outcomes: &[PathOutcome]) -> Result<PathAggregates> {
    let mut total = 0usize;
    let mut successes = 0usize;
    let mut failures = 0usize;
    let mut timelines = Vec::new();
    let mut costs = Vec::new();

    for outcome in outcomes {
        let Some(result) = outcome.result else {
            continue;
        };
        total += 1;
        if result.is_success() {
            successes += 1;
        }
        if result.is_failure() {
            failures += 1;
        }
        if let Some(months) = outcome.actual_timeline_months {
            timelines.push(finite(outcome, "actual_timeline_months", months)?);
        }
        if let Some(cost) = outcome.actual_cost {
            costs.push(finite(outcome, "actual_cost", cost)?);
        }
    }

    if total == 0 {
        return Ok(PathAggregates {
            risk_score: UNKNOWN_RISK,
            ..PathAggregates::default()
        });
    }

    timelines.sort_by(f64::total_cmp);
    costs.sort_by(f64::total_cmp);

    let total_f = total as f64;
    Ok(PathAggregates {
        success_rate: successes as f64 / total_f * 100.0,
        case_count: u32::try_from(total).unwrap_or(u32::MAX),
        timeline_p25: reported_percentile(&timelines, 25.0),
        timeline_p75: reported_percentile(&timelines, 75.0),
        capital_p25: reported_percentile(&costs, 25.0),
        capital_p75: reported_percentile(&costs, 75.0),
        risk_score: (failures as f64 / total_f).min(1.0),
    })
}

/// Nearest-rank percentile of an ascending slice; 0 for an empty slice.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0 * sorted.len() as f64).ceil() as usize;
    let idx = rank.clamp(1, sorted.len()) - 1;
    sorted[idx]
}

fn reported_percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    (!sorted.is_empty()).then(|| percentile(sorted, pct))
}

fn finite(outcome: &PathOutcome, field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LearningError::InvalidOutcome {
            outcome_id: outcome.id.clone(),
            reason: format!("{field} is not a finite number"),
        })
    }
}

/// Percent change of each aggregate between two recalculations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricChanges {
    pub success_rate: f64,
    pub case_count: f64,
    pub timeline_p25: f64,
    pub timeline_p75: f64,
    pub capital_p25: f64,
    pub capital_p75: f64,
    pub risk_score: f64,
}

impl MetricChanges {
    #[must_use]
    pub fn between(previous: &PathAggregates, updated: &PathAggregates) -> Self {
        Self {
            success_rate: percent_change(previous.success_rate, updated.success_rate),
            case_count: percent_change(
                f64::from(previous.case_count),
                f64::from(updated.case_count),
            ),
            timeline_p25: optional_change(previous.timeline_p25, updated.timeline_p25),
            timeline_p75: optional_change(previous.timeline_p75, updated.timeline_p75),
            capital_p25: optional_change(previous.capital_p25, updated.capital_p25),
            capital_p75: optional_change(previous.capital_p75, updated.capital_p75),
            risk_score: percent_change(previous.risk_score, updated.risk_score),
        }
    }
}

// Absent percentiles count as 0.
fn optional_change(previous: Option<f64>, updated: Option<f64>) -> f64 {
    percent_change(previous.unwrap_or(0.0), updated.unwrap_or(0.0))
}

/// `(new - old) / |old| * 100`; from 0 it is 100 when the value grew, else 0.
pub fn percent_change(previous: f64, updated: f64) -> f64 {
    if !previous.is_finite() || !updated.is_finite() {
        return 0.0;
    }
    if previous == 0.0 {
        return if updated > 0.0 { 100.0 } else { 0.0 };
    }
    (updated - previous) / previous.abs() * 100.0
}
