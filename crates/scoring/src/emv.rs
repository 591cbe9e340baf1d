//! Expected monetary value of a strategic path, with what-if adjustments.
//!
//! Timeline adjustments are carried through for display only: revenue is held
//! constant regardless of how many weeks a scenario adds or removes.

use futuretree_protocol::StrategicPath;
use serde::{Deserialize, Serialize};

/// Revenue estimate as a multiple of the path's P75 capital investment.
pub const DEFAULT_REVENUE_MULTIPLIER: f64 = 3.0;

const MIN_ADJUSTED_PROBABILITY: f64 = 0.01;
const MAX_ADJUSTED_PROBABILITY: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmvInput {
    /// 0.0-1.0
    pub success_probability: f64,
    pub estimated_revenue: f64,
    pub cost: f64,
}

impl EmvInput {
    /// Seed an EMV input from a path's aggregates.
    #[must_use]
    pub fn from_path(path: &StrategicPath, revenue_multiplier: f64) -> Self {
        Self {
            success_probability: path.success_rate / 100.0,
            estimated_revenue: estimate_revenue(
                path.capital_p75.unwrap_or(0.0),
                revenue_multiplier,
                path.success_rate,
            ),
            cost: path.capital_midpoint().unwrap_or(0.0),
        }
    }

    fn sanitized(&self) -> Self {
        Self {
            success_probability: finite_or_zero(self.success_probability).clamp(0.0, 1.0),
            estimated_revenue: finite_or_zero(self.estimated_revenue).max(0.0),
            cost: finite_or_zero(self.cost).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmvResult {
    pub emv: f64,
    pub success_value: f64,
    pub failure_loss: f64,

    /// revenue / cost; 0 when cost is 0
    pub risk_reward_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatIfAdjustments {
    pub cost_delta_pct: f64,
    pub probability_delta_pts: f64,
    pub timeline_delta_weeks: f64,
}

impl WhatIfAdjustments {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.cost_delta_pct == 0.0
            && self.probability_delta_pts == 0.0
            && self.timeline_delta_weeks == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WhatIfResult {
    pub original: EmvResult,
    pub adjusted: EmvResult,
    pub adjusted_input: EmvInput,
    pub emv_change: f64,
    pub emv_change_pct: f64,
    pub timeline_delta_weeks: f64,
}

/// A named set of what-if adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub adjustments: WhatIfAdjustments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: WhatIfResult,
}

/// `emv = p * revenue - (1 - p) * cost`
#[must_use]
pub fn calculate_emv(input: &EmvInput) -> EmvResult {
    let EmvInput {
        success_probability: p,
        estimated_revenue: revenue,
        cost,
    } = input.sanitized();

    let success_value = p * revenue;
    let failure_loss = (1.0 - p) * cost;
    let risk_reward_ratio = if cost > 0.0 { revenue / cost } else { 0.0 };

    EmvResult {
        emv: success_value - failure_loss,
        success_value,
        failure_loss,
        risk_reward_ratio,
    }
}

#[must_use]
pub fn apply_what_if_adjustments(base: &EmvInput, adjustments: &WhatIfAdjustments) -> EmvInput {
    let base = base.sanitized();
    let cost_pct = finite_or_zero(adjustments.cost_delta_pct);
    let prob_pts = finite_or_zero(adjustments.probability_delta_pts);

    let cost = (base.cost * (1.0 + cost_pct / 100.0)).max(0.0);
    let success_probability = if prob_pts == 0.0 {
        base.success_probability
    } else {
        (base.success_probability + prob_pts / 100.0)
            .clamp(MIN_ADJUSTED_PROBABILITY, MAX_ADJUSTED_PROBABILITY)
    };

    EmvInput {
        success_probability,
        estimated_revenue: base.estimated_revenue,
        cost,
    }
}

#[must_use]
pub fn calculate_what_if(base: &EmvInput, adjustments: &WhatIfAdjustments) -> WhatIfResult {
    let original = calculate_emv(base);
    let adjusted_input = apply_what_if_adjustments(base, adjustments);
    let adjusted = calculate_emv(&adjusted_input);

    let emv_change = adjusted.emv - original.emv;
    let emv_change_pct = if original.emv == 0.0 {
        0.0
    } else {
        emv_change / original.emv.abs() * 100.0
    };

    WhatIfResult {
        original,
        adjusted,
        adjusted_input,
        emv_change,
        emv_change_pct,
        timeline_delta_weeks: finite_or_zero(adjustments.timeline_delta_weeks),
    }
}

/// Evaluate each scenario against the same base, best adjusted EMV first.
#[must_use]
pub fn compare_scenarios(base: &EmvInput, scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
    let mut outcomes: Vec<ScenarioOutcome> = scenarios
        .iter()
        .map(|scenario| ScenarioOutcome {
            name: scenario.name.clone(),
            result: calculate_what_if(base, &scenario.adjustments),
        })
        .collect();
    outcomes.sort_by(|a, b| b.result.adjusted.emv.total_cmp(&a.result.adjusted.emv));
    log::debug!("Compared {} EMV scenarios", outcomes.len());
    outcomes
}

/// Success probability at which EMV is exactly zero.
#[must_use]
pub fn breakeven_probability(revenue: f64, cost: f64) -> f64 {
    let revenue = finite_or_zero(revenue).max(0.0);
    let cost = finite_or_zero(cost).max(0.0);
    let total = revenue + cost;
    if total == 0.0 {
        0.0
    } else {
        cost / total
    }
}

/// EMV change per probability point.
#[must_use]
pub fn sensitivity(revenue: f64, cost: f64) -> f64 {
    (finite_or_zero(revenue).max(0.0) + finite_or_zero(cost).max(0.0)) / 100.0
}

#[must_use]
pub fn estimate_revenue(capital_p75: f64, multiplier: f64, success_rate: f64) -> f64 {
    let estimate =
        finite_or_zero(capital_p75) * finite_or_zero(multiplier) * finite_or_zero(success_rate)
            / 100.0;
    estimate.max(0.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
