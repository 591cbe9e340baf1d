use futuretree_protocol::{ClientContext, StrategicPath};
use serde::{Deserialize, Serialize};

use crate::profile::{MonthRange, ScoringProfile};
use crate::{Result, ScoringError};

/// Neutral component value when the path carries no data for it.
const NEUTRAL_FIT: f64 = 0.7;

/// Months of midpoint distance at which a non-overlapping timeline bottoms out.
const TIMELINE_DECAY_MONTHS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentComponents {
    pub industry: f64,
    pub capital_fit: f64,
    pub timeline_match: f64,
    pub stage_alignment: f64,
}

/// Explainable fit of one strategic path for one client context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathScore {
    pub path_id: String,
    pub slug: String,
    pub name: String,

    /// 1-based position after ranking; 0 for a path scored on its own
    pub rank: usize,

    /// 0-100
    pub overall_score: u32,
    pub context_alignment: f64,
    pub raw_score: f64,
    pub risk_adjustment: f64,
    pub components: AlignmentComponents,
    pub fit_reasons: Vec<String>,
    pub warnings: Vec<String>,
}

/// Ranks predefined strategic paths against a client context
#[derive(Debug, Clone)]
pub struct PathScorer {
    profile: ScoringProfile,
}

impl PathScorer {
    pub fn new(profile: ScoringProfile) -> Result<Self> {
        profile.validate()?;
        Ok(Self { profile })
    }

    #[must_use]
    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    pub fn score(&self, path: &StrategicPath, context: &ClientContext) -> PathScore {
        let profile = &self.profile;
        let components = AlignmentComponents {
            industry: clamp_unit(profile.industry_affinity(&path.slug, &context.industry)),
            capital_fit: capital_fit(
                path,
                context.available_capital,
                profile
                    .flexibility()
                    .for_flexibility(context.budget_flexibility),
            ),
            timeline_match: timeline_match(
                path,
                profile
                    .timeline_ranges()
                    .for_preference(context.timeline_preference),
            ),
            stage_alignment: clamp_unit(profile.stage_affinity(&path.slug, &context.stage)),
        };

        let w = profile.weights();
        let context_alignment = clamp_unit(
            components.industry * w.industry
                + components.capital_fit * w.capital_fit
                + components.timeline_match * w.timeline_match
                + components.stage_alignment * w.stage_alignment,
        );

        let success = clamp_unit(path.success_rate / 100.0);
        let raw_score = success * context_alignment;

        let risk = clamp_unit(path.risk_score);
        let tolerance = profile.tolerance().for_tolerance(context.risk_tolerance);
        let risk_adjustment = (1.0 - risk * (1.0 - tolerance)).max(0.0);

        let overall_score = (raw_score * risk_adjustment * 100.0).round().clamp(0.0, 100.0) as u32;

        let (fit_reasons, warnings) = explain(&components, risk_adjustment, context);

        log::debug!(
            "Scored path '{}' for {}/{} ({} budget, {} timeline, {} risk): \
             alignment={:.3} raw={:.3} risk_adj={:.3} overall={}",
            path.slug,
            context.industry,
            context.stage,
            context.budget_flexibility.as_str(),
            context.timeline_preference.as_str(),
            context.risk_tolerance.as_str(),
            context_alignment,
            raw_score,
            risk_adjustment,
            overall_score
        );

        PathScore {
            path_id: path.id.clone(),
            slug: path.slug.clone(),
            name: path.name.clone(),
            rank: 0,
            overall_score,
            context_alignment,
            raw_score,
            risk_adjustment,
            components,
            fit_reasons,
            warnings,
        }
    }

    /// Score every active path and rank the results, best first.
    pub fn rank(&self, paths: &[StrategicPath], context: &ClientContext) -> Vec<PathScore> {
        let scores = paths
            .iter()
            .filter(|path| path.is_active)
            .map(|path| self.score(path, context))
            .collect();
        assign_ranks(scores)
    }

    /// Score a path looked up by id; an unknown id is an error, not a neutral score.
    pub fn score_by_id(
        &self,
        paths: &[StrategicPath],
        path_id: &str,
        context: &ClientContext,
    ) -> Result<PathScore> {
        let path = paths
            .iter()
            .find(|path| path.id == path_id)
            .ok_or_else(|| ScoringError::PathNotFound(path_id.to_string()))?;
        Ok(self.score(path, context))
    }
}

/// Sort by overall score descending (input order breaks ties) and number 1..N.
pub fn assign_ranks(mut scores: Vec<PathScore>) -> Vec<PathScore> {
    scores.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
    for (idx, score) in scores.iter_mut().enumerate() {
        score.rank = idx + 1;
    }
    scores
}

/// How well the client's capital fits the path's P25-P75 investment range.
pub fn capital_fit(path: &StrategicPath, available_capital: f64, multiplier: f64) -> f64 {
    let (Some(a), Some(b)) = (path.capital_p25, path.capital_p75) else {
        return NEUTRAL_FIT;
    };
    if !a.is_finite() || !b.is_finite() {
        return NEUTRAL_FIT;
    }
    let (p25, p75) = (a.min(b), a.max(b));

    let capital = if available_capital.is_finite() {
        available_capital.max(0.0)
    } else {
        0.0
    };
    let multiplier = if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    };
    let effective = capital * multiplier;

    if effective >= p25 && effective <= p75 {
        1.0
    } else if effective > p75 {
        if effective <= p75 * 1.5 {
            0.9
        } else {
            0.8
        }
    } else if p25 <= 0.0 {
        NEUTRAL_FIT
    } else {
        let shortfall = (p25 - effective) / p25;
        (1.0 - shortfall).max(0.2)
    }
}

/// How well the path's P25-P75 timeline fits the preferred month range.
pub fn timeline_match(path: &StrategicPath, preferred: MonthRange) -> f64 {
    let (Some(a), Some(b)) = (path.timeline_p25, path.timeline_p75) else {
        return NEUTRAL_FIT;
    };
    if !a.is_finite() || !b.is_finite() {
        return NEUTRAL_FIT;
    }
    let (low, high) = (a.min(b), a.max(b));

    let intersects = low <= preferred.max_months && high >= preferred.min_months;
    if intersects {
        let overlap = high.min(preferred.max_months) - low.max(preferred.min_months);
        let range_len = preferred.len();
        let ratio = if range_len <= 0.0 {
            1.0
        } else {
            clamp_unit(overlap / range_len)
        };
        return 0.7 + 0.3 * ratio;
    }

    let distance = ((low + high) / 2.0 - preferred.midpoint()).abs();
    (NEUTRAL_FIT - 0.4 * distance / TIMELINE_DECAY_MONTHS).max(0.3)
}

fn explain(
    components: &AlignmentComponents,
    risk_adjustment: f64,
    context: &ClientContext,
) -> (Vec<String>, Vec<String>) {
    let mut reasons = Vec::new();
    let mut warnings = Vec::new();

    if components.industry >= 0.8 {
        reasons.push(format!("Strong track record in {}", context.industry));
    } else if components.industry < 0.5 {
        warnings.push(format!("Limited precedent in {}", context.industry));
    }

    if components.capital_fit >= 0.9 {
        reasons.push("Capital fits the typical investment range".to_string());
    } else if components.capital_fit < 0.5 {
        warnings.push("Capital may be insufficient for this path".to_string());
    }

    if components.timeline_match >= 0.85 {
        reasons.push("Typical timeline matches your preference".to_string());
    } else if components.timeline_match < 0.5 {
        warnings.push("Typical timeline differs from your preference".to_string());
    }

    if components.stage_alignment >= 0.8 {
        reasons.push(format!("Well suited to {} businesses", context.stage));
    } else if components.stage_alignment < 0.5 {
        warnings.push(format!("Less common at the {} stage", context.stage));
    }

    if risk_adjustment < 0.7 {
        warnings.push("Risk exceeds your stated tolerance".to_string());
    }

    (reasons, warnings)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
