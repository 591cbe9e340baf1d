use crate::comparators::{
    fuzzy_match, geography_score, jaccard, revenue_score, team_size_score, token_set,
};
use crate::explain::{explain_match, key_takeaways};
use crate::recommend::{recommend_path, RecommendedPath};
use crate::{MatchOptions, MatchingConfig, Result};
use futuretree_protocol::{BusinessProfile, CaseStudy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Share of the sub-industry fuzzy score that counts when the industries differ.
const SUB_INDUSTRY_FACTOR: f64 = 0.9;

/// Explainable similarity between a profile and one case study.
///
/// Every component is on a 0-100 scale; `overall` is their weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub overall: f64,
    pub industry: f64,
    pub revenue_stage: f64,
    pub team_size: f64,
    pub challenge_overlap: f64,
    pub capability_overlap: f64,
    pub geography: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStudyMatch {
    pub case_study_id: String,
    pub company_name: String,
    pub strategy_type: String,
    pub rank: usize,
    pub score: MatchScore,
    pub explanation: Vec<String>,
    pub key_takeaways: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_multiplier: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingResult {
    pub matches: Vec<CaseStudyMatch>,

    /// Case studies scored (after the strategy filter)
    pub candidates_considered: usize,

    /// Case studies at or above the threshold, before truncation
    pub candidates_above_threshold: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_path: Option<RecommendedPath>,
}

/// Ranks case studies against a business profile
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatcher {
    config: MatchingConfig,
}

impl SimilarityMatcher {
    pub fn new(config: MatchingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Score a single candidate without thresholding.
    pub fn score(&self, profile: &BusinessProfile, case: &CaseStudy) -> MatchScore {
        let industry = industry_score(profile, case).round();
        let revenue_stage = revenue_score(
            profile.revenue.as_deref(),
            case.starting_state.revenue.as_deref(),
            &self.config.revenue_buckets,
        )
        .round();
        let team_size = team_size_score(
            profile.team_size.as_deref(),
            case.starting_state.team_size.as_deref(),
            &self.config.team_size_buckets,
        )
        .round();
        let challenge_overlap = jaccard(
            &token_set(profile.challenges.iter().map(String::as_str)),
            &token_set(case.starting_state.challenges.iter().map(String::as_str)),
        )
        .round();
        let capability_overlap = jaccard(
            &token_set(profile.capabilities.all()),
            &token_set(case.starting_state.capabilities.iter().map(String::as_str)),
        )
        .round();
        let geography =
            geography_score(profile.location.as_deref(), case.location.as_deref()).round();

        let w = &self.config.weights;
        let weighted = industry * w.industry
            + revenue_stage * w.revenue_stage
            + team_size * w.team_size
            + challenge_overlap * w.challenge_overlap
            + capability_overlap * w.capability_overlap
            + geography * w.geography;
        let overall = ((weighted * 10.0).round() / 10.0).clamp(0.0, 100.0);

        MatchScore {
            overall,
            industry,
            revenue_stage,
            team_size,
            challenge_overlap,
            capability_overlap,
            geography,
        }
    }

    /// Rank the corpus against `profile`.
    ///
    /// Candidates below `options.threshold` are dropped, the rest sorted by
    /// overall score (corpus order breaks ties), truncated to
    /// `options.max_results` and densely ranked from 1.
    pub fn match_profile(
        &self,
        profile: &BusinessProfile,
        case_studies: &[CaseStudy],
        options: &MatchOptions,
    ) -> MatchingResult {
        let filter = options
            .strategy_filter
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let threshold = if options.threshold.is_finite() {
            options.threshold
        } else {
            0.0
        };

        let candidates: Vec<&CaseStudy> = case_studies
            .iter()
            .filter(|case| match &filter {
                Some(wanted) => case.strategy_type.trim().to_lowercase() == *wanted,
                None => true,
            })
            .collect();

        let mut scored: Vec<(&CaseStudy, MatchScore)> = candidates
            .iter()
            .map(|case| (*case, self.score(profile, case)))
            .filter(|(_, score)| score.overall >= threshold)
            .collect();
        let candidates_above_threshold = scored.len();

        scored.sort_by(|a, b| {
            b.1.overall
                .partial_cmp(&a.1.overall)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(options.max_results);

        let mut matches = Vec::with_capacity(scored.len());
        let mut rank = 0usize;
        let mut previous: Option<f64> = None;
        for (case, score) in scored {
            if previous != Some(score.overall) {
                rank += 1;
                previous = Some(score.overall);
            }
            matches.push(CaseStudyMatch {
                case_study_id: case.id.clone(),
                company_name: case.company_name.clone(),
                strategy_type: case.strategy_type.clone(),
                rank,
                explanation: explain_match(&score),
                key_takeaways: key_takeaways(case),
                score,
                timeline_months: case.timeline_months,
                revenue_multiplier: case.outcomes.revenue_multiplier,
            });
        }

        log::debug!(
            "Matched profile '{}': {} candidates, {} above threshold {:.1}, {} returned",
            profile.industry,
            candidates.len(),
            candidates_above_threshold,
            threshold,
            matches.len()
        );

        let recommended_path = recommend_path(&matches, self.config.recommendation_window);

        MatchingResult {
            matches,
            candidates_considered: candidates.len(),
            candidates_above_threshold,
            recommended_path,
        }
    }
}

fn industry_score(profile: &BusinessProfile, case: &CaseStudy) -> f64 {
    let industry = fuzzy_match(&profile.industry, &case.industry);
    if industry >= 100.0 {
        return 100.0;
    }

    let sub_industry = match (&profile.sub_industry, &case.sub_industry) {
        (Some(a), Some(b)) => fuzzy_match(a, b) * SUB_INDUSTRY_FACTOR,
        _ => 0.0,
    };
    industry.max(sub_industry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futuretree_protocol::{Capabilities, CaseOutcomes, CompanyState};
    use pretty_assertions::assert_eq;

    fn case(id: &str, industry: &str, strategy: &str) -> CaseStudy {
        CaseStudy {
            id: id.to_string(),
            company_name: format!("{id} Inc"),
            industry: industry.to_string(),
            strategy_type: strategy.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn exact_industry_overrides_sub_industry() {
        let matcher = SimilarityMatcher::default();
        let profile = BusinessProfile {
            industry: "Technology".into(),
            sub_industry: Some("fintech".into()),
            ..Default::default()
        };
        let mut candidate = case("c1", "technology", "saas");
        candidate.sub_industry = Some("agriculture".into());

        assert_eq!(matcher.score(&profile, &candidate).industry, 100.0);
    }

    #[test]
    fn sub_industry_counts_at_ninety_percent() {
        let matcher = SimilarityMatcher::default();
        let profile = BusinessProfile {
            industry: "professional services".into(),
            sub_industry: Some("architecture".into()),
            ..Default::default()
        };
        let mut candidate = case("c1", "construction", "niche");
        candidate.sub_industry = Some("Architecture".into());

        assert_eq!(matcher.score(&profile, &candidate).industry, 90.0);
    }

    #[test]
    fn technology_scenario_meets_weighted_floor() {
        let matcher = SimilarityMatcher::default();
        let profile = BusinessProfile {
            industry: "technology".into(),
            revenue: Some("1m-5m".into()),
            ..Default::default()
        };
        let mut candidate = case("c1", "technology", "saas");
        candidate.starting_state = CompanyState {
            revenue: Some("1m-5m".into()),
            ..Default::default()
        };

        let score = matcher.score(&profile, &candidate);
        assert_eq!(score.industry, 100.0);
        assert_eq!(score.revenue_stage, 100.0);
        assert!(score.overall >= 100.0 * 0.30 + 100.0 * 0.20);
        // neutral team size and geography, empty overlaps
        assert_eq!(score.overall, 57.5);
    }

    #[test]
    fn threshold_sort_truncate_and_dense_rank() {
        let matcher = SimilarityMatcher::default();
        let profile = BusinessProfile {
            industry: "retail".into(),
            location: Some("Austin, TX, USA".into()),
            ..Default::default()
        };
        let mut near = case("near", "retail", "franchise");
        near.location = Some("Austin, TX, USA".into());
        let far = case("far", "mining", "acquisition");
        let twin_a = case("twin-a", "retail", "franchise");
        let twin_b = case("twin-b", "retail", "ecommerce");

        let corpus = vec![far, twin_a, near, twin_b];
        let result = matcher.match_profile(&profile, &corpus, &MatchOptions::default());

        let ids: Vec<&str> = result
            .matches
            .iter()
            .map(|m| m.case_study_id.as_str())
            .collect();
        assert_eq!(ids, vec!["near", "twin-a", "twin-b"]);
        let ranks: Vec<usize> = result.matches.iter().map(|m| m.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2]);
        assert_eq!(result.candidates_considered, 4);
        assert_eq!(result.candidates_above_threshold, 3);

        let limited = matcher.match_profile(
            &profile,
            &corpus,
            &MatchOptions {
                max_results: 1,
                ..Default::default()
            },
        );
        assert_eq!(limited.matches.len(), 1);
        assert_eq!(limited.candidates_above_threshold, 3);
    }

    #[test]
    fn strategy_filter_is_case_insensitive() {
        let matcher = SimilarityMatcher::default();
        let profile = BusinessProfile {
            industry: "retail".into(),
            ..Default::default()
        };
        let corpus = vec![
            case("a", "retail", "Franchise"),
            case("b", "retail", "ecommerce"),
        ];
        let result = matcher.match_profile(
            &profile,
            &corpus,
            &MatchOptions {
                strategy_filter: Some(" franchise ".into()),
                ..Default::default()
            },
        );
        assert_eq!(result.candidates_considered, 1);
        assert_eq!(result.matches[0].case_study_id, "a");
    }

    #[test]
    fn capabilities_and_challenges_overlap() {
        let matcher = SimilarityMatcher::default();
        let profile = BusinessProfile {
            industry: "architecture".into(),
            challenges: vec!["cash flow".into()],
            capabilities: Capabilities {
                tools: vec!["Revit".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let mut candidate = case("c1", "architecture", "niche");
        candidate.starting_state.challenges = vec!["Cash Flow".into()];
        candidate.starting_state.capabilities = vec!["revit".into(), "bim".into()];
        candidate.outcomes = CaseOutcomes {
            revenue_multiplier: Some(2.0),
            margin_change: None,
        };

        let score = matcher.score(&profile, &candidate);
        assert_eq!(score.challenge_overlap, 100.0);
        assert_eq!(score.capability_overlap, 50.0);
    }

    #[test]
    fn empty_corpus_has_no_recommendation() {
        let matcher = SimilarityMatcher::default();
        let result = matcher.match_profile(
            &BusinessProfile::default(),
            &[],
            &MatchOptions::default(),
        );
        assert!(result.matches.is_empty());
        assert!(result.recommended_path.is_none());
    }
}
