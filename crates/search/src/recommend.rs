use crate::CaseStudyMatch;
use futuretree_protocol::is_revenue_growth;
use serde::{Deserialize, Serialize};

/// The strategy most represented among the best matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedPath {
    pub strategy_type: String,
    pub supporting_cases: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_timeline_months: Option<f64>,

    /// Percentage of supporting cases whose revenue multiplier exceeded 1
    pub success_estimate: f64,
}

struct StrategyGroup<'a> {
    key: String,
    members: Vec<&'a CaseStudyMatch>,
}

/// Vote on a strategy among the first `window` matches (already ranked).
///
/// The most frequent strategy wins; on a tie the one whose best match ranks
/// higher wins.
pub fn recommend_path(matches: &[CaseStudyMatch], window: usize) -> Option<RecommendedPath> {
    let mut groups: Vec<StrategyGroup<'_>> = Vec::new();
    for m in matches.iter().take(window) {
        let key = m.strategy_type.trim().to_lowercase();
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.members.push(m),
            None => groups.push(StrategyGroup {
                key,
                members: vec![m],
            }),
        }
    }

    let mut best: Option<&StrategyGroup<'_>> = None;
    for group in &groups {
        if best.map_or(true, |b| group.members.len() > b.members.len()) {
            best = Some(group);
        }
    }
    let best = best?;

    let timelines: Vec<f64> = best
        .members
        .iter()
        .filter_map(|m| m.timeline_months)
        .map(f64::from)
        .collect();
    let average_timeline_months = if timelines.is_empty() {
        None
    } else {
        Some(round1(timelines.iter().sum::<f64>() / timelines.len() as f64))
    };

    let grew = best
        .members
        .iter()
        .filter(|m| is_revenue_growth(m.revenue_multiplier))
        .count();
    let success_estimate = round1(grew as f64 / best.members.len() as f64 * 100.0);

    Some(RecommendedPath {
        strategy_type: best.members[0].strategy_type.clone(),
        supporting_cases: best.members.len(),
        average_timeline_months,
        success_estimate,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchScore;
    use pretty_assertions::assert_eq;

    fn m(strategy: &str, timeline: Option<u32>, multiplier: Option<f64>) -> CaseStudyMatch {
        CaseStudyMatch {
            case_study_id: String::new(),
            company_name: String::new(),
            strategy_type: strategy.to_string(),
            rank: 1,
            score: MatchScore {
                overall: 50.0,
                industry: 0.0,
                revenue_stage: 0.0,
                team_size: 0.0,
                challenge_overlap: 0.0,
                capability_overlap: 0.0,
                geography: 0.0,
            },
            explanation: Vec::new(),
            key_takeaways: Vec::new(),
            timeline_months: timeline,
            revenue_multiplier: multiplier,
        }
    }

    #[test]
    fn most_frequent_strategy_wins() {
        let matches = vec![
            m("Franchise", Some(12), Some(2.0)),
            m("ecommerce", Some(6), Some(3.0)),
            m("franchise", None, Some(0.8)),
            m("franchise", Some(18), None),
        ];
        let rec = recommend_path(&matches, 20).unwrap();
        assert_eq!(
            rec,
            RecommendedPath {
                strategy_type: "Franchise".into(),
                supporting_cases: 3,
                average_timeline_months: Some(15.0),
                success_estimate: 33.3,
            }
        );
    }

    #[test]
    fn tie_goes_to_higher_ranked_group() {
        let matches = vec![m("b", None, None), m("a", None, None)];
        assert_eq!(recommend_path(&matches, 20).unwrap().strategy_type, "b");
    }

    #[test]
    fn window_limits_voters() {
        let matches = vec![
            m("a", None, None),
            m("b", None, None),
            m("b", None, None),
        ];
        let rec = recommend_path(&matches, 1).unwrap();
        assert_eq!(rec.strategy_type, "a");
        assert_eq!(rec.average_timeline_months, None);
        assert_eq!(rec.success_estimate, 0.0);
    }
}
