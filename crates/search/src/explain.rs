use crate::MatchScore;
use futuretree_protocol::CaseStudy;

/// Human-readable reasons a case study matched, derived from sub-score thresholds.
pub fn explain_match(score: &MatchScore) -> Vec<String> {
    let mut reasons = Vec::new();

    if score.industry >= 80.0 {
        reasons.push("Same industry".to_string());
    } else if score.industry >= 50.0 {
        reasons.push("Related industry".to_string());
    }
    if score.revenue_stage >= 80.0 {
        reasons.push("Similar revenue stage".to_string());
    }
    if score.team_size >= 80.0 {
        reasons.push("Similar team size".to_string());
    }
    if score.challenge_overlap >= 30.0 {
        reasons.push("Faced similar challenges".to_string());
    }
    if score.capability_overlap >= 30.0 {
        reasons.push("Comparable capabilities".to_string());
    }
    if score.geography >= 70.0 {
        reasons.push("Same region".to_string());
    }

    reasons
}

/// Short lessons drawn from a case study's reported outcomes.
pub fn key_takeaways(case: &CaseStudy) -> Vec<String> {
    let mut takeaways = Vec::new();
    let outcomes = &case.outcomes;

    if let Some(multiplier) = outcomes.revenue_multiplier.filter(|_| outcomes.grew_revenue()) {
        let mut line = format!("Grew revenue {multiplier:.1}x using {}", case.strategy_type);
        if let Some(months) = case.timeline_months {
            line.push_str(&format!(" in {months} months"));
        }
        takeaways.push(line);
    }

    match outcomes.margin_change.filter(|m| m.is_finite()) {
        Some(change) if change > 0.0 => {
            takeaways.push(format!("Improved margins by {change:.1} points"));
        }
        Some(change) if change < 0.0 => {
            takeaways.push(format!("Margins declined by {:.1} points", change.abs()));
        }
        _ => {}
    }

    if case.timeline_months.is_some_and(|months| months <= 12) {
        takeaways.push("Reached outcome within a year".to_string());
    }

    takeaways
}
