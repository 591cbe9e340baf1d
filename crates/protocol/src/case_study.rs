use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Intake snapshot of the business asking for recommendations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BusinessProfile {
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_industry: Option<String>,

    /// Revenue bucket label, e.g. `"500k-1m"` or a plain amount like `"$750k"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,

    /// Team-size bucket label, e.g. `"6-10"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,

    /// Free-form `"city, region, country"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Capabilities {
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub competencies: Vec<String>,
}

impl Capabilities {
    /// All capability entries, certifications first.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.certifications
            .iter()
            .chain(&self.tools)
            .chain(&self.competencies)
            .map(String::as_str)
    }
}

/// Snapshot of a company before or after a strategy was executed.
///
/// Every field is optional: an absent bucket scores neutral and an absent
/// list behaves as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct CompanyState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CaseOutcomes {
    /// Ending revenue divided by starting revenue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_multiplier: Option<f64>,

    /// Margin change in percentage points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_change: Option<f64>,
}

impl CaseOutcomes {
    /// A case counts as a revenue success only when it reports a multiplier above 1.
    #[must_use]
    pub fn grew_revenue(&self) -> bool {
        is_revenue_growth(self.revenue_multiplier)
    }
}

/// True for a finite revenue multiplier above 1.
#[must_use]
pub fn is_revenue_growth(multiplier: Option<f64>) -> bool {
    multiplier.is_some_and(|m| m.is_finite() && m > 1.0)
}

/// Historical case study from the reference corpus. Never mutated by scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CaseStudy {
    pub id: String,
    pub company_name: String,
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub starting_state: CompanyState,
    #[serde(default)]
    pub ending_state: CompanyState,
    pub strategy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_months: Option<u32>,
    #[serde(default)]
    pub outcomes: CaseOutcomes,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sparse_case_study_uses_defaults() {
        let case: CaseStudy = serde_json::from_str(
            r#"{"id":"c1","company_name":"Acme","industry":"retail","strategy_type":"franchise"}"#,
        )
        .unwrap();

        assert_eq!(case.starting_state, CompanyState::default());
        assert_eq!(case.outcomes.revenue_multiplier, None);
        assert!(case.tags.is_empty());
        assert!(!case.outcomes.grew_revenue());
    }

    #[test]
    fn capabilities_all_chains_lists() {
        let caps = Capabilities {
            certifications: vec!["iso 9001".into()],
            tools: vec!["revit".into()],
            competencies: vec!["bim".into()],
        };
        let all: Vec<&str> = caps.all().collect();
        assert_eq!(all, vec!["iso 9001", "revit", "bim"]);
    }

    #[test]
    fn grew_revenue_ignores_non_finite() {
        let outcomes = CaseOutcomes {
            revenue_multiplier: Some(f64::NAN),
            margin_change: None,
        };
        assert!(!outcomes.grew_revenue());
    }
}
