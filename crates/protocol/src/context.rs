use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Scoring query for path recommendations, immutable per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ClientContext {
    pub industry: String,

    /// Business stage key, e.g. `startup`, `growth`, `established`, `mature`
    pub stage: String,

    #[serde(default)]
    pub available_capital: f64,
    #[serde(default)]
    pub budget_flexibility: BudgetFlexibility,
    #[serde(default)]
    pub timeline_preference: TimelinePreference,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BudgetFlexibility {
    #[default]
    Fixed,
    Flexible,
    Unlimited,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimelinePreference {
    Quick,
    #[default]
    Moderate,
    Patient,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl BudgetFlexibility {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Flexible => "flexible",
            Self::Unlimited => "unlimited",
        }
    }
}

impl TimelinePreference {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Moderate => "moderate",
            Self::Patient => "patient",
        }
    }
}

impl RiskTolerance {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}
