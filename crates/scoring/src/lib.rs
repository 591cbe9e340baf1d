//! # FutureTree Scoring
//!
//! Context-to-path ranking and expected-value simulation.
//!
//! ```text
//! ClientContext + StrategicPath[]
//!     │
//!     ├──> ScoringProfile (affinity tables, weights, ranges)
//!     │
//!     ├──> PathScorer
//!     │      ├─> industry / capital / timeline / stage alignment
//!     │      ├─> success rate × alignment × risk adjustment
//!     │      └─> ranked PathScore[] with reasons and warnings
//!     │
//!     └──> EMV simulator (what-if deltas, scenario comparison)
//! ```

mod emv;
mod error;
mod path_scorer;
mod profile;

pub use emv::{
    apply_what_if_adjustments, breakeven_probability, calculate_emv, calculate_what_if,
    compare_scenarios, estimate_revenue, sensitivity, EmvInput, EmvResult, Scenario,
    ScenarioOutcome, WhatIfAdjustments, WhatIfResult, DEFAULT_REVENUE_MULTIPLIER,
};
pub use error::{Result, ScoringError};
pub use path_scorer::{
    assign_ranks, capital_fit, timeline_match, AlignmentComponents, PathScore, PathScorer,
};
pub use profile::{
    AlignmentWeights, FlexibilityMultipliers, MonthRange, ScoringProfile, TimelineRanges,
    ToleranceFactors,
};
