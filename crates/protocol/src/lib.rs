//! Shared records exchanged between the FutureTree engines and their callers.
//!
//! Everything here is plain data: intake snapshots ([`BusinessProfile`],
//! [`ClientContext`]), the reference corpus ([`CaseStudy`]), path statistics
//! ([`StrategicPath`]) and reported results ([`PathOutcome`]). Persistence and
//! transport live outside the core.

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

mod case_study;
mod context;
mod outcome;
mod path;

pub use case_study::{
    is_revenue_growth, BusinessProfile, Capabilities, CaseOutcomes, CaseStudy, CompanyState,
};
pub use context::{BudgetFlexibility, ClientContext, RiskTolerance, TimelinePreference};
pub use outcome::{OutcomeResult, PathOutcome};
pub use path::{ConfidenceLevel, PathAggregates, PathInvariantError, StrategicPath};

pub const RECORDS_SCHEMA_VERSION: u32 = 1;

pub fn serialize_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let raw = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(raw)
}

/// Record files the engines read, by the name used on the command line.
pub const RECORD_KINDS: &[&str] = &[
    "business-profile",
    "case-study",
    "client-context",
    "strategic-path",
    "path-outcome",
];

/// JSON Schema of one record kind, tagged with [`RECORDS_SCHEMA_VERSION`].
pub fn record_schema(kind: &str) -> Result<serde_json::Value> {
    let schema = match kind {
        "business-profile" => schemars::schema_for!(BusinessProfile),
        "case-study" => schemars::schema_for!(CaseStudy),
        "client-context" => schemars::schema_for!(ClientContext),
        "strategic-path" => schemars::schema_for!(StrategicPath),
        "path-outcome" => schemars::schema_for!(PathOutcome),
        other => {
            return Err(anyhow!(
                "Unknown record kind '{other}' (expected one of: {})",
                RECORD_KINDS.join(", ")
            ))
        }
    };
    let mut value = serde_json::to_value(schema)?;
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "x-records-schema-version".to_string(),
            RECORDS_SCHEMA_VERSION.into(),
        );
    }
    Ok(value)
}

/// Parse a JSON document that holds either a single record or an array of them.
pub fn parse_records<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Into::into))
            .collect(),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}
