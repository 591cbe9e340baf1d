//! # FutureTree Learning
//!
//! Recalculates strategic path statistics from reported outcomes.
//!
//! ```text
//! PathOutcome[] (reported results)
//!     │
//!     ├──> check_recalculation_needed (new outcomes >= threshold)
//!     │
//!     └──> MetricRecalculator::recalculate
//!            ├─> PathGuards (one in-flight job per path)
//!            ├─> RecalculationJob: Idle -> Processing -> Completed | Failed
//!            ├─> compute_aggregates (success rate, P25/P75, risk)
//!            └─> LearningStore::write_aggregates (CAS on model_version)
//! ```
//!
//! Persistence sits behind the async [`LearningStore`] trait;
//! [`InMemoryStore`] backs tests and the CLI.

mod aggregate;
mod config;
mod error;
mod guard;
mod job;
mod recalculator;
mod store;

pub use aggregate::{compute_aggregates, percent_change, percentile, MetricChanges};
pub use config::LearningConfig;
pub use error::{LearningError, Result};
pub use guard::{PathGuard, PathGuards};
pub use job::{JobState, RecalculationJob, RecalculationTrigger, WATCHDOG_REASON};
pub use recalculator::{
    BatchOptions, BatchRecalculationResult, MetricRecalculator, PathRecalculation,
    RecalculationResult,
};
pub use store::{InMemoryStore, LearningStore};
