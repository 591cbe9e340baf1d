use std::time::Duration;

use crate::{LearningError, Result};

/// Tuning knobs for the recalculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningConfig {
    /// New outcomes needed before a path is recalculated automatically
    pub outcome_threshold: usize,

    /// Upper bound on one compute-and-write step
    pub recalculation_timeout: Duration,

    /// Age after which the watchdog fails a job still marked processing
    pub stale_job_after: Duration,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            outcome_threshold: 5,
            recalculation_timeout: Duration::from_secs(30),
            stale_job_after: Duration::from_secs(15 * 60),
        }
    }
}

impl LearningConfig {
    pub fn validate(&self) -> Result<()> {
        if self.outcome_threshold == 0 {
            return Err(LearningError::InvalidConfig(
                "outcome_threshold must be at least 1".to_string(),
            ));
        }
        if self.recalculation_timeout.is_zero() {
            return Err(LearningError::InvalidConfig(
                "recalculation_timeout must be positive".to_string(),
            ));
        }
        if self.stale_job_after < self.recalculation_timeout {
            return Err(LearningError::InvalidConfig(
                "stale_job_after must not be shorter than recalculation_timeout".to_string(),
            ));
        }
        Ok(())
    }
}
