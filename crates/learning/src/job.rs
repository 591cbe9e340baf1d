use chrono::{DateTime, Utc};
use futuretree_protocol::PathAggregates;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::MetricChanges;
use crate::{LearningError, Result};

/// Error text recorded on jobs reclaimed by the watchdog.
pub const WATCHDOG_REASON: &str = "timeout: reclaimed by watchdog";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecalculationTrigger {
    /// Enough new outcomes arrived since the last run
    Threshold,
    #[default]
    Manual,
    Scheduled,
}

/// Lifecycle of one recalculation job.
///
/// ```text
/// Idle ──start──> Processing ──complete──> Completed
///                     │
///                     └────────fail──────> Failed
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Processing {
        started_at: DateTime<Utc>,
    },
    Completed {
        completed_at: DateTime<Utc>,
        changes: MetricChanges,
    },
    Failed {
        failed_at: DateTime<Utc>,
        error: String,
    },
}

impl JobState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing { .. } => "processing",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculationJob {
    pub id: Uuid,
    pub path_id: String,
    pub trigger: RecalculationTrigger,
    pub outcomes_considered: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<PathAggregates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<PathAggregates>,

    /// Path model version written by this job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<u32>,
    pub state: JobState,
}

impl RecalculationJob {
    #[must_use]
    pub fn new(path_id: impl Into<String>, trigger: RecalculationTrigger) -> Self {
        Self {
            id: Uuid::new_v4(),
            path_id: path_id.into(),
            trigger,
            outcomes_considered: 0,
            previous: None,
            updated: None,
            model_version: None,
            state: JobState::Idle,
        }
    }

    pub fn start(&mut self, previous: PathAggregates, now: DateTime<Utc>) -> Result<()> {
        match self.state {
            JobState::Idle => {
                self.previous = Some(previous);
                self.state = JobState::Processing { started_at: now };
                Ok(())
            }
            _ => Err(self.invalid("processing")),
        }
    }

    pub fn complete(
        &mut self,
        updated: PathAggregates,
        outcomes_considered: usize,
        model_version: u32,
        now: DateTime<Utc>,
    ) -> Result<MetricChanges> {
        if !matches!(self.state, JobState::Processing { .. }) {
            return Err(self.invalid("completed"));
        }
        let previous = self.previous.unwrap_or_default();
        let changes = MetricChanges::between(&previous, &updated);
        self.updated = Some(updated);
        self.outcomes_considered = outcomes_considered;
        self.model_version = Some(model_version);
        self.state = JobState::Completed {
            completed_at: now,
            changes,
        };
        Ok(changes)
    }

    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) -> Result<()> {
        match self.state {
            JobState::Processing { .. } => {
                self.state = JobState::Failed {
                    failed_at: now,
                    error: error.into(),
                };
                Ok(())
            }
            _ => Err(self.invalid("failed")),
        }
    }

    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self.state, JobState::Processing { .. })
    }

    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            JobState::Processing { started_at } => Some(started_at),
            _ => None,
        }
    }

    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            JobState::Completed { completed_at, .. } => Some(completed_at),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            JobState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    fn invalid(&self, to: &'static str) -> LearningError {
        LearningError::InvalidTransition {
            from: self.state.name(),
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn happy_path_transitions() {
        let now = Utc::now();
        let mut job = RecalculationJob::new("p", RecalculationTrigger::Manual);
        assert_eq!(job.state, JobState::Idle);

        job.start(PathAggregates::default(), now).unwrap();
        assert!(job.is_processing());
        assert_eq!(job.started_at(), Some(now));

        let updated = PathAggregates {
            success_rate: 60.0,
            case_count: 5,
            ..Default::default()
        };
        let changes = job.complete(updated, 5, 2, now).unwrap();
        assert_eq!(changes.success_rate, 100.0);
        assert_eq!(job.completed_at(), Some(now));
        assert_eq!(job.model_version, Some(2));
        assert!(!job.is_processing());
    }

    #[test]
    fn rejects_invalid_transitions() {
        let now = Utc::now();
        let mut job = RecalculationJob::new("p", RecalculationTrigger::Threshold);
        assert_eq!(
            job.complete(PathAggregates::default(), 0, 1, now).unwrap_err(),
            LearningError::InvalidTransition {
                from: "idle",
                to: "completed"
            }
        );
        assert!(job.fail("boom", now).is_err());

        job.start(PathAggregates::default(), now).unwrap();
        assert!(job.start(PathAggregates::default(), now).is_err());
        job.fail("boom", now).unwrap();
        assert_eq!(job.error(), Some("boom"));
        assert!(job.fail("again", now).is_err());
    }

    #[test]
    fn state_serializes_with_status_tag() {
        let json = serde_json::to_value(JobState::Idle).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "idle" }));
    }
}
