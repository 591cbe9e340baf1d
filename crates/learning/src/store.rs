use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futuretree_protocol::{PathAggregates, PathOutcome, StrategicPath};
use tokio::sync::RwLock;

use crate::job::RecalculationJob;
use crate::{LearningError, Result};

/// Persistence used by the recalculator.
///
/// Implementations must make `write_aggregates` a compare-and-swap on the
/// path's `model_version` and must refuse a second processing job for the
/// same path in `insert_job`.
#[async_trait]
pub trait LearningStore: Send + Sync {
    // ── Paths ──

    async fn get_path(&self, path_id: &str) -> Result<Option<StrategicPath>>;
    async fn list_paths(&self) -> Result<Vec<StrategicPath>>;

    /// Overwrite the aggregates if the stored model version still equals
    /// `expected_version`. Returns the updated path.
    async fn write_aggregates(
        &self,
        path_id: &str,
        expected_version: u32,
        aggregates: &PathAggregates,
        now: DateTime<Utc>,
    ) -> Result<StrategicPath>;

    // ── Outcomes ──

    async fn outcomes_for_path(&self, path_id: &str) -> Result<Vec<PathOutcome>>;

    // ── Jobs ──

    async fn insert_job(&self, job: &RecalculationJob) -> Result<()>;
    async fn update_job(&self, job: &RecalculationJob) -> Result<()>;
    async fn last_completed_job(&self, path_id: &str) -> Result<Option<RecalculationJob>>;
    async fn processing_jobs(&self) -> Result<Vec<RecalculationJob>>;
}

/// Store kept entirely in memory; paths keep their insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    paths: RwLock<Vec<StrategicPath>>,
    outcomes: RwLock<Vec<PathOutcome>>,
    jobs: RwLock<Vec<RecalculationJob>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(paths: Vec<StrategicPath>, outcomes: Vec<PathOutcome>) -> Self {
        Self {
            paths: RwLock::new(paths),
            outcomes: RwLock::new(outcomes),
            jobs: RwLock::new(Vec::new()),
        }
    }

    pub async fn add_outcome(&self, outcome: PathOutcome) {
        self.outcomes.write().await.push(outcome);
    }

    pub async fn jobs(&self) -> Vec<RecalculationJob> {
        self.jobs.read().await.clone()
    }
}

#[async_trait]
impl LearningStore for InMemoryStore {
    async fn get_path(&self, path_id: &str) -> Result<Option<StrategicPath>> {
        let paths = self.paths.read().await;
        Ok(paths.iter().find(|p| p.id == path_id).cloned())
    }

    async fn list_paths(&self) -> Result<Vec<StrategicPath>> {
        Ok(self.paths.read().await.clone())
    }

    async fn write_aggregates(
        &self,
        path_id: &str,
        expected_version: u32,
        aggregates: &PathAggregates,
        now: DateTime<Utc>,
    ) -> Result<StrategicPath> {
        let mut paths = self.paths.write().await;
        let path = paths
            .iter_mut()
            .find(|p| p.id == path_id)
            .ok_or_else(|| LearningError::PathNotFound(path_id.to_string()))?;
        if path.model_version != expected_version {
            return Err(LearningError::StaleWrite {
                path_id: path_id.to_string(),
                expected: expected_version,
                actual: path.model_version,
            });
        }
        let mut candidate = path.clone();
        candidate.apply_aggregates(aggregates, now);
        candidate
            .validate()
            .map_err(|err| LearningError::InvalidPath {
                path_id: path_id.to_string(),
                reason: err.to_string(),
            })?;
        *path = candidate.clone();
        Ok(candidate)
    }

    async fn outcomes_for_path(&self, path_id: &str) -> Result<Vec<PathOutcome>> {
        let outcomes = self.outcomes.read().await;
        Ok(outcomes
            .iter()
            .filter(|o| o.path_id == path_id)
            .cloned()
            .collect())
    }

    async fn insert_job(&self, job: &RecalculationJob) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if job.is_processing()
            && jobs
                .iter()
                .any(|j| j.path_id == job.path_id && j.is_processing())
        {
            return Err(LearningError::AlreadyProcessing(job.path_id.clone()));
        }
        jobs.push(job.clone());
        Ok(())
    }

    async fn update_job(&self, job: &RecalculationJob) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let slot = jobs
            .iter_mut()
            .find(|j| j.id == job.id)
            .ok_or(LearningError::JobNotFound(job.id))?;
        *slot = job.clone();
        Ok(())
    }

    async fn last_completed_job(&self, path_id: &str) -> Result<Option<RecalculationJob>> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .iter()
            .filter(|j| j.path_id == path_id)
            .filter_map(|j| j.completed_at().map(|at| (at, j)))
            .max_by_key(|(at, _)| *at)
            .map(|(_, j)| j.clone()))
    }

    async fn processing_jobs(&self) -> Result<Vec<RecalculationJob>> {
        let jobs = self.jobs.read().await;
        Ok(jobs.iter().filter(|j| j.is_processing()).cloned().collect())
    }
}
