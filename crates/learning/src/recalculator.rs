use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futuretree_protocol::{PathAggregates, StrategicPath};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::aggregate::{compute_aggregates, MetricChanges};
use crate::config::LearningConfig;
use crate::guard::PathGuards;
use crate::job::{RecalculationJob, RecalculationTrigger, WATCHDOG_REASON};
use crate::store::LearningStore;
use crate::{LearningError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculationResult {
    pub path_id: String,
    pub job_id: Uuid,
    pub outcomes_considered: usize,
    pub previous: PathAggregates,
    pub updated: PathAggregates,
    pub changes: MetricChanges,
    pub model_version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchOptions {
    pub trigger: RecalculationTrigger,

    /// Recalculate even paths under the outcome threshold
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecalculation {
    pub path_id: String,
    pub recalculated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RecalculationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchRecalculationResult {
    pub paths: Vec<PathRecalculation>,
    pub recalculated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Folds reported outcomes back into strategic path statistics.
#[derive(Clone)]
pub struct MetricRecalculator {
    store: Arc<dyn LearningStore>,
    config: LearningConfig,
    guards: PathGuards,
}

impl MetricRecalculator {
    pub fn new(store: Arc<dyn LearningStore>, config: LearningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            guards: PathGuards::new(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &LearningConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn LearningStore> {
        &self.store
    }

    /// True when enough outcomes arrived since the last completed job.
    pub async fn check_recalculation_needed(&self, path_id: &str) -> Result<bool> {
        self.require_path(path_id).await?;
        let since = self
            .store
            .last_completed_job(path_id)
            .await?
            .and_then(|job| job.completed_at());
        let outcomes = self.store.outcomes_for_path(path_id).await?;
        let fresh = outcomes
            .iter()
            .filter(|o| since.map_or(true, |at| o.reported_at > at))
            .count();

        log::debug!(
            "Path {path_id}: {fresh} new outcomes (threshold {})",
            self.config.outcome_threshold
        );
        Ok(fresh >= self.config.outcome_threshold)
    }

    pub async fn recalculate(
        &self,
        path_id: &str,
        trigger: RecalculationTrigger,
    ) -> Result<RecalculationResult> {
        let _guard = self
            .guards
            .try_acquire(path_id)
            .ok_or_else(|| LearningError::AlreadyProcessing(path_id.to_string()))?;
        // Read under the guard so the expected version is the one we will swap.
        let path = self.require_path(path_id).await?;

        let mut job = RecalculationJob::new(path_id, trigger);
        job.start(path.aggregates(), Utc::now())?;
        self.store.insert_job(&job).await?;

        let step = tokio::time::timeout(
            self.config.recalculation_timeout,
            self.compute_and_write(&path),
        )
        .await
        .unwrap_or(Err(LearningError::Timeout));

        let (updated_path, aggregates, considered) = match step {
            Ok(done) => done,
            Err(err) => return Err(self.fail_job(job, err).await),
        };

        let changes = job.complete(aggregates, considered, updated_path.model_version, Utc::now())?;
        // The path write already committed; a lost job update must not fail the run.
        if let Err(err) = self.store.update_job(&job).await {
            log::warn!(
                "Path {path_id} updated to model v{} but job {} was not recorded: {err}",
                updated_path.model_version,
                job.id
            );
        }

        log::info!(
            "Recalculated path {path_id} from {considered} outcomes (model v{}, success {:.1}%)",
            updated_path.model_version,
            aggregates.success_rate
        );

        Ok(RecalculationResult {
            path_id: path_id.to_string(),
            job_id: job.id,
            outcomes_considered: considered,
            previous: path.aggregates(),
            updated: aggregates,
            changes,
            model_version: updated_path.model_version,
        })
    }

    /// Recalculate every active path that needs it, in parallel.
    pub async fn recalculate_all(&self, options: &BatchOptions) -> Result<BatchRecalculationResult> {
        let paths: Vec<StrategicPath> = self
            .store
            .list_paths()
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .collect();

        let mut entries: HashMap<String, PathRecalculation> = HashMap::new();
        let mut pending: HashSet<String> = HashSet::new();
        let mut tasks = JoinSet::new();

        for path in &paths {
            if !options.force {
                match self.check_recalculation_needed(&path.id).await {
                    Ok(true) => {}
                    Ok(false) => {
                        entries.insert(path.id.clone(), skipped(&path.id, None));
                        continue;
                    }
                    Err(err) => {
                        entries.insert(path.id.clone(), skipped(&path.id, Some(err.to_string())));
                        continue;
                    }
                }
            }
            if !pending.insert(path.id.clone()) {
                continue;
            }
            let this = self.clone();
            let path_id = path.id.clone();
            let trigger = options.trigger;
            tasks.spawn(async move {
                let outcome = this.recalculate(&path_id, trigger).await;
                (path_id, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((path_id, outcome)) => {
                    pending.remove(&path_id);
                    let entry = match outcome {
                        Ok(result) => PathRecalculation {
                            path_id: path_id.clone(),
                            recalculated: true,
                            result: Some(result),
                            error: None,
                        },
                        Err(err) => skipped(&path_id, Some(err.to_string())),
                    };
                    entries.insert(path_id, entry);
                }
                Err(err) => log::warn!("Recalculation task did not finish: {err}"),
            }
        }
        for path_id in pending {
            let entry = skipped(&path_id, Some("recalculation task aborted".to_string()));
            entries.insert(path_id, entry);
        }

        let mut batch = BatchRecalculationResult::default();
        for path in &paths {
            let Some(entry) = entries.remove(&path.id) else {
                continue;
            };
            if entry.recalculated {
                batch.recalculated += 1;
            } else if entry.error.is_some() {
                batch.failed += 1;
            } else {
                batch.skipped += 1;
            }
            batch.paths.push(entry);
        }

        log::info!(
            "Batch recalculation: {} recalculated, {} skipped, {} failed",
            batch.recalculated,
            batch.skipped,
            batch.failed
        );
        Ok(batch)
    }

    /// Fail processing jobs older than `stale_job_after`. Returns their ids.
    pub async fn reclaim_stale_jobs(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>> {
        let mut reclaimed = Vec::new();
        for mut job in self.store.processing_jobs().await? {
            let Some(started_at) = job.started_at() else {
                continue;
            };
            let stale = (now - started_at)
                .to_std()
                .map(|age| age > self.config.stale_job_after)
                .unwrap_or(false);
            if !stale {
                continue;
            }
            job.fail(WATCHDOG_REASON, now)?;
            self.store.update_job(&job).await?;
            log::warn!(
                "Reclaimed stale recalculation job {} for path {} (started {started_at})",
                job.id,
                job.path_id
            );
            reclaimed.push(job.id);
        }
        Ok(reclaimed)
    }

    async fn require_path(&self, path_id: &str) -> Result<StrategicPath> {
        self.store
            .get_path(path_id)
            .await?
            .ok_or_else(|| LearningError::PathNotFound(path_id.to_string()))
    }

    async fn compute_and_write(
        &self,
        path: &StrategicPath,
    ) -> Result<(StrategicPath, PathAggregates, usize)> {
        let outcomes: Vec<_> = self
            .store
            .outcomes_for_path(&path.id)
            .await?
            .into_iter()
            .filter(|o| o.result.is_some())
            .collect();
        let aggregates = compute_aggregates(&outcomes)?;
        let updated = self
            .store
            .write_aggregates(&path.id, path.model_version, &aggregates, Utc::now())
            .await?;
        Ok((updated, aggregates, outcomes.len()))
    }

    async fn fail_job(&self, mut job: RecalculationJob, err: LearningError) -> LearningError {
        log::warn!(
            "Recalculation job {} for path {} failed: {err}",
            job.id,
            job.path_id
        );
        if let Err(transition) = job.fail(err.to_string(), Utc::now()) {
            log::warn!("Could not mark job {} failed: {transition}", job.id);
            return err;
        }
        if let Err(store_err) = self.store.update_job(&job).await {
            log::warn!("Could not persist failed job {}: {store_err}", job.id);
        }
        err
    }
}

fn skipped(path_id: &str, error: Option<String>) -> PathRecalculation {
    PathRecalculation {
        path_id: path_id.to_string(),
        recalculated: false,
        result: None,
        error,
    }
}
