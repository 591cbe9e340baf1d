use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use futuretree_learning::LearningConfig;
use futuretree_search::MatchOptions;
use serde::Deserialize;

/// Optional `futuretree.toml` with per-section overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub matching: MatchingSection,
    pub scoring: ScoringSection,
    pub learning: LearningSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingSection {
    pub threshold: Option<f64>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringSection {
    /// JSON or TOML scoring profile; relative paths resolve against the config file
    pub profile: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LearningSection {
    pub outcome_threshold: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub stale_job_secs: Option<u64>,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        if let (Some(profile), Some(base)) = (&config.scoring.profile, path.parent()) {
            if profile.is_relative() {
                config.scoring.profile = Some(base.join(profile));
            }
        }
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Defaults, then config file, then explicit flags.
    pub fn match_options(
        &self,
        threshold: Option<f64>,
        max_results: Option<usize>,
        strategy: Option<String>,
    ) -> MatchOptions {
        let defaults = MatchOptions::default();
        MatchOptions {
            threshold: threshold
                .or(self.matching.threshold)
                .unwrap_or(defaults.threshold),
            max_results: max_results
                .or(self.matching.max_results)
                .unwrap_or(defaults.max_results),
            strategy_filter: strategy,
        }
    }

    pub fn learning_config(&self) -> LearningConfig {
        let defaults = LearningConfig::default();
        LearningConfig {
            outcome_threshold: self
                .learning
                .outcome_threshold
                .unwrap_or(defaults.outcome_threshold),
            recalculation_timeout: self
                .learning
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.recalculation_timeout),
            stale_job_after: self
                .learning
                .stale_job_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.stale_job_after),
        }
    }
}
