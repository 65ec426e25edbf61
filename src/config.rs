//! Experiment configuration.
//!
//! Loaded from TOML; every field has a default so a file only needs the
//! settings it changes:
//!
//! ```toml
//! [rule]
//! kind = "density"
//! mu = 0.3
//!
//! [batch]
//! max_steps = 2000
//! num_workers = 8
//!
//! [mutation]
//! seed = 7
//! rewire = 40
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::life::histogram::{DEFAULT_BUCKET_WIDTH, DEFAULT_NUM_BUCKETS};
use crate::life::rule::TransitionRule;
use crate::life::topology::DEFAULT_MAX_ATTEMPTS;
use crate::life::trajectory::DEFAULT_MAX_STEPS;

/// Complete configuration for one experiment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Transition rule shared by every simulation.
    pub rule: TransitionRule,
    /// Batch execution settings.
    pub batch: BatchConfig,
    /// Zygote topology mutation, applied before the batch.
    pub mutation: MutationConfig,
}

/// Settings for the concurrent batch runner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of states observed per simulation.
    pub max_steps: usize,
    /// Simulations run concurrently per cohort.
    pub num_workers: usize,
    /// Entropy histogram bucket width.
    pub bucket_width: f64,
    /// Number of entropy histogram buckets.
    pub num_buckets: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            num_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            bucket_width: DEFAULT_BUCKET_WIDTH,
            num_buckets: DEFAULT_NUM_BUCKETS,
        }
    }
}

impl BatchConfig {
    /// Check every setting is in range.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(invalid("max_steps", "must be at least 1"));
        }
        if self.num_workers == 0 {
            return Err(invalid("num_workers", "must be at least 1"));
        }
        if !(self.bucket_width.is_finite() && self.bucket_width > 0.0) {
            return Err(invalid(
                "bucket_width",
                format!("must be positive and finite, got {}", self.bucket_width),
            ));
        }
        if self.num_buckets == 0 {
            return Err(invalid("num_buckets", "must be at least 1"));
        }
        Ok(())
    }
}

/// Topology mutation applied to the zygote graph before any simulation.
///
/// Rewiring runs first, then additions, then removals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Seed for the mutation random source.
    pub seed: u64,
    /// Number of degree-preserving double-edge swaps.
    pub rewire: usize,
    /// Number of edges to add.
    pub add: usize,
    /// Number of edges to remove.
    pub remove: usize,
    /// Consecutive rejected samples tolerated per mutation.
    pub max_attempts: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            rewire: 0,
            add: 0,
            remove: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl MutationConfig {
    /// True if any mutation is requested.
    pub fn is_active(&self) -> bool {
        self.rewire > 0 || self.add > 0 || self.remove > 0
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

impl ExperimentConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ExperimentConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.batch.validate()?;
        self.mutation.validate()?;
        if let TransitionRule::Density { mu } = self.rule {
            if !mu.is_finite() {
                return Err(invalid("rule.mu", format!("must be finite, got {}", mu)));
            }
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidSetting {
        name,
        reason: reason.into(),
    }
}
