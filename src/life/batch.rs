//! Concurrent batch simulation and result aggregation.
//!
//! One read-only zygote automaton is spawned once per initial state. Spawned
//! automata borrow the zygote's graph and own only their liveness, so any
//! number of them can run side by side on the worker pool.
//!
//! Dispatch is cohort-based: at most `num_workers` simulations run at once,
//! and the histogram is only touched after a whole cohort has joined.

use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

use crate::config::{BatchConfig, ExperimentConfig};
use crate::error::{ConfigError, Result};
use crate::graph::Graph;
use crate::states::parse_states;

use super::automaton::GraphAutomaton;
use super::histogram::Histogram;
use super::rule::TransitionRule;
use super::state::LiveSet;
use super::topology::mutate_zygote;
use super::trajectory::{SimulationResult, TrajectoryAnalyzer};

/// Aggregated batch output: histogram plus per-run results in input order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Entropy histogram; out-of-range entropies are only counted as overflow.
    pub histogram: Histogram,
    /// One result per initial state, indexed like the input.
    pub runs: Vec<SimulationResult>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn entropies(&self) -> Vec<f64> {
        self.runs.iter().map(|r| r.entropy).collect()
    }

    pub fn steps(&self) -> Vec<usize> {
        self.runs.iter().map(|r| r.steps_observed).collect()
    }

    pub fn cycle_lengths(&self) -> Vec<Option<usize>> {
        self.runs.iter().map(|r| r.cycle_length()).collect()
    }

    pub fn cycle_begins(&self) -> Vec<Option<usize>> {
        self.runs.iter().map(|r| r.cycle_begin()).collect()
    }

    /// Mean entropy over every run, or `None` for an empty batch.
    pub fn mean_entropy(&self) -> Option<f64> {
        if self.runs.is_empty() {
            return None;
        }
        Some(self.runs.iter().map(|r| r.entropy).sum::<f64>() / self.runs.len() as f64)
    }

    /// Entropies joined by commas, in input order.
    pub fn entropy_csv(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.entropy.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// One line per run: index, entropy, steps observed, cycle length (-1 if unknown).
    pub fn run_lines(&self) -> Vec<String> {
        self.runs
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let cycle = r.cycle_length().map_or(-1, |len| len as i64);
                format!("{:4} {:8.6} {:4} {:4}", i, r.entropy, r.steps_observed, cycle)
            })
            .collect()
    }
}

/// Mean attractor entropy for one density threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub mu: f64,
    pub mean_entropy: f64,
}

/// Density thresholds 0.1, 0.2, ..., 0.9.
pub fn default_mu_grid() -> Vec<f64> {
    (1..10).map(|k| k as f64 / 10.0).collect()
}

/// Runs trajectories for many initial states over a shared zygote.
pub struct BatchRunner<'g> {
    zygote: GraphAutomaton<'g>,
    analyzer: TrajectoryAnalyzer,
    config: BatchConfig,
    pool: ThreadPool,
}

impl<'g> BatchRunner<'g> {
    /// Create a runner with a dedicated pool of `config.num_workers` threads.
    ///
    /// # Errors
    /// Invalid batch settings, or a worker pool that cannot be started.
    pub fn new(zygote: GraphAutomaton<'g>, config: BatchConfig) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_workers)
            .thread_name(|i| format!("graphlife-worker-{}", i))
            .build()
            .map_err(|e| ConfigError::InvalidSetting {
                name: "num_workers",
                reason: e.to_string(),
            })?;

        Ok(Self {
            zygote,
            analyzer: TrajectoryAnalyzer::new(config.max_steps),
            config,
            pool,
        })
    }

    pub fn zygote(&self) -> &GraphAutomaton<'g> {
        &self.zygote
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Simulate every initial state and aggregate the results.
    ///
    /// # Errors
    /// A state whose length does not match the graph. All states are checked
    /// before any simulation starts, so an error means no partial output.
    pub fn run(&self, states: &[LiveSet]) -> Result<BatchReport> {
        self.run_with(&self.zygote, states)
    }

    /// Parse a whitespace-delimited state stream and run it.
    pub fn run_str(&self, text: &str) -> Result<BatchReport> {
        let states = parse_states(text, self.zygote.graph().n_vertices())?;
        self.run(&states)
    }

    /// Mean entropy of the batch under `TransitionRule::Density` for each `mu`.
    pub fn density_sweep(&self, states: &[LiveSet], mus: &[f64]) -> Result<Vec<DensityPoint>> {
        let mut points = Vec::with_capacity(mus.len());
        for &mu in mus {
            let zygote = GraphAutomaton::new(self.zygote.graph(), TransitionRule::Density { mu });
            let report = self.run_with(&zygote, states)?;
            let point = DensityPoint {
                mu,
                mean_entropy: report.mean_entropy().unwrap_or(0.0),
            };
            tracing::info!(mu, mean_entropy = point.mean_entropy, "density sweep point");
            points.push(point);
        }
        Ok(points)
    }

    fn run_with(&self, zygote: &GraphAutomaton<'g>, states: &[LiveSet]) -> Result<BatchReport> {
        let n_vertices = zygote.graph().n_vertices();
        if let Some(bad) = states.iter().find(|s| s.len() != n_vertices) {
            return Err(ConfigError::StateLength {
                expected: n_vertices,
                actual: bad.len(),
            }
            .into());
        }

        let mut histogram = Histogram::new(self.config.bucket_width, self.config.num_buckets);
        let mut runs = Vec::with_capacity(states.len());

        for (cohort_index, cohort) in states.chunks(self.config.num_workers).enumerate() {
            let offset = cohort_index * self.config.num_workers;
            let results: Vec<SimulationResult> = self.pool.install(|| {
                cohort
                    .par_iter()
                    .enumerate()
                    .map(|(i, state)| self.simulate(zygote, offset + i, state))
                    .collect()
            });

            // The cohort has joined; aggregate in input order.
            for (i, result) in results.into_iter().enumerate() {
                if !histogram.record(result.entropy) {
                    tracing::warn!(
                        index = offset + i,
                        entropy = result.entropy,
                        upper_bound = histogram.upper_bound(),
                        "entropy outside histogram range"
                    );
                }
                runs.push(result);
            }
            tracing::debug!(cohort = cohort_index, size = cohort.len(), "cohort complete");
        }

        tracing::info!(
            rule = %zygote.rule(),
            samples = runs.len(),
            overflow = histogram.overflow(),
            "batch complete"
        );
        Ok(BatchReport { histogram, runs })
    }

    /// Run one trajectory. Never fails: a simulation that cannot produce an
    /// entropy is recorded with a NaN entropy and lands in histogram overflow.
    fn simulate(&self, zygote: &GraphAutomaton<'g>, index: usize, state: &LiveSet) -> SimulationResult {
        let outcome = zygote
            .spawn(state.clone())
            .and_then(|mut automaton| self.analyzer.analyze(&mut automaton));
        match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(index, error = %e, "simulation failed");
                SimulationResult {
                    entropy: f64::NAN,
                    cycle: None,
                    steps_observed: 0,
                }
            }
        }
    }
}

/// Full pipeline: mutate the zygote graph, then run the batch over it.
///
/// Mutation completes before the runner borrows the graph. Returns the
/// (possibly mutated) graph alongside the report so it can be persisted.
pub fn run_experiment(
    mut graph: Graph,
    states_text: &str,
    config: &ExperimentConfig,
) -> Result<(Graph, BatchReport)> {
    config.validate()?;
    if config.mutation.is_active() {
        mutate_zygote(&mut graph, &config.mutation)?;
    }

    let states = parse_states(states_text, graph.n_vertices())?;
    let report = {
        let zygote = GraphAutomaton::new(&graph, config.rule);
        BatchRunner::new(zygote, config.batch.clone())?.run(&states)?
    };
    Ok((graph, report))
}
