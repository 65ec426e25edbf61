//! Life-like cellular automata on arbitrary graphs.
//!
//! A graph is loaded (or generated as a torus), optionally rewired, then
//! shared read-only by a batch of simulations that each start from a
//! different initial state. Every simulation runs until its trajectory
//! revisits a state; the per-vertex Shannon entropy of the attractor it
//! falls into is collected in a histogram.
//!
//! ```no_run
//! use graphlife::{BatchConfig, BatchRunner, Graph, GraphAutomaton, TransitionRule};
//!
//! # fn main() -> graphlife::Result<()> {
//! let graph = Graph::torus(6);
//! let zygote = GraphAutomaton::new(&graph, TransitionRule::Classical);
//! let runner = BatchRunner::new(zygote, BatchConfig::default())?;
//! let report = runner.run_str("010000001000111000000000000000000000")?;
//! println!("{}", report.histogram.format_counts());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod description;
pub mod error;
pub mod graph;
pub mod life;
pub mod states;

#[cfg(feature = "python")]
mod python;

pub use config::{BatchConfig, ExperimentConfig, MutationConfig};
pub use description::GraphDescription;
pub use error::{ConfigError, GraphLifeError, Result};
pub use graph::Graph;
pub use life::{
    BatchReport, BatchRunner, GraphAutomaton, Histogram, LiveSet, SimulationResult,
    TopologyMutator, Trajectory, TrajectoryAnalyzer, TransitionRule,
};
pub use states::{parse_states, random_states};
