//! Life-like cellular automata on arbitrary graphs.
//!
//! This module provides:
//! - LiveSet: bitset state, also used as the cycle-detection fingerprint
//! - TransitionRule: the five rule families
//! - GraphAutomaton: synchronous stepping over a borrowed graph
//! - TrajectoryAnalyzer: cycle detection and attractor entropy
//! - TopologyMutator: degree-preserving rewiring plus edge addition/removal
//! - Histogram: fixed-width entropy histogram with overflow
//! - BatchRunner: cohort-parallel simulation of many initial states

pub mod state;
pub mod rule;
pub mod automaton;
pub mod trajectory;
pub mod topology;
pub mod histogram;
pub mod batch;

pub use state::LiveSet;
pub use rule::TransitionRule;
pub use automaton::GraphAutomaton;
pub use trajectory::{
    Cycle,
    SimulationResult,
    Trajectory,
    TrajectoryAnalyzer,
    shannon_entropy,
    vertex_entropies,
};
pub use topology::{mutate_zygote, DoubleEdgeSwap, Mutation, TopologyMutator};
pub use histogram::Histogram;
pub use batch::{default_mu_grid, run_experiment, BatchReport, BatchRunner, DensityPoint};
