//! Trajectory analysis: cycle detection and attractor entropy.
//!
//! Drives an automaton step by step, remembering the first index at which
//! each state was seen. The first repeat closes the trajectory:
//! - Transient = frames before the first visit of the repeated state
//! - Cycle = frames from that first visit up to the repeat
//!
//! Entropy is measured over the cycle when one is found and over the whole
//! recorded trajectory otherwise. Everything here is deterministic.

use std::collections::HashMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{GraphLifeError, Result};

use super::automaton::GraphAutomaton;
use super::state::LiveSet;

/// Step budget used by the batch harness when none is configured.
pub const DEFAULT_MAX_STEPS: usize = 4000;

/// Location of a detected cycle in a trajectory: frames `[begin, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// Index of the first visit of the repeated state (the transient length).
    pub begin: usize,
    /// Index at which the repeat was observed.
    pub end: usize,
}

impl Cycle {
    /// Period of the attractor.
    #[inline]
    pub fn length(&self) -> usize {
        self.end - self.begin
    }
}

/// Outcome of one simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Mean per-vertex Shannon entropy, in bits, over the analyzed segment.
    pub entropy: f64,
    /// Detected cycle; `None` when the step budget ran out first.
    pub cycle: Option<Cycle>,
    /// Index at which observation stopped: the repeat index, or the budget.
    pub steps_observed: usize,
}

impl SimulationResult {
    pub fn cycle_begin(&self) -> Option<usize> {
        self.cycle.map(|c| c.begin)
    }

    pub fn cycle_length(&self) -> Option<usize> {
        self.cycle.map(|c| c.length())
    }
}

/// States visited by an automaton, in order, with the cycle if one closed.
///
/// All frames are pairwise distinct.
#[derive(Clone, Debug)]
pub struct Trajectory {
    frames: Vec<LiveSet>,
    cycle: Option<Cycle>,
    steps_observed: usize,
}

impl Trajectory {
    /// Recorded frames (the repeated state is not recorded twice).
    pub fn frames(&self) -> &[LiveSet] {
        &self.frames
    }

    pub fn cycle(&self) -> Option<Cycle> {
        self.cycle
    }

    /// True if the trajectory ended on a repeat rather than on the step budget.
    pub fn is_closed(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn steps_observed(&self) -> usize {
        self.steps_observed
    }

    /// Frames that entropy is measured over: the cycle if closed, else everything.
    pub fn analyzed_segment(&self) -> &[LiveSet] {
        match self.cycle {
            Some(cycle) => &self.frames[cycle.begin..cycle.end],
            None => &self.frames,
        }
    }

    /// Per-vertex Shannon entropy over the analyzed segment.
    pub fn vertex_entropies(&self) -> Result<Array1<f64>> {
        vertex_entropies(self.analyzed_segment())
    }

    /// Mean per-vertex Shannon entropy over the analyzed segment.
    pub fn entropy(&self) -> Result<f64> {
        shannon_entropy(self.analyzed_segment())
    }

    /// Extend a closed trajectory to exactly `len` frames by repeating its cycle.
    ///
    /// Open trajectories, and closed ones already longer than `len`, are
    /// truncated instead.
    pub fn unrolled(&self, len: usize) -> Vec<LiveSet> {
        let mut frames = self.frames.clone();
        if let Some(cycle) = self.cycle {
            let period = self.frames[cycle.begin..cycle.end].iter().cycle();
            let missing = len.saturating_sub(frames.len());
            frames.extend(period.take(missing).cloned());
        }
        frames.truncate(len);
        frames
    }

    /// Summarize as a simulation result.
    pub fn to_result(&self) -> Result<SimulationResult> {
        Ok(SimulationResult {
            entropy: self.entropy()?,
            cycle: self.cycle,
            steps_observed: self.steps_observed,
        })
    }
}

/// Runs automata until their state sequence repeats or a step budget is spent.
#[derive(Clone, Copy, Debug)]
pub struct TrajectoryAnalyzer {
    max_steps: usize,
}

impl Default for TrajectoryAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STEPS)
    }
}

impl TrajectoryAnalyzer {
    /// Create an analyzer that observes at most `max_steps` states.
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Step `automaton` until a state repeats or the budget runs out.
    ///
    /// The automaton is left one step past the last recorded frame.
    pub fn run(&self, automaton: &mut GraphAutomaton<'_>) -> Trajectory {
        let mut first_seen: HashMap<LiveSet, usize> = HashMap::new();
        let mut frames = Vec::new();

        for i in 0..self.max_steps {
            let state = automaton.state();
            if let Some(&begin) = first_seen.get(state) {
                let cycle = Cycle { begin, end: i };
                tracing::debug!(
                    begin = cycle.begin,
                    length = cycle.length(),
                    "trajectory closed"
                );
                return Trajectory {
                    frames,
                    cycle: Some(cycle),
                    steps_observed: i,
                };
            }
            first_seen.insert(state.clone(), i);
            frames.push(state.clone());
            automaton.step();
        }

        tracing::debug!(max_steps = self.max_steps, "no cycle within step budget");
        Trajectory {
            frames,
            cycle: None,
            steps_observed: self.max_steps,
        }
    }

    /// Run and summarize in one call.
    ///
    /// # Errors
    /// `EmptySegment` when the budget is zero.
    pub fn analyze(&self, automaton: &mut GraphAutomaton<'_>) -> Result<SimulationResult> {
        self.run(automaton).to_result()
    }
}

/// Binary Shannon entropy of a vertex that is live with probability `p1`.
#[inline]
fn binary_entropy(p1: f64) -> f64 {
    let p0 = 1.0 - p1;
    let mut h = 0.0;
    if p0 > 0.0 {
        h -= p0 * p0.log2();
    }
    if p1 > 0.0 {
        h -= p1 * p1.log2();
    }
    h
}

/// Shannon entropy of each vertex's liveness across `frames`.
///
/// # Errors
/// `EmptySegment` if `frames` is empty.
pub fn vertex_entropies(frames: &[LiveSet]) -> Result<Array1<f64>> {
    let first = frames.first().ok_or(GraphLifeError::EmptySegment)?;
    let n_vertices = first.len();

    let mut live_counts = Array1::<f64>::zeros(n_vertices);
    for frame in frames {
        debug_assert_eq!(frame.len(), n_vertices, "frames must share one length");
        for vertex in frame.iter_live() {
            live_counts[vertex] += 1.0;
        }
    }

    let n_frames = frames.len() as f64;
    Ok(live_counts.mapv(|count| binary_entropy(count / n_frames)))
}

/// Normalized Shannon entropy: mean per-vertex entropy in bits, in [0, 1].
///
/// A graph with no vertices has entropy 0.
pub fn shannon_entropy(frames: &[LiveSet]) -> Result<f64> {
    Ok(vertex_entropies(frames)?.mean().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::life::rule::TransitionRule;

    fn states(strings: &[&str]) -> Vec<LiveSet> {
        strings.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn single_vertex() -> Graph {
        Graph::from_edges(vec!["x".to_string()], &[]).unwrap()
    }

    #[test]
    fn test_binary_entropy_bounds() {
        assert_eq!(binary_entropy(0.0), 0.0);
        assert_eq!(binary_entropy(1.0), 0.0);
        assert_eq!(binary_entropy(0.5), 1.0);
        assert!((binary_entropy(0.25) - 0.811_278_124_459_132_8).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_of_fixed_point_is_zero() {
        let frames = states(&["1010", "1010", "1010"]);
        assert_eq!(shannon_entropy(&frames).unwrap(), 0.0);
    }

    #[test]
    fn test_entropy_is_mean_over_vertices() {
        // Vertex 0 alternates, vertex 1 is constant.
        let frames = states(&["10", "00"]);
        assert_eq!(shannon_entropy(&frames).unwrap(), 0.5);
        let per_vertex = vertex_entropies(&frames).unwrap();
        assert_eq!(per_vertex.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_entropy_of_empty_segment_fails() {
        assert!(matches!(
            shannon_entropy(&[]),
            Err(GraphLifeError::EmptySegment)
        ));
    }

    #[test]
    fn test_period_two_oscillator_has_one_bit() {
        // Isolated vertex: birth needs 0 live neighbors, survival needs 1.
        let graph = single_vertex();
        let rule = TransitionRule::Underpopulation { birth: 0, survive: 1 };
        let mut automaton = GraphAutomaton::new(&graph, rule);

        let result = TrajectoryAnalyzer::new(100).analyze(&mut automaton).unwrap();
        assert_eq!(result.cycle, Some(Cycle { begin: 0, end: 2 }));
        assert_eq!(result.cycle_length(), Some(2));
        assert_eq!(result.entropy, 1.0);
        assert_eq!(result.steps_observed, 2);
    }

    #[test]
    fn test_fixed_point_trajectory() {
        let graph = single_vertex();
        let mut automaton = GraphAutomaton::new(&graph, TransitionRule::Classical);
        automaton.set_state_str("1").unwrap();

        let trajectory = TrajectoryAnalyzer::new(10).run(&mut automaton);
        // "1" -> "0" -> "0": transient of one frame, then a period-1 cycle.
        assert_eq!(trajectory.frames().len(), 2);
        assert_eq!(trajectory.cycle(), Some(Cycle { begin: 1, end: 2 }));
        assert_eq!(trajectory.entropy().unwrap(), 0.0);
    }

    #[test]
    fn test_known_transient_and_period() {
        // Compare against a linear scan over every earlier state.
        let names = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let graph = Graph::from_edges(names, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let rule = TransitionRule::Density { mu: 0.4 };

        let mut automaton = GraphAutomaton::new(&graph, rule);
        automaton.set_state_str("10000").unwrap();
        let mut reference = automaton.clone();
        let trajectory = TrajectoryAnalyzer::new(1000).run(&mut automaton);

        let mut seen: Vec<LiveSet> = Vec::new();
        let (transient, period) = loop {
            let state = reference.state().clone();
            if let Some(k) = seen.iter().position(|s| *s == state) {
                break (k, seen.len() - k);
            }
            seen.push(state);
            reference.step();
        };

        let cycle = trajectory.cycle().unwrap();
        assert_eq!(cycle.begin, transient);
        assert_eq!(cycle.length(), period);
        assert_eq!(trajectory.frames(), &seen[..]);
    }

    #[test]
    fn test_open_trajectory_uses_every_frame() {
        // A long cycle cut short by a small budget.
        let graph = Graph::torus(5);
        let mut automaton = GraphAutomaton::new(&graph, TransitionRule::Classical);
        for name in ["1_0", "2_1", "0_2", "1_2", "2_2"] {
            automaton.set_live_vertex(name).unwrap();
        }

        let trajectory = TrajectoryAnalyzer::new(3).run(&mut automaton);
        assert!(!trajectory.is_closed());
        assert_eq!(trajectory.steps_observed(), 3);
        assert_eq!(trajectory.analyzed_segment().len(), 3);

        let result = trajectory.to_result().unwrap();
        assert_eq!(result.cycle_length(), None);
        assert_eq!(result.cycle_begin(), None);
        assert!(result.entropy > 0.0 && result.entropy <= 1.0);
    }

    #[test]
    fn test_zero_budget_is_empty_segment() {
        let graph = single_vertex();
        let mut automaton = GraphAutomaton::new(&graph, TransitionRule::Classical);
        let result = TrajectoryAnalyzer::new(0).analyze(&mut automaton);
        assert!(matches!(result, Err(GraphLifeError::EmptySegment)));
    }

    #[test]
    fn test_unrolled_repeats_cycle() {
        let graph = single_vertex();
        let rule = TransitionRule::Underpopulation { birth: 0, survive: 1 };
        let mut automaton = GraphAutomaton::new(&graph, rule);
        let trajectory = TrajectoryAnalyzer::new(100).run(&mut automaton);

        let unrolled: Vec<String> = trajectory.unrolled(5).iter().map(|s| s.to_string()).collect();
        assert_eq!(unrolled, vec!["0", "1", "0", "1", "0"]);
        assert_eq!(trajectory.unrolled(1).len(), 1);
    }
}
