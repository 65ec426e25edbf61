//! Life on a graph.
//!
//! The automaton borrows the graph and owns only its liveness, so cloning
//! one per simulation costs a bitset, never an adjacency copy.

use crate::error::{ConfigError, Result};
use crate::graph::Graph;

use super::rule::TransitionRule;
use super::state::LiveSet;

/// Cellular automaton over a shared, read-only graph.
#[derive(Clone, Debug)]
pub struct GraphAutomaton<'g> {
    graph: &'g Graph,
    rule: TransitionRule,
    live: LiveSet,
}

impl<'g> GraphAutomaton<'g> {
    /// Create an automaton with every vertex dead.
    pub fn new(graph: &'g Graph, rule: TransitionRule) -> Self {
        Self {
            graph,
            rule,
            live: LiveSet::empty(graph.n_vertices()),
        }
    }

    /// New automaton over the same graph and rule, starting from `state`.
    ///
    /// This is how a zygote is cloned for one simulation: only the
    /// liveness is owned by the child.
    pub fn spawn(&self, state: LiveSet) -> Result<Self> {
        let mut child = Self::new(self.graph, self.rule);
        child.set_state(state)?;
        Ok(child)
    }

    /// Underlying graph.
    #[inline]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    #[inline]
    pub fn rule(&self) -> TransitionRule {
        self.rule
    }

    /// Current state, usable as a cycle-detection fingerprint.
    #[inline]
    pub fn state(&self) -> &LiveSet {
        &self.live
    }

    /// Current state as the canonical `'0'/'1'` string.
    pub fn state_string(&self) -> String {
        self.live.to_string()
    }

    /// Replace the live set.
    ///
    /// # Errors
    /// `ConfigError::StateLength` if `state` does not cover every vertex.
    pub fn set_state(&mut self, state: LiveSet) -> Result<()> {
        if state.len() != self.graph.n_vertices() {
            return Err(ConfigError::StateLength {
                expected: self.graph.n_vertices(),
                actual: state.len(),
            }
            .into());
        }
        self.live = state;
        Ok(())
    }

    /// Replace the live set from a state string (`'1'` live, `'0'`/`'.'` dead).
    pub fn set_state_str(&mut self, state: &str) -> Result<()> {
        self.live = LiveSet::parse(state, self.graph.n_vertices())?;
        Ok(())
    }

    /// Mark the named vertex live.
    pub fn set_live_vertex(&mut self, name: &str) -> Result<()> {
        let vertex = self.graph.index_of(name)?;
        self.live.insert(vertex);
        Ok(())
    }

    /// Number of live neighbors of `vertex` in the current state.
    pub fn live_neighbors(&self, vertex: usize) -> usize {
        self.graph
            .neighbors(vertex)
            .iter()
            .filter(|&&n| self.live.contains(n))
            .count()
    }

    /// Advance one synchronous step.
    ///
    /// Every vertex is evaluated against the state before the step; the new
    /// live set replaces the old one only after all vertices are evaluated.
    pub fn step(&mut self) {
        let n_vertices = self.graph.n_vertices();
        let mut next = LiveSet::empty(n_vertices);

        for vertex in 0..n_vertices {
            let live = self.live.contains(vertex);
            let n_neighbors = self.graph.degree(vertex);
            let n_live = self.live_neighbors(vertex);
            if self.rule.next_state(live, n_neighbors, n_live) {
                next.insert(vertex);
            }
        }

        self.live = next;
    }

    /// Per-vertex report of neighbors, with live neighbors marked `*`.
    pub fn live_annotations(&self) -> Vec<String> {
        (0..self.graph.n_vertices())
            .map(|vertex| {
                let neighbors: Vec<String> = self
                    .graph
                    .neighbors(vertex)
                    .iter()
                    .map(|&n| {
                        let mark = if self.live.contains(n) { "*" } else { "" };
                        format!("{}{}", self.graph.vertex_name(n), mark)
                    })
                    .collect();
                format!("{}: {}", self.graph.vertex_name(vertex), neighbors.join(" "))
            })
            .collect()
    }
}
