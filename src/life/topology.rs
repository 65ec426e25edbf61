//! Randomized topology mutation of the zygote graph.
//!
//! Double-edge swaps rewire a graph while keeping every vertex's degree,
//! so a k-regular torus stays k-regular while drifting toward a small
//! world. Edge addition and removal change degrees and are offered for
//! density experiments.
//!
//! The mutator holds the graph mutably, so no automaton can borrow it
//! until mutation is finished.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::MutationConfig;
use crate::error::{GraphLifeError, Result};
use crate::graph::Graph;

/// Consecutive failed samples allowed per mutation when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Kinds of topology mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// (a,b), (c,d) → (a,c), (b,d)
    Rewire,
    /// ∅ → (a,c)
    AddEdge,
    /// (a,b) → ∅
    RemoveEdge,
}

impl Mutation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutation::Rewire => "rewire",
            Mutation::AddEdge => "add_edge",
            Mutation::RemoveEdge => "remove_edge",
        }
    }
}

/// A double-edge swap replacing edges a–b and c–d with a–c and b–d.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoubleEdgeSwap {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
}

/// Rejection-sampling mutator over a graph it borrows exclusively.
pub struct TopologyMutator<'g, R: Rng> {
    graph: &'g mut Graph,
    rng: R,
    max_attempts: usize,
}

impl<'g, R: Rng> TopologyMutator<'g, R> {
    /// Create a mutator drawing randomness from `rng`.
    pub fn new(graph: &'g mut Graph, rng: R) -> Self {
        Self {
            graph,
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Bound the number of consecutive rejected samples per mutation.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn graph(&self) -> &Graph {
        &*self.graph
    }

    /// Uniformly random neighbor of `vertex`, if it has any.
    fn random_neighbor(&mut self, vertex: usize) -> Option<usize> {
        let degree = self.graph.degree(vertex);
        if degree == 0 {
            return None;
        }
        let k = self.rng.gen_range(0..degree);
        self.graph.neighbors(vertex).iter().nth(k).copied()
    }

    /// Two distinct, non-adjacent vertices drawn uniformly, or `None` on rejection.
    fn random_non_adjacent_pair(&mut self) -> Option<(usize, usize)> {
        let n_vertices = self.graph.n_vertices();
        if n_vertices < 2 {
            return None;
        }
        let a = self.rng.gen_range(0..n_vertices);
        let c = self.rng.gen_range(0..n_vertices);
        if a == c || self.graph.has_edge(a, c) {
            return None;
        }
        Some((a, c))
    }

    /// Draw one candidate double-edge swap.
    ///
    /// Picks non-adjacent a and c, then random neighbors b of a and d of c.
    /// Returns `None` when the draw would create a duplicate edge; callers
    /// retry.
    pub fn select_rewirable(&mut self) -> Option<DoubleEdgeSwap> {
        let (a, c) = self.random_non_adjacent_pair()?;
        let b = self.random_neighbor(a)?;
        if self.graph.has_edge(b, c) {
            return None;
        }
        let d = self.random_neighbor(c)?;
        if b == d || self.graph.has_edge(b, d) {
            return None;
        }
        Some(DoubleEdgeSwap { a, b, c, d })
    }

    /// Apply a double-edge swap.
    ///
    /// Returns false, leaving the graph untouched, unless a–b and c–d exist,
    /// a–c and b–d do not, and the four vertices are distinct.
    pub fn rewire(&mut self, swap: DoubleEdgeSwap) -> bool {
        let DoubleEdgeSwap { a, b, c, d } = swap;
        let distinct = a != b && a != c && a != d && b != c && b != d && c != d;
        if !distinct
            || !self.graph.has_edge(a, b)
            || !self.graph.has_edge(c, d)
            || self.graph.has_edge(a, c)
            || self.graph.has_edge(b, d)
        {
            return false;
        }

        self.graph.remove_edge(a, b);
        self.graph.remove_edge(c, d);
        self.graph.add_edge(a, c);
        self.graph.add_edge(b, d);
        true
    }

    fn try_once(&mut self, mutation: Mutation) -> bool {
        match mutation {
            Mutation::Rewire => match self.select_rewirable() {
                Some(swap) => self.rewire(swap),
                None => false,
            },
            Mutation::AddEdge => match self.random_non_adjacent_pair() {
                Some((a, c)) => self.graph.add_edge(a, c),
                None => false,
            },
            Mutation::RemoveEdge => {
                if self.graph.n_vertices() == 0 {
                    return false;
                }
                let a = self.rng.gen_range(0..self.graph.n_vertices());
                match self.random_neighbor(a) {
                    Some(b) => self.graph.remove_edge(a, b),
                    None => false,
                }
            }
        }
    }

    /// Perform `count` successful mutations of one kind.
    ///
    /// # Errors
    /// `RewireExhaustion` when `max_attempts` consecutive samples are rejected.
    /// Mutations completed before the failure stay applied.
    pub fn apply(&mut self, mutation: Mutation, count: usize) -> Result<()> {
        for completed in 0..count {
            let mut attempts = 0;
            while !self.try_once(mutation) {
                attempts += 1;
                if attempts >= self.max_attempts {
                    tracing::warn!(
                        operation = mutation.as_str(),
                        completed,
                        requested = count,
                        attempts,
                        "topology mutation exhausted"
                    );
                    return Err(GraphLifeError::RewireExhaustion {
                        operation: mutation.as_str(),
                        completed,
                        requested: count,
                        attempts,
                    });
                }
            }
        }

        if count > 0 {
            tracing::info!(
                operation = mutation.as_str(),
                count,
                edges = self.graph.n_edges(),
                "topology mutation complete"
            );
        }
        Ok(())
    }

    /// Perform `count` degree-preserving double-edge swaps.
    pub fn rewire_many(&mut self, count: usize) -> Result<()> {
        self.apply(Mutation::Rewire, count)
    }

    /// Add `count` new edges between random non-adjacent vertices.
    pub fn add_edges(&mut self, count: usize) -> Result<()> {
        self.apply(Mutation::AddEdge, count)
    }

    /// Remove `count` random existing edges.
    pub fn remove_edges(&mut self, count: usize) -> Result<()> {
        self.apply(Mutation::RemoveEdge, count)
    }
}

/// Apply the configured mutations to a zygote graph: rewiring, then
/// additions, then removals, all from one seeded random source.
///
/// Must finish before any automaton borrows `graph`; the borrow checker
/// enforces this.
pub fn mutate_zygote(graph: &mut Graph, config: &MutationConfig) -> Result<()> {
    config.validate()?;
    let rng = StdRng::seed_from_u64(config.seed);
    let mut mutator = TopologyMutator::new(graph, rng).with_max_attempts(config.max_attempts);
    mutator.rewire_many(config.rewire)?;
    mutator.add_edges(config.add)?;
    mutator.remove_edges(config.remove)?;
    Ok(())
}
