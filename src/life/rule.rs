//! Transition rules for Life on a graph.
//!
//! A rule sees only three things about a vertex: whether it is live now,
//! how many neighbors it has, and how many of those are live. It knows
//! nothing about the graph's shape, which is what lets one rule run on a
//! torus, a random graph, or a rewired small world alike.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Built-in Life-like rule families.
///
/// Every variant is a pure function of `(live, n_neighbors, n_live_neighbors)`
/// parameterized by fixed thresholds; evaluating a rule never mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionRule {
    /// Conway's B3/S23 expressed on live-neighbor counts:
    /// fewer than 2 → dead, exactly 2 → unchanged, exactly 3 → live, more → dead.
    Classical,
    /// Flip the vertex when the live fraction of its neighborhood exceeds `mu`,
    /// otherwise keep it.
    ///
    /// A vertex with no neighbors has density 0, so for `mu >= 0` it never flips.
    Density { mu: f64 },
    /// Dead → live with at least `birth` live neighbors; live stays live with
    /// at least `survive`.
    Underpopulation { birth: usize, survive: usize },
    /// Dead → live with at least `birth` live neighbors; live stays live with
    /// at most `survive`.
    Overpopulation { birth: usize, survive: usize },
    /// Live with exactly `exact` live neighbors, dead with at most `low` or more
    /// than `high`, unchanged otherwise.
    ModifiedConway { low: usize, exact: usize, high: usize },
}

impl Default for TransitionRule {
    /// The overpopulation rule with birth at 2 and survival up to 3.
    fn default() -> Self {
        TransitionRule::Overpopulation {
            birth: 2,
            survive: 3,
        }
    }
}

impl TransitionRule {
    /// Compute a vertex's next liveness.
    ///
    /// # Arguments
    /// * `live` - Whether the vertex is live before the step
    /// * `n_neighbors` - Degree of the vertex
    /// * `n_live` - Number of live neighbors before the step
    #[inline]
    pub fn next_state(&self, live: bool, n_neighbors: usize, n_live: usize) -> bool {
        match *self {
            TransitionRule::Classical => match n_live {
                0 | 1 => false,
                2 => live,
                3 => true,
                _ => false,
            },
            TransitionRule::Density { mu } => {
                let density = if n_neighbors == 0 {
                    0.0
                } else {
                    n_live as f64 / n_neighbors as f64
                };
                if density > mu {
                    !live
                } else {
                    live
                }
            }
            TransitionRule::Underpopulation { birth, survive } => {
                let threshold = if live { survive } else { birth };
                n_live >= threshold
            }
            TransitionRule::Overpopulation { birth, survive } => {
                if live {
                    n_live <= survive
                } else {
                    n_live >= birth
                }
            }
            TransitionRule::ModifiedConway { low, exact, high } => {
                if n_live == exact {
                    true
                } else if n_live <= low || n_live > high {
                    false
                } else {
                    live
                }
            }
        }
    }

    /// Short name of the rule family.
    pub fn family(&self) -> &'static str {
        match self {
            TransitionRule::Classical => "classical",
            TransitionRule::Density { .. } => "density",
            TransitionRule::Underpopulation { .. } => "underpopulation",
            TransitionRule::Overpopulation { .. } => "overpopulation",
            TransitionRule::ModifiedConway { .. } => "modified_conway",
        }
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionRule::Classical => write!(f, "classical"),
            TransitionRule::Density { mu } => write!(f, "density(mu={})", mu),
            TransitionRule::Underpopulation { birth, survive }
            | TransitionRule::Overpopulation { birth, survive } => {
                write!(f, "{}(birth={}, survive={})", self.family(), birth, survive)
            }
            TransitionRule::ModifiedConway { low, exact, high } => {
                write!(f, "modified_conway({}, {}, {})", low, exact, high)
            }
        }
    }
}
