//! Automaton state representation.
//!
//! A state is the set of live vertices, stored as a fixed-length bitset.
//! The bitset doubles as the fingerprint used for cycle detection: it is
//! cheap to hash and compare, and converts to and from the canonical
//! `'0'/'1'` state string at the boundary.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, GraphLifeError};

const WORD_BITS: usize = 64;

/// Set of live vertex indices for a graph with a fixed number of vertices.
///
/// Key properties:
/// - Length never changes after construction
/// - Hashable, so it can key the seen-state map
/// - Bits past `len` in the last word are always zero
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiveSet {
    words: Vec<u64>,
    len: usize,
}

impl LiveSet {
    /// All-dead state for `len` vertices.
    pub fn empty(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// State with exactly the given vertices live.
    pub fn from_indices(len: usize, live: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::empty(len);
        for vertex in live {
            set.insert(vertex);
        }
        set
    }

    /// Parse a state string and check it against the vertex count.
    ///
    /// `'1'` marks a live vertex, `'0'` or `'.'` a dead one.
    pub fn parse(state: &str, n_vertices: usize) -> Result<Self, ConfigError> {
        let actual = state.chars().count();
        if actual != n_vertices {
            return Err(ConfigError::StateLength {
                expected: n_vertices,
                actual,
            });
        }
        let mut set = Self::empty(n_vertices);
        for (position, ch) in state.chars().enumerate() {
            match ch {
                '1' => set.insert(position),
                '0' | '.' => {}
                found => return Err(ConfigError::StateChar { position, found }),
            }
        }
        Ok(set)
    }

    /// Number of vertices covered by this state.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn contains(&self, vertex: usize) -> bool {
        vertex < self.len && self.words[vertex / WORD_BITS] & (1u64 << (vertex % WORD_BITS)) != 0
    }

    /// Mark `vertex` live.
    #[inline]
    pub fn insert(&mut self, vertex: usize) {
        assert!(vertex < self.len, "vertex {} out of range {}", vertex, self.len);
        self.words[vertex / WORD_BITS] |= 1u64 << (vertex % WORD_BITS);
    }

    /// Number of live vertices.
    pub fn count_live(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Live vertex indices in ascending order.
    pub fn iter_live(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let offset = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(w * WORD_BITS + offset)
            })
        })
    }
}

impl fmt::Display for LiveSet {
    /// Canonical state string: one `'1'`/`'0'` per vertex in index order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = (0..self.len)
            .map(|v| if self.contains(v) { '1' } else { '0' })
            .collect();
        f.write_str(&text)
    }
}

impl FromStr for LiveSet {
    type Err = GraphLifeError;

    /// Parse a state string, taking its length as the vertex count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s, s.chars().count())?)
    }
}
