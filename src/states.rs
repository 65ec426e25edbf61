//! Initial states for batch runs.
//!
//! States travel as whitespace-delimited streams of fixed-length `'0'/'1'`
//! strings, one per simulation.

use std::collections::BTreeSet;

use rand::seq::index;
use rand::Rng;

use crate::error::{ConfigError, Result};
use crate::life::state::LiveSet;

/// Parse every whitespace-delimited state in `text`.
///
/// # Errors
/// The first token with the wrong length or an invalid character. Nothing
/// is returned for the tokens before it.
pub fn parse_states(text: &str, n_vertices: usize) -> Result<Vec<LiveSet>> {
    text.split_whitespace()
        .map(|token| Ok(LiveSet::parse(token, n_vertices)?))
        .collect()
}

/// Newline-separated canonical state strings.
pub fn format_states(states: &[LiveSet]) -> String {
    let mut out = String::new();
    for state in states {
        out.push_str(&state.to_string());
        out.push('\n');
    }
    out
}

/// Number of live vertices each random state gets: `ceil(p * n_vertices)`.
pub fn live_count(n_vertices: usize, p: f64) -> usize {
    ((p * n_vertices as f64).ceil() as usize).min(n_vertices)
}

/// Binomial coefficient, saturating at `cap`.
fn choose_capped(n: usize, k: usize, cap: usize) -> usize {
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc >= cap as u128 {
            return cap;
        }
    }
    (acc as usize).min(cap)
}

/// Draw `count` distinct random states with exactly `ceil(p * n_vertices)`
/// live vertices each.
///
/// The result is sorted, so the same seed always yields the same list.
///
/// # Errors
/// `p` outside [0, 1], or more states requested than distinct ones exist.
pub fn random_states<R: Rng>(
    rng: &mut R,
    count: usize,
    n_vertices: usize,
    p: f64,
) -> Result<Vec<LiveSet>> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::InvalidSetting {
            name: "p",
            reason: format!("live fraction must be in [0, 1], got {}", p),
        }
        .into());
    }

    let n_live = live_count(n_vertices, p);
    let available = choose_capped(n_vertices, n_live, count);
    if available < count {
        return Err(ConfigError::InvalidSetting {
            name: "count",
            reason: format!(
                "only {} distinct states with {} of {} vertices live",
                available, n_live, n_vertices
            ),
        }
        .into());
    }

    let mut states = BTreeSet::new();
    while states.len() < count {
        let live = index::sample(rng, n_vertices, n_live);
        states.insert(LiveSet::from_indices(n_vertices, live.into_iter()));
    }
    Ok(states.into_iter().collect())
}
