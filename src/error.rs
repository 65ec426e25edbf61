//! Error types for graph construction, simulation, and topology mutation.

use thiserror::Error;

/// Fatal configuration problems. Any of these aborts a run before output is produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// State string does not have one character per vertex.
    #[error("state has length {actual}, graph has {expected} vertices")]
    StateLength { expected: usize, actual: usize },

    /// State string contains something other than '1', '0' or '.'.
    #[error("invalid character {found:?} at position {position} in state")]
    StateChar { position: usize, found: char },

    /// Edge or live-vertex designation names a vertex that does not exist.
    #[error("unknown vertex: {0}")]
    UnknownVertex(String),

    /// Two vertex records share a name.
    #[error("duplicate vertex name: {0}")]
    DuplicateVertex(String),

    /// Edge from a vertex to itself.
    #[error("self-loop on vertex: {0}")]
    SelfLoop(String),

    /// Graph description has no vertices.
    #[error("graph has no vertices")]
    EmptyGraph,

    /// Numeric setting outside its valid range.
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// Errors that can occur in graphlife.
#[derive(Debug, Error)]
pub enum GraphLifeError {
    /// Fatal configuration error.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Entropy requested over a segment with no frames.
    #[error("entropy segment is empty")]
    EmptySegment,

    /// Rejection sampling gave up before the requested number of mutations succeeded.
    #[error("{operation}: gave up after {attempts} attempts with {completed}/{requested} done")]
    RewireExhaustion {
        operation: &'static str,
        completed: usize,
        requested: usize,
        attempts: usize,
    },

    /// Malformed graph description document.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed configuration file.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Reading a description or configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphLifeError>;
