//! Error types for cutvertex.
//!
//! Only failures that must reach the caller live here. First-run and
//! edge-removal signals are routing decisions, see [`crate::reconcile::FullReason`].

use thiserror::Error;

/// Errors produced by the graph reader, the incremental updater and
/// snapshot/config I/O.
#[derive(Debug, Error)]
pub enum CutVertexError {
    /// The graph text input is unusable. No partial graph is returned.
    #[error("malformed graph input at line {line}: {reason}")]
    MalformedGraphInput { line: usize, reason: String },

    /// Persisted DFS state does not describe the graph it is applied to.
    /// Reconciliation recovers from this with a full recompute.
    #[error("inconsistent persisted state: {0}")]
    InconsistentPersistedState(String),

    /// Snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CutVertexError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        CutVertexError::MalformedGraphInput {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        CutVertexError::InconsistentPersistedState(reason.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CutVertexError>;
