//! Error types for taintflow-engine
//!
//! Imprecision is always preferred to failure: missing well-known types,
//! malformed classification metadata, unsupported operand shapes, and
//! exhausted summarization budgets all degrade to conservative values
//! instead of surfacing here. Only cooperative cancellation and a
//! structurally broken input graph produce an `Err`.

use thiserror::Error;

/// Main error type for engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Analysis of one body was cancelled between blocks
    #[error("analysis cancelled")]
    Cancelled,

    /// The input CFG is structurally invalid (dangling edge, missing entry)
    #[error("invalid control flow graph: {0}")]
    InvalidGraph(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
