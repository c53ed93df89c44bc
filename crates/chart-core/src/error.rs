// File: crates/chart-core/src/error.rs
// Summary: Error type shared by the engine; everything here is a caller contract violation or config failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    /// Parallel target/value slices passed to the animator differ in length.
    #[error("animation arity mismatch: {targets} targets but {values} values")]
    ArityMismatch { targets: usize, values: usize },

    #[error("indicator period must be at least 1 (got {0})")]
    InvalidPeriod(usize),

    #[error("invalid engine config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;
