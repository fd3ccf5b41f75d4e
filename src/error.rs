//! Error types for the learned search strategies.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up a decision strategy.
///
/// All variants are configuration-time failures: once a strategy is
/// constructed, scoring and labeling never fail.
#[derive(Error, Debug)]
pub enum LearnError {
    /// A model or solution file could not be opened.
    #[error("cannot open <{}> for reading: {source}", .path.display())]
    Io {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A reference solution file contained a malformed line.
    #[error("invalid line {line} of solution file <{}>: {reason}", .path.display())]
    SolutionFormat {
        /// Path of the solution file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// A policy model file was empty, truncated, or unparsable.
    #[error("invalid policy model <{}>: {reason}", .path.display())]
    PolicyFormat {
        /// Path of the model file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A required setting was not provided.
    #[error("strategy configuration error: {0}")]
    Config(String),
}

/// Result type for strategy setup.
pub type LearnResult<T> = Result<T, LearnError>;
