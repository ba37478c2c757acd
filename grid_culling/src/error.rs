//! Error types for the grid culling engine
//!
//! This module defines the error types used throughout the crate,
//! including renderer failures, configuration problems, query pool
//! misuse, and camera path I/O.

use std::fmt;

/// Result type for grid culling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Grid culling errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Renderer backend error (draw or query submission failed)
    BackendError(String),

    /// Invalid configuration (grid size, tree depth, pool capacity)
    InvalidConfig(String),

    /// More queries were acquired in one traversal than the pool holds
    QueryPoolExhausted {
        /// Number of handles in the pool
        capacity: usize,
    },

    /// Query handle unknown to the renderer or used out of order
    InvalidQuery(String),

    /// File could not be read or written
    Io(String),

    /// Malformed camera path file
    ParseError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::QueryPoolExhausted { capacity } => {
                write!(f, "Query pool exhausted (capacity {})", capacity)
            }
            Error::InvalidQuery(msg) => write!(f, "Invalid query: {}", msg),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
            Error::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
