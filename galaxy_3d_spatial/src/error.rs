//! Error types for the Galaxy3D spatial index
//!
//! Only lifecycle misuse is an error. Inserting outside the scene, empty
//! query results and capacity/depth overruns are normal outcomes and are
//! reported through return values instead.

use std::fmt;

/// Result type for spatial index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Spatial index errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The tree has no root (never initialized, or shut down)
    NotInitialized,

    /// `initialize` called on a tree that already has a root
    AlreadyInitialized,

    /// Scene bounds rejected at initialization (non-finite or inverted)
    InvalidBounds(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotInitialized => write!(f, "Tree not initialized"),
            Error::AlreadyInitialized => write!(f, "Tree already initialized"),
            Error::InvalidBounds(msg) => write!(f, "Invalid bounds: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
