//! Error types for wmf-replica.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for replica operations.
#[derive(Error, Debug)]
pub enum ReplicaError {
    /// An argument was rejected before any I/O was attempted
    /// (e.g. an unrecognized output format).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, permission errors, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, missing credentials, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReplicaError {
    /// Creates an invalid-argument error with the given message.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "Invalid Argument",
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
        }
    }
}

/// Result type alias using ReplicaError.
pub type Result<T> = std::result::Result<T, ReplicaError>;
