//! Error types for fleetgrep

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Input Errors ===
    #[error("pattern is empty after trimming")]
    EmptyPattern,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Per-node Errors ===
    #[error("failed to connect to {node} at {address}: {reason}")]
    NodeUnreachable {
        node: String,
        address: String,
        reason: String,
    },

    #[error("query timed out on {node} after {timeout:?}")]
    NodeTimeout { node: String, timeout: Duration },

    // === Engine Errors ===
    #[error("engine execution failed: {0}")]
    Engine(String),

    // === Network Errors ===
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    // === Generic ===
    #[error("{0}")]
    Other(String),
}

// Implement From for common error types
impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
