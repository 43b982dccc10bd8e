//! Unified error handling for slirc-bridge.
//!
//! Connection-level failures never cross the public `connect`/`disconnect`
//! boundary: they become state transitions and host-visible status. Only
//! direct send requests surface errors to the caller.

use crate::config::ValidationError;
use crate::config::validation::describe;
use crate::wire::TransportError;
use thiserror::Error;

/// Errors returned by bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A send was requested while no registered connection exists.
    #[error("not connected")]
    NotConnected,

    #[error("invalid configuration: {}", describe(.0))]
    Config(Vec<ValidationError>),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The bridge has been stopped and no longer accepts work.
    #[error("bridge is stopping")]
    Stopping,
}

impl BridgeError {
    /// Get a static error code string for status labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::Config(_) => "config",
            Self::Transport(TransportError::Timeout(_)) => "timeout",
            Self::Transport(_) => "transport",
            Self::Stopping => "stopping",
        }
    }

    /// Configuration errors are never retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<Vec<ValidationError>> for BridgeError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Config(errors)
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T = ()> = Result<T, BridgeError>;
