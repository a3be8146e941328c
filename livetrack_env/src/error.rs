//! Error types for the LiveTrack environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The subscription was released; no further events can be delivered
    #[error("Subscription closed")]
    SubscriptionClosed,

    /// The share identifier is absent or unusable
    #[error("Invalid share identifier: {0}")]
    InvalidShareId(String),
}

impl EnvError {
    /// Creates an invalid-identifier error.
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidShareId(msg.into())
    }
}
