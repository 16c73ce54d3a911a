//! Graph store error types

use thiserror::Error;

/// Errors reported by a graph store backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The transaction lost an optimistic-concurrency conflict
    #[error("Transaction aborted: {0}")]
    Aborted(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The store understood the request and refused it
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn aborted<S: Into<String>>(msg: S) -> Self {
        Self::Aborted(msg.into())
    }

    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    pub fn rejected<S: Into<String>>(msg: S) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Check if the error is a transaction conflict worth retrying
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
