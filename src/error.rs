//! Error type shared by the API client, the hooks and the dialog state.
//!
//! Hooks never surface these messages to users directly: failure
//! notifications are generic. The variants exist so callers can tell a
//! "not found" view apart from a transient failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered 404 for the requested entity.
    #[error("{0} not found")]
    NotFound(String),

    /// Any other non-success HTTP status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Input rejected locally before any request was issued.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The same mutation is already in flight.
    #[error("{0} is already in progress")]
    MutationPending(&'static str),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
