//! Adapter error taxonomy.
//!
//! Both HTTP adapters (scoring engine and forum) and the reconcile passes
//! surface failures as an `ApiError`. The variants are exactly those the
//! call sites construct: transport faults from `reqwest`, non-success
//! remote responses, decode failures, configuration problems, and lookups
//! that found nothing.

use thiserror::Error;

/// Errors raised by the scoring and forum adapters.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Underlying transport failure (connection, timeout, TLS, …).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote returned a non-success HTTP status.
    #[error("remote error: status {status}: {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body, captured for diagnostics.
        body: String,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A required configuration value was missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A lookup completed but matched nothing.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// True when the error represents a missing remote resource — either an
    /// explicit `NotFound` or a remote `404` status.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound(_) | ApiError::Remote { status: 404, .. }
        )
    }
}
