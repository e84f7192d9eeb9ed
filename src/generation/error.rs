//! Errors raised by text-generation capabilities.
//!
//! All of these are I^B materialized: whether the provider answers, and what
//! it answers with, is unknown until the call is made. None of them is
//! retried here.

use thiserror::Error;

/// Failure of a single text-generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Request never produced an HTTP response (DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Provider answered with a non-success status.
    #[error("Upstream error {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body, as returned by the provider
        body: String,
    },

    /// Provider answered, but the body could not be turned into a reply.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Capability cannot be used at all (missing API key, no runtime).
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Scripted generator ran out of queued replies.
    #[error("No scripted reply left for {0}")]
    Exhausted(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerationError::MalformedResponse(err.to_string())
        } else {
            GenerationError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::MalformedResponse(format!("JSON parse error: {err}"))
    }
}
