//! Error types for talking to the records API.
//!
//! Network, status and decode failures are kept apart so the event loop can
//! log them precisely; none of them is fatal to the application.

use thiserror::Error;

/// Failures of a single HTTP round-trip against the records collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection, timeout or I/O failure before a response was received.
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON we expected.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The request payload could not be serialized.
    #[error("could not encode request: {0}")]
    Encode(String),
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
