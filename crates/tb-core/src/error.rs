//! Typed error definitions for tickerbar.
//!
//! Provides [`TbError`] for domain-specific errors that are more informative
//! than plain `anyhow::Error` strings. Provider adapters return it as their
//! failure reason, so a failed batch always says *why* it failed.

use thiserror::Error;

/// Domain-specific errors for tickerbar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TbError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Connection-level HTTP failure (DNS, TLS, reset, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status.
    #[error("unexpected http status {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Response body was not the expected JSON shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Writing a frame to the output sink failed.
    #[error("output error: {0}")]
    Output(String),
}

impl From<std::io::Error> for TbError {
    fn from(err: std::io::Error) -> Self {
        TbError::Output(err.to_string())
    }
}
