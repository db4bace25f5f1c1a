//! Unified error types for the `central-publisher` crate.
//!
//! This module centralizes all failures of the publish step and provides a
//! single top-level [`Error`] enum plus the convenient [`Result`] alias.
//! Configuration problems are always reported before any network traffic, so
//! a broken invocation can never half-upload a bundle.

use std::path::PathBuf;

use thiserror::Error;

// --- Build-Time Error ---

/// Errors that can occur while building a [`crate::PublisherClient`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to build the HTTP client (reqwest configuration).
    #[error("Failed to build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The publisher endpoint (default or override) is not a valid URL.
    #[error("Invalid publisher endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

// --- The Main Operational Error Enum ---

/// The crate's top-level error type.
///
/// It groups failures into high-level categories:
/// - [`Error::Config`] — invalid input, caught before any network call
/// - [`Error::Transport`] — the HTTP exchange itself failed
/// - [`Error::Protocol`] — the publisher answered, but not with 201 Created
/// - [`Error::Io`] — reading the bundle from disk failed mid-send
/// - [`Error::Build`] — construction of the client failed
#[derive(Debug, Error)]
pub enum Error {
    /// Input validation failed; no connection was attempted.
    #[error("Invalid upload configuration: {0}")]
    Config(#[from] ConfigError),

    /// Network/protocol failure from reqwest (connect, DNS, TLS, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The publisher returned a status other than 201 Created. Carries the
    /// status and the response body verbatim for operator diagnosis.
    #[error("Publisher rejected the bundle: {status} - {body}")]
    Protocol {
        /// The HTTP status code returned by the publisher.
        status: reqwest::StatusCode,
        /// The response body, unmodified.
        body: String,
    },

    /// Reading the bundle file failed after validation (e.g. it disappeared
    /// between the size check and the send).
    #[error("Failed to read bundle: {0}")]
    Io(#[from] std::io::Error),

    /// Building the client failed (reqwest or endpoint configuration).
    #[error("Client build failed: {0}")]
    Build(#[from] BuildError),
}

impl Error {
    /// Returns true if the failure is one a caller could plausibly retry:
    /// rate limiting (429), service unavailable (503), request timeout (408),
    /// or a transport-level timeout/connect failure.
    ///
    /// This is classification only. The uploader itself never retries, since
    /// a repeated POST against a publishing endpoint risks duplicate
    /// releases; the decision is left to the operator.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Protocol { status, .. } => matches!(status.as_u16(), 408 | 429 | 503),
            Error::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

// --- Configuration Errors ---

/// Invalid inputs, detected before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bundle path does not exist or is not a regular file.
    #[error("bundle file does not exist: {}", .0.display())]
    MissingBundle(PathBuf),

    /// The bundle file exists but is empty; an empty zip is never a valid
    /// publication.
    #[error("bundle file is empty: {}", .0.display())]
    EmptyBundle(PathBuf),

    /// The account id is empty.
    #[error("account id must not be empty")]
    EmptyAccountId,

    /// The account token is empty.
    #[error("account token must not be empty")]
    EmptyAccountToken,
}

/// A specialized `Result` type for `central-publisher` operations.
pub type Result<T> = std::result::Result<T, Error>;
