//! Error taxonomy for the Tally API client.
//!
//! Every failure a request can produce is normalized into [`ApiError`],
//! following the status-driven taxonomy the backend contract defines:
//! unauthorized (handled by refresh-then-replay before it ever surfaces),
//! forbidden, rate-limited, validation, and server/network errors.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the API client and the CLI around it.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request was rejected with 401 and has not yet been replayed.
    ///
    /// Callers never see this variant: the client converts it into either a
    /// successful replay or [`ApiError::SessionExpired`].
    #[error("unauthorized")]
    Unauthorized,

    /// The session could not be recovered: the refresh call failed, or the
    /// replayed request was rejected with 401 a second time.
    #[error("session expired - please log in again")]
    SessionExpired,

    /// The server rejected the request with 403.
    #[error("permission denied: {message}")]
    Forbidden {
        /// User-facing permission message from the server payload.
        message: String,
    },

    /// The server rejected the request with 429. Terminal: the client does
    /// not block and retry on rate limits.
    #[error("rate limited - retry after {} seconds", retry_after.as_secs())]
    RateLimited {
        /// Wait hint parsed from the `Retry-After` header.
        retry_after: Duration,
    },

    /// A 4xx validation or business error, fields lifted from the backend
    /// error payload.
    #[error("API error {status} ({code}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code from the payload.
        code: String,
        /// Human-readable message from the payload.
        message: String,
        /// Correlation id echoed by the backend, when present.
        request_id: Option<String>,
    },

    /// A 5xx response that survived the retry budget (GET) or occurred on a
    /// non-idempotent request (never retried).
    #[error("server error {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// Network-level failure (connect, timeout, TLS) after retries.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected type.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded (operation or type name).
        context: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An authenticated endpoint was called without a session.
    #[error("not authenticated - run `tally login` first")]
    NotAuthenticated,

    /// Failed to read a local file (session file, import upload).
    #[error("failed to read '{path}': {source}")]
    FileRead {
        /// Path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a local file (session persistence).
    #[error("failed to write '{path}': {source}")]
    FileWrite {
        /// Path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status associated with this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized | Self::SessionExpired => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is worth reporting to the external error sink.
    ///
    /// Server errors indicate backend trouble; everything else is either
    /// expected (validation, permissions) or already terminal for the user.
    pub fn is_reportable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Network(_))
    }
}

/// Result type alias for Tally API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
