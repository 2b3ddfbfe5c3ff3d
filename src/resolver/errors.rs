// Error types for the resolution pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::models::BackendId;

/// Stable machine-readable error codes shared by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidUrl,
    UnsupportedProvider,
    ResolutionFailed,
    InvalidApiKey,
    ApiKeyExpired,
    UsageLimitExceeded,
    CredentialStoreError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "INVALID_URL",
            Self::UnsupportedProvider => "UNSUPPORTED_PROVIDER",
            Self::ResolutionFailed => "RESOLUTION_FAILED",
            Self::InvalidApiKey => "INVALID_API_KEY",
            Self::ApiKeyExpired => "API_KEY_EXPIRED",
            Self::UsageLimitExceeded => "USAGE_LIMIT_EXCEEDED",
            Self::CredentialStoreError => "CREDENTIAL_STORE_ERROR",
        }
    }

    /// HTTP status a transport layer should map this code to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidUrl => 400,
            Self::UnsupportedProvider => 415,
            Self::ResolutionFailed => 502,
            Self::InvalidApiKey | Self::ApiKeyExpired => 401,
            Self::UsageLimitExceeded => 429,
            Self::CredentialStoreError => 503,
        }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ResolutionFailed | Self::CredentialStoreError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const INVALID_URL_MESSAGE: &str =
    "This doesn't look like a valid link. Paste the full address of the video, e.g. https://www.youtube.com/watch?v=...";
pub const RESOLUTION_FAILED_MESSAGE: &str =
    "We couldn't fetch the available formats for this link right now. Please try again in a few minutes.";

/// Failure of URL validation or provider detection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", INVALID_URL_MESSAGE)]
    InvalidUrl { input: String },

    #[error("Links from {host} are not supported yet. Try a link from YouTube, Vimeo, TikTok or another supported site.")]
    UnsupportedProvider { host: String },
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidUrl { .. } => ErrorCode::InvalidUrl,
            Self::UnsupportedProvider { .. } => ErrorCode::UnsupportedProvider,
        }
    }
}

/// Error raised by a single extraction back-end
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// Network timeout while talking to the platform
    #[error("Network timeout: the platform is not responding")]
    NetworkTimeout,

    /// The platform blocked the request (429, bot detection, etc.)
    #[error("Request blocked by the platform: {0}")]
    Blocked(String),

    /// Extraction tool not installed or not on PATH
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The back-end rejected the URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Media is private, removed, geo-blocked, ...
    #[error("Media unavailable: {0}")]
    Unavailable(String),

    /// Failed to parse back-end output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Process spawn/wait failure or timeout
    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Classifies raw tool output (stderr, library error text)
impl From<String> for ExtractionError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::NetworkTimeout;
        }

        if lower.contains("429")
            || lower.contains("sign in to confirm")
            || lower.contains("not a bot")
            || lower.contains("bot detection")
            || lower.contains("blocked")
            || lower.contains("403")
        {
            return Self::Blocked(s);
        }

        if lower.contains("command not found") || lower.contains("no such file") {
            return Self::ToolNotFound(s);
        }

        if lower.contains("unsupported url") || lower.contains("invalid url") {
            return Self::InvalidUrl(s);
        }

        if lower.contains("private video")
            || lower.contains("video unavailable")
            || lower.contains("not available in your country")
            || lower.contains("has been removed")
        {
            return Self::Unavailable(s);
        }

        if lower.contains("json") || lower.contains("parse") {
            return Self::ParseError(s);
        }

        Self::Unknown(s)
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(format!("Invalid JSON: {}", err))
    }
}

/// Error returned by the orchestrator to callers.
///
/// Only carries the validator codes or `RESOLUTION_FAILED`; per back-end
/// errors are kept in `cause` and never become the message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct MediaResolverError {
    pub code: ErrorCode,
    pub message: String,
    /// Back-end that produced `cause`
    pub failed_backend: Option<BackendId>,
    #[source]
    pub cause: Option<ExtractionError>,
}

impl MediaResolverError {
    pub fn resolution_failed(backend: Option<BackendId>, cause: Option<ExtractionError>) -> Self {
        Self {
            code: ErrorCode::ResolutionFailed,
            message: RESOLUTION_FAILED_MESSAGE.to_string(),
            failed_backend: backend,
            cause,
        }
    }
}

impl From<ValidationError> for MediaResolverError {
    fn from(err: ValidationError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            failed_backend: None,
            cause: None,
        }
    }
}
