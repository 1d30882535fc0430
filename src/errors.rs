//! Error types for the HSE catalog client
//!
//! `ApiError` is the closed taxonomy surfaced to callers of the catalog API
//! and carried inside session states, so it is cheap to clone and compare.
//! The remaining types describe failures below it (transport) or around it
//! (configuration, CLI plumbing).

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the catalog API client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Non-2xx status or transport-level failure
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// Payload did not match the expected shape
    #[error("Failed to decode response: {reason}")]
    Decoding { reason: String },

    /// Request URL could not be built
    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Catch-all, not expected in practice
    #[error("Unknown error")]
    Unknown,
}

impl ApiError {
    /// Create a network error with a reason
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network {
            reason: reason.into(),
        }
    }

    /// Create a decoding error with a reason
    pub fn decoding(reason: impl Into<String>) -> Self {
        Self::Decoding {
            reason: reason.into(),
        }
    }

    /// Whether repeating the same request could plausibly succeed
    ///
    /// Nothing in the crate retries automatically; this only informs the
    /// caller deciding whether to offer a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Network { .. } => "network",
            ApiError::Decoding { .. } => "decoding",
            ApiError::InvalidUrl { .. } => "invalid_url",
            ApiError::Unknown => "unknown",
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        ApiError::network(error.to_string())
    }
}

/// Failures of the underlying HTTP transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Server answered with a non-success status
    #[error("Server responded with HTTP {status}")]
    InvalidStatus { status: u16 },

    /// Rate limiter could not be configured
    #[error("Invalid rate limit: {reason}")]
    RateLimiter { reason: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format in {path}: {source}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// User configuration directory could not be determined
    #[error("Could not determine user config directory")]
    NoConfigDir,

    /// I/O error reading or writing the configuration
    #[error("Configuration I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Catalog API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Transport error outside of an API call
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Api(e) => e.category(),
            AppError::Transport(_) => "transport",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Catalog API result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Transport result type alias
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
