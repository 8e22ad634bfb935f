//! Error type definitions for the lineup service
//!
//! `AppError` is the request-level taxonomy surfaced to callers; `SourceError`
//! describes why a single upstream fetch failed and is carried inside
//! `AppError::UpstreamFetchFailed`.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// No `service` selector was supplied
    #[error("No service type provided")]
    MissingService,

    /// The region selector does not name a region of a partitioned catalog
    #[error("Invalid region {0}")]
    UnknownRegion(String),

    /// A request parameter could not be interpreted
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// The upstream catalog (or a required companion feed) could not be fetched
    #[error("Failed to fetch data for {service}: {source}")]
    UpstreamFetchFailed {
        service: String,
        #[source]
        source: SourceError,
    },

    /// The upstream answered successfully but with nothing usable
    #[error("Upstream payload for {service} is empty")]
    EmptyUpstreamPayload { service: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Upstream fetch specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Redirect chain exceeded the configured limit
    #[error("Too many redirects (limit {limit}): {url}")]
    TooManyRedirects { url: String, limit: usize },

    /// Non-success HTTP status from the upstream
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Transport failures not covered above
    #[error("Request failed: {message}")]
    Request { message: String },

    /// Compressed payload could not be inflated
    #[error("Decompression failed: {message}")]
    Decompression { message: String },

    /// Payload could not be decoded into the expected shape
    #[error("Parse error: {message}")]
    Parse { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Wrap a source error with the service it occurred for
    pub fn upstream<S: Into<String>>(service: S, source: SourceError) -> Self {
        Self::UpstreamFetchFailed {
            service: service.into(),
            source,
        }
    }

    /// Create an invalid-parameter error
    pub fn invalid_parameter<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller is at fault (maps to 400 at the web layer)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingService | Self::UnknownRegion(_) | Self::InvalidParameter { .. }
        )
    }
}

impl SourceError {
    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Classify a reqwest failure for the given URL
    pub fn from_reqwest(error: reqwest::Error, url: &str, redirect_limit: usize) -> Self {
        if error.is_redirect() {
            Self::TooManyRedirects {
                url: url.to_string(),
                limit: redirect_limit,
            }
        } else if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = error.status() {
            Self::Http {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            Self::Request {
                message: error.to_string(),
            }
        }
    }
}
