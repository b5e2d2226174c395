use std::fmt;

use thiserror::Error;

/// A failed round trip to the crawl service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds the error for a non-success response, preferring the server's own message.
    pub fn from_status(status: u16, server_message: Option<String>) -> Self {
        let message = server_message
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Self::new(FailureKind::HttpStatus(status), message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus(u16),
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Decode => write!(f, "malformed response"),
        }
    }
}

/// Rejections raised before a job URL is ever sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("url is empty")]
    Empty,
    #[error("invalid url: {0}")]
    Malformed(String),
    #[error("unsupported url scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("`{key}` must be a positive integer, got `{value}`")]
    InvalidNumber { key: String, value: String },
    #[error("unknown sort field `{0}`")]
    UnknownSortField(String),
    #[error("unknown sort order `{0}`")]
    UnknownSortOrder(String),
    #[error("unknown job status `{0}`")]
    UnknownStatus(String),
}
