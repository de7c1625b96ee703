//! Error types for fetching, extraction, feed parsing and configuration.
//!
//! Every network or extraction failure is mapped onto a [`FailureKind`] before
//! it leaves the crate, so callers can decide between retrying, skipping and
//! flagging a URL for manual attention without inspecting raw HTTP codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified reason a single URL or feed could not be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidUrl,
    /// HTTP 403, usually an anti-bot wall.
    Blocked,
    NotFound,
    RateLimited,
    Timeout,
    Network,
    /// Any other non-2xx status.
    Http,
    Extraction,
    Feed,
    Environment,
}

impl FailureKind {
    /// Whether trying the same URL again later can reasonably succeed.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            FailureKind::RateLimited | FailureKind::Timeout | FailureKind::Network
        )
    }
}

/// Errors raised while retrieving a page or feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("access blocked (HTTP 403), the site is likely rejecting automated requests")]
    Blocked,

    #[error("page not found (HTTP 404)")]
    NotFound,

    #[error("rate limited by the site (HTTP 429), retry later")]
    RateLimited,

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Blocked => FailureKind::Blocked,
            FetchError::NotFound => FailureKind::NotFound,
            FetchError::RateLimited => FailureKind::RateLimited,
            FetchError::Timeout(_) => FailureKind::Timeout,
            FetchError::Network(_) => FailureKind::Network,
            FetchError::Status(_) => FailureKind::Http,
            FetchError::Client(_) => FailureKind::Environment,
        }
    }

    /// Map a non-success status code onto its classified error.
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => FetchError::Blocked,
            404 => FetchError::NotFound,
            429 => FetchError::RateLimited,
            other => FetchError::Status(other),
        }
    }
}

/// Errors raised by the field extractor and the post-extraction validation gate.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The HTML parsing capability failed its startup self-check. Nothing can be
    /// extracted in this environment.
    #[error("HTML parser unavailable: {0}")]
    ParserUnavailable(String),

    #[error("no title could be extracted")]
    EmptyTitle,

    #[error("extracted content too short: {0} characters")]
    ContentTooShort(usize),
}

impl ExtractError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::ParserUnavailable(_) => FailureKind::Environment,
            ExtractError::EmptyTitle | ExtractError::ContentTooShort(_) => FailureKind::Extraction,
        }
    }
}

/// Errors raised while reading an RSS or Atom feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("feed contains no items")]
    NoItems,

    #[error("malformed feed item: {0}")]
    Malformed(String),
}

impl FeedError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FeedError::Fetch(e) => e.kind(),
            FeedError::NoItems | FeedError::Malformed(_) => FailureKind::Feed,
        }
    }
}

/// Errors raised while loading runtime settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(FetchError::from_status(403), FetchError::Blocked));
        assert!(matches!(FetchError::from_status(404), FetchError::NotFound));
        assert!(matches!(FetchError::from_status(429), FetchError::RateLimited));
        assert!(matches!(FetchError::from_status(502), FetchError::Status(502)));
    }

    #[test]
    fn test_blocked_is_not_generic_http() {
        let err = FetchError::from_status(403);
        assert_eq!(err.kind(), FailureKind::Blocked);
        assert!(err.to_string().contains("blocked"));
        assert!(!err.to_string().contains("unexpected HTTP status"));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(FailureKind::RateLimited.is_retryable());
        assert!(FailureKind::Timeout.is_retryable());
        assert!(FailureKind::Network.is_retryable());
        assert!(!FailureKind::Blocked.is_retryable());
        assert!(!FailureKind::NotFound.is_retryable());
        assert!(!FailureKind::Extraction.is_retryable());
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::RateLimited).unwrap();
        assert_eq!(json, "\"rate_limited\"");
    }
}
