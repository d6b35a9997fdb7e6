mod http;

pub use http::HttpFetcher;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a transport-level probe failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Connection,
    Redirect,
    InvalidRequest,
    Body,
    Decode,
    Request,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::Redirect => "redirect",
            Self::InvalidRequest => "invalid_request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure before or during delivery of an HTTP response.
///
/// A response with an error status is not a transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Timeout fetching {url}")]
    Timeout { url: String },
    #[error("{kind} error fetching {url}: {reason}")]
    Failed {
        url: String,
        kind: FailureKind,
        reason: String,
    },
}

impl TransportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Failed { kind, .. } => *kind,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } => url,
            Self::Failed { url, .. } => url,
        }
    }
}

/// A fully received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: String,
}

/// Issues a single GET request and reads the whole body.
///
/// Implementations apply their own timeout and must not retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, TransportError>;
}
