//! Kubernetes API error types.
//!
//! Errors are categorized so the retry logic knows what to do with them:
//!
//! - **Transient** errors are retriable (5xx, 429 throttling, 409 conflicts,
//!   connection failures)
//! - **Permanent** errors will not go away by waiting (403 forbidden, 404 not
//!   found, 422 invalid patch, malformed responses)

use std::fmt;
use thiserror::Error;

/// The kind of Kubernetes API error, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterErrorKind {
    /// Transient error - safe to retry with backoff.
    Transient,

    /// Permanent error - retrying will not help.
    Permanent,
}

impl ClusterErrorKind {
    /// Returns true if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ClusterErrorKind::Transient)
    }

    /// Categorizes an HTTP status returned by the API server.
    pub fn for_status(code: u16) -> Self {
        match code {
            409 | 429 => ClusterErrorKind::Transient,
            code if (500..600).contains(&code) => ClusterErrorKind::Transient,
            _ => ClusterErrorKind::Permanent,
        }
    }
}

/// A Kubernetes API error with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct ClusterApiError {
    pub kind: ClusterErrorKind,

    /// The HTTP status code, if the API server answered.
    pub status_code: Option<u16>,

    /// What the controller was doing when the error occurred.
    pub context: String,

    #[source]
    pub source: Option<kube::Error>,
}

impl fmt::Display for ClusterApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, self.status_code) {
            (Some(source), Some(code)) => {
                write!(f, "{} (HTTP {}): {}", self.context, code, source)
            }
            (Some(source), None) => write!(f, "{}: {}", self.context, source),
            (None, Some(code)) => write!(f, "{} (HTTP {})", self.context, code),
            (None, None) => write!(f, "{}", self.context),
        }
    }
}

impl ClusterApiError {
    /// Categorizes a kube client error.
    pub fn from_kube(context: impl Into<String>, err: kube::Error) -> Self {
        let (kind, status_code) = match &err {
            kube::Error::Api(response) => {
                (ClusterErrorKind::for_status(response.code), Some(response.code))
            }
            kube::Error::SerdeError(_) | kube::Error::BuildRequest(_) => {
                (ClusterErrorKind::Permanent, None)
            }
            // Connection, TLS and service errors
            _ => (ClusterErrorKind::Transient, None),
        };

        Self {
            kind,
            status_code,
            context: context.into(),
            source: Some(err),
        }
    }

    /// Creates a permanent error without a kube source.
    pub fn permanent_without_source(context: impl Into<String>) -> Self {
        Self {
            kind: ClusterErrorKind::Permanent,
            status_code: None,
            context: context.into(),
            source: None,
        }
    }

    /// Creates a transient error without a kube source.
    pub fn transient_without_source(context: impl Into<String>) -> Self {
        Self {
            kind: ClusterErrorKind::Transient,
            status_code: None,
            context: context.into(),
            source: None,
        }
    }
}
