//! Fetch error type

use std::fmt;
use thiserror::Error;

/// Why a fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection, DNS or TLS failure
    Transport,
    /// The server answered with a non-success status
    Status,
    /// The body was not the expected JSON shape
    Decode,
    /// No response within the configured timeout
    Timeout,
    /// The caller cancelled the request
    Cancelled,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchErrorKind::Transport => "transport error",
            FetchErrorKind::Status => "bad status",
            FetchErrorKind::Decode => "invalid response body",
            FetchErrorKind::Timeout => "timed out",
            FetchErrorKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A failed request against the content API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to fetch {endpoint}: {kind}{}: {message}", status_suffix(.status))]
pub struct FetchError {
    /// Endpoint path relative to `/api/`
    pub endpoint: String,
    /// HTTP status, when a response arrived
    pub status: Option<u16>,
    pub kind: FetchErrorKind,
    /// Human-readable reason
    pub message: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl FetchError {
    pub fn new(endpoint: &str, kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            status: None,
            kind,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub(crate) fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FetchErrorKind::Timeout
        } else if err.is_decode() {
            FetchErrorKind::Decode
        } else {
            FetchErrorKind::Transport
        };
        let error = Self::new(endpoint, kind, err.to_string());
        match err.status() {
            Some(status) => error.with_status(status.as_u16()),
            None => error,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FetchErrorKind::Timeout
    }
}
