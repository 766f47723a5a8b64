use std::fmt;

use thiserror::Error;
use upload_core::Failure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    Network,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// Failure reported by a transport after a task reached `uploading`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<TransportError> for Failure {
    fn from(err: TransportError) -> Self {
        let failure = Failure::new(err.to_string());
        match err.kind {
            FailureKind::HttpStatus(code) => failure.with_status(code),
            _ => failure,
        }
    }
}

/// The asynchronous step of a gate failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("gate transform failed: {message}")]
pub struct GateError {
    pub message: String,
}

impl GateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<GateError> for Failure {
    fn from(err: GateError) -> Self {
        Failure::new(err.to_string())
    }
}

/// A suggestion source could not answer a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("suggestion fetch failed: {message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
