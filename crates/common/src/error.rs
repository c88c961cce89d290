//! Error types for stackwait

use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using the stackwait configuration error
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and I/O errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Terminal outcome of a wait that did not succeed.
///
/// `R` is the resource being watched and `E` is the error type of the
/// fetcher that observed it. Fetch errors are carried as-is in
/// [`WaitError::Fetch`] and never retried.
#[derive(Error, Debug)]
pub enum WaitError<R: Debug, E: std::error::Error + 'static> {
    #[error(
        "Timeout after {timeout:?} waiting for {kind} {id} to reach {target} (last status: {})",
        .status.as_deref().unwrap_or("unknown")
    )]
    Timeout {
        kind: &'static str,
        id: String,
        target: String,
        status: Option<String>,
        timeout: Duration,
        resource: R,
    },

    #[error("{kind} {id} transitioned to failure status {status}")]
    Failure {
        kind: &'static str,
        id: String,
        status: String,
        resource: R,
    },

    #[error("{kind} resources have no status field to wait on")]
    Misuse { kind: &'static str },

    #[error("{kind} {id} disappeared while waiting for status {target}")]
    NotFound {
        kind: &'static str,
        id: String,
        target: String,
        resource: R,
    },

    #[error("Wait for {kind} {id} was cancelled")]
    Cancelled {
        kind: &'static str,
        id: String,
        resource: R,
    },

    #[error(transparent)]
    Fetch(E),
}

impl<R: Debug, E: std::error::Error + 'static> WaitError<R, E> {
    /// The last observed resource, when the error carries one
    pub fn resource(&self) -> Option<&R> {
        match self {
            WaitError::Timeout { resource, .. }
            | WaitError::Failure { resource, .. }
            | WaitError::NotFound { resource, .. }
            | WaitError::Cancelled { resource, .. } => Some(resource),
            _ => None,
        }
    }

    /// Consume the error, returning the last observed resource if any
    pub fn into_resource(self) -> Option<R> {
        match self {
            WaitError::Timeout { resource, .. }
            | WaitError::Failure { resource, .. }
            | WaitError::NotFound { resource, .. }
            | WaitError::Cancelled { resource, .. } => Some(resource),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, WaitError::Failure { .. })
    }
}
