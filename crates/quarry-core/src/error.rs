//! Error types for git-hosted content backends.
//!
//! All errors implement the standard `std::error::Error` trait via
//! `thiserror`. Every failure in the backend layer propagates to the
//! caller as a `BackendError`; the layer performs no automatic retries.

use thiserror::Error;

/// Convenience alias used throughout the backend crates.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors produced by a git-hosted content backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend configuration is invalid or incomplete.
    ///
    /// Raised at construction time, before any network call.
    #[error("invalid backend configuration: {0}")]
    Config(String),

    /// An operation was attempted without an active session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The authenticated identity lacks write access to the repository.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The provider API rejected a request, or the network failed.
    ///
    /// `status` is absent for network-level failures. `body` carries the
    /// raw response payload for diagnostics.
    #[error("{provider} API error{}: {message}", status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Api {
        provider: &'static str,
        status: Option<u16>,
        message: String,
        body: Option<String>,
    },

    /// Two write requests in a single persist call target the same path.
    #[error("duplicate target path in commit: {0}")]
    DuplicatePath(String),

    /// A response body could not be decoded as requested.
    #[error("failed to decode content of {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl BackendError {
    /// Creates a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new permission error.
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Creates a new provider API error.
    pub fn api(
        provider: &'static str,
        status: Option<u16>,
        message: impl Into<String>,
        body: Option<String>,
    ) -> Self {
        Self::Api {
            provider,
            status,
            message: message.into(),
            body,
        }
    }

    /// Creates a new decode error.
    pub fn decode(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    ///
    /// Server-side (5xx) and network-level API failures are transient;
    /// configuration, authentication and caller errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => match status {
                Some(code) => *code >= 500,
                None => true,
            },
            _ => false,
        }
    }

    /// Returns true if this error indicates a missing or expired session.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::PermissionDenied(_))
    }
}
