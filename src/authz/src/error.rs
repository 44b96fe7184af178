//! Error types for the menu authorization engine

use crate::provider::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Numeric error code carried across the provider boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    pub const ILLEGAL_ARGUMENT: ErrorCode = ErrorCode(1001);
    pub const ILLEGAL_STATE: ErrorCode = ErrorCode(1002);
    pub const AUTHENTICATION_FAILURE: ErrorCode = ErrorCode(1101);
    pub const RESOURCE_NOT_FOUND: ErrorCode = ErrorCode(1102);
    pub const ACCOUNT_LOCKED: ErrorCode = ErrorCode(1103);
    pub const UPSTREAM_FAILURE: ErrorCode = ErrorCode(1500);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which kind of navigational resource a lookup missed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Menu,
    MenuItem,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Menu => write!(f, "menu"),
            Self::MenuItem => write!(f, "menu item"),
        }
    }
}

/// What the caller should do with a rejected request
///
/// `RedirectToLogin` and `AccessDenied` are kept apart so that "not logged in"
/// and "logged in without rights" show up separately in telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    RedirectToLogin,
    AccessDenied,
    Fault,
}

/// Authorization engine errors
#[derive(Debug, Error)]
pub enum SecurityError {
    /// A required argument was blank or missing
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No identity, or the identity provider rejected the credentials
    #[error("Authentication failed [{code}]: {message}")]
    AuthenticationFailure {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<ProviderError>,
    },

    /// The canonical path has no menu or menu item in the access tree
    #[error("No {resource} found for URL [{path}]: {message}")]
    ResourceNotFound {
        resource: ResourceKind,
        path: String,
        message: String,
    },

    /// A node was attached without a usable URL, or an index collided
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Any other failure reported by the identity provider
    #[error("Identity provider failure [{code}]: {message}")]
    UpstreamFailure {
        code: ErrorCode,
        message: String,
        #[source]
        source: ProviderError,
    },
}

impl SecurityError {
    /// Authentication failure raised by the engine itself (no provider cause)
    pub fn not_authenticated(message: impl Into<String>) -> Self {
        SecurityError::AuthenticationFailure {
            code: ErrorCode::AUTHENTICATION_FAILURE,
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(resource: ResourceKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        SecurityError::ResourceNotFound {
            resource,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Re-wrap a provider error raised while verifying credentials
    pub fn from_authentication(err: ProviderError) -> Self {
        SecurityError::AuthenticationFailure {
            code: err.code(),
            message: err.message().to_string(),
            source: Some(err),
        }
    }

    /// Re-wrap a provider error raised by any other provider call
    pub fn from_upstream(err: ProviderError) -> Self {
        SecurityError::UpstreamFailure {
            code: err.code(),
            message: err.message().to_string(),
            source: err,
        }
    }

    /// Stable error code, preserved from the provider where one was given
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::ILLEGAL_ARGUMENT,
            Self::AuthenticationFailure { code, .. } => *code,
            Self::ResourceNotFound { .. } => ErrorCode::RESOURCE_NOT_FOUND,
            Self::IllegalState(_) => ErrorCode::ILLEGAL_STATE,
            Self::UpstreamFailure { code, .. } => *code,
        }
    }

    /// Short label for the error kind, used as a telemetry key
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::AuthenticationFailure { .. } => "authentication_failure",
            Self::ResourceNotFound { .. } => "resource_not_found",
            Self::IllegalState(_) => "illegal_state",
            Self::UpstreamFailure { .. } => "upstream_failure",
        }
    }

    /// User-visible outcome of this error
    pub fn rejection(&self) -> Rejection {
        match self {
            Self::AuthenticationFailure { .. } => Rejection::RedirectToLogin,
            Self::ResourceNotFound { .. } => Rejection::AccessDenied,
            Self::InvalidArgument(_) | Self::IllegalState(_) | Self::UpstreamFailure { .. } => {
                Rejection::Fault
            }
        }
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, SecurityError>;

/// Fail with `InvalidArgument` when `value` is empty after trimming
pub(crate) fn require_qualified(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SecurityError::InvalidArgument(format!(
            "{} must not be blank",
            what
        )));
    }
    Ok(())
}
