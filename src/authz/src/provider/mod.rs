//! Identity provider boundary
//!
//! The facade never talks to a user store directly. Everything it knows about
//! a user (profile, menus, items, roles, domains) comes through the
//! [`IdentityProvider`] trait, which is injected at construction time.

mod directory;
mod file;
mod memory;

pub use directory::{password_digest, Directory, UserEntry};
pub use file::JsonFileProvider;
pub use memory::{InMemoryIdentityProvider, RecoveryRequest};

use crate::error::ErrorCode;
use crate::identity::UserProfile;
use crate::menu::{MenuDefinition, MenuItemDefinition};
use crate::types::{Application, ApplicationDomain, UserRole};
use async_trait::async_trait;
use thiserror::Error;

/// Error reported by an identity provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Credentials were refused
    #[error("[{code}] {message}")]
    Authentication { code: ErrorCode, message: String },

    /// Any other provider failure (I/O, malformed data, lookup errors)
    #[error("[{code}] {message}")]
    Application {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ProviderError {
    pub fn authentication(code: ErrorCode, message: impl Into<String>) -> Self {
        ProviderError::Authentication {
            code,
            message: message.into(),
        }
    }

    pub fn application(code: ErrorCode, message: impl Into<String>) -> Self {
        ProviderError::Application {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Application error wrapping an underlying cause
    pub fn with_source<E>(code: ErrorCode, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ProviderError::Application {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Authentication { code, .. } | Self::Application { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Authentication { message, .. } | Self::Application { message, .. } => message,
        }
    }
}

/// Result type for provider calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Source of users, their menus and the surrounding directory data
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify credentials and return the user's profile
    async fn get_user(&self, user_id: &str, password: &str, application: &str) -> ProviderResult<UserProfile>;

    /// Menu headers granted to the user across all of their roles
    async fn get_menus(&self, user: &UserProfile) -> ProviderResult<Vec<MenuDefinition>>;

    /// Top-level items of a menu, each carrying its full sub-item tree
    async fn get_menu_items(&self, menu: &MenuDefinition) -> ProviderResult<Vec<MenuItemDefinition>>;

    async fn get_all_applications(&self) -> ProviderResult<Vec<Application>>;

    /// Applications the user is registered for
    async fn get_applications(&self, user: &UserProfile) -> ProviderResult<Vec<Application>>;

    async fn get_application_domains(&self, user: &UserProfile) -> ProviderResult<Vec<ApplicationDomain>>;

    /// Roles the user holds in their current domain
    async fn get_user_roles(&self, user: &UserProfile) -> ProviderResult<Vec<UserRole>>;

    /// Every role the application defines
    async fn get_application_roles(&self) -> ProviderResult<Vec<UserRole>>;

    /// Begin password recovery; `false` when the user id and email do not match
    async fn start_password_recovery(&self, user_id: &str, email: &str) -> ProviderResult<bool>;
}
