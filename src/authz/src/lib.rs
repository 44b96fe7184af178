//! # Menuguard Authorization Engine
//!
//! Menu and menu-item authorization for request-driven applications.
//!
//! ## Features
//!
//! - **Per-identity access trees** built once at login and frozen
//! - **Flat URL indices**: menu and item lookups are a single map probe,
//!   whatever the nesting depth
//! - **Pluggable identity providers** behind an async trait, with in-memory
//!   and JSON-file implementations
//! - **Request canonicalization** to the form index keys are stored in
//! - **Rejection telemetry** separating "not logged in" from "no rights"
//!
//! ## Example
//!
//! ```rust
//! use menuguard_authz::{AuthorizationFacade, Directory, InMemoryIdentityProvider, UserEntry};
//! use menuguard_authz::menu::{MenuDefinition, MenuItemDefinition};
//! use menuguard_authz::types::{ActionKind, UserRole};
//! use menuguard_authz::identity::UserProfile;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut clerk = UserRole::new(1, "Clerk");
//!     clerk.menus.insert("payables.do".to_string());
//!
//!     let directory = Directory::new()
//!         .with_user(UserEntry::new(UserProfile::new("asha").with_role("default", clerk), "pw"))
//!         .with_menu(MenuDefinition::new(1, "Payables", "payables.do").with_item(
//!             MenuItemDefinition::new(0, "Invoices", "menuItem.do?item-id=6876", ActionKind::LeftNavigation),
//!         ));
//!
//!     let facade = AuthorizationFacade::new(Arc::new(InMemoryIdentityProvider::from_directory(directory)));
//!     let identity = facade.authenticate("asha", "pw", "ledger").await?;
//!
//!     let path = facade.canonicalize_uri("/PB/menuItem.do?item-id=6876&menu=yes");
//!     let menu = facade.validate_request_for_menu(Some(&identity), "payables.do")?;
//!     let item = facade.validate_request_for_menu_item(Some(&identity), Some(menu), &path)?;
//!
//!     println!("Access granted to {}", item.display_name());
//!     Ok(())
//! }
//! ```

pub mod canonical;
pub mod config;
pub mod error;
pub mod facade;
pub mod identity;
pub mod index;
pub mod menu;
pub mod order;
pub mod provider;
pub mod tree;
pub mod types;

// Re-export commonly used types
pub use config::FacadeConfig;
pub use error::{ErrorCode, Rejection, ResourceKind, Result, SecurityError};
pub use facade::{AuthorizationFacade, FacadeStats};
pub use identity::{Identity, UserProfile};
pub use index::{AccessIndex, CollisionPolicy};
pub use menu::{MenuDefinition, MenuId, MenuItemDefinition, MenuItemId, MenuItemNode, MenuNode};
pub use provider::{
    Directory, IdentityProvider, InMemoryIdentityProvider, JsonFileProvider, ProviderError, UserEntry,
};
pub use tree::{AccessTree, AccessTreeBuilder};
pub use types::ActionKind;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
