//! Menus and menu items
//!
//! Menus own their items in an arena; parent, child and owning-menu links are
//! [`MenuItemId`] / [`MenuId`] handles rather than references, so the
//! parent ↔ child cycle never turns into shared ownership.
//!
//! # Example
//!
//! ```rust
//! use menuguard_authz::menu::{MenuItemDefinition, MenuNode};
//! use menuguard_authz::types::ActionKind;
//!
//! let mut menu = MenuNode::new(1, "Payables", "payables.do");
//! let invoices = MenuItemDefinition::new(0, "Invoices", "invoices.do", ActionKind::LeftNavigation)
//!     .with_sub_item(MenuItemDefinition::new(0, "Edit", "invoice-edit.do", ActionKind::Page));
//! menu.attach(invoices, None).unwrap();
//!
//! // Nested items resolve with a single index lookup
//! let edit = menu.find_item_by_url("invoice-edit.do").unwrap().unwrap();
//! assert_eq!(edit.display_name(), "Edit");
//! ```

mod definition;
mod item;
mod node;

pub use definition::{MenuDefinition, MenuItemDefinition};
pub use item::MenuItemNode;
pub use node::MenuNode;

/// Handle of a menu item inside its menu's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuItemId(pub(crate) usize);

/// Handle of a menu inside its access tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(pub(crate) usize);
