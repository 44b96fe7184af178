//! Arena-resident menu item

use super::definition::MenuItemDefinition;
use super::{MenuId, MenuItemId};
use crate::order::{precedence, OrderKey};
use crate::types::{ActionKind, LocalizedNames};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A single authorizable resource inside a menu
///
/// Items live in their menu's arena. Parent and menu links are plain handles
/// filled in by [`MenuNode::attach`](super::MenuNode::attach); the item never
/// owns anything but its child handle set.
#[derive(Debug)]
pub struct MenuItemNode {
    pub(super) handle: MenuItemId,
    pub(super) order: OrderKey,
    id: Option<i64>,
    display_name: String,
    localized_names: LocalizedNames,
    shortcut_key: Option<String>,
    hot_key: Option<String>,
    url: String,
    encrypted_url: Option<String>,
    action: ActionKind,
    visibility_condition: Option<String>,
    pub(super) children: BTreeMap<OrderKey, MenuItemId>,
    pub(super) parent: Option<MenuItemId>,
    pub(super) menu: Option<MenuId>,

    /// Set when this item or an ancestor is a left-navigation item
    pub(super) under_left_navigation: bool,
}

impl MenuItemNode {
    /// Build the node for `definition`, leaving its sub-items behind
    pub(super) fn from_definition(
        handle: MenuItemId,
        order: OrderKey,
        definition: &MenuItemDefinition,
        parent: Option<MenuItemId>,
        menu: Option<MenuId>,
        under_left_navigation: bool,
    ) -> Self {
        Self {
            handle,
            order,
            id: definition.id,
            display_name: definition.display_name.clone(),
            localized_names: definition.localized_names.clone(),
            shortcut_key: definition.shortcut_key.clone(),
            hot_key: definition.hot_key.clone(),
            url: definition.url.clone(),
            encrypted_url: definition.encrypted_url.clone(),
            action: definition.action,
            visibility_condition: definition.visibility_condition.clone(),
            children: BTreeMap::new(),
            parent,
            menu,
            under_left_navigation,
        }
    }

    /// Definition for this node alone, without sub-items
    pub(super) fn to_definition(&self) -> MenuItemDefinition {
        MenuItemDefinition {
            id: self.id,
            index: self.order.index(),
            display_name: self.display_name.clone(),
            localized_names: self.localized_names.clone(),
            shortcut_key: self.shortcut_key.clone(),
            hot_key: self.hot_key.clone(),
            url: self.url.clone(),
            encrypted_url: self.encrypted_url.clone(),
            action: self.action,
            visibility_condition: self.visibility_condition.clone(),
            sub_items: Vec::new(),
        }
    }

    pub fn handle(&self) -> MenuItemId {
        self.handle
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn index(&self) -> i32 {
        self.order.index()
    }

    pub fn order_key(&self) -> OrderKey {
        self.order
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Display name for `locale`, falling back to the default display name
    pub fn localized_name(&self, locale: &str) -> &str {
        self.localized_names
            .get(locale)
            .map(String::as_str)
            .unwrap_or(&self.display_name)
    }

    pub fn shortcut_key(&self) -> Option<&str> {
        self.shortcut_key.as_deref()
    }

    pub fn hot_key(&self) -> Option<&str> {
        self.hot_key.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn encrypted_url(&self) -> Option<&str> {
        self.encrypted_url.as_deref()
    }

    /// URL to render into pages: the encrypted alias
    pub fn web_page_url(&self) -> Option<&str> {
        self.encrypted_url()
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn is_left_navigation(&self) -> bool {
        self.action == ActionKind::LeftNavigation
    }

    pub fn visibility_condition(&self) -> Option<&str> {
        self.visibility_condition.as_deref()
    }

    pub fn parent(&self) -> Option<MenuItemId> {
        self.parent
    }

    /// Handle of the owning menu, once that menu sits in an access tree
    pub fn menu(&self) -> Option<MenuId> {
        self.menu
    }

    /// Child handles in sibling order
    pub fn children(&self) -> impl Iterator<Item = MenuItemId> + '_ {
        self.children.values().copied()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Index-only comparison; see [`precedence`]
    pub fn precedence_over(&self, other: &MenuItemNode) -> Ordering {
        precedence(self.index(), other.index())
    }
}

impl fmt::Display for MenuItemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MenuItem id[{:?}] index[{}] displayName[{}] url[{}] action[{}]",
            self.id,
            self.index(),
            self.display_name,
            self.url,
            self.action
        )
    }
}
