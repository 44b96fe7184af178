//! Detached menu and menu item definitions
//!
//! This is the shape identity providers hand over. Definitions own their
//! sub-items outright; attaching one to a [`MenuNode`](super::MenuNode)
//! moves it into the menu's arena and indexes it.

use crate::types::{ActionKind, LocalizedNames};
use serde::{Deserialize, Serialize};

/// A menu item together with its whole sub-item tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemDefinition {
    #[serde(default)]
    pub id: Option<i64>,

    /// Position among siblings
    #[serde(default)]
    pub index: i32,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub localized_names: LocalizedNames,

    #[serde(default)]
    pub shortcut_key: Option<String>,

    #[serde(default)]
    pub hot_key: Option<String>,

    pub url: String,

    /// Obfuscated alias the browser sees instead of `url`
    #[serde(default)]
    pub encrypted_url: Option<String>,

    pub action: ActionKind,

    /// Evaluated by the page renderer, never by this crate
    #[serde(default)]
    pub visibility_condition: Option<String>,

    #[serde(default)]
    pub sub_items: Vec<MenuItemDefinition>,
}

impl MenuItemDefinition {
    pub fn new(
        index: i32,
        display_name: impl Into<String>,
        url: impl Into<String>,
        action: ActionKind,
    ) -> Self {
        Self {
            id: None,
            index,
            display_name: display_name.into(),
            localized_names: LocalizedNames::new(),
            shortcut_key: None,
            hot_key: None,
            url: url.into(),
            encrypted_url: None,
            action,
            visibility_condition: None,
            sub_items: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_encrypted_url(mut self, url: impl Into<String>) -> Self {
        self.encrypted_url = Some(url.into());
        self
    }

    pub fn with_visibility_condition(mut self, condition: impl Into<String>) -> Self {
        self.visibility_condition = Some(condition.into());
        self
    }

    pub fn with_localized_name(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.localized_names.insert(locale.into(), name.into());
        self
    }

    pub fn with_sub_item(mut self, item: MenuItemDefinition) -> Self {
        self.sub_items.push(item);
        self
    }

    /// Number of items in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self.sub_items.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// A menu header plus, optionally, its item trees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDefinition {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub index: i32,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub localized_names: LocalizedNames,

    #[serde(default)]
    pub shortcut_key: Option<String>,

    #[serde(default)]
    pub hot_key: Option<String>,

    pub url: String,

    #[serde(default)]
    pub encrypted_url: Option<String>,

    /// `"global"` (any case, surrounding blanks ignored) marks a global menu
    #[serde(default)]
    pub module_name: Option<String>,

    #[serde(default)]
    pub page_name: Option<String>,

    #[serde(default)]
    pub items: Vec<MenuItemDefinition>,
}

impl MenuDefinition {
    pub fn new(index: i32, display_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            index,
            display_name: display_name.into(),
            localized_names: LocalizedNames::new(),
            shortcut_key: None,
            hot_key: None,
            url: url.into(),
            encrypted_url: None,
            module_name: None,
            page_name: None,
            items: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_encrypted_url(mut self, url: impl Into<String>) -> Self {
        self.encrypted_url = Some(url.into());
        self
    }

    pub fn with_module(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    pub fn with_item(mut self, item: MenuItemDefinition) -> Self {
        self.items.push(item);
        self
    }

    /// Copy of the header with the item trees left out
    pub fn header(&self) -> MenuDefinition {
        MenuDefinition {
            items: Vec::new(),
            ..self.clone()
        }
    }
}
