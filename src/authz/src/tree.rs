//! Per-identity access tree
//!
//! An [`AccessTree`] is assembled once through an [`AccessTreeBuilder`] and
//! then frozen: it exposes no mutating methods, so a published tree can be
//! shared across any number of concurrent validations without locking.

use crate::error::{require_qualified, Result, SecurityError};
use crate::index::{AccessIndex, CollisionPolicy};
use crate::menu::{MenuDefinition, MenuId, MenuNode};
use crate::order::{OrderKey, Sequence};
use std::collections::BTreeMap;
use tracing::{debug, error, trace};

/// Mutable assembly stage of an [`AccessTree`]
#[derive(Debug)]
pub struct AccessTreeBuilder {
    menus: Vec<MenuNode>,
    page_menus: BTreeMap<OrderKey, MenuId>,
    global_menus: BTreeMap<OrderKey, MenuId>,
    url_index: AccessIndex<MenuId>,
    seq: Sequence,
}

impl AccessTreeBuilder {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            menus: Vec::new(),
            page_menus: BTreeMap::new(),
            global_menus: BTreeMap::new(),
            url_index: AccessIndex::new(policy),
            seq: Sequence::default(),
        }
    }

    /// Attach a menu, filing it under the global or page set once and for all
    ///
    /// # Errors
    ///
    /// `IllegalState` if the menu URL is blank or collides under
    /// [`CollisionPolicy::Reject`].
    pub fn attach_menu(&mut self, mut menu: MenuNode) -> Result<MenuId> {
        trace!("attach_menu: {}", menu);

        if menu.url().trim().is_empty() {
            let err = SecurityError::IllegalState(format!(
                "URL of menu is blank, it must not be. menu[{}]",
                menu
            ));
            error!("{}", err);
            return Err(err);
        }

        let handle = MenuId(self.menus.len());
        self.url_index
            .register(menu.url(), menu.encrypted_url(), handle)?;
        menu.set_handle(handle);

        let key = self.seq.key(menu.index());
        if menu.is_global_menu() {
            self.global_menus.insert(key, handle);
        } else {
            self.page_menus.insert(key, handle);
        }

        debug!(
            "Attached menu [{}] as {:?} (global={}, items={})",
            menu.url(),
            handle,
            menu.is_global_menu(),
            menu.item_count()
        );
        self.menus.push(menu);
        Ok(handle)
    }

    /// Build a menu from its definition and attach it
    pub fn attach_definition(&mut self, definition: MenuDefinition) -> Result<MenuId> {
        let menu = MenuNode::from_definition(definition, self.url_index.policy())?;
        self.attach_menu(menu)
    }

    pub fn menu_count(&self) -> usize {
        self.menus.len()
    }

    /// Freeze the tree
    pub fn build(self) -> AccessTree {
        AccessTree {
            menus: self.menus,
            page_menus: self.page_menus,
            global_menus: self.global_menus,
            url_index: self.url_index,
        }
    }
}

impl Default for AccessTreeBuilder {
    fn default() -> Self {
        Self::new(CollisionPolicy::default())
    }
}

/// Frozen menus of one identity plus the URL → menu index
#[derive(Debug)]
pub struct AccessTree {
    menus: Vec<MenuNode>,
    page_menus: BTreeMap<OrderKey, MenuId>,
    global_menus: BTreeMap<OrderKey, MenuId>,
    url_index: AccessIndex<MenuId>,
}

impl AccessTree {
    pub fn builder(policy: CollisionPolicy) -> AccessTreeBuilder {
        AccessTreeBuilder::new(policy)
    }

    /// A tree with no menus; every lookup misses
    pub fn empty() -> Self {
        AccessTreeBuilder::default().build()
    }

    /// Look up a page or global menu by plain or encrypted URL
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `url` is blank.
    pub fn find_menu_by_url(&self, url: &str) -> Result<Option<&MenuNode>> {
        trace!("find_menu_by_url: url[{}]", url);
        require_qualified(url, "menu URL")?;

        let found = self.url_index.get(url).and_then(|handle| self.menu(handle));
        debug!("Retrieved menu[{:?}] for url[{}]", found.map(MenuNode::url), url.trim());
        Ok(found)
    }

    pub fn menu(&self, handle: MenuId) -> Option<&MenuNode> {
        self.menus.get(handle.0)
    }

    /// Page menus in display order
    pub fn page_menus(&self) -> impl Iterator<Item = &MenuNode> + '_ {
        self.page_menus.values().filter_map(move |handle| self.menu(*handle))
    }

    /// Global menus in display order
    pub fn global_menus(&self) -> impl Iterator<Item = &MenuNode> + '_ {
        self.global_menus.values().filter_map(move |handle| self.menu(*handle))
    }

    /// Every menu, in attach order
    pub fn menus(&self) -> impl Iterator<Item = &MenuNode> + '_ {
        self.menus.iter()
    }

    pub fn menu_count(&self) -> usize {
        self.menus.len()
    }

    /// Items across all menus, at any depth
    pub fn item_count(&self) -> usize {
        self.menus.iter().map(MenuNode::item_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.url_index.policy()
    }

    /// Definitions of every menu, in attach order
    pub fn to_definitions(&self) -> Vec<MenuDefinition> {
        self.menus.iter().map(MenuNode::to_definition).collect()
    }

    /// Deep copy; every menu and index is rebuilt from scratch
    pub fn rebuild(&self) -> Result<AccessTree> {
        let mut builder = AccessTreeBuilder::new(self.collision_policy());
        for menu in &self.menus {
            builder.attach_menu(menu.rebuild()?)?;
        }
        Ok(builder.build())
    }
}
