//! Menu node: item arena, ordered item sets and the URL → item index

use super::definition::{MenuDefinition, MenuItemDefinition};
use super::item::MenuItemNode;
use super::{MenuId, MenuItemId};
use crate::error::{require_qualified, Result, SecurityError};
use crate::index::{AccessIndex, CollisionPolicy};
use crate::order::{precedence, OrderKey, Sequence};
use crate::types::{ActionKind, LocalizedNames, GLOBAL_MODULE_NAME};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, error, trace};

/// A named, ordered group of menu items
///
/// # Layout
///
/// ```text
/// arena:           [item0, item1, item2, ...]   every attached item, any depth
/// roots:           items attached directly to the menu
/// items:           roots + every left-navigation subtree, flattened
/// left_navigation: left-navigation items only
/// url_index:       url / encrypted url → handle, every item, any depth
/// ```
///
/// Parents always sit before their children in the arena.
#[derive(Debug)]
pub struct MenuNode {
    handle: Option<MenuId>,
    id: Option<i64>,
    index: i32,
    display_name: String,
    localized_names: LocalizedNames,
    shortcut_key: Option<String>,
    hot_key: Option<String>,
    url: String,
    encrypted_url: Option<String>,
    module_name: Option<String>,
    page_name: Option<String>,
    arena: Vec<MenuItemNode>,
    roots: BTreeMap<OrderKey, MenuItemId>,
    items: BTreeMap<OrderKey, MenuItemId>,
    left_navigation: BTreeMap<OrderKey, MenuItemId>,
    url_index: AccessIndex<MenuItemId>,
    seq: Sequence,
}

impl MenuNode {
    /// Create an empty menu
    pub fn new(index: i32, display_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::from_header(&MenuDefinition::new(index, display_name, url), CollisionPolicy::default())
    }

    /// Build a menu from a provider definition, attaching all of its items
    pub fn from_definition(definition: MenuDefinition, policy: CollisionPolicy) -> Result<Self> {
        let mut menu = Self::from_header(&definition, policy);
        for item in definition.items {
            menu.attach(item, None)?;
        }
        Ok(menu)
    }

    fn from_header(definition: &MenuDefinition, policy: CollisionPolicy) -> Self {
        Self {
            handle: None,
            id: definition.id,
            index: definition.index,
            display_name: definition.display_name.clone(),
            localized_names: definition.localized_names.clone(),
            shortcut_key: definition.shortcut_key.clone(),
            hot_key: definition.hot_key.clone(),
            url: definition.url.clone(),
            encrypted_url: definition.encrypted_url.clone(),
            module_name: definition.module_name.clone(),
            page_name: definition.page_name.clone(),
            arena: Vec::new(),
            roots: BTreeMap::new(),
            items: BTreeMap::new(),
            left_navigation: BTreeMap::new(),
            url_index: AccessIndex::new(policy),
            seq: Sequence::default(),
        }
    }

    pub fn with_module(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    pub fn with_encrypted_url(mut self, url: impl Into<String>) -> Self {
        self.encrypted_url = Some(url.into());
        self
    }

    /// Attach `item` and its whole sub-item tree under `parent` (or at the
    /// menu root when `parent` is `None`)
    ///
    /// Every node in the subtree is indexed under its trimmed URL and, when
    /// non-blank, its trimmed encrypted URL. Left-navigation items and all of
    /// their descendants are also folded into the menu's master item set.
    ///
    /// # Errors
    ///
    /// - `IllegalState` if any node in the subtree has a blank URL, or if a
    ///   URL collides under [`CollisionPolicy::Reject`]. Nothing is attached.
    /// - `InvalidArgument` if `parent` is not an item of this menu.
    pub fn attach(&mut self, item: MenuItemDefinition, parent: Option<MenuItemId>) -> Result<MenuItemId> {
        trace!("attach: url[{}] parent[{:?}] menu[{}]", item.url, parent, self.url);

        let parent_under_left_navigation = match parent {
            Some(parent) => {
                self.item(parent)
                    .ok_or_else(|| {
                        SecurityError::InvalidArgument(format!(
                            "{:?} is not an item of menu [{}]",
                            parent, self.url
                        ))
                    })?
                    .under_left_navigation
            }
            None => false,
        };

        self.precheck(&item).map_err(|e| {
            error!("Refusing to attach menu item tree to menu [{}]: {}", self.url, e);
            e
        })?;

        let handle = self.attach_subtree(&item, parent, parent_under_left_navigation)?;
        debug!(
            "Attached {} item(s) at {:?} to menu [{}]",
            item.subtree_len(),
            handle,
            self.url
        );
        Ok(handle)
    }

    /// Validate a whole subtree before touching any state
    fn precheck(&self, item: &MenuItemDefinition) -> Result<()> {
        let reject = self.url_index.policy() == CollisionPolicy::Reject;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack = vec![item];

        while let Some(definition) = stack.pop() {
            let url = definition.url.trim();
            if url.is_empty() {
                return Err(SecurityError::IllegalState(format!(
                    "URL of menu item is blank, it must not be. item[{}] index[{}]",
                    definition.display_name, definition.index
                )));
            }

            if reject {
                let encrypted = definition
                    .encrypted_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty());
                for key in std::iter::once(url).chain(encrypted) {
                    if self.url_index.contains(key) || !seen.insert(key) {
                        return Err(SecurityError::IllegalState(format!(
                            "URL [{}] is registered twice in menu [{}]",
                            key, self.url
                        )));
                    }
                }
            }

            stack.extend(definition.sub_items.iter());
        }
        Ok(())
    }

    fn attach_subtree(
        &mut self,
        root: &MenuItemDefinition,
        root_parent: Option<MenuItemId>,
        root_parent_under_left_navigation: bool,
    ) -> Result<MenuItemId> {
        let root_handle = MenuItemId(self.arena.len());
        let mut stack = vec![(root, root_parent, root_parent_under_left_navigation)];

        while let Some((definition, parent, parent_under_left_navigation)) = stack.pop() {
            let handle = MenuItemId(self.arena.len());
            let order = self.seq.key(definition.index);
            let is_left_navigation = definition.action == ActionKind::LeftNavigation;
            let under_left_navigation = parent_under_left_navigation || is_left_navigation;

            self.url_index
                .register(&definition.url, definition.encrypted_url.as_deref(), handle)?;
            self.arena.push(MenuItemNode::from_definition(
                handle,
                order,
                definition,
                parent,
                self.handle,
                under_left_navigation,
            ));

            match parent {
                Some(parent) => {
                    self.arena[parent.0].children.insert(order, handle);
                }
                None => {
                    self.roots.insert(order, handle);
                }
            }
            if parent.is_none() || under_left_navigation {
                self.items.insert(order, handle);
            }
            if is_left_navigation {
                self.left_navigation.insert(order, handle);
            }

            // Reversed so siblings pop, and take sequence numbers, in order
            for sub_item in definition.sub_items.iter().rev() {
                stack.push((sub_item, Some(handle), under_left_navigation));
            }
        }

        Ok(root_handle)
    }

    /// Record this menu's handle in the access tree and back-fill it into
    /// every item
    pub(crate) fn set_handle(&mut self, handle: MenuId) {
        self.handle = Some(handle);
        for item in &mut self.arena {
            item.menu = Some(handle);
        }
    }

    /// Look up an item at any depth by plain or encrypted URL
    ///
    /// The URL is trimmed and matched exactly. A miss is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `url` is blank.
    pub fn find_item_by_url(&self, url: &str) -> Result<Option<&MenuItemNode>> {
        trace!("find_item_by_url: url[{}]", url);
        require_qualified(url, "menu item URL")?;

        let found = self.url_index.get(url).and_then(|handle| self.item(handle));
        debug!(
            "Returning item[{}] for url[{}]",
            found.map(|item| item.url()).unwrap_or("none"),
            url.trim()
        );
        Ok(found)
    }

    pub fn contains_item_for_url(&self, url: &str) -> Result<bool> {
        Ok(self.find_item_by_url(url)?.is_some())
    }

    pub fn item(&self, handle: MenuItemId) -> Option<&MenuItemNode> {
        self.arena.get(handle.0)
    }

    /// Master item set: root items plus every flattened left-navigation
    /// subtree, in order
    pub fn items(&self) -> impl Iterator<Item = &MenuItemNode> + '_ {
        self.resolve(self.items.values())
    }

    pub fn left_navigation_items(&self) -> impl Iterator<Item = &MenuItemNode> + '_ {
        self.resolve(self.left_navigation.values())
    }

    /// Items attached directly to the menu
    pub fn root_items(&self) -> impl Iterator<Item = &MenuItemNode> + '_ {
        self.resolve(self.roots.values())
    }

    pub fn sub_items<'a>(&'a self, item: &'a MenuItemNode) -> impl Iterator<Item = &'a MenuItemNode> + 'a {
        self.resolve(item.children.values())
    }

    /// Path from the menu root down to `handle`, inclusive
    pub fn breadcrumb(&self, handle: MenuItemId) -> Vec<&MenuItemNode> {
        let mut path = Vec::new();
        let mut current = self.item(handle);
        while let Some(item) = current {
            path.push(item);
            current = item.parent.and_then(|parent| self.item(parent));
        }
        path.reverse();
        path
    }

    fn resolve<'a>(
        &'a self,
        handles: impl Iterator<Item = &'a MenuItemId> + 'a,
    ) -> impl Iterator<Item = &'a MenuItemNode> + 'a {
        handles.filter_map(move |handle| self.item(*handle))
    }

    /// Total number of attached items, at any depth
    pub fn item_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of URL keys in the item index
    pub fn indexed_url_count(&self) -> usize {
        self.url_index.len()
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.url_index.policy()
    }

    pub fn is_global_menu(&self) -> bool {
        self.module_name
            .as_deref()
            .map(|module| module.trim().eq_ignore_ascii_case(GLOBAL_MODULE_NAME))
            .unwrap_or(false)
    }

    pub fn handle(&self) -> Option<MenuId> {
        self.handle
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn index(&self) -> i32 {
        self.index
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

    pub fn module_name(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    pub fn page_name(&self) -> Option<&str> {
        self.page_name.as_deref()
    }

    /// Index-only comparison; see [`precedence`]
    pub fn precedence_over(&self, other: &MenuNode) -> Ordering {
        precedence(self.index, other.index)
    }

    /// Reconstruct the provider definition, item trees included
    pub fn to_definition(&self) -> MenuDefinition {
        // Children always come after their parent in the arena, so walking it
        // backwards finishes every subtree before its parent needs it.
        let mut built: Vec<Option<MenuItemDefinition>> = vec![None; self.arena.len()];
        for node in self.arena.iter().rev() {
            let mut definition = node.to_definition();
            definition.sub_items = node
                .children
                .values()
                .filter_map(|child| built[child.0].take())
                .collect();
            built[node.handle.0] = Some(definition);
        }

        MenuDefinition {
            id: self.id,
            index: self.index,
            display_name: self.display_name.clone(),
            localized_names: self.localized_names.clone(),
            shortcut_key: self.shortcut_key.clone(),
            hot_key: self.hot_key.clone(),
            url: self.url.clone(),
            encrypted_url: self.encrypted_url.clone(),
            module_name: self.module_name.clone(),
            page_name: self.page_name.clone(),
            items: self
                .roots
                .values()
                .filter_map(|root| built[root.0].take())
                .collect(),
        }
    }

    /// Deep copy with a freshly built arena and index
    ///
    /// The copy is detached: it carries no access-tree handle.
    pub fn rebuild(&self) -> Result<MenuNode> {
        MenuNode::from_definition(self.to_definition(), self.collision_policy())
    }
}

impl fmt::Display for MenuNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Menu id[{:?}] index[{}] displayName[{}] url[{}] pageName[{}] moduleName[{}]",
            self.id,
            self.index,
            self.display_name,
            self.url,
            self.page_name.as_deref().unwrap_or(""),
            self.module_name.as_deref().unwrap_or("")
        )
    }
}
