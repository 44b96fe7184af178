//! Authenticated identity bound to its access tree

use crate::error::Result;
use crate::menu::{MenuItemNode, MenuNode};
use crate::tree::AccessTree;
use crate::types::{UserPreferences, UserRole, DEFAULT_DOMAIN};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

/// User record as delivered by the identity provider
///
/// Carried through unmodified; only the role helpers interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub phone_cell: Option<String>,

    /// Landing page for this user, if any
    #[serde(default)]
    pub home_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default = "default_domain")]
    pub current_domain: String,

    /// Domain name → roles held in that domain
    #[serde(default)]
    pub domain_roles: HashMap<String, Vec<UserRole>>,
    #[serde(default)]
    pub password_expired: bool,
    #[serde(default)]
    pub account_locked: bool,
    #[serde(default)]
    pub temporary_password: bool,

    /// Free-form data an application attaches to its users
    #[serde(default)]
    pub app_specific: HashMap<String, serde_json::Value>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            title: None,
            first_name: None,
            middle_name: None,
            last_name: None,
            email: None,
            phone: None,
            phone_cell: None,
            home_url: None,
            description: None,
            preferences: UserPreferences::default(),
            current_domain: default_domain(),
            domain_roles: HashMap::new(),
            password_expired: false,
            account_locked: false,
            temporary_password: false,
            app_specific: HashMap::new(),
        }
    }

    pub fn with_role(mut self, domain: impl Into<String>, role: UserRole) -> Self {
        self.domain_roles.entry(domain.into()).or_default().push(role);
        self
    }

    pub fn roles_for_domain(&self, domain: &str) -> &[UserRole] {
        self.domain_roles
            .get(domain)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn roles_for_current_domain(&self) -> &[UserRole] {
        self.roles_for_domain(&self.current_domain)
    }

    /// Whether the user holds `role_name` (ASCII case-insensitive) in the
    /// current domain
    pub fn is_in_role(&self, role_name: &str) -> bool {
        self.roles_for_current_domain()
            .iter()
            .any(|role| role.name.eq_ignore_ascii_case(role_name))
    }

    pub fn app_specific(&self, key: &str) -> Option<&serde_json::Value> {
        self.app_specific.get(key)
    }
}

/// An authenticated principal and its frozen access tree
///
/// Cloning is cheap: the tree is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Identity {
    session_id: Uuid,
    authenticated_at: DateTime<Utc>,
    application: String,
    profile: UserProfile,
    tree: Arc<AccessTree>,
}

impl Identity {
    pub fn new(profile: UserProfile, application: impl Into<String>, tree: AccessTree) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            authenticated_at: Utc::now(),
            application: application.into(),
            profile,
            tree: Arc::new(tree),
        }
    }

    /// Correlation id for log lines about this identity
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn user_id(&self) -> &str {
        &self.profile.user_id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn access_tree(&self) -> &AccessTree {
        &self.tree
    }

    /// Shared handle on the tree, for handing to other tasks
    pub fn shared_tree(&self) -> Arc<AccessTree> {
        Arc::clone(&self.tree)
    }

    pub fn menu_for_url(&self, url: &str) -> Result<Option<&MenuNode>> {
        self.tree.find_menu_by_url(url)
    }

    /// Item lookup always goes through the given menu's own index
    pub fn menu_item_for_url<'a>(&self, menu: &'a MenuNode, url: &str) -> Result<Option<&'a MenuItemNode>> {
        menu.find_item_by_url(url)
    }

    pub fn left_navigation_items<'a>(&self, menu: &'a MenuNode) -> impl Iterator<Item = &'a MenuItemNode> + 'a {
        menu.left_navigation_items()
    }

    pub fn page_menus(&self) -> impl Iterator<Item = &MenuNode> + '_ {
        self.tree.page_menus()
    }

    pub fn global_menus(&self) -> impl Iterator<Item = &MenuNode> + '_ {
        self.tree.global_menus()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User id[{}] name[{} {}] session[{}]",
            self.profile.user_id,
            self.profile.first_name.as_deref().unwrap_or(""),
            self.profile.last_name.as_deref().unwrap_or(""),
            self.session_id
        )
    }
}
