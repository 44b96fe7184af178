//! Authorization facade: authentication and per-request validation
//!
//! # Request states
//!
//! ```text
//! Unauthenticated ──authenticate──▶ Authenticated ──menu──▶ MenuResolved ──item──▶ MenuItemResolved
//!        │                               │                       │
//!        └───────────────────────────────┴───────────────────────┴──▶ Rejected
//! ```
//!
//! The facade holds no per-user state. Everything a validation needs lives in
//! the [`Identity`] returned by [`AuthorizationFacade::authenticate`].

mod stats;

pub use stats::{FacadeStats, StatsCollector};

use crate::canonical;
use crate::config::FacadeConfig;
use crate::error::{require_qualified, ResourceKind, Result, SecurityError};
use crate::identity::{Identity, UserProfile};
use crate::menu::{MenuItemNode, MenuNode};
use crate::provider::IdentityProvider;
use crate::tree::AccessTree;
use crate::types::{Application, ApplicationDomain, UserRole};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, trace};

const NOT_LOGGED_IN: &str = "Not authorized to access the resource, user is not logged in";
const NO_MENU_RIGHTS: &str = "User does not have rights on the requested menu";
const NO_ITEM_RIGHTS: &str = "User does not have rights on the requested menu item";
const NO_CURRENT_MENU: &str = "No current menu to resolve the menu item against";

/// Entry point for authenticating users and validating their requests
///
/// # Example
///
/// ```rust
/// use menuguard_authz::facade::AuthorizationFacade;
/// use menuguard_authz::provider::{Directory, InMemoryIdentityProvider, UserEntry};
/// use menuguard_authz::identity::UserProfile;
/// use menuguard_authz::menu::MenuDefinition;
/// use menuguard_authz::types::UserRole;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let mut clerk = UserRole::new(1, "Clerk");
/// clerk.menus.insert("payables.do".to_string());
///
/// let directory = Directory::new()
///     .with_user(UserEntry::new(UserProfile::new("asha").with_role("default", clerk), "pw"))
///     .with_menu(MenuDefinition::new(1, "Payables", "payables.do"));
///
/// let facade = AuthorizationFacade::new(Arc::new(InMemoryIdentityProvider::from_directory(directory)));
/// let identity = facade.authenticate("asha", "pw", "ledger").await.unwrap();
///
/// let menu = facade.validate_request_for_menu(Some(&identity), "payables.do").unwrap();
/// assert_eq!(menu.display_name(), "Payables");
/// # });
/// ```
pub struct AuthorizationFacade {
    /// Source of users and their menus
    provider: Arc<dyn IdentityProvider>,

    /// Resolution and rejection counters (if enabled)
    stats: Option<Arc<StatsCollector>>,

    config: FacadeConfig,
}

impl AuthorizationFacade {
    /// Create a facade with the default configuration
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::with_config(provider, FacadeConfig::default())
    }

    /// Create a facade with the given configuration
    ///
    /// # Arguments
    ///
    /// * `provider` - Identity provider consulted on authentication and by
    ///   the pass-through operations
    /// * `config` - Collision policy and stats switch
    pub fn with_config(provider: Arc<dyn IdentityProvider>, config: FacadeConfig) -> Self {
        let stats = if config.enable_stats {
            Some(Arc::new(StatsCollector::new()))
        } else {
            None
        };

        info!(
            "AuthorizationFacade initialized with collision_policy={:?}, stats={}",
            config.collision_policy, config.enable_stats
        );

        Self {
            provider,
            stats,
            config,
        }
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// Snapshot of the counters, `None` when stats are disabled
    pub fn stats(&self) -> Option<FacadeStats> {
        self.stats.as_ref().map(|stats| stats.snapshot())
    }

    /// Verify credentials and build the user's access tree
    ///
    /// # Pipeline
    ///
    /// 1. Verify the credentials with the provider
    /// 2. Fetch the user's menus
    /// 3. Fetch the items of every menu concurrently
    /// 4. Attach everything to a fresh access tree and freeze it
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `user_id` or `password` is blank
    /// - `AuthenticationFailure` if the provider refuses the credentials; the
    ///   provider's code and message are kept and its error is the source
    /// - `UpstreamFailure` if fetching menus or items fails
    /// - `IllegalState` if a menu or item arrives without a URL
    pub async fn authenticate(&self, user_id: &str, password: &str, application: &str) -> Result<Identity> {
        trace!(
            "authenticate: user_id[{}] password_present[{}] application[{}]",
            user_id,
            !password.is_empty(),
            application
        );

        let result = self.authenticate_inner(user_id, password, application).await;
        self.observe(&result, StatsCollector::record_authentication);
        result
    }

    async fn authenticate_inner(&self, user_id: &str, password: &str, application: &str) -> Result<Identity> {
        require_qualified(user_id, "user id")?;
        require_qualified(password, "password")?;

        let profile = self
            .provider
            .get_user(user_id.trim(), password, application)
            .await
            .map_err(|e| {
                info!("Authentication refused for user [{}]: {}", user_id.trim(), e);
                SecurityError::from_authentication(e)
            })?;

        let tree = self.assemble_tree(&profile).await?;
        let identity = Identity::new(profile, application, tree);

        info!(
            "Authenticated {} ({} menus, {} items)",
            identity,
            identity.access_tree().menu_count(),
            identity.access_tree().item_count()
        );
        Ok(identity)
    }

    /// Build the frozen access tree for a verified user
    async fn assemble_tree(&self, profile: &UserProfile) -> Result<AccessTree> {
        let menus = self
            .provider
            .get_menus(profile)
            .await
            .map_err(SecurityError::from_upstream)?;
        debug!("Provider returned {} menus for user [{}]", menus.len(), profile.user_id);

        let provider = &self.provider;
        let items = try_join_all(menus.iter().map(|menu| provider.get_menu_items(menu)))
            .await
            .map_err(SecurityError::from_upstream)?;

        let mut builder = AccessTree::builder(self.config.collision_policy);
        for (mut menu, items) in menus.into_iter().zip(items) {
            menu.items = items;
            builder.attach_definition(menu)?;
        }
        Ok(builder.build())
    }

    /// Resolve the menu a canonical request path belongs to
    ///
    /// The identity is checked before the path: a missing identity always
    /// means "log in first", whatever the path looks like.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailure` if `identity` is `None`
    /// - `InvalidArgument` if `path` is blank
    /// - `ResourceNotFound` (menu) if the identity holds no menu for `path`
    pub fn validate_request_for_menu<'a>(&self, identity: Option<&'a Identity>, path: &str) -> Result<&'a MenuNode> {
        trace!("validate_request_for_menu: path[{}]", path);

        let result = Self::resolve_menu(identity, path);
        self.observe(&result, StatsCollector::record_menu_resolved);
        result
    }

    fn resolve_menu<'a>(identity: Option<&'a Identity>, path: &str) -> Result<&'a MenuNode> {
        let identity = identity.ok_or_else(|| SecurityError::not_authenticated(NOT_LOGGED_IN))?;
        require_qualified(path, "request path")?;

        match identity.menu_for_url(path)? {
            Some(menu) => {
                debug!("User [{}] resolved menu [{}] for path [{}]", identity.user_id(), menu.url(), path);
                Ok(menu)
            }
            None => {
                let err = SecurityError::not_found(ResourceKind::Menu, path.trim(), NO_MENU_RIGHTS);
                info!("User [{}] session[{}]: {}", identity.user_id(), identity.session_id(), err);
                Err(err)
            }
        }
    }

    /// Resolve a menu item inside an already resolved menu
    ///
    /// Only one of `identity` and `menu` needs to be present. When `menu` is
    /// given, the lookup runs against its own item index even without an
    /// identity.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailure` if both `identity` and `menu` are `None`
    /// - `ResourceNotFound` (menu) if only the identity is given
    /// - `InvalidArgument` if `path` is blank
    /// - `ResourceNotFound` (menu item) if the menu holds no item for `path`
    pub fn validate_request_for_menu_item<'a>(
        &self,
        identity: Option<&Identity>,
        menu: Option<&'a MenuNode>,
        path: &str,
    ) -> Result<&'a MenuItemNode> {
        trace!(
            "validate_request_for_menu_item: path[{}] menu[{:?}]",
            path,
            menu.map(MenuNode::url)
        );

        let result = Self::resolve_menu_item(identity, menu, path);
        self.observe(&result, StatsCollector::record_item_resolved);
        result
    }

    fn resolve_menu_item<'a>(
        identity: Option<&Identity>,
        menu: Option<&'a MenuNode>,
        path: &str,
    ) -> Result<&'a MenuItemNode> {
        let menu = match (identity, menu) {
            (None, None) => return Err(SecurityError::not_authenticated(NOT_LOGGED_IN)),
            (_, Some(menu)) => menu,
            (Some(_), None) => {
                return Err(SecurityError::not_found(ResourceKind::Menu, path.trim(), NO_CURRENT_MENU))
            }
        };
        require_qualified(path, "request path")?;

        match menu.find_item_by_url(path)? {
            Some(item) => {
                debug!("Resolved menu item [{}] in menu [{}]", item.url(), menu.url());
                Ok(item)
            }
            None => {
                let err = SecurityError::not_found(ResourceKind::MenuItem, path.trim(), NO_ITEM_RIGHTS);
                info!(
                    "User [{}] menu[{}]: {}",
                    identity.map(Identity::user_id).unwrap_or("<none>"),
                    menu.url(),
                    err
                );
                Err(err)
            }
        }
    }

    /// See [`canonical::canonicalize_request_path`]
    pub fn canonicalize_request_path(&self, raw_path: &str, raw_query: Option<&str>) -> String {
        canonical::canonicalize_request_path(raw_path, raw_query)
    }

    /// See [`canonical::canonicalize_uri`]
    pub fn canonicalize_uri(&self, complete: &str) -> String {
        canonical::canonicalize_uri(complete)
    }

    // ========================================================================
    // Provider pass-through
    // ========================================================================

    pub async fn application_domains(&self, identity: &Identity) -> Result<Vec<ApplicationDomain>> {
        trace!("application_domains: user[{}]", identity.user_id());
        self.provider
            .get_application_domains(identity.profile())
            .await
            .map_err(SecurityError::from_upstream)
    }

    /// Roles the identity holds in its current domain
    pub async fn user_roles(&self, identity: &Identity) -> Result<Vec<UserRole>> {
        trace!("user_roles: user[{}]", identity.user_id());
        self.provider
            .get_user_roles(identity.profile())
            .await
            .map_err(SecurityError::from_upstream)
    }

    pub async fn application_roles(&self) -> Result<Vec<UserRole>> {
        self.provider
            .get_application_roles()
            .await
            .map_err(SecurityError::from_upstream)
    }

    pub async fn applications(&self, identity: &Identity) -> Result<Vec<Application>> {
        trace!("applications: user[{}]", identity.user_id());
        self.provider
            .get_applications(identity.profile())
            .await
            .map_err(SecurityError::from_upstream)
    }

    pub async fn all_applications(&self) -> Result<Vec<Application>> {
        self.provider
            .get_all_applications()
            .await
            .map_err(SecurityError::from_upstream)
    }

    /// Start password recovery for a user
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if either argument is blank.
    pub async fn start_password_recovery(&self, user_id: &str, email: &str) -> Result<bool> {
        trace!("start_password_recovery: user_id[{}] email[{}]", user_id, email);
        require_qualified(user_id, "user id")?;
        require_qualified(email, "email")?;

        self.provider
            .start_password_recovery(user_id.trim(), email.trim())
            .await
            .map_err(SecurityError::from_upstream)
    }

    fn observe<T>(&self, result: &Result<T>, on_success: fn(&StatsCollector)) {
        if let Some(stats) = &self.stats {
            match result {
                Ok(_) => on_success(stats),
                Err(err) => stats.record_rejection(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, Rejection};
    use crate::menu::{MenuDefinition, MenuItemDefinition};
    use crate::provider::{Directory, InMemoryIdentityProvider, UserEntry};
    use crate::types::ActionKind;

    fn facade() -> AuthorizationFacade {
        let mut clerk = UserRole::new(1, "Clerk");
        clerk.menus.insert("payables.do".to_string());
        clerk.menus.insert("home.do".to_string());

        let directory = Directory::new()
            .with_user(UserEntry::new(UserProfile::new("asha").with_role("default", clerk), "pw"))
            .with_menu(
                MenuDefinition::new(1, "Payables", "payables.do")
                    .with_encrypted_url("m-1")
                    .with_item(
                        MenuItemDefinition::new(0, "Invoices", "invoices.do", ActionKind::LeftNavigation)
                            .with_sub_item(MenuItemDefinition::new(
                                0,
                                "Edit",
                                "menuItem.do?item-id=6876",
                                ActionKind::Page,
                            )),
                    ),
            )
            .with_menu(MenuDefinition::new(0, "Home", "home.do").with_module("global"))
            .with_menu(MenuDefinition::new(2, "Admin", "admin.do"));

        AuthorizationFacade::new(Arc::new(InMemoryIdentityProvider::from_directory(directory)))
    }

    #[tokio::test]
    async fn test_authenticate_builds_tree() {
        let facade = facade();
        let identity = facade.authenticate("asha", "pw", "ledger").await.unwrap();

        assert_eq!(identity.user_id(), "asha");
        assert_eq!(identity.access_tree().menu_count(), 2);
        assert_eq!(identity.global_menus().count(), 1);
        assert_eq!(identity.access_tree().item_count(), 2);
    }

    #[tokio::test]
    async fn test_blank_credentials_are_invalid_arguments() {
        let facade = facade();

        let err = facade.authenticate(" ", "pw", "ledger").await.unwrap_err();
        assert!(matches!(err, SecurityError::InvalidArgument(_)));

        let err = facade.authenticate("asha", "", "ledger").await.unwrap_err();
        assert!(matches!(err, SecurityError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_bad_password_keeps_provider_code() {
        let facade = facade();
        let err = facade.authenticate("asha", "wrong", "ledger").await.unwrap_err();

        assert!(matches!(err, SecurityError::AuthenticationFailure { source: Some(_), .. }));
        assert_eq!(err.code(), ErrorCode::AUTHENTICATION_FAILURE);
    }

    #[tokio::test]
    async fn test_menu_and_item_resolution() {
        let facade = facade();
        let identity = facade.authenticate("asha", "pw", "ledger").await.unwrap();

        let path = facade.canonicalize_uri("/PB/menuItem.do?item-id=6876&menu=yes");
        let menu = facade.validate_request_for_menu(Some(&identity), "m-1").unwrap();
        let item = facade
            .validate_request_for_menu_item(Some(&identity), Some(menu), &path)
            .unwrap();

        assert_eq!(menu.url(), "payables.do");
        assert_eq!(item.display_name(), "Edit");
    }

    #[tokio::test]
    async fn test_missing_identity_wins_over_bad_path() {
        let facade = facade();

        for path in ["", "  ", "payables.do", "unknown.do"] {
            let err = facade.validate_request_for_menu(None, path).unwrap_err();
            assert_eq!(err.rejection(), Rejection::RedirectToLogin, "path {:?}", path);
        }
    }

    #[tokio::test]
    async fn test_unknown_menu_is_not_found() {
        let facade = facade();
        let identity = facade.authenticate("asha", "pw", "ledger").await.unwrap();

        let err = facade
            .validate_request_for_menu(Some(&identity), "admin.do")
            .unwrap_err();
        assert!(matches!(
            err,
            SecurityError::ResourceNotFound { resource: ResourceKind::Menu, ref path, .. } if path == "admin.do"
        ));

        let err = facade.validate_request_for_menu(Some(&identity), " ").unwrap_err();
        assert!(matches!(err, SecurityError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_item_lookup_argument_combinations() {
        let facade = facade();
        let identity = facade.authenticate("asha", "pw", "ledger").await.unwrap();
        let menu = facade.validate_request_for_menu(Some(&identity), "payables.do").unwrap();

        let err = facade
            .validate_request_for_menu_item(None, None, "invoices.do")
            .unwrap_err();
        assert_eq!(err.rejection(), Rejection::RedirectToLogin);

        // A resolved menu is enough on its own
        let item = facade
            .validate_request_for_menu_item(None, Some(menu), "invoices.do")
            .unwrap();
        assert_eq!(item.display_name(), "Invoices");

        let err = facade
            .validate_request_for_menu_item(Some(&identity), None, "invoices.do")
            .unwrap_err();
        assert!(matches!(
            err,
            SecurityError::ResourceNotFound { resource: ResourceKind::Menu, .. }
        ));

        let err = facade
            .validate_request_for_menu_item(Some(&identity), Some(menu), "nothing.do")
            .unwrap_err();
        assert!(matches!(
            err,
            SecurityError::ResourceNotFound { resource: ResourceKind::MenuItem, .. }
        ));
    }

    #[tokio::test]
    async fn test_stats_separate_outcomes() {
        let facade = facade();
        let identity = facade.authenticate("asha", "pw", "ledger").await.unwrap();

        let _ = facade.validate_request_for_menu(Some(&identity), "payables.do");
        let _ = facade.validate_request_for_menu(None, "payables.do");
        let _ = facade.validate_request_for_menu(Some(&identity), "admin.do");

        let stats = facade.stats().unwrap();
        assert_eq!(stats.authentications, 1);
        assert_eq!(stats.menus_resolved, 1);
        assert_eq!(stats.redirects_to_login, 1);
        assert_eq!(stats.access_denied, 1);
    }

    #[tokio::test]
    async fn test_stats_can_be_disabled() {
        let config = FacadeConfig {
            enable_stats: false,
            ..FacadeConfig::default()
        };
        let facade = AuthorizationFacade::with_config(Arc::new(InMemoryIdentityProvider::new()), config);

        assert!(facade.stats().is_none());
    }

    #[tokio::test]
    async fn test_password_recovery_requires_arguments() {
        let facade = facade();

        let err = facade.start_password_recovery("asha", " ").await.unwrap_err();
        assert!(matches!(err, SecurityError::InvalidArgument(_)));
        assert!(!facade.start_password_recovery("asha", "a@b.c").await.unwrap());
    }
}
