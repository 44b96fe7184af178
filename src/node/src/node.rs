//! Guard node: a facade wired to the configured directory file

use anyhow::{Context, Result};
use menuguard_authz::{
    AuthorizationFacade, Identity, JsonFileProvider, MenuDefinition, MenuItemNode, MenuNode, Rejection,
    SecurityError,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::NodeConfig;

/// A single request to validate
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub user_id: String,
    pub password: String,
    pub application: Option<String>,

    /// Canonical path of the menu
    pub menu_path: String,

    /// Canonical path of an item inside the menu
    pub item_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuSummary {
    pub url: String,
    pub display_name: String,
    pub global: bool,
    pub items: usize,
}

impl From<&MenuNode> for MenuSummary {
    fn from(menu: &MenuNode) -> Self {
        Self {
            url: menu.url().to_string(),
            display_name: menu.display_name().to_string(),
            global: menu.is_global_menu(),
            items: menu.item_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemSummary {
    pub url: String,
    pub display_name: String,
    pub action: String,

    /// Display names from the menu root down to this item
    pub breadcrumb: Vec<String>,
}

impl ItemSummary {
    fn new(menu: &MenuNode, item: &MenuItemNode) -> Self {
        Self {
            url: item.url().to_string(),
            display_name: item.display_name().to_string(),
            action: item.action().to_string(),
            breadcrumb: menu
                .breadcrumb(item.handle())
                .into_iter()
                .map(|node| node.display_name().to_string())
                .collect(),
        }
    }
}

/// Outcome of a [`CheckRequest`]
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub user_id: String,
    pub session_id: Option<Uuid>,
    pub allowed: bool,
    pub rejection: Option<Rejection>,
    pub error: Option<String>,
    pub menu: Option<MenuSummary>,
    pub item: Option<ItemSummary>,
}

impl CheckReport {
    fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            session_id: None,
            allowed: false,
            rejection: None,
            error: None,
            menu: None,
            item: None,
        }
    }

    fn reject(mut self, err: &SecurityError) -> Self {
        self.rejection = Some(err.rejection());
        self.error = Some(err.to_string());
        self
    }
}

/// Menus of one identity, split the way they are displayed
#[derive(Debug, Clone, Serialize)]
pub struct TreeReport {
    pub user_id: String,
    pub page_menus: Vec<MenuDefinition>,
    pub global_menus: Vec<MenuDefinition>,
}

impl From<&Identity> for TreeReport {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id().to_string(),
            page_menus: identity.page_menus().map(MenuNode::to_definition).collect(),
            global_menus: identity.global_menus().map(MenuNode::to_definition).collect(),
        }
    }
}

/// Authorization node serving one directory file
pub struct GuardNode {
    config: NodeConfig,
    provider: Arc<JsonFileProvider>,
    facade: AuthorizationFacade,
}

impl GuardNode {
    /// Open the directory file and build the facade
    pub async fn new(config: NodeConfig) -> Result<Self> {
        let directory = config.directory_path();
        info!("Opening directory file {:?}", directory);

        let provider = Arc::new(
            JsonFileProvider::open(&directory)
                .await
                .with_context(|| format!("Failed to open directory file {:?}", directory))?,
        );
        let facade = AuthorizationFacade::with_config(provider.clone(), config.facade.clone());

        Ok(Self {
            config,
            provider,
            facade,
        })
    }

    pub fn facade(&self) -> &AuthorizationFacade {
        &self.facade
    }

    /// Re-read the directory file
    pub async fn reload(&self) -> Result<()> {
        self.provider
            .reload()
            .await
            .context("Failed to reload directory file")
    }

    fn application<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.config.node.application)
    }

    /// Authenticate and validate a menu path and, optionally, an item path
    ///
    /// Authorization failures are part of the report, not errors.
    pub async fn check(&self, request: &CheckRequest) -> CheckReport {
        let application = self.application(request.application.as_deref());
        let mut report = CheckReport::new(&request.user_id);

        let identity = match self
            .facade
            .authenticate(&request.user_id, &request.password, application)
            .await
        {
            Ok(identity) => identity,
            Err(e) => return report.reject(&e),
        };

        report.session_id = Some(identity.session_id());

        let menu = match self
            .facade
            .validate_request_for_menu(Some(&identity), &request.menu_path)
        {
            Ok(menu) => menu,
            Err(e) => return report.reject(&e),
        };
        report.menu = Some(MenuSummary::from(menu));

        if let Some(item_path) = &request.item_path {
            match self
                .facade
                .validate_request_for_menu_item(Some(&identity), Some(menu), item_path)
            {
                Ok(item) => report.item = Some(ItemSummary::new(menu, item)),
                Err(e) => return report.reject(&e),
            }
        }

        debug!("Request allowed for user [{}]", request.user_id);
        report.allowed = true;
        report
    }

    /// Authenticate and report the identity's access tree
    pub async fn tree(&self, user_id: &str, password: &str, application: Option<&str>) -> Result<TreeReport> {
        let identity = self
            .facade
            .authenticate(user_id, password, self.application(application))
            .await
            .context("Authentication failed")?;

        Ok(TreeReport::from(&identity))
    }
}
