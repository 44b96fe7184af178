//! In-memory identity provider

use super::{Directory, IdentityProvider, ProviderError, ProviderResult, UserEntry};
use crate::error::ErrorCode;
use crate::identity::UserProfile;
use crate::menu::{MenuDefinition, MenuItemDefinition};
use crate::types::{Application, ApplicationDomain, UserRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const BAD_CREDENTIALS: &str = "Unknown user id or wrong password";

/// A password recovery that was started through the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryRequest {
    pub user_id: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, UserEntry>,
    menus: Vec<MenuDefinition>,
    application_roles: Vec<UserRole>,
    applications: Vec<Application>,
    recovery_requests: Vec<RecoveryRequest>,
}

impl State {
    fn from_directory(directory: Directory) -> Self {
        let mut users = HashMap::with_capacity(directory.users.len());
        for entry in directory.users {
            let user_id = entry.profile.user_id.clone();
            if users.insert(user_id.clone(), entry).is_some() {
                warn!("Duplicate user [{}] in directory, keeping the last entry", user_id);
            }
        }

        Self {
            users,
            menus: directory.menus,
            application_roles: directory.application_roles,
            applications: directory.applications,
            recovery_requests: Vec::new(),
        }
    }

    fn user(&self, user_id: &str) -> ProviderResult<&UserEntry> {
        self.users.get(user_id).ok_or_else(|| {
            ProviderError::application(
                ErrorCode::RESOURCE_NOT_FOUND,
                format!("Unknown user [{}]", user_id),
            )
        })
    }
}

/// Identity provider backed by a [`Directory`] held in memory
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityProvider {
    state: Arc<RwLock<State>>,
}

impl InMemoryIdentityProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_directory(directory: Directory) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::from_directory(directory))),
        }
    }

    /// Swap in a new directory; pending recovery requests are kept
    pub async fn replace(&self, directory: Directory) {
        let mut state = self.state.write().await;
        let recovery_requests = std::mem::take(&mut state.recovery_requests);
        *state = State::from_directory(directory);
        state.recovery_requests = recovery_requests;
    }

    pub async fn add_user(&self, entry: UserEntry) {
        let mut state = self.state.write().await;
        state.users.insert(entry.profile.user_id.clone(), entry);
    }

    pub async fn add_menu(&self, menu: MenuDefinition) {
        self.state.write().await.menus.push(menu);
    }

    pub async fn add_application(&self, application: Application) {
        self.state.write().await.applications.push(application);
    }

    pub async fn add_application_role(&self, role: UserRole) {
        self.state.write().await.application_roles.push(role);
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn menu_count(&self) -> usize {
        self.state.read().await.menus.len()
    }

    /// Recovery requests started so far, oldest first
    pub async fn recovery_requests(&self) -> Vec<RecoveryRequest> {
        self.state.read().await.recovery_requests.clone()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn get_user(&self, user_id: &str, password: &str, application: &str) -> ProviderResult<UserProfile> {
        let state = self.state.read().await;

        let entry = match state.users.get(user_id.trim()) {
            Some(entry) if entry.verify_password(password) => entry,
            _ => {
                return Err(ProviderError::authentication(
                    ErrorCode::AUTHENTICATION_FAILURE,
                    BAD_CREDENTIALS,
                ))
            }
        };

        if entry.profile.account_locked {
            return Err(ProviderError::authentication(
                ErrorCode::ACCOUNT_LOCKED,
                format!("Account [{}] is locked", entry.profile.user_id),
            ));
        }

        if !entry.is_registered_for(application) {
            return Err(ProviderError::authentication(
                ErrorCode::AUTHENTICATION_FAILURE,
                format!(
                    "User [{}] is not registered for application [{}]",
                    entry.profile.user_id, application
                ),
            ));
        }

        debug!("Verified credentials for user [{}]", entry.profile.user_id);
        Ok(entry.profile.clone())
    }

    async fn get_menus(&self, user: &UserProfile) -> ProviderResult<Vec<MenuDefinition>> {
        let granted: BTreeSet<&str> = user
            .domain_roles
            .values()
            .flatten()
            .flat_map(|role| role.menus.iter().map(|url| url.trim()))
            .collect();

        let state = self.state.read().await;
        let menus: Vec<MenuDefinition> = state
            .menus
            .iter()
            .filter(|menu| granted.contains(menu.url.trim()))
            .map(MenuDefinition::header)
            .collect();

        debug!(
            "User [{}] holds {} menus ({} granted urls)",
            user.user_id,
            menus.len(),
            granted.len()
        );
        Ok(menus)
    }

    async fn get_menu_items(&self, menu: &MenuDefinition) -> ProviderResult<Vec<MenuItemDefinition>> {
        let state = self.state.read().await;
        state
            .menus
            .iter()
            .find(|candidate| candidate.url.trim() == menu.url.trim())
            .map(|found| found.items.clone())
            .ok_or_else(|| {
                ProviderError::application(
                    ErrorCode::RESOURCE_NOT_FOUND,
                    format!("Unknown menu [{}]", menu.url),
                )
            })
    }

    async fn get_all_applications(&self) -> ProviderResult<Vec<Application>> {
        Ok(self.state.read().await.applications.clone())
    }

    async fn get_applications(&self, user: &UserProfile) -> ProviderResult<Vec<Application>> {
        let state = self.state.read().await;
        let entry = state.user(&user.user_id)?;

        Ok(state
            .applications
            .iter()
            .filter(|application| entry.is_registered_for(&application.name))
            .cloned()
            .collect())
    }

    async fn get_application_domains(&self, user: &UserProfile) -> ProviderResult<Vec<ApplicationDomain>> {
        let state = self.state.read().await;
        Ok(state.user(&user.user_id)?.domains.clone())
    }

    async fn get_user_roles(&self, user: &UserProfile) -> ProviderResult<Vec<UserRole>> {
        Ok(user.roles_for_current_domain().to_vec())
    }

    async fn get_application_roles(&self) -> ProviderResult<Vec<UserRole>> {
        Ok(self.state.read().await.application_roles.clone())
    }

    async fn start_password_recovery(&self, user_id: &str, email: &str) -> ProviderResult<bool> {
        let mut state = self.state.write().await;

        let matches = state
            .users
            .get(user_id.trim())
            .and_then(|entry| entry.profile.email.as_deref())
            .map(|stored| stored.trim().eq_ignore_ascii_case(email.trim()))
            .unwrap_or(false);

        if matches {
            state.recovery_requests.push(RecoveryRequest {
                user_id: user_id.trim().to_string(),
                requested_at: Utc::now(),
            });
        }
        Ok(matches)
    }
}
