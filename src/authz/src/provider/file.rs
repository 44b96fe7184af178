//! Identity provider loaded from a JSON directory file

use super::{Directory, IdentityProvider, InMemoryIdentityProvider, ProviderError, ProviderResult};
use crate::error::ErrorCode;
use crate::identity::UserProfile;
use crate::menu::{MenuDefinition, MenuItemDefinition};
use crate::types::{Application, ApplicationDomain, UserRole};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Identity provider serving a [`Directory`] document read from disk
///
/// The file is read once on [`open`](Self::open) and again on every
/// [`reload`](Self::reload); lookups never touch the filesystem.
///
/// # Example
///
/// ```rust,no_run
/// use menuguard_authz::provider::JsonFileProvider;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = JsonFileProvider::open("directory.json").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
    inner: InMemoryIdentityProvider,
}

impl JsonFileProvider {
    /// Read and parse the directory file
    ///
    /// # Errors
    ///
    /// `ProviderError::Application` if the file cannot be read or is not a
    /// valid directory document.
    pub async fn open(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref().to_path_buf();
        let directory = read_directory(&path).await?;

        Ok(Self {
            path,
            inner: InMemoryIdentityProvider::from_directory(directory),
        })
    }

    /// Re-read the file; on error the previously loaded directory stays in place
    pub async fn reload(&self) -> ProviderResult<()> {
        let directory = read_directory(&self.path).await?;
        self.inner.replace(directory).await;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory view of the loaded directory
    pub fn inner(&self) -> &InMemoryIdentityProvider {
        &self.inner
    }
}

async fn read_directory(path: &Path) -> ProviderResult<Directory> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        ProviderError::with_source(
            ErrorCode::UPSTREAM_FAILURE,
            format!("Failed to read directory file {}", path.display()),
            e,
        )
    })?;

    let directory: Directory = serde_json::from_str(&raw).map_err(|e| {
        ProviderError::with_source(
            ErrorCode::UPSTREAM_FAILURE,
            format!("Failed to parse directory file {}", path.display()),
            e,
        )
    })?;

    info!(
        "Loaded directory {} ({} users, {} menus, {} applications)",
        path.display(),
        directory.users.len(),
        directory.menus.len(),
        directory.applications.len()
    );
    Ok(directory)
}

#[async_trait]
impl IdentityProvider for JsonFileProvider {
    async fn get_user(&self, user_id: &str, password: &str, application: &str) -> ProviderResult<UserProfile> {
        self.inner.get_user(user_id, password, application).await
    }

    async fn get_menus(&self, user: &UserProfile) -> ProviderResult<Vec<MenuDefinition>> {
        self.inner.get_menus(user).await
    }

    async fn get_menu_items(&self, menu: &MenuDefinition) -> ProviderResult<Vec<MenuItemDefinition>> {
        self.inner.get_menu_items(menu).await
    }

    async fn get_all_applications(&self) -> ProviderResult<Vec<Application>> {
        self.inner.get_all_applications().await
    }

    async fn get_applications(&self, user: &UserProfile) -> ProviderResult<Vec<Application>> {
        self.inner.get_applications(user).await
    }

    async fn get_application_domains(&self, user: &UserProfile) -> ProviderResult<Vec<ApplicationDomain>> {
        self.inner.get_application_domains(user).await
    }

    async fn get_user_roles(&self, user: &UserProfile) -> ProviderResult<Vec<UserRole>> {
        self.inner.get_user_roles(user).await
    }

    async fn get_application_roles(&self) -> ProviderResult<Vec<UserRole>> {
        self.inner.get_application_roles().await
    }

    async fn start_password_recovery(&self, user_id: &str, email: &str) -> ProviderResult<bool> {
        self.inner.start_password_recovery(user_id, email).await
    }
}
