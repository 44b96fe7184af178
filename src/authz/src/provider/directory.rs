//! Serializable directory document shared by the bundled providers

use crate::identity::UserProfile;
use crate::menu::MenuDefinition;
use crate::types::{Application, ApplicationDomain, UserRole};
use serde::{Deserialize, Serialize};

/// Hex BLAKE3 digest of a password, as stored in [`UserEntry::password_digest`]
pub fn password_digest(password: &str) -> String {
    blake3::hash(password.as_bytes()).to_hex().to_string()
}

/// A user together with the credential and registrations the provider keeps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub profile: UserProfile,

    /// Hex BLAKE3 digest of the password
    pub password_digest: String,

    /// Application names the user may log in to; empty means all of them
    #[serde(default)]
    pub applications: Vec<String>,
    #[serde(default)]
    pub domains: Vec<ApplicationDomain>,
}

impl UserEntry {
    pub fn new(profile: UserProfile, password: &str) -> Self {
        Self {
            profile,
            password_digest: password_digest(password),
            applications: Vec::new(),
            domains: Vec::new(),
        }
    }

    pub fn with_application(mut self, name: impl Into<String>) -> Self {
        self.applications.push(name.into());
        self
    }

    pub fn with_domain(mut self, domain: ApplicationDomain) -> Self {
        self.domains.push(domain);
        self
    }

    /// Compare against the stored digest; a malformed digest never matches
    pub fn verify_password(&self, password: &str) -> bool {
        match blake3::Hash::from_hex(self.password_digest.trim()) {
            // blake3::Hash equality is constant-time
            Ok(stored) => stored == blake3::hash(password.as_bytes()),
            Err(_) => false,
        }
    }

    pub fn is_registered_for(&self, application: &str) -> bool {
        self.applications.is_empty()
            || self
                .applications
                .iter()
                .any(|name| name.eq_ignore_ascii_case(application))
    }
}

/// Everything a provider serves: users, menus with their item trees,
/// application roles and applications
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub users: Vec<UserEntry>,

    /// Full menu definitions; the provider hands out headers and items separately
    #[serde(default)]
    pub menus: Vec<MenuDefinition>,
    #[serde(default)]
    pub application_roles: Vec<UserRole>,
    #[serde(default)]
    pub applications: Vec<Application>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserEntry) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_menu(mut self, menu: MenuDefinition) -> Self {
        self.menus.push(menu);
        self
    }

    pub fn with_application_role(mut self, role: UserRole) -> Self {
        self.application_roles.push(role);
        self
    }

    pub fn with_application(mut self, application: Application) -> Self {
        self.applications.push(application);
        self
    }
}
