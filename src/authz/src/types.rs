//! Core authorization types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Module-name tag reserved for menus shown on every page
pub const GLOBAL_MODULE_NAME: &str = "global";

/// Domain a freshly loaded user starts in
pub const DEFAULT_DOMAIN: &str = "default";

/// Role a menu item plays on the page
///
/// Provider payloads carry the numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ActionKind {
    LeftNavigation,
    Page,
    List,
    ListHeader,
    RightNavigation,
}

impl ActionKind {
    pub fn code(self) -> u8 {
        match self {
            Self::LeftNavigation => 1,
            Self::Page => 2,
            Self::List => 3,
            Self::ListHeader => 4,
            Self::RightNavigation => 5,
        }
    }
}

impl TryFrom<u8> for ActionKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::LeftNavigation),
            2 => Ok(Self::Page),
            3 => Ok(Self::List),
            4 => Ok(Self::ListHeader),
            5 => Ok(Self::RightNavigation),
            other => Err(format!("unknown menu item action code: {}", other)),
        }
    }
}

impl From<ActionKind> for u8 {
    fn from(kind: ActionKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LeftNavigation => "left-navigation",
            Self::Page => "page",
            Self::List => "list",
            Self::ListHeader => "list-header",
            Self::RightNavigation => "right-navigation",
        };
        write!(f, "{}", name)
    }
}

/// Role granted to a user within a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    /// URLs of the menus this role grants
    #[serde(default)]
    pub menus: BTreeSet<String>,
}

impl UserRole {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            menus: BTreeSet::new(),
        }
    }
}

/// Entity grouped under an application domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntity {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Data partition a user may work in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDomain {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub entities: Vec<DomainEntity>,

    /// Opaque application data, passed through untouched
    #[serde(default)]
    pub app_specific: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub name: String,
}

/// Application registered with the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// Presentation preferences stored for a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub style_sheet: Option<String>,
    #[serde(default)]
    pub tiles: Option<String>,
}

/// Localized display names keyed by locale code
pub type LocalizedNames = HashMap<String, String>;
