//! Node configuration loading and validation

use anyhow::{Context, Result};
use menuguard_authz::FacadeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete node configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub node: NodeSection,
    pub provider: ProviderSection,

    #[serde(default)]
    pub facade: FacadeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeSection {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Application name used when the command line gives none
    #[serde(default = "default_application")]
    pub application: String,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            application: default_application(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderSection {
    /// JSON directory document, relative paths resolve against `node.data_dir`
    pub directory: PathBuf,
}

// Default value functions
fn default_data_dir() -> PathBuf { PathBuf::from(".") }
fn default_log_level() -> String { "info".to_string() }
fn default_application() -> String { "default".to_string() }

impl NodeConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {:?}", path.as_ref()))?;

        let config: NodeConfig = toml::from_str(&contents)
            .context("Failed to parse configuration file")?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.node.log_level.as_str()) {
            anyhow::bail!(
                "Log level must be one of {:?}, got '{}'",
                LOG_LEVELS,
                self.node.log_level
            );
        }

        if self.node.application.trim().is_empty() {
            anyhow::bail!("Default application name must not be blank");
        }

        if self.provider.directory.as_os_str().is_empty() {
            anyhow::bail!("Provider directory file must be set");
        }

        Ok(())
    }

    /// Get absolute data directory path
    pub fn data_dir(&self) -> PathBuf {
        if self.node.data_dir.is_absolute() {
            self.node.data_dir.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.node.data_dir)
        }
    }

    /// Get absolute directory document path
    pub fn directory_path(&self) -> PathBuf {
        if self.provider.directory.is_absolute() {
            self.provider.directory.clone()
        } else {
            self.data_dir().join(&self.provider.directory)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuguard_authz::CollisionPolicy;
    use std::io::Write;

    fn load_str(contents: &str) -> Result<NodeConfig> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        NodeConfig::load(file.path())
    }

    #[test]
    fn test_minimal_config() {
        let config = load_str("[provider]\ndirectory = \"users.json\"\n").unwrap();

        assert_eq!(config.node.log_level, "info");
        assert_eq!(config.node.application, "default");
        assert_eq!(config.facade, FacadeConfig::default());
        assert!(config.directory_path().ends_with("users.json"));
        assert!(config.directory_path().is_absolute());
        config.validate().unwrap();
    }

    #[test]
    fn test_full_config() {
        let config = load_str(
            r#"
            [node]
            data_dir = "/var/lib/menuguard"
            log_level = "debug"
            application = "ledger"

            [provider]
            directory = "directory.json"

            [facade]
            collision_policy = "reject"
            enable_stats = false
            "#,
        )
        .unwrap();

        assert_eq!(config.facade.collision_policy, CollisionPolicy::Reject);
        assert!(!config.facade.enable_stats);
        assert_eq!(
            config.directory_path(),
            PathBuf::from("/var/lib/menuguard/directory.json")
        );
    }

    #[test]
    fn test_validation_failures() {
        let mut config = load_str("[provider]\ndirectory = \"users.json\"\n").unwrap();

        config.node.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        config.node.log_level = "warn".to_string();
        config.node.application = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_provider_section() {
        assert!(load_str("[node]\nlog_level = \"info\"\n").is_err());
    }
}
