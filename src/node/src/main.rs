//! Menuguard Node - Main Binary
//!
//! Command line front end for the menu authorization engine:
//! - Validate a user's access to a menu and menu item
//! - Dump a user's access tree
//! - Canonicalize request identifiers

use anyhow::Result;
use clap::{Parser, Subcommand};
use menuguard_authz::canonical::{canonicalize_request_path, canonicalize_uri};
use menuguard_node::{CheckRequest, GuardNode, NodeConfig};
use std::path::PathBuf;
use tracing::{info, warn};

/// Menuguard Node CLI
#[derive(Parser)]
#[command(name = "menuguard-node")]
#[command(about = "Menuguard - menu and menu item authorization")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "menuguard.toml", env = "MENUGUARD_CONFIG")]
    config: PathBuf,

    /// Directory file (overrides config)
    #[arg(long, env = "MENUGUARD_DIRECTORY")]
    directory: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate a user and validate a menu path and optional item path
    Check {
        #[arg(short, long)]
        user: String,

        #[arg(short, long, env = "MENUGUARD_PASSWORD", hide_env_values = true)]
        password: String,

        /// Application name (defaults to the configured one)
        #[arg(short, long)]
        application: Option<String>,

        /// Canonical menu path
        #[arg(short, long)]
        menu: String,

        /// Canonical menu item path
        #[arg(short, long)]
        item: Option<String>,
    },

    /// Authenticate a user and print their access tree
    Tree {
        #[arg(short, long)]
        user: String,

        #[arg(short, long, env = "MENUGUARD_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(short, long)]
        application: Option<String>,
    },

    /// Canonicalize a request identifier
    Canonicalize {
        /// Request path, or a combined path and query
        input: String,

        /// Separate query string; without it the input is treated as combined
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show node version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Commands that need no configuration
    match &cli.command {
        Command::Version => {
            println!("Menuguard Node v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Canonicalize { input, query } => {
            init_logging(if cli.verbose { "debug" } else { "info" });
            let canonical = match query {
                Some(query) => canonicalize_request_path(input, Some(query)),
                None => canonicalize_uri(input),
            };
            println!("{}", canonical);
            return Ok(());
        }
        Command::Check { .. } | Command::Tree { .. } => {}
    }

    // Load configuration
    let mut config = NodeConfig::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(directory) = cli.directory {
        config.provider.directory = directory;
    }

    // Validate configuration
    config.validate()?;

    init_logging(if cli.verbose { "debug" } else { config.node.log_level.as_str() });
    info!("Loaded configuration from {:?}", cli.config);

    let node = GuardNode::new(config).await?;

    match cli.command {
        Command::Check {
            user,
            password,
            application,
            menu,
            item,
        } => {
            let report = node
                .check(&CheckRequest {
                    user_id: user,
                    password,
                    application,
                    menu_path: menu,
                    item_path: item,
                })
                .await;

            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.allowed {
                warn!("Request rejected: {:?}", report.rejection);
                std::process::exit(2);
            }
        }
        Command::Tree {
            user,
            password,
            application,
        } => {
            let report = node.tree(&user, &password, application.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Version | Command::Canonicalize { .. } => {}
    }

    Ok(())
}

/// Install the global subscriber; `RUST_LOG` wins over `level`
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},menuguard_node={}", level, level).into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
