//! Menuguard Node Library
//!
//! Wires the authorization facade to a JSON directory file described by a
//! TOML configuration, and reports validation outcomes in serializable form.

pub mod config;
pub mod node;

pub use config::NodeConfig;
pub use node::{CheckReport, CheckRequest, GuardNode, TreeReport};
