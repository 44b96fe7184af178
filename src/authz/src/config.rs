//! Facade configuration

use crate::index::CollisionPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for [`AuthorizationFacade`](crate::facade::AuthorizationFacade)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// What to do when two nodes index the same URL
    pub collision_policy: CollisionPolicy,

    /// Count resolutions and rejections
    pub enable_stats: bool,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            collision_policy: CollisionPolicy::LastWriteWins,
            enable_stats: true,
        }
    }
}
