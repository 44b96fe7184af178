//! Validation outcome counters

use crate::error::{Rejection, SecurityError};
use dashmap::DashMap;
use std::collections::BTreeMap;

const AUTHENTICATIONS: &str = "authentications";
const MENUS_RESOLVED: &str = "menus_resolved";
const ITEMS_RESOLVED: &str = "items_resolved";

/// Snapshot of facade activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacadeStats {
    pub authentications: usize,
    pub menus_resolved: usize,
    pub items_resolved: usize,

    /// Requests sent back to the login page
    pub redirects_to_login: usize,

    /// Logged-in requests without rights on the resource
    pub access_denied: usize,
    pub faults: usize,

    /// Rejections keyed by [`SecurityError::kind`]
    pub rejections_by_kind: BTreeMap<String, usize>,
}

impl FacadeStats {
    pub fn total_rejections(&self) -> usize {
        self.redirects_to_login + self.access_denied + self.faults
    }

    /// Share of validations (menu and item) that were rejected
    pub fn rejection_rate(&self) -> f64 {
        let total = self.menus_resolved + self.items_resolved + self.total_rejections();
        if total == 0 {
            0.0
        } else {
            self.total_rejections() as f64 / total as f64
        }
    }
}

/// Thread-safe counters behind [`FacadeStats`]
#[derive(Debug, Default)]
pub struct StatsCollector {
    counters: DashMap<&'static str, usize>,
    rejections: DashMap<&'static str, usize>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_authentication(&self) {
        self.increment(AUTHENTICATIONS);
    }

    pub fn record_menu_resolved(&self) {
        self.increment(MENUS_RESOLVED);
    }

    pub fn record_item_resolved(&self) {
        self.increment(ITEMS_RESOLVED);
    }

    pub fn record_rejection(&self, err: &SecurityError) {
        let outcome = match err.rejection() {
            Rejection::RedirectToLogin => "redirect_to_login",
            Rejection::AccessDenied => "access_denied",
            Rejection::Fault => "fault",
        };
        self.increment(outcome);
        self.rejections
            .entry(err.kind())
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    pub fn snapshot(&self) -> FacadeStats {
        FacadeStats {
            authentications: self.get(AUTHENTICATIONS),
            menus_resolved: self.get(MENUS_RESOLVED),
            items_resolved: self.get(ITEMS_RESOLVED),
            redirects_to_login: self.get("redirect_to_login"),
            access_denied: self.get("access_denied"),
            faults: self.get("fault"),
            rejections_by_kind: self
                .rejections
                .iter()
                .map(|entry| (entry.key().to_string(), *entry.value()))
                .collect(),
        }
    }

    pub fn reset(&self) {
        self.counters.clear();
        self.rejections.clear();
    }

    fn increment(&self, key: &'static str) {
        self.counters
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get(&self, key: &str) -> usize {
        self.counters.get(key).map(|v| *v).unwrap_or(0)
    }
}
