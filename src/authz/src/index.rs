//! Flattened URL index
//!
//! Maps every URL alias (plain and encrypted) of every node in a subtree to
//! that node's handle, so a request can be resolved with one hash lookup no
//! matter how deep the node sits.

use crate::error::{Result, SecurityError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// What to do when two distinct nodes register the same URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later registration replaces the earlier one (logged at warn)
    #[default]
    LastWriteWins,
    /// Registration fails with `IllegalState`
    Reject,
}

/// URL → node handle map
#[derive(Debug, Clone)]
pub struct AccessIndex<H> {
    entries: HashMap<String, H>,
    policy: CollisionPolicy,
}

impl<H> AccessIndex<H>
where
    H: Copy + PartialEq + fmt::Debug,
{
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Register a node under its primary URL and, when non-blank, its
    /// encrypted URL. Both keys are stored trimmed.
    pub fn register(&mut self, primary: &str, encrypted: Option<&str>, handle: H) -> Result<()> {
        let primary = primary.trim();
        if primary.is_empty() {
            return Err(SecurityError::IllegalState(format!(
                "cannot index {:?} without a URL",
                handle
            )));
        }

        let encrypted = encrypted.map(str::trim).filter(|url| !url.is_empty());

        if self.policy == CollisionPolicy::Reject {
            for key in std::iter::once(primary).chain(encrypted) {
                if let Some(existing) = self.entries.get(key) {
                    if *existing != handle {
                        return Err(SecurityError::IllegalState(format!(
                            "URL [{}] already registered to {:?}, refusing {:?}",
                            key, existing, handle
                        )));
                    }
                }
            }
        }

        self.insert(primary, handle);
        if let Some(encrypted) = encrypted {
            self.insert(encrypted, handle);
        }
        Ok(())
    }

    fn insert(&mut self, key: &str, handle: H) {
        if let Some(previous) = self.entries.insert(key.to_string(), handle) {
            if previous != handle {
                warn!(
                    "URL [{}] re-registered: {:?} replaced by {:?}",
                    key, previous, handle
                );
            }
        }
    }

    /// Exact, case-sensitive lookup on the trimmed URL
    pub fn get(&self, url: &str) -> Option<H> {
        self.entries.get(url.trim()).copied()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url.trim())
    }

    /// Number of URL keys (a node with an encrypted URL counts twice)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_primary_and_encrypted() {
        let mut index = AccessIndex::new(CollisionPolicy::LastWriteWins);
        index.register(" list.do?id=1 ", Some(" x9f2 "), 1usize).unwrap();

        assert_eq!(index.get("list.do?id=1"), Some(1));
        assert_eq!(index.get("x9f2"), Some(1));
        assert_eq!(index.get("  x9f2"), Some(1));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_blank_encrypted_url_is_ignored() {
        let mut index = AccessIndex::new(CollisionPolicy::LastWriteWins);
        index.register("a.do", Some("   "), 1usize).unwrap();

        assert_eq!(index.len(), 1);
        assert!(!index.contains(""));
    }

    #[test]
    fn test_blank_primary_is_illegal_state() {
        let mut index = AccessIndex::<usize>::new(CollisionPolicy::LastWriteWins);
        assert!(matches!(
            index.register("  ", None, 1),
            Err(SecurityError::IllegalState(_))
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut index = AccessIndex::new(CollisionPolicy::LastWriteWins);
        index.register("Menu.do", None, 1usize).unwrap();

        assert_eq!(index.get("Menu.do"), Some(1));
        assert_eq!(index.get("menu.do"), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut index = AccessIndex::new(CollisionPolicy::LastWriteWins);
        index.register("a.do", None, 1usize).unwrap();
        index.register("a.do", None, 2usize).unwrap();

        assert_eq!(index.get("a.do"), Some(2));
    }

    #[test]
    fn test_reject_policy_leaves_index_untouched() {
        let mut index = AccessIndex::new(CollisionPolicy::Reject);
        index.register("a.do", None, 1usize).unwrap();

        let err = index.register("b.do", Some("a.do"), 2usize).unwrap_err();
        assert!(matches!(err, SecurityError::IllegalState(_)));
        assert_eq!(index.get("a.do"), Some(1));
        assert!(!index.contains("b.do"));

        // Re-registering the same node is not a collision
        index.register("a.do", None, 1usize).unwrap();
    }
}
