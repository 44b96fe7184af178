//! Sibling ordering for menus and menu items
//!
//! Menus and menu items sort by ascending index. Providers routinely hand out
//! the same index twice, and both entries must stay visible, so an index tie
//! never compares as `Equal`: the entry compared from the left wins `Greater`.
//! In containers this is realised by [`OrderKey`], which breaks ties on
//! insertion sequence so the later entry lands after the earlier one.

use std::cmp::Ordering;

/// Position of a node among its siblings
///
/// Every attached node gets a unique sequence number from its container, so
/// two keys are only equal when they belong to the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderKey {
    index: i32,
    seq: u64,
}

impl OrderKey {
    pub(crate) fn new(index: i32, seq: u64) -> Self {
        Self { index, seq }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Index-only comparison used when ordering two nodes
///
/// Returns `Greater` on a tie, including when a node is compared with itself.
/// This must not be changed to return `Equal`: ordered-unique containers
/// would then silently drop one of two same-index menus. Do not feed this to
/// `sort_by`; containers order by [`OrderKey`] instead, which agrees with this
/// function for any two distinct nodes inserted left-after-right.
pub fn precedence(left_index: i32, right_index: i32) -> Ordering {
    if left_index >= right_index {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Hands out insertion sequence numbers
#[derive(Debug, Clone, Default)]
pub(crate) struct Sequence {
    next: u64,
}

impl Sequence {
    pub(crate) fn key(&mut self, index: i32) -> OrderKey {
        let key = OrderKey::new(index, self.next);
        self.next += 1;
        key
    }
}
