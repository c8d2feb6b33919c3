//! Duplicate suppression for client-originated broadcasts.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use conductor_protocol::PlayerId;

/// Identifies one chat message: same sender, same text, same client
/// timestamp means the same message delivered twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatKey {
    pub sender: PlayerId,
    pub text: String,
    pub timestamp: u64,
}

/// A bounded set of recently seen keys.
///
/// Holds at most `capacity` keys; inserting past that evicts the oldest.
/// A key that was evicted counts as new again.
#[derive(Debug)]
pub struct RecentSet<K> {
    order: VecDeque<K>,
    seen: HashSet<K>,
    capacity: usize,
}

impl<K: Clone + Eq + Hash> RecentSet<K> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Records `key`. Returns `false` if it was already in the window.
    pub fn insert(&mut self, key: K) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(key.clone());
        self.order.push_back(key);
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
