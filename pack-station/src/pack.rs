//! Pack state machine
//!
//! One entry per order item recording whether the packer has put it in the
//! box. Every transition produces a fresh snapshot; a no-op hands back the
//! same snapshot so callers can skip re-rendering.

use serde::Serialize;
use shared::models::{ItemId, OrderItem};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackStatus {
    pub item_id: ItemId,
    pub packed: bool,
}

/// Immutable pack snapshot for one order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackState {
    entries: Arc<Vec<PackStatus>>,
}

impl PackState {
    /// Every item starts unpacked. Repeated ids collapse onto the first entry.
    pub fn from_items(items: &[OrderItem]) -> Self {
        let mut entries: Vec<PackStatus> = Vec::with_capacity(items.len());
        for item in items {
            if entries.iter().any(|e| e.item_id == item.id) {
                continue;
            }
            entries.push(PackStatus {
                item_id: item.id.clone(),
                packed: false,
            });
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn entries(&self) -> &[PackStatus] {
        &self.entries
    }

    pub fn get(&self, item_id: &ItemId) -> Option<&PackStatus> {
        self.entries.iter().find(|e| &e.item_id == item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of unpacked entries
    pub fn remaining(&self) -> usize {
        self.entries.iter().filter(|e| !e.packed).count()
    }

    pub fn packed_count(&self) -> usize {
        self.entries.len() - self.remaining()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// True when both values share one snapshot
    pub fn same_snapshot(&self, other: &PackState) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    pub fn pack(&self, item_id: &ItemId) -> Self {
        self.set(|e| &e.item_id == item_id, |_| true)
    }

    pub fn unpack(&self, item_id: &ItemId) -> Self {
        self.set(|e| &e.item_id == item_id, |_| false)
    }

    pub fn toggle(&self, item_id: &ItemId) -> Self {
        self.set(|e| &e.item_id == item_id, |packed| !packed)
    }

    /// Toggle every entry whose id equals the scanned code
    ///
    /// An unknown code leaves the snapshot untouched.
    pub fn apply_scan(&self, code: &str) -> Self {
        self.set(|e| e.item_id == code, |packed| !packed)
    }

    fn set(&self, matches: impl Fn(&PackStatus) -> bool, next: impl Fn(bool) -> bool) -> Self {
        let changed = self
            .entries
            .iter()
            .any(|e| matches(e) && next(e.packed) != e.packed);
        if !changed {
            return self.clone();
        }

        let entries = self
            .entries
            .iter()
            .map(|e| {
                if matches(e) {
                    PackStatus {
                        item_id: e.item_id.clone(),
                        packed: next(e.packed),
                    }
                } else {
                    e.clone()
                }
            })
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }
}
