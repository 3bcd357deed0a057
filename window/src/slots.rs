use alloc::vec::Vec;

use crate::key::SlotMap;
use crate::{RangeDelta, RowRange};

/// Assigns recycled layout slots to materialized rows.
///
/// A slot is a reusable layout position (a widget, a DOM node, a buffer region). When a row leaves
/// the window its slot is released, and the next row entering the window takes it over, so the
/// number of slots ever created is bounded by the largest materialized range, not by the row
/// count.
#[derive(Clone, Debug, Default)]
pub struct SlotPool {
    by_index: SlotMap,
    free: Vec<usize>,
    capacity: usize,
}

impl SlotPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently holding a slot.
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Number of distinct slots ever created.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slot_of(&self, index: usize) -> Option<usize> {
        self.by_index.get(&index).copied()
    }

    /// Releases the slots of unmounted rows, then hands slots to mounted rows.
    ///
    /// Unmounts run first so the freed slots are available to the rows entering on the same
    /// frame.
    pub fn apply(&mut self, delta: RangeDelta) {
        if delta.is_unchanged() {
            return;
        }
        delta.for_each_unmounted(|index| {
            self.release(index);
        });
        delta.for_each_mounted(|index| {
            self.acquire(index);
        });
        wtrace!(
            live = self.by_index.len(),
            capacity = self.capacity,
            "SlotPool::apply"
        );
    }

    /// Brings the pool in line with `range`, releasing every slot outside it.
    pub fn sync(&mut self, range: RowRange) {
        let stale: Vec<usize> = self
            .by_index
            .keys()
            .copied()
            .filter(|&i| !range.contains(i))
            .collect();
        for index in stale {
            self.release(index);
        }
        for index in range.indexes() {
            self.acquire(index);
        }
    }

    /// Returns the slot of `index`, assigning one if the row has none yet.
    pub fn acquire(&mut self, index: usize) -> usize {
        if let Some(slot) = self.by_index.get(&index) {
            return *slot;
        }
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let slot = self.capacity;
                self.capacity = self.capacity.saturating_add(1);
                slot
            }
        };
        self.by_index.insert(index, slot);
        slot
    }

    pub fn release(&mut self, index: usize) -> Option<usize> {
        let slot = self.by_index.remove(&index)?;
        self.free.push(slot);
        Some(slot)
    }

    /// Drops every assignment but keeps the created slots for reuse.
    pub fn clear(&mut self) {
        let mut slots: Vec<usize> = self.by_index.values().copied().collect();
        slots.sort_unstable();
        self.by_index.clear();
        self.free.extend(slots.into_iter().rev());
    }
}
