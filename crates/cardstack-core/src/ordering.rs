#![forbid(unsafe_code)]

//! Stack ordering engine: which item sits in which slot.
//!
//! The binding is a sequence of N item ids, slot 0 frontmost. The only
//! mutation is [`StackOrder::rotate`], a left rotation by one: the front
//! card cycles to the back and every other card advances one slot.
//!
//! # Invariants
//!
//! 1. The binding is always a permutation of the ids given at construction.
//! 2. N is fixed for the lifetime of the engine and never zero.
//! 3. `rotate()` applied N times is the identity.

use std::collections::HashSet;

use crate::error::{Result, StackError};
use crate::item::ItemId;

/// Slot binding for a stack of N cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOrder {
    slots: Vec<ItemId>,
    initial: Vec<ItemId>,
}

impl StackOrder {
    /// Bind `ids` to slots in order (first id in front).
    ///
    /// Fails with [`StackError::InvalidConfiguration`] if `ids` is empty or
    /// contains duplicates.
    pub fn new(ids: impl IntoIterator<Item = ItemId>) -> Result<Self> {
        let slots: Vec<ItemId> = ids.into_iter().collect();
        if slots.is_empty() {
            return Err(StackError::config("stack must hold at least one item"));
        }
        let mut seen = HashSet::with_capacity(slots.len());
        if let Some(dup) = slots.iter().find(|id| !seen.insert(**id)) {
            return Err(StackError::config(format!("duplicate item id {dup}")));
        }
        Ok(Self {
            initial: slots.clone(),
            slots,
        })
    }

    /// Number of slots (N).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; an empty order cannot be constructed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The current binding, slot 0 first.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[ItemId] {
        &self.slots
    }

    /// Iterate `(position, id)` pairs front to back.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ItemId)> + '_ {
        self.slots.iter().copied().enumerate()
    }

    /// The id in slot 0.
    #[inline]
    #[must_use]
    pub fn front(&self) -> ItemId {
        self.slots[0]
    }

    /// Slot currently holding `id`, if it belongs to this stack.
    #[must_use]
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == id)
    }

    /// Cycle the front card to the back; everything else advances one slot.
    pub fn rotate(&mut self) -> &[ItemId] {
        self.slots.rotate_left(1);
        &self.slots
    }

    /// Restore the binding given at construction.
    pub fn reset(&mut self) {
        self.slots.clone_from(&self.initial);
    }
}
