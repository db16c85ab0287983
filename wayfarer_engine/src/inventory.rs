//! Inventory Module
//!
//! Inventories hold ordered stacks of item ids. Stackable items merge into a
//! single stack; everything else occupies one slot per copy, capped at
//! [`MAX_SLOTS`]. The inventory stores ids only; weight and value are
//! computed against the item resources on demand.

use crate::item::Item;
use serde::{Deserialize, Serialize};

/// Slot capacity of an inventory.
pub const MAX_SLOTS: usize = 100;

/// A stack of copies of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub count: u32,
}

/// An actor's carried items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<ItemStack>,
    /// Item id of the held weapon or shield, if any.
    held: Option<String>,
}

impl Inventory {
    pub fn new() -> Inventory {
        Inventory::default()
    }

    pub fn slots(&self) -> &[ItemStack] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total copies of the given item across all stacks.
    pub fn count_of(&self, item_id: &str) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.count)
            .sum()
    }

    /// Add copies of an item. Stackables merge into an existing stack;
    /// non-stackables take one slot each, limited by remaining capacity.
    /// Returns how many copies were actually added.
    pub fn add(&mut self, item: &Item, count: u32) -> u32 {
        if count == 0 {
            return 0;
        }
        if item.stackable {
            if let Some(stack) = self.slots.iter_mut().find(|s| s.item_id == item.id) {
                stack.count += count;
                return count;
            }
            if self.slots.len() < MAX_SLOTS {
                self.slots.push(ItemStack {
                    item_id: item.id.clone(),
                    count,
                });
                return count;
            }
            return 0;
        }

        let space = MAX_SLOTS.saturating_sub(self.slots.len());
        let added = count.min(space as u32);
        for _ in 0..added {
            self.slots.push(ItemStack {
                item_id: item.id.clone(),
                count: 1,
            });
        }
        added
    }

    /// Remove up to `count` copies of an item, draining multiple stacks if
    /// needed. Returns how many were actually removed.
    pub fn remove(&mut self, item_id: &str, count: u32) -> u32 {
        let mut left = count;
        for stack in self.slots.iter_mut().filter(|s| s.item_id == item_id) {
            if left == 0 {
                break;
            }
            let taken = stack.count.min(left);
            stack.count -= taken;
            left -= taken;
        }
        if self.held.as_deref() == Some(item_id) && self.count_of(item_id) == 0 {
            self.held = None;
        }
        self.slots.retain(|s| s.count > 0);
        count - left
    }

    /// Mark an item as held (weapons and shields). The item must be carried.
    pub fn equip_held(&mut self, item_id: &str) -> bool {
        if self.count_of(item_id) == 0 {
            return false;
        }
        self.held = Some(item_id.to_string());
        true
    }

    pub fn unequip_held(&mut self) {
        self.held = None;
    }

    pub fn held(&self) -> Option<&str> {
        self.held.as_deref()
    }

    /// Total carried weight, resolving item ids through `lookup`. Unknown
    /// ids weigh nothing.
    pub fn total_weight<'a>(&self, lookup: impl Fn(&str) -> Option<&'a Item>) -> f32 {
        self.slots
            .iter()
            .filter_map(|s| lookup(&s.item_id).map(|item| item.weight * s.count as f32))
            .sum()
    }

    /// Total base value of carried items.
    pub fn total_value<'a>(&self, lookup: impl Fn(&str) -> Option<&'a Item>) -> u32 {
        self.slots
            .iter()
            .filter_map(|s| lookup(&s.item_id).map(|item| item.value * s.count))
            .sum()
    }
}
