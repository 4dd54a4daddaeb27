use crate::id::ItemTypeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A quantity of one item type, as used by rules and reward-sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuantity {
    pub item_type: ItemTypeId,
    pub quantity: u32,
}

impl ItemQuantity {
    pub fn new(item_type: ItemTypeId, quantity: u32) -> Self {
        Self {
            item_type,
            quantity,
        }
    }
}

/// A base's general stores. Fungible counts keyed by item type; unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemContainer {
    items: BTreeMap<ItemTypeId, u32>,
}

impl ItemContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add items of one type.
    pub fn add(&mut self, item_type: ItemTypeId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.items.entry(item_type).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Remove items. Returns the amount actually removed.
    #[must_use = "returns the quantity actually removed, which may be less than requested"]
    pub fn remove(&mut self, item_type: ItemTypeId, quantity: u32) -> u32 {
        let Some(stored) = self.items.get_mut(&item_type) else {
            return 0;
        };
        let removed = quantity.min(*stored);
        *stored -= removed;
        if *stored == 0 {
            self.items.remove(&item_type);
        }
        removed
    }

    /// Quantity of a specific item type.
    pub fn quantity(&self, item_type: ItemTypeId) -> u32 {
        self.items.get(&item_type).copied().unwrap_or(0)
    }

    /// Total items across all types.
    pub fn total(&self) -> u64 {
        self.items.values().map(|&q| q as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stored quantities in item-id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemTypeId, u32)> + '_ {
        self.items.iter().map(|(&id, &q)| (id, q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove() {
        let mut stores = ItemContainer::new();
        let alloys = ItemTypeId(0);
        stores.add(alloys, 50);
        assert_eq!(stores.quantity(alloys), 50);

        let removed = stores.remove(alloys, 30);
        assert_eq!(removed, 30);
        assert_eq!(stores.quantity(alloys), 20);
    }

    #[test]
    fn remove_more_than_available() {
        let mut stores = ItemContainer::new();
        let elerium = ItemTypeId(1);
        stores.add(elerium, 5);
        assert_eq!(stores.remove(elerium, 10), 5);
        assert_eq!(stores.quantity(elerium), 0);
        assert!(stores.is_empty());
    }

    #[test]
    fn remove_missing_type() {
        let mut stores = ItemContainer::new();
        assert_eq!(stores.remove(ItemTypeId(9), 1), 0);
    }

    #[test]
    fn add_zero_keeps_container_empty() {
        let mut stores = ItemContainer::new();
        stores.add(ItemTypeId(0), 0);
        assert!(stores.is_empty());
    }

    #[test]
    fn multiple_types() {
        let mut stores = ItemContainer::new();
        stores.add(ItemTypeId(0), 30);
        stores.add(ItemTypeId(1), 20);
        assert_eq!(stores.total(), 50);
        let listed: Vec<_> = stores.iter().collect();
        assert_eq!(listed, vec![(ItemTypeId(0), 30), (ItemTypeId(1), 20)]);
    }
}
