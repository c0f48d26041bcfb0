use serde::{Deserialize, Serialize};

use crate::core::item::ItemStack;

/// Slot-addressed item storage exposed by the host (barrels, player inventories).
pub trait Container {
    fn size(&self) -> usize;

    fn slot(&self, index: usize) -> Option<&ItemStack>;

    fn set_slot(&mut self, index: usize, stack: Option<ItemStack>);

    fn clear(&mut self) {
        for index in 0..self.size() {
            self.set_slot(index, None);
        }
    }

    /// Tops up matching partial stacks first, then fills empty slots.
    /// Returns whatever did not fit.
    fn add_item(&mut self, stack: ItemStack) -> Option<ItemStack> {
        let mut remaining = stack;

        for index in 0..self.size() {
            if remaining.amount == 0 {
                return None;
            }
            let Some(existing) = self.slot(index) else {
                continue;
            };
            if !existing.stacks_with(&remaining) || existing.is_full() {
                continue;
            }
            let mut merged = existing.clone();
            let moved = (merged.max_stack_size() - merged.amount).min(remaining.amount);
            merged.amount += moved;
            remaining.amount -= moved;
            self.set_slot(index, Some(merged));
        }

        for index in 0..self.size() {
            if remaining.amount == 0 {
                return None;
            }
            if self.slot(index).is_some() {
                continue;
            }
            let moved = remaining.max_stack_size().min(remaining.amount);
            let mut placed = remaining.clone();
            placed.amount = moved;
            remaining.amount -= moved;
            self.set_slot(index, Some(placed));
        }

        (remaining.amount > 0).then_some(remaining)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    pub fn count(&self, material: crate::core::block::Material) -> u32 {
        self.iter()
            .filter(|stack| stack.material == material)
            .map(|stack| stack.amount)
            .sum()
    }
}

impl Container for Inventory {
    fn size(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    fn set_slot(&mut self, index: usize, stack: Option<ItemStack>) {
        if let Some(slot) = self.slots.get_mut(index) {
            // Empty stacks never occupy a slot
            *slot = stack.filter(|s| s.amount > 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::Material;

    #[test]
    fn add_item_tops_up_before_using_empty_slots() {
        let mut inv = Inventory::new(3);
        inv.set_slot(2, Some(ItemStack::new(Material::Cobblestone, 60)));

        assert!(inv.add_item(ItemStack::new(Material::Cobblestone, 10)).is_none());

        assert_eq!(inv.slot(2).map(|s| s.amount), Some(64));
        assert_eq!(inv.slot(0).map(|s| s.amount), Some(6));
        assert!(inv.slot(1).is_none());
    }

    #[test]
    fn add_item_returns_leftover_when_full() {
        let mut inv = Inventory::new(1);
        let leftover = inv.add_item(ItemStack::new(Material::Cobblestone, 70));
        assert_eq!(leftover.map(|s| s.amount), Some(6));
    }

    #[test]
    fn zero_amount_stacks_clear_the_slot() {
        let mut inv = Inventory::new(2);
        inv.set_slot(0, Some(ItemStack::new(Material::Coal, 0)));
        assert!(inv.slot(0).is_none());
    }
}
