use crate::cobblegen::registry::GeneratorState;
use crate::constants::{DEFAULT_FUEL_USES, TOOL_SLOT};
use crate::core::block::Material;
use crate::core::inventory::Container;

/// Production cycles paid for by one item of `material`. Stronger fuels last
/// longer; any other furnace fuel gets a small flat amount.
pub fn fuel_uses(material: Material) -> u32 {
    match material {
        Material::LavaBucket => 100,
        Material::CoalBlock => 72,
        Material::Coal | Material::Charcoal | Material::BlazeRod => 8,
        _ => DEFAULT_FUEL_USES,
    }
}

/// Spends one fuel use, pulling a new fuel item from the container when the
/// buffer is empty. The tool slot is never searched.
pub fn consume_fuel_use(state: &mut GeneratorState, container: &mut dyn Container) -> bool {
    if state.fuel_uses_remaining > 0 {
        state.fuel_uses_remaining -= 1;
        return true;
    }

    for index in 0..container.size() {
        if index == TOOL_SLOT {
            continue;
        }
        let Some(stack) = container.slot(index) else {
            continue;
        };
        if !stack.material.is_fuel() {
            continue;
        }

        let uses = fuel_uses(stack.material);
        let mut rest = stack.clone();
        rest.amount -= 1;
        container.set_slot(index, Some(rest).filter(|s| s.amount > 0));
        state.fuel_uses_remaining = uses - 1;
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inventory::Inventory;
    use crate::core::item::ItemStack;

    #[test]
    fn fuel_table() {
        assert_eq!(fuel_uses(Material::LavaBucket), 100);
        assert_eq!(fuel_uses(Material::CoalBlock), 72);
        assert_eq!(fuel_uses(Material::Charcoal), 8);
        assert_eq!(fuel_uses(Material::OakPlanks), 4);
    }

    #[test]
    fn buffered_uses_are_spent_first() {
        let mut state = GeneratorState {
            fuel_uses_remaining: 2,
            ..Default::default()
        };
        let mut inv = Inventory::new(3);
        inv.set_slot(1, Some(ItemStack::new(Material::Coal, 1)));

        assert!(consume_fuel_use(&mut state, &mut inv));
        assert_eq!(state.fuel_uses_remaining, 1);
        assert_eq!(inv.count(Material::Coal), 1);
    }

    #[test]
    fn new_item_fills_the_buffer_minus_the_current_use() {
        let mut state = GeneratorState::default();
        let mut inv = Inventory::new(3);
        inv.set_slot(2, Some(ItemStack::new(Material::Coal, 1)));

        assert!(consume_fuel_use(&mut state, &mut inv));
        assert_eq!(state.fuel_uses_remaining, 7);
        assert!(inv.slot(2).is_none());
    }

    #[test]
    fn tool_slot_and_non_fuel_are_skipped() {
        let mut state = GeneratorState::default();
        let mut inv = Inventory::new(3);
        inv.set_slot(0, Some(ItemStack::new(Material::Coal, 5)));
        inv.set_slot(1, Some(ItemStack::new(Material::Cobblestone, 64)));

        assert!(!consume_fuel_use(&mut state, &mut inv));
        assert_eq!(inv.count(Material::Coal), 5);
    }
}
