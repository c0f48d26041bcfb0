use crate::core::inventory::Container;
use crate::core::item::Enchantment;
use crate::core::random::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wear {
    Intact,
    Broke,
}

/// Applies one use of wear to the tool in `slot`.
///
/// Unbreaking level `L` lets a use through without damage unless a uniform
/// draw lands below `1 / (L + 1)`. A tool whose damage reaches its maximum
/// durability is removed. An empty or non-tool slot counts as broken.
pub fn apply_wear<R: RandomSource + ?Sized>(
    container: &mut dyn Container,
    slot: usize,
    rng: &mut R,
) -> Wear {
    let Some(tool) = container.slot(slot) else {
        return Wear::Broke;
    };
    let Some(tier) = tool.material.tool_tier() else {
        return Wear::Broke;
    };

    let unbreaking = tool.enchantment_level(Enchantment::Unbreaking);
    if unbreaking > 0 {
        let chance = 1.0 / (unbreaking as f64 + 1.0);
        if rng.next_f64() >= chance {
            return Wear::Intact;
        }
    }

    let damage = tool.damage + 1;
    if damage >= tier.max_durability() {
        container.set_slot(slot, None);
        return Wear::Broke;
    }

    let worn = tool.clone().with_damage(damage);
    container.set_slot(slot, Some(worn));
    Wear::Intact
}
