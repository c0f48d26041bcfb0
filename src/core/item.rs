//! Item stacks and the tool tiers that drive generators.

use serde::{Deserialize, Serialize};

use crate::core::block::Material;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Enchantment {
    Efficiency,
    Unbreaking,
}

/// The seven pickaxe tiers a generator accepts in its tool slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ToolTier {
    Wooden,
    Stone,
    Copper,
    Iron,
    Golden,
    Diamond,
    Netherite,
}

impl ToolTier {
    pub const ALL: [ToolTier; 7] = [
        ToolTier::Wooden,
        ToolTier::Stone,
        ToolTier::Copper,
        ToolTier::Iron,
        ToolTier::Golden,
        ToolTier::Diamond,
        ToolTier::Netherite,
    ];

    pub fn from_material(material: Material) -> Option<Self> {
        match material {
            Material::WoodenPickaxe => Some(ToolTier::Wooden),
            Material::StonePickaxe => Some(ToolTier::Stone),
            Material::CopperPickaxe => Some(ToolTier::Copper),
            Material::IronPickaxe => Some(ToolTier::Iron),
            Material::GoldenPickaxe => Some(ToolTier::Golden),
            Material::DiamondPickaxe => Some(ToolTier::Diamond),
            Material::NetheritePickaxe => Some(ToolTier::Netherite),
            _ => None,
        }
    }

    pub fn material(self) -> Material {
        match self {
            ToolTier::Wooden => Material::WoodenPickaxe,
            ToolTier::Stone => Material::StonePickaxe,
            ToolTier::Copper => Material::CopperPickaxe,
            ToolTier::Iron => Material::IronPickaxe,
            ToolTier::Golden => Material::GoldenPickaxe,
            ToolTier::Diamond => Material::DiamondPickaxe,
            ToolTier::Netherite => Material::NetheritePickaxe,
        }
    }

    pub fn max_durability(self) -> u32 {
        match self {
            ToolTier::Wooden => 59,
            ToolTier::Stone => 131,
            ToolTier::Copper => 190,
            ToolTier::Iron => 250,
            ToolTier::Golden => 32,
            ToolTier::Diamond => 1561,
            ToolTier::Netherite => 2031,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: Material,
    pub amount: u32,
    /// Durability already consumed.
    pub damage: u32,
    pub enchantments: Vec<(Enchantment, u32)>,
}

impl ItemStack {
    pub fn new(material: Material, amount: u32) -> Self {
        Self {
            material,
            amount,
            damage: 0,
            enchantments: Vec::new(),
        }
    }

    pub fn with_enchantment(mut self, enchantment: Enchantment, level: u32) -> Self {
        self.enchantments.retain(|(e, _)| *e != enchantment);
        if level > 0 {
            self.enchantments.push((enchantment, level));
        }
        self
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn enchantment_level(&self, enchantment: Enchantment) -> u32 {
        self.enchantments
            .iter()
            .find(|(e, _)| *e == enchantment)
            .map_or(0, |(_, level)| *level)
    }

    pub fn max_stack_size(&self) -> u32 {
        self.material.max_stack_size()
    }

    pub fn is_full(&self) -> bool {
        self.amount >= self.max_stack_size()
    }

    /// Two stacks merge when nothing but their amount differs.
    pub fn stacks_with(&self, other: &ItemStack) -> bool {
        self.material == other.material
            && self.damage == other.damage
            && self.enchantments == other.enchantments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tier_round_trips_through_its_material() {
        for tier in ToolTier::ALL {
            assert_eq!(ToolTier::from_material(tier.material()), Some(tier));
        }
        assert_eq!(ToolTier::from_material(Material::Stone), None);
    }

    #[test]
    fn enchantment_levels_default_to_zero() {
        let pick = ItemStack::new(Material::IronPickaxe, 1)
            .with_enchantment(Enchantment::Efficiency, 3)
            .with_enchantment(Enchantment::Efficiency, 5);

        assert_eq!(pick.enchantment_level(Enchantment::Efficiency), 5);
        assert_eq!(pick.enchantment_level(Enchantment::Unbreaking), 0);
    }

    #[test]
    fn damaged_tools_do_not_stack_with_fresh_ones() {
        let fresh = ItemStack::new(Material::StonePickaxe, 1);
        let worn = ItemStack::new(Material::StonePickaxe, 1).with_damage(3);
        assert!(!fresh.stacks_with(&worn));
        assert!(ItemStack::new(Material::Coal, 3).stacks_with(&ItemStack::new(Material::Coal, 9)));
    }
}
