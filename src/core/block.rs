use serde::{Deserialize, Serialize};

use crate::core::item::ToolTier;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Material {
    #[default]
    Air,
    Stone,
    Cobblestone,
    Dirt,
    Grass,
    Sand,
    Gravel,
    Water,
    Lava,
    Bedrock,
    OakLog,
    OakPlanks,
    Netherrack,
    SoulSand,
    NetherBricks,
    NetherBrickFence,
    NetherBrickStairs,
    NetherBrickSlab,
    NetherWart,
    Spawner,
    EndPortalFrame,
    Barrel,
    RespawnAnchor,
    // Items without a block form
    WoodenPickaxe,
    StonePickaxe,
    CopperPickaxe,
    IronPickaxe,
    GoldenPickaxe,
    DiamondPickaxe,
    NetheritePickaxe,
    Coal,
    Charcoal,
    CoalBlock,
    BlazeRod,
    LavaBucket,
    Stick,
    FireworkRocket,
}

impl Material {
    pub fn is_air(&self) -> bool {
        *self == Material::Air
    }

    pub fn is_solid(&self) -> bool {
        self.is_block()
            && !matches!(
                self,
                Material::Air | Material::Water | Material::Lava | Material::NetherWart
            )
    }

    /// Whether this material can exist as a voxel in a world.
    pub fn is_block(&self) -> bool {
        !matches!(
            self,
            Material::WoodenPickaxe
                | Material::StonePickaxe
                | Material::CopperPickaxe
                | Material::IronPickaxe
                | Material::GoldenPickaxe
                | Material::DiamondPickaxe
                | Material::NetheritePickaxe
                | Material::Coal
                | Material::Charcoal
                | Material::BlazeRod
                | Material::LavaBucket
                | Material::Stick
                | Material::FireworkRocket
        )
    }

    /// Furnace fuels.
    pub fn is_fuel(&self) -> bool {
        matches!(
            self,
            Material::OakLog
                | Material::OakPlanks
                | Material::Stick
                | Material::Coal
                | Material::Charcoal
                | Material::CoalBlock
                | Material::BlazeRod
                | Material::LavaBucket
                | Material::WoodenPickaxe
                | Material::Barrel
        )
    }

    pub fn max_stack_size(&self) -> u32 {
        if self.tool_tier().is_some() {
            return 1;
        }
        match self {
            Material::LavaBucket => 1,
            _ => 64,
        }
    }

    /// Durability of a tool, 0 for anything that does not wear.
    pub fn max_durability(&self) -> u32 {
        self.tool_tier().map_or(0, ToolTier::max_durability)
    }

    pub fn tool_tier(&self) -> Option<ToolTier> {
        ToolTier::from_material(*self)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Dimension {
    Overworld,
    Nether,
    End,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EntityKind {
    Blaze,
    Zombie,
    Skeleton,
    Spider,
    CaveSpider,
    Silverfish,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_are_items_not_blocks() {
        assert!(!Material::DiamondPickaxe.is_block());
        assert!(!Material::DiamondPickaxe.is_solid());
        assert_eq!(Material::DiamondPickaxe.max_stack_size(), 1);
        assert_eq!(Material::DiamondPickaxe.max_durability(), 1561);
        assert_eq!(Material::Stone.max_durability(), 0);
    }

    #[test]
    fn liquids_and_plants_are_not_solid() {
        assert!(Material::Stone.is_solid());
        assert!(Material::Bedrock.is_solid());
        assert!(!Material::Water.is_solid());
        assert!(!Material::NetherWart.is_solid());
        assert!(!Material::Air.is_solid());
    }
}
