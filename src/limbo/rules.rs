//! Gameplay rules enforced around the holding world.

use crate::core::block::Material;
use crate::core::item::ItemStack;
use crate::host::{Player, VoxelWorld};
use crate::limbo::placement::in_platform_column;
use crate::utils::settings::Settings;

/// Block placement or breaking is refused anywhere in the platform column of
/// the holding world.
pub fn may_modify_block<W: VoxelWorld + ?Sized>(settings: &Settings, world: &W, x: i32, z: i32) -> bool {
    !(settings.is_holding_world(world.name()) && in_platform_column(x, z))
}

/// Keeps the building stack full after an accepted cobblestone placement in
/// the holding world. Returns true if the stack was refilled.
pub fn refill_after_place(
    settings: &Settings,
    world_name: &str,
    placed: Material,
    in_hand: &mut ItemStack,
) -> bool {
    if !settings.is_holding_world(world_name)
        || placed != Material::Cobblestone
        || in_hand.material != Material::Cobblestone
    {
        return false;
    }
    in_hand.amount = settings.limbo.cobblestone_stack_size;
    true
}

/// Whether right-clicking `clicked` should trigger an escape.
pub fn is_escape_marker<W: VoxelWorld + ?Sized>(settings: &Settings, world: &W, clicked: Material) -> bool {
    clicked == Material::RespawnAnchor && settings.is_holding_world(world.name())
}

/// Firework boosts are refused while gliding when the restriction is on.
pub fn allow_item_use<P: Player + ?Sized>(settings: &Settings, player: &P, item: Material) -> bool {
    !(settings.gameplay.disable_elytra_rocket_boost
        && item == Material::FireworkRocket
        && player.is_gliding())
}
