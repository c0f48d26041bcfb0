//! Player interactions that create and remove generators.

use crate::cobblegen::registry::GeneratorRegistry;
use crate::constants::TOOL_SLOT;
use crate::core::block::Material;
use crate::host::{BlockLocation, Host, MessageLevel, Player, PlayerId, Sound, VoxelWorld};
use crate::utils::settings::GeneratorSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupOutcome {
    Created,
    Removed,
    /// The barrel's tool slot already holds something.
    SlotOccupied,
    /// The interaction does not concern generators.
    Ignored,
}

/// A sneaking player right-clicks a barrel while holding a pickaxe: the
/// pickaxe moves into the barrel's tool slot and the barrel starts producing.
pub fn create_generator<H: Host>(
    host: &mut H,
    registry: &mut GeneratorRegistry,
    settings: &GeneratorSettings,
    player_id: PlayerId,
    at: BlockLocation,
) -> SetupOutcome {
    if !settings.enabled {
        return SetupOutcome::Ignored;
    }

    let Some(player) = host.player_mut(player_id) else {
        return SetupOutcome::Ignored;
    };
    let tool = match player.main_hand() {
        Some(stack) if player.is_sneaking() && stack.material.tool_tier().is_some() => stack.clone(),
        _ => return SetupOutcome::Ignored,
    };

    let Some(world) = host.world_mut(at.world) else {
        return SetupOutcome::Ignored;
    };
    if world.block(at.pos) != Material::Barrel {
        return SetupOutcome::Ignored;
    }
    let placed = match world.container_mut(at.pos) {
        Some(container) if container.slot(TOOL_SLOT).is_some() => Some(false),
        Some(container) => {
            container.set_slot(TOOL_SLOT, Some(tool));
            Some(true)
        }
        None => None,
    };

    match placed {
        Some(true) => {}
        Some(false) => {
            if let Some(player) = host.player_mut(player_id) {
                player.send_message(
                    MessageLevel::Warning,
                    "Slot 0 of this barrel is already occupied. Clear it before creating a generator.",
                );
            }
            return SetupOutcome::SlotOccupied;
        }
        None => {
            if let Some(player) = host.player_mut(player_id) {
                player.send_message(
                    MessageLevel::Error,
                    "This block cannot function as a cobblestone generator.",
                );
            }
            return SetupOutcome::Ignored;
        }
    }

    registry.register(at);

    if settings.sound.on_create {
        if let Some(world) = host.world_mut(at.world) {
            world.play_sound(at.offset(0.5, 0.5, 0.5), Sound::GeneratorCreated, 0.8, 1.2);
        }
    }
    if let Some(player) = host.player_mut(player_id) {
        player.set_main_hand(None);
        player.send_message(
            MessageLevel::Success,
            "Cobblestone generator created. Your pickaxe has been placed into slot 0 of this barrel.",
        );
    }
    SetupOutcome::Created
}

/// Breaking a barrel retires any generator it hosted. `broken` is the
/// material the block had before it was broken.
pub fn remove_generator<H: Host>(
    host: &mut H,
    registry: &mut GeneratorRegistry,
    breaker: Option<PlayerId>,
    at: BlockLocation,
    broken: Material,
) -> SetupOutcome {
    if broken != Material::Barrel || !registry.unregister(at) {
        return SetupOutcome::Ignored;
    }
    if let Some(player) = breaker.and_then(|id| host.player_mut(id)) {
        player.send_message(MessageLevel::Info, "Cobblestone generator removed.");
    }
    SetupOutcome::Removed
}
