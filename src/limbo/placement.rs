//! Holding world entry and exit
//!
//! Players routed here land on a small bedrock platform with a starter kit.
//! Entry from the main world scatters escape anchors around the platform;
//! using one returns the player to the main world's spawn.

use glam::{DVec3, IVec3};

use crate::constants::*;
use crate::core::block::{Dimension, Material};
use crate::core::item::ItemStack;
use crate::core::random::RandomSource;
use crate::error::Result;
use crate::host::{
    BlockLocation, Difficulty, GameRule, Host, Location, Player, PlayerId, Terrain, VoxelWorld,
    WorldId,
};
use crate::utils::settings::{LimboSettings, Settings};

/// Whether `(x, z)` lies in the column above or below the platform.
pub fn in_platform_column(x: i32, z: i32) -> bool {
    let xs = PLATFORM_CENTER_X - PLATFORM_EXTENT_NEG..=PLATFORM_CENTER_X + PLATFORM_EXTENT_POS;
    let zs = PLATFORM_CENTER_Z - PLATFORM_EXTENT_NEG..=PLATFORM_CENTER_Z + PLATFORM_EXTENT_POS;
    xs.contains(&x) && zs.contains(&z)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryReport {
    pub anchors: Vec<IVec3>,
}

pub struct HoldingWorld {
    settings: LimboSettings,
    main_world: String,
}

impl HoldingWorld {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.limbo.clone(),
            main_world: settings.world.target_world.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.world_name
    }

    /// Where a routed player respawns: just above the platform center.
    pub fn spawn_point(&self, world: WorldId) -> Location {
        Location::new(
            world,
            DVec3::new(
                PLATFORM_CENTER_X as f64 + 0.5,
                (self.settings.platform_y + 1) as f64,
                PLATFORM_CENTER_Z as f64 + 0.5,
            ),
        )
    }

    /// Looks the holding world up, creating it on first use, and pins it to
    /// a peaceful, perpetual night.
    pub fn ensure_world<H: Host>(&self, host: &mut H) -> Result<WorldId> {
        let name = self.settings.world_name.as_str();
        let id = match host.world_id_by_name(name) {
            Some(id) => id,
            None => {
                let id = host
                    .create_world(name, Dimension::Overworld, Terrain::Void)
                    .inspect_err(|err| tracing::warn!("Could not create holding world: {}", err))?;
                tracing::info!("Created holding world `{}`", name);
                id
            }
        };

        if let Some(world) = host.world_mut(id) {
            world.set_time(MIDNIGHT);
            world.set_game_rule(GameRule::DoDaylightCycle(false));
            world.set_game_rule(GameRule::DoMobSpawning(false));
            world.set_difficulty(Difficulty::Peaceful);
        }
        Ok(id)
    }

    /// Places the player on the platform with a fresh starter kit, scattering
    /// new escape anchors when `spawn_anchors` is set.
    pub fn enter<H, R>(
        &self,
        host: &mut H,
        player_id: PlayerId,
        spawn_anchors: bool,
        rng: &mut R,
    ) -> Result<EntryReport>
    where
        H: Host,
        R: RandomSource + ?Sized,
    {
        let id = self.ensure_world(host)?;
        let mut report = EntryReport::default();

        if let Some(world) = host.world_mut(id) {
            world.load_chunk(0, 0);
            self.build_platform(world);
        }

        let name = {
            let Some(player) = host.player_mut(player_id) else {
                return Ok(report);
            };
            player.teleport(self.spawn_point(id));
            let inventory = player.inventory_mut();
            inventory.clear();
            inventory.add_item(ItemStack::new(Material::CopperPickaxe, 1));
            inventory.add_item(ItemStack::new(
                Material::Cobblestone,
                self.settings.cobblestone_stack_size,
            ));
            player.name().to_string()
        };

        if spawn_anchors {
            if let Some(world) = host.world_mut(id) {
                report.anchors = self.spawn_anchors(world, self.settings.anchors_per_entry, rng);
            }
            host.broadcast(&format!("{} has been sent to Limbo!", name));
        }
        Ok(report)
    }

    fn build_platform<W: VoxelWorld + ?Sized>(&self, world: &mut W) {
        let y = self.settings.platform_y;
        for x in PLATFORM_CENTER_X - PLATFORM_EXTENT_NEG..=PLATFORM_CENTER_X + PLATFORM_EXTENT_POS {
            for z in PLATFORM_CENTER_Z - PLATFORM_EXTENT_NEG..=PLATFORM_CENTER_Z + PLATFORM_EXTENT_POS {
                world.set_block(IVec3::new(x, y, z), Material::Bedrock);
            }
        }
    }

    /// Scatters up to `count` anchors by polar sampling around the origin.
    /// A sample inside the platform column is redrawn; an anchor that still
    /// lands there after the last attempt is skipped.
    pub fn spawn_anchors<W, R>(&self, world: &mut W, count: u32, rng: &mut R) -> Vec<IVec3>
    where
        W: VoxelWorld + ?Sized,
        R: RandomSource + ?Sized,
    {
        let min_y = self.settings.anchor_min_y;
        let max_y = self.settings.anchor_max_y;
        let radius = self.settings.anchor_radius.max(1);
        let mut placed = Vec::new();

        for _ in 0..count {
            let mut attempts = 0;
            let (x, z) = loop {
                let angle = rng.next_f64() * std::f64::consts::TAU;
                let dist = (rng.next_int(radius) + 1) as f64;
                let x = (angle.cos() * dist).round() as i32;
                let z = (angle.sin() * dist).round() as i32;
                attempts += 1;
                if !in_platform_column(x, z) || attempts >= ANCHOR_PLACEMENT_ATTEMPTS {
                    break (x, z);
                }
            };
            if in_platform_column(x, z) {
                tracing::debug!("Skipping anchor after {} attempts", attempts);
                continue;
            }

            let y = min_y + rng.next_int((max_y - min_y + 1).max(1));
            world.load_chunk(x >> 4, z >> 4);
            let pos = IVec3::new(x, y, z);
            world.set_block(pos, Material::RespawnAnchor);
            placed.push(pos);
        }

        placed
    }

    /// Consumes the anchor at `marker` and sends the player home. Returns
    /// false when the main world is missing; the anchor is gone either way.
    pub fn escape<H: Host>(&self, host: &mut H, player_id: PlayerId, marker: BlockLocation) -> bool {
        if let Some(world) = host.world_mut(marker.world) {
            world.set_block(marker.pos, Material::Air);
        }

        let Some(main) = host.world_id_by_name(&self.main_world) else {
            return false;
        };
        let Some(spawn) = host.world(main).map(|w| w.spawn()) else {
            return false;
        };

        let name = {
            let Some(player) = host.player_mut(player_id) else {
                return false;
            };
            player.inventory_mut().clear();
            player.teleport(Location::new(main, spawn));
            player.name().to_string()
        };

        tracing::info!("{} used an escape anchor at {}", name, marker.pos);
        host.broadcast(&format!("{} has escaped Limbo!", name));
        true
    }
}
