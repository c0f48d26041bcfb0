//! Chunk voiding
//!
//! Decides, once per chunk per run, whether freshly generated terrain stays
//! or is erased. Only first-generation chunks may be fed in; chunks loaded
//! back from storage carry player builds and must never reach this engine.

use glam::{DVec3, IVec3};
use rustc_hash::FxHashSet;

use crate::constants::{CHUNK_SIZE, EMPTY_COLUMN_SURFACE_OFFSET};
use crate::core::block::{Dimension, Material};
use crate::host::{ChunkKey, GameRule, VoxelWorld};
use crate::utils::settings::Settings;
use crate::world::protection::{NetherProtection, OverworldProtection, ProtectedChunks};
use crate::world::region::RegionPlanner;

/// What happened to a chunk handed to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkVerdict {
    AlreadyProcessed,
    Protected,
    Kept,
    Voided { cleared: usize },
}

/// Blocks left in place when a chunk of the given dimension is voided.
fn preserved_materials(dimension: Dimension) -> &'static [Material] {
    match dimension {
        Dimension::Nether => &[
            Material::NetherBricks,
            Material::NetherBrickFence,
            Material::NetherBrickStairs,
            Material::NetherBrickSlab,
        ],
        Dimension::Overworld | Dimension::End => &[],
    }
}

pub struct ChunkVoidEngine {
    region_size: i32,
    spawn_on_island: bool,
    overworld: OverworldProtection,
    nether: NetherProtection,
    processed: FxHashSet<ChunkKey>,
    protected: ProtectedChunks,
}

impl ChunkVoidEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            region_size: settings.world.region_size_chunks.max(1),
            spawn_on_island: settings.world.spawn_on_island,
            overworld: OverworldProtection {
                enabled: settings.protection.end_portal_room,
                neighbors: settings.protection.end_portal_neighbors,
            },
            nether: NetherProtection {
                enabled: settings.protection.nether_fortress,
            },
            processed: FxHashSet::default(),
            protected: ProtectedChunks::new(),
        }
    }

    pub fn planner_for<W: VoxelWorld + ?Sized>(&self, world: &W) -> RegionPlanner {
        RegionPlanner::new(world.seed(), self.region_size)
    }

    pub fn is_processed(&self, key: ChunkKey) -> bool {
        self.processed.contains(&key)
    }

    pub fn is_protected(&self, key: ChunkKey) -> bool {
        self.protected.contains(key)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn on_chunk_generated<W: VoxelWorld + ?Sized>(
        &mut self,
        world: &mut W,
        cx: i32,
        cz: i32,
    ) -> ChunkVerdict {
        let key = ChunkKey::new(world.id(), cx, cz);
        if !self.processed.insert(key) {
            return ChunkVerdict::AlreadyProcessed;
        }

        let protected = match world.dimension() {
            Dimension::Overworld => {
                self.overworld
                    .should_protect(&*world, cx, cz, &mut self.protected)
            }
            Dimension::Nether => self.nether.should_protect(&*world, cx, cz, &mut self.protected),
            Dimension::End => false,
        };
        if protected {
            tracing::debug!("Chunk ({}, {}) protected", cx, cz);
            return ChunkVerdict::Protected;
        }

        if self.planner_for(&*world).is_kept(cx, cz) {
            tracing::debug!("Chunk ({}, {}) kept as region island", cx, cz);
            return ChunkVerdict::Kept;
        }

        let keep = preserved_materials(world.dimension());
        let cleared = clear_chunk(world, cx, cz, keep);
        tracing::debug!("Chunk ({}, {}) voided, {} blocks cleared", cx, cz, cleared);
        ChunkVerdict::Voided { cleared }
    }

    /// Erases a fresh holding-world chunk entirely, at most once per run.
    pub fn void_holding_chunk<W: VoxelWorld + ?Sized>(
        &mut self,
        world: &mut W,
        cx: i32,
        cz: i32,
    ) -> ChunkVerdict {
        if !self.processed.insert(ChunkKey::new(world.id(), cx, cz)) {
            return ChunkVerdict::AlreadyProcessed;
        }
        let cleared = clear_chunk(world, cx, cz, &[]);
        ChunkVerdict::Voided { cleared }
    }

    /// Moves the world spawn onto the origin island and disables spawn
    /// scatter. Returns the new spawn point, or `None` when spawn-on-island
    /// is turned off.
    pub fn ensure_spawn_on_island<W: VoxelWorld + ?Sized>(&self, world: &mut W) -> Option<DVec3> {
        if !self.spawn_on_island {
            return None;
        }

        let (cx, cz) = self.planner_for(&*world).kept_chunk(0, 0);
        world.load_chunk(cx, cz);

        let (base_x, base_z) = world.chunk_origin(cx, cz);
        let x = base_x + CHUNK_SIZE / 2;
        let z = base_z + CHUNK_SIZE / 2;
        let mut y = world.highest_block_y(x, z);
        if y <= world.min_height() {
            y = world.min_height() + EMPTY_COLUMN_SURFACE_OFFSET;
        }

        let spawn = DVec3::new(x as f64 + 0.5, (y + 1) as f64, z as f64 + 0.5);
        world.set_spawn(spawn);
        world.set_game_rule(GameRule::SpawnRadius(0));
        tracing::info!("Spawn placed on island chunk ({}, {}) at {}", cx, cz, spawn);
        Some(spawn)
    }
}

/// Sets every non-air voxel of the chunk to air unless it is in `keep`.
fn clear_chunk<W: VoxelWorld + ?Sized>(world: &mut W, cx: i32, cz: i32, keep: &[Material]) -> usize {
    let (base_x, base_z) = world.chunk_origin(cx, cz);
    let mut cleared = 0;
    for y in world.min_height()..world.max_height() {
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let pos = IVec3::new(base_x + lx, y, base_z + lz);
                let material = world.block(pos);
                if material.is_air() || keep.contains(&material) {
                    continue;
                }
                world.set_block(pos, Material::Air);
                cleared += 1;
            }
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::EntityKind;
    use crate::host::{MemoryWorld, Terrain, WorldId};

    fn stone_world(dimension: Dimension) -> MemoryWorld {
        let mut world =
            MemoryWorld::with_heights(WorldId(0), "world", dimension, 2137, Terrain::Void, 0, 32);
        for cx in -1..=6 {
            for cz in -1..=6 {
                fill_floor(&mut world, cx, cz);
            }
        }
        world
    }

    fn fill_floor(world: &mut MemoryWorld, cx: i32, cz: i32) {
        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                for y in 0..4 {
                    world.set_block(IVec3::new(cx * 16 + lx, y, cz * 16 + lz), Material::Stone);
                }
            }
        }
    }

    #[test]
    fn origin_chunk_is_kept_and_neighbors_voided() {
        let mut world = stone_world(Dimension::Overworld);
        let mut engine = ChunkVoidEngine::new(&Settings::default());

        assert_eq!(engine.on_chunk_generated(&mut world, 0, 0), ChunkVerdict::Kept);
        assert_eq!(
            engine.on_chunk_generated(&mut world, 5, 5),
            ChunkVerdict::Voided { cleared: 16 * 16 * 4 }
        );
        assert!(world.chunk(5, 5).is_some_and(|c| c.is_empty()));
        assert_eq!(world.block(IVec3::new(8, 3, 8)), Material::Stone);
    }

    #[test]
    fn second_pass_never_touches_player_builds() {
        let mut world = stone_world(Dimension::Overworld);
        let mut engine = ChunkVoidEngine::new(&Settings::default());

        engine.on_chunk_generated(&mut world, 3, 2);
        let placed = IVec3::new(3 * 16 + 2, 10, 2 * 16 + 2);
        world.set_block(placed, Material::Cobblestone);

        assert_eq!(engine.on_chunk_generated(&mut world, 3, 2), ChunkVerdict::AlreadyProcessed);
        assert_eq!(world.block(placed), Material::Cobblestone);
    }

    #[test]
    fn portal_chunk_survives_and_shields_neighbors() {
        let mut world = stone_world(Dimension::Overworld);
        world.set_block(IVec3::new(5 * 16 + 3, 6, 5 * 16 + 3), Material::EndPortalFrame);
        let mut engine = ChunkVoidEngine::new(&Settings::default());

        assert_eq!(engine.on_chunk_generated(&mut world, 5, 5), ChunkVerdict::Protected);
        assert_eq!(engine.on_chunk_generated(&mut world, 4, 6), ChunkVerdict::Protected);
        assert!(engine.is_protected(ChunkKey::new(WorldId(0), 6, 4)));
        assert!(!world.chunk(4, 6).is_some_and(|c| c.is_empty()));
    }

    #[test]
    fn nether_voiding_preserves_fortress_bricks() {
        let mut world = stone_world(Dimension::Nether);
        let brick = IVec3::new(2 * 16 + 1, 8, 16 + 1);
        world.set_block(brick, Material::NetherBricks);
        let mut settings = Settings::default();
        settings.protection.nether_fortress = true;
        let mut engine = ChunkVoidEngine::new(&settings);

        let verdict = engine.on_chunk_generated(&mut world, 2, 1);
        assert!(matches!(verdict, ChunkVerdict::Voided { .. }));
        assert_eq!(world.block(brick), Material::NetherBricks);
        assert_eq!(world.block(IVec3::new(2 * 16, 0, 16)), Material::Air);
    }

    #[test]
    fn blaze_spawner_protects_nether_chunk() {
        let mut world = stone_world(Dimension::Nether);
        world.set_spawner(IVec3::new(16 + 4, 10, 4), EntityKind::Blaze);
        let mut engine = ChunkVoidEngine::new(&Settings::default());
        assert_eq!(engine.on_chunk_generated(&mut world, 1, 0), ChunkVerdict::Protected);
    }

    #[test]
    fn holding_chunks_are_wiped_once() {
        let mut world = stone_world(Dimension::Overworld);
        let mut engine = ChunkVoidEngine::new(&Settings::default());

        assert!(matches!(
            engine.void_holding_chunk(&mut world, 0, 0),
            ChunkVerdict::Voided { cleared } if cleared > 0
        ));
        assert_eq!(engine.void_holding_chunk(&mut world, 0, 0), ChunkVerdict::AlreadyProcessed);
    }

    #[test]
    fn spawn_lands_on_top_of_origin_island() {
        let mut world = stone_world(Dimension::Overworld);
        let engine = ChunkVoidEngine::new(&Settings::default());

        let spawn = engine.ensure_spawn_on_island(&mut world);
        assert_eq!(spawn, Some(DVec3::new(8.5, 4.0, 8.5)));
        assert_eq!(world.spawn_radius, 0);
    }

    #[test]
    fn spawn_ignores_water_above_the_island() {
        let mut world = stone_world(Dimension::Overworld);
        for y in 4..9 {
            world.set_block(IVec3::new(8, y, 8), Material::Water);
        }
        let engine = ChunkVoidEngine::new(&Settings::default());

        let spawn = engine.ensure_spawn_on_island(&mut world);
        assert_eq!(spawn, Some(DVec3::new(8.5, 4.0, 8.5)));
    }

    #[test]
    fn empty_origin_column_falls_back_above_minimum() {
        let mut world =
            MemoryWorld::with_heights(WorldId(0), "world", Dimension::Overworld, 1, Terrain::Void, -64, 320);
        let engine = ChunkVoidEngine::new(&Settings::default());

        let spawn = engine.ensure_spawn_on_island(&mut world);
        assert_eq!(spawn, Some(DVec3::new(8.5, 1.0, 8.5)));
    }
}
