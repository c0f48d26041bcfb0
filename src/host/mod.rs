//! Host interfaces
//!
//! The simulation never owns a world. Everything it reads or writes goes
//! through these traits, which a server adapter implements. `memory` holds a
//! complete in-memory implementation used by the demo binary and the tests.

pub mod memory;

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

use crate::constants::CHUNK_SIZE;
use crate::core::block::{Dimension, EntityKind, Material};
use crate::core::inventory::Container;
use crate::core::item::ItemStack;
use crate::error::Result;

pub use memory::{MemoryHost, MemoryPlayer, MemoryWorld};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct WorldId(pub u32);

pub type PlayerId = u64;

/// World-scoped chunk identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChunkKey {
    pub world: WorldId,
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    pub fn new(world: WorldId, x: i32, z: i32) -> Self {
        Self { world, x, z }
    }

    /// The eight chunks sharing an edge or corner with this one.
    pub fn neighbors(self) -> impl Iterator<Item = ChunkKey> {
        (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dz| (dx, dz)))
            .filter(|&(dx, dz)| dx != 0 || dz != 0)
            .map(move |(dx, dz)| ChunkKey::new(self.world, self.x + dx, self.z + dz))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BlockLocation {
    pub world: WorldId,
    pub pos: IVec3,
}

impl BlockLocation {
    pub fn new(world: WorldId, pos: IVec3) -> Self {
        Self { world, pos }
    }

    pub fn chunk(&self) -> (i32, i32) {
        (self.pos.x >> 4, self.pos.z >> 4)
    }

    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> DVec3 {
        self.pos.as_dvec3() + DVec3::new(dx, dy, dz)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Location {
    pub world: WorldId,
    pub pos: DVec3,
}

impl Location {
    pub fn new(world: WorldId, pos: DVec3) -> Self {
        Self { world, pos }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameRule {
    SpawnRadius(i32),
    DoDaylightCycle(bool),
    DoMobSpawning(bool),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Peaceful,
    Easy,
    #[default]
    Normal,
    Hard,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sound {
    GeneratorCreated,
    StoneBreak,
    ToolBreak,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Particle {
    CampfireSmoke,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DamageCause {
    Void,
    Fall,
    Lava,
    Drowning,
    EntityAttack,
    Other,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MessageLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Terrain hint passed when the host creates a world on demand.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Terrain {
    Generated,
    Void,
}

pub trait VoxelWorld {
    fn id(&self) -> WorldId;

    fn name(&self) -> &str;

    fn dimension(&self) -> Dimension;

    fn seed(&self) -> i64;

    /// Lowest buildable height, inclusive.
    fn min_height(&self) -> i32;

    /// Build limit, exclusive.
    fn max_height(&self) -> i32;

    fn block(&self, pos: IVec3) -> Material;

    fn set_block(&mut self, pos: IVec3, material: Material);

    /// Entity configured on the spawner at `pos`, if there is one.
    fn spawner_type(&self, pos: IVec3) -> Option<EntityKind>;

    fn is_chunk_loaded(&self, cx: i32, cz: i32) -> bool;

    fn load_chunk(&mut self, cx: i32, cz: i32);

    fn spawn(&self) -> DVec3;

    fn set_spawn(&mut self, pos: DVec3);

    fn set_game_rule(&mut self, rule: GameRule);

    fn set_time(&mut self, time: i64);

    fn set_difficulty(&mut self, difficulty: Difficulty);

    fn container_mut(&mut self, pos: IVec3) -> Option<&mut dyn Container>;

    fn play_sound(&mut self, _pos: DVec3, _sound: Sound, _volume: f32, _pitch: f32) {}

    fn spawn_particle(&mut self, _pos: DVec3, _particle: Particle, _count: u32) {}

    /// Height of the topmost solid voxel in the column, or `min_height` if
    /// the column holds none.
    fn highest_block_y(&self, x: i32, z: i32) -> i32 {
        (self.min_height()..self.max_height())
            .rev()
            .find(|&y| self.block(IVec3::new(x, y, z)).is_solid())
            .unwrap_or(self.min_height())
    }

    /// Block-space origin of a chunk.
    fn chunk_origin(&self, cx: i32, cz: i32) -> (i32, i32) {
        (cx * CHUNK_SIZE, cz * CHUNK_SIZE)
    }
}

pub trait Player {
    fn id(&self) -> PlayerId;

    fn name(&self) -> &str;

    fn location(&self) -> Location;

    fn teleport(&mut self, to: Location);

    fn inventory_mut(&mut self) -> &mut dyn Container;

    fn is_sneaking(&self) -> bool;

    fn is_gliding(&self) -> bool;

    fn main_hand(&self) -> Option<&ItemStack>;

    fn set_main_hand(&mut self, stack: Option<ItemStack>);

    fn send_message(&mut self, level: MessageLevel, text: &str);
}

pub trait Host {
    type World: VoxelWorld;
    type Player: Player;

    fn world(&self, id: WorldId) -> Option<&Self::World>;

    fn world_mut(&mut self, id: WorldId) -> Option<&mut Self::World>;

    fn world_id_by_name(&self, name: &str) -> Option<WorldId>;

    fn create_world(&mut self, name: &str, dimension: Dimension, terrain: Terrain)
    -> Result<WorldId>;

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Self::Player>;

    fn broadcast(&mut self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_key_has_eight_distinct_neighbors() {
        let key = ChunkKey::new(WorldId(1), -3, 7);
        let neighbors: Vec<_> = key.neighbors().collect();

        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&key));
        assert!(neighbors.contains(&ChunkKey::new(WorldId(1), -4, 6)));
        assert!(neighbors.contains(&ChunkKey::new(WorldId(1), -2, 8)));
    }

    #[test]
    fn block_location_chunk_uses_floor_division() {
        let loc = BlockLocation::new(WorldId(0), IVec3::new(-1, 64, 17));
        assert_eq!(loc.chunk(), (-1, 1));
    }
}
