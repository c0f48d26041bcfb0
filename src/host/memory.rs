//! In-memory host
//!
//! A self-contained world server backing the demo binary and the tests:
//! sectioned chunk storage, block entities for barrels and spawners, players
//! with plain inventories, and a record of every effect and broadcast.

use glam::{DVec3, IVec3};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::constants::*;
use crate::core::block::{Dimension, EntityKind, Material};
use crate::core::chunk::Chunk;
use crate::core::inventory::{Container, Inventory};
use crate::core::item::ItemStack;
use crate::error::{Error, Result};
use crate::host::{
    Difficulty, GameRule, Host, Location, MessageLevel, Particle, Player, PlayerId, Sound,
    Terrain, VoxelWorld, WorldId,
};
use crate::world::generator::ChunkGenerator;

/// Effects recorded by a [`MemoryWorld`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum WorldEffect {
    Sound(DVec3, Sound),
    Particle(DVec3, Particle, u32),
}

pub struct MemoryWorld {
    id: WorldId,
    name: String,
    dimension: Dimension,
    seed: i64,
    min_height: i32,
    max_height: i32,
    generator: Option<ChunkGenerator>,
    chunks: FxHashMap<(i32, i32), Chunk>,
    stored: FxHashMap<(i32, i32), Chunk>,
    fresh: Vec<(i32, i32)>,
    containers: FxHashMap<IVec3, Inventory>,
    spawners: FxHashMap<IVec3, EntityKind>,
    spawn: DVec3,
    pub spawn_radius: i32,
    pub daylight_cycle: bool,
    pub mob_spawning: bool,
    pub time: i64,
    pub difficulty: Difficulty,
    pub effects: Vec<WorldEffect>,
}

impl MemoryWorld {
    pub fn new(id: WorldId, name: &str, dimension: Dimension, seed: i64, terrain: Terrain) -> Self {
        let (min_height, max_height) = match dimension {
            Dimension::Overworld => (-64, 320),
            Dimension::Nether | Dimension::End => (0, 256),
        };
        Self::with_heights(id, name, dimension, seed, terrain, min_height, max_height)
    }

    pub fn with_heights(
        id: WorldId,
        name: &str,
        dimension: Dimension,
        seed: i64,
        terrain: Terrain,
        min_height: i32,
        max_height: i32,
    ) -> Self {
        let generator = match terrain {
            Terrain::Generated => Some(ChunkGenerator::new(seed, dimension, min_height, max_height)),
            Terrain::Void => None,
        };
        Self {
            id,
            name: name.to_string(),
            dimension,
            seed,
            min_height,
            max_height,
            generator,
            chunks: FxHashMap::default(),
            stored: FxHashMap::default(),
            fresh: Vec::new(),
            containers: FxHashMap::default(),
            spawners: FxHashMap::default(),
            spawn: DVec3::new(0.5, 64.0, 0.5),
            spawn_radius: 10,
            daylight_cycle: true,
            mob_spawning: true,
            time: 0,
            difficulty: Difficulty::Normal,
            effects: Vec::new(),
        }
    }

    pub fn has_terrain(&self) -> bool {
        self.generator.is_some()
    }

    /// Accepts a chunk generated elsewhere (e.g. by a loader worker). Ignored
    /// when the chunk already exists, loaded or stored.
    pub fn insert_generated_chunk(&mut self, cx: i32, cz: i32, chunk: Chunk) -> bool {
        if self.chunks.contains_key(&(cx, cz)) || self.stored.contains_key(&(cx, cz)) {
            return false;
        }
        self.chunks.insert((cx, cz), chunk);
        self.fresh.push((cx, cz));
        true
    }

    /// Chunks that came out of the terrain generator since the last call, in
    /// generation order.
    pub fn take_fresh_chunks(&mut self) -> Vec<(i32, i32)> {
        std::mem::take(&mut self.fresh)
    }

    pub fn unload_chunk(&mut self, cx: i32, cz: i32) {
        if let Some(chunk) = self.chunks.remove(&(cx, cz)) {
            self.stored.insert((cx, cz), chunk);
        }
    }

    pub fn chunk(&self, cx: i32, cz: i32) -> Option<&Chunk> {
        self.chunks.get(&(cx, cz))
    }

    pub fn loaded_chunks(&self) -> impl Iterator<Item = (&(i32, i32), &Chunk)> {
        self.chunks.iter()
    }

    /// Every chunk the world holds, loaded or not.
    pub fn all_chunks(&self) -> impl Iterator<Item = (&(i32, i32), &Chunk)> {
        self.chunks.iter().chain(self.stored.iter())
    }

    /// Puts a previously saved chunk into storage. It is loaded on demand and
    /// never reported as freshly generated.
    pub fn store_chunk(&mut self, cx: i32, cz: i32, chunk: Chunk) {
        self.chunks.remove(&(cx, cz));
        self.stored.insert((cx, cz), chunk);
    }

    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn set_spawner(&mut self, pos: IVec3, kind: EntityKind) {
        self.set_block(pos, Material::Spawner);
        self.spawners.insert(pos, kind);
    }

    pub fn container(&self, pos: IVec3) -> Option<&Inventory> {
        self.containers.get(&pos)
    }

    fn in_height_range(&self, y: i32) -> bool {
        y >= self.min_height && y < self.max_height
    }
}

impl VoxelWorld for MemoryWorld {
    fn id(&self) -> WorldId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn seed(&self) -> i64 {
        self.seed
    }

    fn min_height(&self) -> i32 {
        self.min_height
    }

    fn max_height(&self) -> i32 {
        self.max_height
    }

    fn block(&self, pos: IVec3) -> Material {
        match self.chunks.get(&(pos.x >> 4, pos.z >> 4)) {
            Some(chunk) => chunk.get_block(pos.x & 15, pos.y, pos.z & 15),
            None => Material::Air,
        }
    }

    fn set_block(&mut self, pos: IVec3, material: Material) {
        if !self.in_height_range(pos.y) || !material.is_block() {
            return;
        }
        let (cx, cz) = (pos.x >> 4, pos.z >> 4);
        self.load_chunk(cx, cz);
        if let Some(chunk) = self.chunks.get_mut(&(cx, cz)) {
            chunk.set_block(pos.x & 15, pos.y, pos.z & 15, material);
        }

        if material == Material::Barrel {
            self.containers
                .entry(pos)
                .or_insert_with(|| Inventory::new(BARREL_SLOTS));
        } else {
            self.containers.remove(&pos);
        }
        if material != Material::Spawner {
            self.spawners.remove(&pos);
        }
    }

    fn spawner_type(&self, pos: IVec3) -> Option<EntityKind> {
        self.spawners.get(&pos).copied()
    }

    fn is_chunk_loaded(&self, cx: i32, cz: i32) -> bool {
        self.chunks.contains_key(&(cx, cz))
    }

    fn load_chunk(&mut self, cx: i32, cz: i32) {
        if self.chunks.contains_key(&(cx, cz)) {
            return;
        }
        if let Some(chunk) = self.stored.remove(&(cx, cz)) {
            self.chunks.insert((cx, cz), chunk);
            return;
        }
        match &self.generator {
            Some(generator) => {
                self.chunks.insert((cx, cz), generator.generate_chunk(cx, cz));
                self.fresh.push((cx, cz));
            }
            // Nothing generated, nothing to shape
            None => {
                self.chunks
                    .insert((cx, cz), Chunk::new(self.min_height, self.max_height));
            }
        }
    }

    fn spawn(&self) -> DVec3 {
        self.spawn
    }

    fn set_spawn(&mut self, pos: DVec3) {
        self.spawn = pos;
    }

    fn set_game_rule(&mut self, rule: GameRule) {
        match rule {
            GameRule::SpawnRadius(radius) => self.spawn_radius = radius,
            GameRule::DoDaylightCycle(enabled) => self.daylight_cycle = enabled,
            GameRule::DoMobSpawning(enabled) => self.mob_spawning = enabled,
        }
    }

    fn set_time(&mut self, time: i64) {
        self.time = time;
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    fn container_mut(&mut self, pos: IVec3) -> Option<&mut dyn Container> {
        self.containers
            .get_mut(&pos)
            .map(|inv| inv as &mut dyn Container)
    }

    fn play_sound(&mut self, pos: DVec3, sound: Sound, _volume: f32, _pitch: f32) {
        self.effects.push(WorldEffect::Sound(pos, sound));
    }

    fn spawn_particle(&mut self, pos: DVec3, particle: Particle, count: u32) {
        self.effects.push(WorldEffect::Particle(pos, particle, count));
    }
}

pub struct MemoryPlayer {
    id: PlayerId,
    name: String,
    location: Location,
    pub inventory: Inventory,
    pub main_hand: Option<ItemStack>,
    pub sneaking: bool,
    pub gliding: bool,
    pub messages: Vec<(MessageLevel, String)>,
}

impl MemoryPlayer {
    pub fn new(id: PlayerId, name: &str, location: Location) -> Self {
        Self {
            id,
            name: name.to_string(),
            location,
            inventory: Inventory::new(PLAYER_INVENTORY_SLOTS),
            main_hand: None,
            sneaking: false,
            gliding: false,
            messages: Vec::new(),
        }
    }
}

impl Player for MemoryPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Location {
        self.location
    }

    fn teleport(&mut self, to: Location) {
        self.location = to;
    }

    fn inventory_mut(&mut self) -> &mut dyn Container {
        &mut self.inventory
    }

    fn is_sneaking(&self) -> bool {
        self.sneaking
    }

    fn is_gliding(&self) -> bool {
        self.gliding
    }

    fn main_hand(&self) -> Option<&ItemStack> {
        self.main_hand.as_ref()
    }

    fn set_main_hand(&mut self, stack: Option<ItemStack>) {
        self.main_hand = stack;
    }

    fn send_message(&mut self, level: MessageLevel, text: &str) {
        self.messages.push((level, text.to_string()));
    }
}

#[derive(Default)]
pub struct MemoryHost {
    worlds: Vec<MemoryWorld>,
    players: FxHashMap<PlayerId, MemoryPlayer>,
    refused_worlds: FxHashSet<String>,
    pub broadcasts: Vec<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_world_id(&self) -> WorldId {
        WorldId(self.worlds.len() as u32)
    }

    pub fn add_world(
        &mut self,
        name: &str,
        dimension: Dimension,
        seed: i64,
        terrain: Terrain,
    ) -> WorldId {
        let id = self.next_world_id();
        self.worlds
            .push(MemoryWorld::new(id, name, dimension, seed, terrain));
        id
    }

    pub fn add_world_with_heights(
        &mut self,
        name: &str,
        dimension: Dimension,
        seed: i64,
        terrain: Terrain,
        min_height: i32,
        max_height: i32,
    ) -> WorldId {
        let id = self.next_world_id();
        self.worlds.push(MemoryWorld::with_heights(
            id, name, dimension, seed, terrain, min_height, max_height,
        ));
        id
    }

    /// Adds a world built by the caller from the id it will be stored under.
    pub fn insert_world_with<F>(&mut self, build: F) -> WorldId
    where
        F: FnOnce(WorldId) -> MemoryWorld,
    {
        let id = self.next_world_id();
        self.worlds.push(build(id));
        id
    }

    /// Makes `create_world` fail for `name`, simulating a broken world backend.
    pub fn refuse_world(&mut self, name: &str) {
        self.refused_worlds.insert(name.to_string());
    }

    pub fn add_player(&mut self, player: MemoryPlayer) {
        self.players.insert(player.id, player);
    }

    pub fn player(&self, id: PlayerId) -> Option<&MemoryPlayer> {
        self.players.get(&id)
    }

    pub fn worlds_mut(&mut self) -> impl Iterator<Item = &mut MemoryWorld> {
        self.worlds.iter_mut()
    }
}

impl Host for MemoryHost {
    type World = MemoryWorld;
    type Player = MemoryPlayer;

    fn world(&self, id: WorldId) -> Option<&MemoryWorld> {
        self.worlds.get(id.0 as usize)
    }

    fn world_mut(&mut self, id: WorldId) -> Option<&mut MemoryWorld> {
        self.worlds.get_mut(id.0 as usize)
    }

    fn world_id_by_name(&self, name: &str) -> Option<WorldId> {
        self.worlds.iter().find(|w| w.name == name).map(|w| w.id)
    }

    fn create_world(&mut self, name: &str, dimension: Dimension, terrain: Terrain) -> Result<WorldId> {
        if self.refused_worlds.contains(name) {
            return Err(Error::WorldUnavailable {
                name: name.to_string(),
            });
        }
        if let Some(id) = self.world_id_by_name(name) {
            return Ok(id);
        }
        let seed = self.worlds.first().map_or(0, |w| w.seed);
        Ok(self.add_world(name, dimension, seed, terrain))
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut MemoryPlayer> {
        self.players.get_mut(&id)
    }

    fn broadcast(&mut self, message: &str) {
        tracing::info!("[broadcast] {}", message);
        self.broadcasts.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_world() -> MemoryWorld {
        MemoryWorld::with_heights(WorldId(0), "world", Dimension::Overworld, 1, Terrain::Void, 0, 64)
    }

    #[test]
    fn barrels_carry_a_container_until_replaced() {
        let mut world = flat_world();
        let pos = IVec3::new(3, 10, 3);

        world.set_block(pos, Material::Barrel);
        assert_eq!(world.container_mut(pos).map(|c| c.size()), Some(BARREL_SLOTS));

        world.set_block(pos, Material::Stone);
        assert!(world.container_mut(pos).is_none());
    }

    #[test]
    fn unloaded_chunks_keep_their_blocks() {
        let mut world = flat_world();
        let pos = IVec3::new(20, 5, -3);
        world.set_block(pos, Material::Cobblestone);
        world.take_fresh_chunks();

        world.unload_chunk(1, -1);
        assert!(!world.is_chunk_loaded(1, -1));
        assert_eq!(world.block(pos), Material::Air);

        world.load_chunk(1, -1);
        assert_eq!(world.block(pos), Material::Cobblestone);
        assert!(world.take_fresh_chunks().is_empty());
    }

    #[test]
    fn out_of_range_heights_are_ignored() {
        let mut world = flat_world();
        world.set_block(IVec3::new(0, 64, 0), Material::Stone);
        world.set_block(IVec3::new(0, -1, 0), Material::Stone);
        assert_eq!(world.block(IVec3::new(0, 64, 0)), Material::Air);
        assert_eq!(world.block(IVec3::new(0, -1, 0)), Material::Air);
    }

    #[test]
    fn highest_block_skips_liquids() {
        let mut world = flat_world();
        world.set_block(IVec3::new(8, 20, 8), Material::Stone);
        world.set_block(IVec3::new(8, 21, 8), Material::Water);
        assert_eq!(world.highest_block_y(8, 8), 20);
        assert_eq!(world.highest_block_y(9, 9), 0);
    }

    #[test]
    fn inserted_world_gets_the_next_id() {
        let mut host = MemoryHost::new();
        host.add_world("world", Dimension::Overworld, 5, Terrain::Void);
        let id = host.insert_world_with(|id| {
            MemoryWorld::new(id, "restored", Dimension::Overworld, 5, Terrain::Void)
        });

        assert_eq!(id, WorldId(1));
        assert_eq!(host.world_id_by_name("restored"), Some(id));
        assert_eq!(host.world(id).map(|w| w.id()), Some(id));
    }

    #[test]
    fn refused_world_creation_fails() {
        let mut host = MemoryHost::new();
        host.refuse_world("limbo");
        assert!(host.create_world("limbo", Dimension::Overworld, Terrain::Void).is_err());
        assert!(host.create_world("other", Dimension::Overworld, Terrain::Void).is_ok());
    }
}
