//! Structure protection
//!
//! Chunks holding an end portal room or a nether fortress are exempt from
//! voiding. Both rules scan the whole chunk volume once; the result is
//! memoized in [`ProtectedChunks`], which only ever grows.

use glam::IVec3;
use rustc_hash::FxHashSet;

use crate::constants::CHUNK_SIZE;
use crate::core::block::{EntityKind, Material};
use crate::host::{ChunkKey, VoxelWorld};

#[derive(Default, Debug)]
pub struct ProtectedChunks {
    chunks: FxHashSet<ChunkKey>,
}

impl ProtectedChunks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        self.chunks.contains(&key)
    }

    /// Returns true if the chunk was not protected before.
    pub fn protect(&mut self, key: ChunkKey) -> bool {
        self.chunks.insert(key)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Finds the first voxel in the chunk column matching `pred`.
fn scan_chunk<W, F>(world: &W, cx: i32, cz: i32, mut pred: F) -> Option<IVec3>
where
    W: VoxelWorld + ?Sized,
    F: FnMut(IVec3, Material) -> bool,
{
    let (base_x, base_z) = world.chunk_origin(cx, cz);
    for y in world.min_height()..world.max_height() {
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let pos = IVec3::new(base_x + lx, y, base_z + lz);
                if pred(pos, world.block(pos)) {
                    return Some(pos);
                }
            }
        }
    }
    None
}

/// Keeps chunks containing end portal frames, optionally with their ring of
/// eight neighbors so the portal room is never cut in half.
#[derive(Clone, Copy, Debug)]
pub struct OverworldProtection {
    pub enabled: bool,
    pub neighbors: bool,
}

impl OverworldProtection {
    pub fn should_protect<W: VoxelWorld + ?Sized>(
        &self,
        world: &W,
        cx: i32,
        cz: i32,
        protected: &mut ProtectedChunks,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        let key = ChunkKey::new(world.id(), cx, cz);
        if protected.contains(key) {
            return true;
        }

        let found = scan_chunk(world, cx, cz, |_, material| material == Material::EndPortalFrame);
        let Some(pos) = found else {
            return false;
        };

        tracing::info!("Protecting end portal chunk ({}, {}) at {}", cx, cz, pos);
        protected.protect(key);
        if self.neighbors {
            for neighbor in key.neighbors() {
                protected.protect(neighbor);
            }
        }
        true
    }
}

/// Keeps chunks containing nether wart or a blaze spawner. Neighbors are
/// left alone.
#[derive(Clone, Copy, Debug)]
pub struct NetherProtection {
    pub enabled: bool,
}

impl NetherProtection {
    pub fn should_protect<W: VoxelWorld + ?Sized>(
        &self,
        world: &W,
        cx: i32,
        cz: i32,
        protected: &mut ProtectedChunks,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        let key = ChunkKey::new(world.id(), cx, cz);
        if protected.contains(key) {
            return true;
        }

        let found = scan_chunk(world, cx, cz, |pos, material| match material {
            Material::NetherWart => true,
            Material::Spawner => world.spawner_type(pos) == Some(EntityKind::Blaze),
            _ => false,
        });
        if found.is_none() {
            return false;
        }

        tracing::info!("Protecting fortress chunk ({}, {})", cx, cz);
        protected.protect(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::Dimension;
    use crate::host::{MemoryWorld, Terrain, WorldId};

    fn world(dimension: Dimension) -> MemoryWorld {
        MemoryWorld::with_heights(WorldId(0), "world", dimension, 1, Terrain::Void, 0, 32)
    }

    #[test]
    fn portal_frame_protects_chunk_and_neighbors() {
        let mut w = world(Dimension::Overworld);
        w.set_block(IVec3::new(20, 10, 5), Material::EndPortalFrame);
        let rule = OverworldProtection {
            enabled: true,
            neighbors: true,
        };
        let mut protected = ProtectedChunks::new();

        assert!(rule.should_protect(&w, 1, 0, &mut protected));
        assert_eq!(protected.len(), 9);
        assert!(protected.contains(ChunkKey::new(WorldId(0), 2, 1)));
        assert!(protected.contains(ChunkKey::new(WorldId(0), 0, -1)));

        // A neighbor is protected without ever being scanned
        assert!(rule.should_protect(&w, 2, 1, &mut protected));
    }

    #[test]
    fn portal_frame_without_neighbor_toggle_protects_one_chunk() {
        let mut w = world(Dimension::Overworld);
        w.set_block(IVec3::new(3, 3, 3), Material::EndPortalFrame);
        let rule = OverworldProtection {
            enabled: true,
            neighbors: false,
        };
        let mut protected = ProtectedChunks::new();

        assert!(rule.should_protect(&w, 0, 0, &mut protected));
        assert_eq!(protected.len(), 1);
        assert!(!rule.should_protect(&w, 1, 0, &mut protected));
    }

    #[test]
    fn disabled_rule_never_protects() {
        let mut w = world(Dimension::Overworld);
        w.set_block(IVec3::new(3, 3, 3), Material::EndPortalFrame);
        let rule = OverworldProtection {
            enabled: false,
            neighbors: true,
        };
        let mut protected = ProtectedChunks::new();
        assert!(!rule.should_protect(&w, 0, 0, &mut protected));
        assert!(protected.is_empty());
    }

    #[test]
    fn only_blaze_spawners_mark_a_fortress() {
        let mut w = world(Dimension::Nether);
        let rule = NetherProtection { enabled: true };
        let mut protected = ProtectedChunks::new();

        w.set_spawner(IVec3::new(4, 12, 4), EntityKind::Zombie);
        assert!(!rule.should_protect(&w, 0, 0, &mut protected));

        w.set_spawner(IVec3::new(-4, 12, 4), EntityKind::Blaze);
        assert!(rule.should_protect(&w, -1, 0, &mut protected));
        assert_eq!(protected.len(), 1);
    }

    #[test]
    fn nether_wart_marks_a_fortress() {
        let mut w = world(Dimension::Nether);
        w.set_block(IVec3::new(0, 20, 15), Material::NetherWart);
        let rule = NetherProtection { enabled: true };
        let mut protected = ProtectedChunks::new();
        assert!(rule.should_protect(&w, 0, 0, &mut protected));
    }
}
