use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::core::block::Dimension;
use crate::core::chunk::Chunk;
use crate::error::{Error, Result};
use crate::host::{MemoryWorld, Terrain, VoxelWorld, WorldId};

const MAGIC_HEADER: &[u8; 4] = b"SKVW";
const VERSION: u32 = 1;

pub const SNAPSHOT_FILE_EXTENSION: &str = "skv";
pub const DEFAULT_SNAPSHOT_FILE: &str = "world.skv";

#[derive(Serialize, Deserialize)]
pub struct SavedChunk {
    pub cx: i32,
    pub cz: i32,
    pub chunk: Chunk,
}

/// Block data of one in-memory world. Block entities (barrel contents,
/// spawner types) are not captured.
#[derive(Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub name: String,
    pub dimension: Dimension,
    pub seed: i64,
    pub min_height: i32,
    pub max_height: i32,
    pub generated_terrain: bool,
    pub spawn: DVec3,
    pub chunks: Vec<SavedChunk>,
}

impl WorldSnapshot {
    pub fn capture(world: &MemoryWorld) -> Self {
        let mut chunks: Vec<_> = world
            .all_chunks()
            .map(|(&(cx, cz), chunk)| SavedChunk {
                cx,
                cz,
                chunk: chunk.clone(),
            })
            .collect();
        chunks.sort_by_key(|c| (c.cx, c.cz));

        WorldSnapshot {
            name: world.name().to_string(),
            dimension: world.dimension(),
            seed: world.seed(),
            min_height: world.min_height(),
            max_height: world.max_height(),
            generated_terrain: world.has_terrain(),
            spawn: world.spawn(),
            chunks,
        }
    }

    /// Rebuilds the world with every chunk in storage, unloaded.
    pub fn restore(self, id: WorldId) -> MemoryWorld {
        let terrain = if self.generated_terrain {
            Terrain::Generated
        } else {
            Terrain::Void
        };
        let mut world = MemoryWorld::with_heights(
            id,
            &self.name,
            self.dimension,
            self.seed,
            terrain,
            self.min_height,
            self.max_height,
        );
        world.set_spawn(self.spawn);
        for saved in self.chunks {
            world.store_chunk(saved.cx, saved.cz, saved.chunk);
        }
        world
    }
}

pub fn save_snapshot<P: AsRef<Path>>(path: P, snapshot: &WorldSnapshot) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(MAGIC_HEADER)?;
    writer.write_all(&VERSION.to_le_bytes())?;

    let data = bincode::serialize(snapshot)?;
    writer.write_all(&(data.len() as u64).to_le_bytes())?;
    writer.write_all(&data)?;
    writer.flush()?;

    Ok(())
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<WorldSnapshot> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC_HEADER {
        return Err(Error::BadSnapshotHeader);
    }

    let mut version_bytes = [0u8; 4];
    reader.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version != VERSION {
        return Err(Error::UnsupportedSnapshotVersion(version));
    }

    let mut size_bytes = [0u8; 8];
    reader.read_exact(&mut size_bytes)?;
    let size = u64::from_le_bytes(size_bytes) as usize;

    let mut data = vec![0u8; size];
    reader.read_exact(&mut data)?;

    Ok(bincode::deserialize(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::Material;
    use glam::IVec3;

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("skyvoid-{}-{}.{}", tag, std::process::id(), SNAPSHOT_FILE_EXTENSION))
    }

    #[test]
    fn snapshot_survives_disk_and_restores_unloaded() {
        let mut world =
            MemoryWorld::with_heights(WorldId(0), "world", Dimension::Overworld, 9, Terrain::Void, 0, 64);
        world.set_block(IVec3::new(-5, 12, 40), Material::Cobblestone);
        world.set_spawn(DVec3::new(8.5, 13.0, 8.5));
        world.take_fresh_chunks();

        let path = temp_path("roundtrip");
        save_snapshot(&path, &WorldSnapshot::capture(&world)).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let mut restored = loaded.restore(WorldId(3));
        assert_eq!(restored.id(), WorldId(3));
        assert_eq!(restored.spawn(), DVec3::new(8.5, 13.0, 8.5));
        assert!(!restored.is_chunk_loaded(-1, 2));

        restored.load_chunk(-1, 2);
        assert_eq!(restored.block(IVec3::new(-5, 12, 40)), Material::Cobblestone);
        assert!(restored.take_fresh_chunks().is_empty());
    }

    #[test]
    fn foreign_file_is_rejected() {
        let path = temp_path("foreign");
        std::fs::write(&path, b"NOPE\x01\x00\x00\x00").unwrap();
        let result = load_snapshot(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(Error::BadSnapshotHeader)));
    }

    #[test]
    fn newer_version_is_rejected() {
        let path = temp_path("version");
        let mut bytes = MAGIC_HEADER.to_vec();
        bytes.extend_from_slice(&7u32.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();
        let result = load_snapshot(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(Error::UnsupportedSnapshotVersion(7))));
    }
}
