//! Thread-safe terrain generation using FastNoiseLite
//!
//! Produces the raw terrain that the void engine later shapes. Generators are
//! immutable after construction so each loader worker can own one.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use crate::constants::*;
use crate::core::block::{Dimension, Material};
use crate::core::chunk::Chunk;

const SEA_LEVEL: i32 = 62;
const NETHER_LAVA_LEVEL: i32 = 31;

pub struct ChunkGenerator {
    dimension: Dimension,
    min_y: i32,
    max_y: i32,
    noise_terrain: FastNoiseLite,
    noise_detail: FastNoiseLite,
    noise_cave: FastNoiseLite,
    pub seed: i64,
}

impl ChunkGenerator {
    pub fn new(seed: i64, dimension: Dimension, min_y: i32, max_y: i32) -> Self {
        let base = (seed ^ (seed >> 32)) as i32;
        ChunkGenerator {
            dimension,
            min_y,
            max_y,
            noise_terrain: Self::create_fbm_noise(base, 0.008),
            noise_detail: Self::create_noise(base.wrapping_add(1), 0.05),
            noise_cave: Self::create_noise(base.wrapping_add(2), 0.06),
            seed,
        }
    }

    fn create_noise(seed: i32, frequency: f32) -> FastNoiseLite {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(frequency));
        noise
    }

    fn create_fbm_noise(seed: i32, frequency: f32) -> FastNoiseLite {
        let mut noise = Self::create_noise(seed, frequency);
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(4));
        noise.set_fractal_lacunarity(Some(2.0));
        noise.set_fractal_gain(Some(0.5));
        noise
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Generate a complete chunk at the given coordinates
    pub fn generate_chunk(&self, cx: i32, cz: i32) -> Chunk {
        let mut chunk = Chunk::new(self.min_y, self.max_y);
        match self.dimension {
            Dimension::Overworld => self.generate_overworld(&mut chunk, cx, cz),
            Dimension::Nether => self.generate_nether(&mut chunk, cx, cz),
            Dimension::End => {}
        }
        chunk
    }

    fn surface_height(&self, x: i32, z: i32) -> i32 {
        let (fx, fz) = (x as f32, z as f32);
        let base = self.noise_terrain.get_noise_2d(fx, fz) * 24.0;
        let detail = self.noise_detail.get_noise_2d(fx, fz) * 3.0;
        (SEA_LEVEL + 6 + (base + detail) as i32).clamp(self.min_y + 8, self.max_y - 8)
    }

    fn is_cave(&self, x: i32, y: i32, z: i32) -> bool {
        self.noise_cave.get_noise_3d(x as f32, y as f32 * 1.5, z as f32) > 0.72
    }

    fn generate_overworld(&self, chunk: &mut Chunk, cx: i32, cz: i32) {
        let base_x = cx * CHUNK_SIZE;
        let base_z = cz * CHUNK_SIZE;

        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let world_x = base_x + lx;
                let world_z = base_z + lz;
                let surface = self.surface_height(world_x, world_z);

                chunk.set_block(lx, self.min_y, lz, Material::Bedrock);
                for y in (self.min_y + 1)..surface {
                    let block = if y < surface - 4 {
                        if self.is_cave(world_x, y, world_z) {
                            continue;
                        }
                        Material::Stone
                    } else if y < surface - 1 {
                        Material::Dirt
                    } else if surface <= SEA_LEVEL {
                        Material::Sand
                    } else {
                        Material::Grass
                    };
                    chunk.set_block(lx, y, lz, block);
                }
                for y in surface..SEA_LEVEL {
                    chunk.set_block(lx, y, lz, Material::Water);
                }
            }
        }
    }

    fn generate_nether(&self, chunk: &mut Chunk, cx: i32, cz: i32) {
        let base_x = cx * CHUNK_SIZE;
        let base_z = cz * CHUNK_SIZE;
        let roof = self.max_y - 1;

        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let (fx, fz) = ((base_x + lx) as f32, (base_z + lz) as f32);
                let floor = self.min_y + 28 + (self.noise_terrain.get_noise_2d(fx, fz) * 10.0) as i32;
                let ceiling = roof - 12 - (self.noise_detail.get_noise_2d(fx, fz) * 6.0) as i32;

                chunk.set_block(lx, self.min_y, lz, Material::Bedrock);
                chunk.set_block(lx, roof, lz, Material::Bedrock);
                for y in (self.min_y + 1)..roof {
                    let block = if y < floor || y >= ceiling {
                        Material::Netherrack
                    } else if y < self.min_y + NETHER_LAVA_LEVEL {
                        Material::Lava
                    } else {
                        continue;
                    };
                    chunk.set_block(lx, y, lz, block);
                }
            }
        }
    }
}
