//! Region planning
//!
//! The chunk grid is cut into `size x size` regions and each region keeps
//! exactly one chunk. The choice is a pure function of the world seed and the
//! region coordinate, so every reload reaches the same answer without any
//! stored state.

use crate::constants::{REGION_SEED_X, REGION_SEED_Z};
use crate::core::random::{JavaRandom, RandomSource};

/// The chunk kept in region `(rx, rz)`. The origin region always keeps chunk
/// `(0, 0)` so a fresh world never spawns over the void.
pub fn kept_chunk(world_seed: i64, region_size: i32, rx: i32, rz: i32) -> (i32, i32) {
    if rx == 0 && rz == 0 {
        return (0, 0);
    }
    let size = region_size.max(1);
    let seed = world_seed
        ^ (rx as i64).wrapping_mul(REGION_SEED_X)
        ^ (rz as i64).wrapping_mul(REGION_SEED_Z);
    let mut rng = JavaRandom::new(seed);
    let offset_x = rng.next_int(size);
    let offset_z = rng.next_int(size);
    (rx * size + offset_x, rz * size + offset_z)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionPlanner {
    seed: i64,
    size: i32,
}

impl RegionPlanner {
    pub fn new(seed: i64, size: i32) -> Self {
        Self {
            seed,
            size: size.max(1),
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn region_of(&self, cx: i32, cz: i32) -> (i32, i32) {
        (cx.div_euclid(self.size), cz.div_euclid(self.size))
    }

    pub fn kept_chunk(&self, rx: i32, rz: i32) -> (i32, i32) {
        kept_chunk(self.seed, self.size, rx, rz)
    }

    pub fn is_kept(&self, cx: i32, cz: i32) -> bool {
        let (rx, rz) = self.region_of(cx, cz);
        self.kept_chunk(rx, rz) == (cx, cz)
    }
}
