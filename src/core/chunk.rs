use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::core::block::Material;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Section {
    blocks: Vec<Material>,
    non_air: u16,
}

impl Section {
    pub fn new() -> Self {
        Section {
            blocks: vec![Material::Air; SECTION_VOLUME],
            non_air: 0,
        }
    }

    fn index(x: i32, y: i32, z: i32) -> usize {
        ((y * SECTION_HEIGHT + z) * CHUNK_SIZE + x) as usize
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Material {
        self.blocks[Self::index(x, y, z)]
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Material) {
        let slot = &mut self.blocks[Self::index(x, y, z)];
        match (slot.is_air(), block.is_air()) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
        *slot = block;
    }

    pub fn is_empty(&self) -> bool {
        self.non_air == 0
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

/// A 16 x 16 column of sections spanning `min_y..min_y + height`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chunk {
    min_y: i32,
    sections: Vec<Section>,
}

impl Chunk {
    pub fn new(min_y: i32, max_y: i32) -> Self {
        let count = ((max_y - min_y).max(0) + SECTION_HEIGHT - 1) / SECTION_HEIGHT;
        Chunk {
            min_y,
            sections: (0..count).map(|_| Section::new()).collect(),
        }
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn max_y(&self) -> i32 {
        self.min_y + self.sections.len() as i32 * SECTION_HEIGHT
    }

    fn locate(&self, x: i32, y: i32, z: i32) -> Option<(usize, i32)> {
        if !(0..CHUNK_SIZE).contains(&x) || !(0..CHUNK_SIZE).contains(&z) {
            return None;
        }
        if y < self.min_y || y >= self.max_y() {
            return None;
        }
        let offset = y - self.min_y;
        Some(((offset / SECTION_HEIGHT) as usize, offset % SECTION_HEIGHT))
    }

    /// `x`/`z` are chunk-local, `y` is a world height.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Material {
        match self.locate(x, y, z) {
            Some((section, local_y)) => self.sections[section].get_block(x, local_y, z),
            None => Material::Air,
        }
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Material) {
        if let Some((section, local_y)) = self.locate(x, y, z) {
            self.sections[section].set_block(x, local_y, z, block);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(Section::is_empty)
    }

    pub fn count(&self, block: Material) -> usize {
        self.sections
            .iter()
            .filter(|s| !s.is_empty() || block.is_air())
            .map(|s| s.blocks.iter().filter(|b| **b == block).count())
            .sum()
    }
}
