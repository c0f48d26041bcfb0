use glam::IVec3;

use crate::constants::CHUNK_SIZE;
use crate::core::block::Material;
use crate::host::VoxelWorld;

/// Finds the `target` voxel closest to `anchor` inside the anchor's chunk
/// column.
///
/// Layers are visited in rings of growing vertical distance (`+dy` before
/// `-dy`) and the search stops at the first ring holding a candidate, so the
/// result is the nearest within that ring rather than globally.
pub fn find_target<W: VoxelWorld + ?Sized>(
    world: &W,
    anchor: IVec3,
    vertical_range: i32,
    target: Material,
) -> Option<IVec3> {
    let (base_x, base_z) = world.chunk_origin(anchor.x >> 4, anchor.z >> 4);
    let min_y = world.min_height();
    let max_y = world.max_height() - 1;

    for dy in 0..=vertical_range.max(1) {
        let mut best: Option<(i32, IVec3)> = None;
        let layers = [anchor.y + dy, anchor.y - dy];
        let layers = if dy == 0 { &layers[..1] } else { &layers[..] };

        for &y in layers {
            if y < min_y || y > max_y {
                continue;
            }
            for x in base_x..base_x + CHUNK_SIZE {
                for z in base_z..base_z + CHUNK_SIZE {
                    let pos = IVec3::new(x, y, z);
                    if world.block(pos) != target {
                        continue;
                    }
                    let dist = (pos - anchor).length_squared();
                    if best.is_none_or(|(d, _)| dist < d) {
                        best = Some((dist, pos));
                    }
                }
            }
        }

        if let Some((_, pos)) = best {
            return Some(pos);
        }
    }
    None
}
