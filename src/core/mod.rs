//! Core data structures
//! Materials, items, containers, chunk storage and seeded randomness.

pub mod block;
pub mod chunk;
pub mod inventory;
pub mod item;
pub mod random;

// Re-export commonly used types
pub use block::{Dimension, EntityKind, Material};
pub use chunk::{Chunk, Section};
pub use inventory::{Container, Inventory};
pub use item::{Enchantment, ItemStack, ToolTier};
pub use random::{JavaRandom, RandomSource};
