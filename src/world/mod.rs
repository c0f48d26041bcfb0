//! World shaping
//! Terrain generation, background loading, region planning and voiding.

pub mod generator;
pub mod loader;
pub mod protection;
pub mod region;
pub mod void_engine;

// Re-export commonly used types
pub use generator::ChunkGenerator;
pub use loader::{ChunkGenResult, ChunkLoader};
pub use protection::{NetherProtection, OverworldProtection, ProtectedChunks};
pub use region::{RegionPlanner, kept_chunk};
pub use void_engine::{ChunkVerdict, ChunkVoidEngine};
