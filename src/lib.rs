// Core data structures: materials, items, containers, chunks, randomness
pub mod core;

// Host traits and the in-memory host
pub mod host;

// Chunk shaping: regions, protection, voiding, terrain workers
pub mod world;

// Cobblestone generators
pub mod cobblegen;

// Death routing and the holding world
pub mod limbo;

// Other modules
pub mod constants;
pub mod error;
pub mod save;
pub mod server;
pub mod session;
pub mod utils;

// Re-exports
pub use core::{Chunk, Dimension, ItemStack, JavaRandom, Material, RandomSource};
pub use error::{Error, Result};
pub use host::{BlockLocation, Host, Location, MemoryHost, Player, PlayerId, VoxelWorld, WorldId};
pub use save::{DEFAULT_SNAPSHOT_FILE, WorldSnapshot, load_snapshot, save_snapshot};
pub use server::{GameServer, ServerEvent, ServerStats};
pub use session::{EventResponse, HostEvent, Session, TickSummary};
pub use utils::settings::Settings;
pub use world::{ChunkGenResult, ChunkGenerator, ChunkLoader, ChunkVoidEngine, RegionPlanner};
