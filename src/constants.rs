// World constants
pub const CHUNK_SIZE: i32 = 16;
pub const SECTION_HEIGHT: i32 = 16;
pub const SECTION_VOLUME: usize = (CHUNK_SIZE * SECTION_HEIGHT * CHUNK_SIZE) as usize;

// Fallback surface offset when a spawn column has no solid block
pub const EMPTY_COLUMN_SURFACE_OFFSET: i32 = 64;

// Region selection constants
pub const REGION_SEED_X: i64 = 341_873_128_712;
pub const REGION_SEED_Z: i64 = 132_897_987_541;

// Generator constants
pub const TOOL_SLOT: usize = 0;
pub const MAX_PROGRESS: f64 = 10.0;
pub const DEFAULT_TICKS_PER_CYCLE: i64 = 20;
pub const DEFAULT_FUEL_USES: u32 = 4;
pub const BARREL_SLOTS: usize = 27;

// Holding world constants
pub const PLATFORM_CENTER_X: i32 = 1;
pub const PLATFORM_CENTER_Z: i32 = 1;
pub const PLATFORM_EXTENT_NEG: i32 = 4;
pub const PLATFORM_EXTENT_POS: i32 = 5;
pub const ANCHOR_PLACEMENT_ATTEMPTS: u32 = 20;
pub const MIDNIGHT: i64 = 18_000;

// Player constants
pub const PLAYER_INVENTORY_SLOTS: usize = 36;

// Server loop
pub const TICK_MILLIS: u64 = 50;
pub const MAX_CHUNKS_PER_TICK: usize = 64;
