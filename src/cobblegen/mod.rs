//! Cobblestone generators
//! Barrels that mine nearby stone into cobblestone, paid for with fuel and
//! tool durability.

pub mod fuel;
pub mod registry;
pub mod search;
pub mod setup;
pub mod tick;
pub mod wear;

pub use registry::{GeneratorRegistry, GeneratorState};
pub use setup::{SetupOutcome, create_generator, remove_generator};
pub use tick::{CycleOutcome, GeneratorTickSimulator, TickReport};
