//! Limbo
//! Death routing into the holding world, the holding world itself, and the
//! rules that keep its platform intact.

pub mod placement;
pub mod routing;
pub mod rules;

pub use placement::{EntryReport, HoldingWorld, in_platform_column};
pub use routing::{DeathRoutingTracker, RoutingDecision};
