use rustc_hash::FxHashSet;

use crate::host::{DamageCause, PlayerId};

/// Where a tracked death sends the player on respawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoutingDecision {
    /// New escape anchors are placed only on entry from the main world.
    pub spawn_anchors: bool,
}

/// Bridges a death event to the player's next respawn.
///
/// Each player sits in at most one pending set; a respawn consumes the
/// membership. Players in neither set respawn normally.
#[derive(Default, Debug)]
pub struct DeathRoutingTracker {
    died_in_holding: FxHashSet<PlayerId>,
    died_by_void: FxHashSet<PlayerId>,
}

impl DeathRoutingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `cause` is `None` when the host does not know what killed the player.
    pub fn on_death(&mut self, player: PlayerId, in_holding_world: bool, cause: Option<DamageCause>) {
        if in_holding_world {
            self.died_by_void.remove(&player);
            self.died_in_holding.insert(player);
        } else if cause == Some(DamageCause::Void) {
            self.died_in_holding.remove(&player);
            self.died_by_void.insert(player);
        }
    }

    pub fn on_respawn(&mut self, player: PlayerId) -> Option<RoutingDecision> {
        if self.died_in_holding.remove(&player) {
            return Some(RoutingDecision {
                spawn_anchors: false,
            });
        }
        if self.died_by_void.remove(&player) {
            return Some(RoutingDecision {
                spawn_anchors: true,
            });
        }
        None
    }

    pub fn is_pending(&self, player: PlayerId) -> bool {
        self.died_in_holding.contains(&player) || self.died_by_void.contains(&player)
    }
}
