//! Session coordinator
//!
//! Owns every piece of mutable state for one server run and routes host
//! events to the subsystems. All handlers run on the tick thread; nothing
//! here is shared across threads.

use std::collections::VecDeque;

use glam::DVec3;

use crate::cobblegen::{
    GeneratorRegistry, GeneratorTickSimulator, SetupOutcome, TickReport, create_generator,
    remove_generator,
};
use crate::core::block::Material;
use crate::core::random::{JavaRandom, RandomSource};
use crate::host::{BlockLocation, DamageCause, Host, Location, Player, PlayerId, VoxelWorld, WorldId};
use crate::limbo::{DeathRoutingTracker, HoldingWorld, rules};
use crate::utils::settings::Settings;
use crate::world::{ChunkVerdict, ChunkVoidEngine};

/// Work deferred to a later tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduledAction {
    EnterHoldingWorld {
        player: PlayerId,
        spawn_anchors: bool,
    },
}

/// Events a host adapter forwards to the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    ChunkGenerated {
        world: WorldId,
        cx: i32,
        cz: i32,
    },
    PlayerDeath {
        player: PlayerId,
        cause: Option<DamageCause>,
    },
    PlayerRespawn {
        player: PlayerId,
    },
    /// Right click with the main hand, on a block or in the air.
    Interact {
        player: PlayerId,
        clicked: Option<BlockLocation>,
    },
    /// Sent before the host applies the placement.
    BlockPlace {
        player: PlayerId,
        at: BlockLocation,
        material: Material,
    },
    /// Sent before the host applies the break.
    BlockBreak {
        player: Option<PlayerId>,
        at: BlockLocation,
    },
}

/// How the host should proceed with the event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventResponse {
    Continue,
    Cancel,
    /// Respawn at this location instead of the default.
    RespawnAt(Location),
}

#[derive(Debug, Default)]
pub struct TickSummary {
    pub generators: Option<TickReport>,
    pub holding_entries: usize,
}

pub struct Session<R: RandomSource = JavaRandom> {
    settings: Settings,
    engine: ChunkVoidEngine,
    registry: GeneratorRegistry,
    simulator: GeneratorTickSimulator,
    tracker: DeathRoutingTracker,
    holding: HoldingWorld,
    scheduled: VecDeque<(u64, ScheduledAction)>,
    rng: R,
    tick: u64,
}

impl Session<JavaRandom> {
    pub fn new(settings: Settings) -> Self {
        Self::with_rng(settings, JavaRandom::from_entropy())
    }
}

impl<R: RandomSource> Session<R> {
    pub fn with_rng(settings: Settings, rng: R) -> Self {
        let settings = settings.normalized();
        Self {
            engine: ChunkVoidEngine::new(&settings),
            registry: GeneratorRegistry::new(),
            simulator: GeneratorTickSimulator::new(settings.generator.clone()),
            tracker: DeathRoutingTracker::new(),
            holding: HoldingWorld::new(&settings),
            scheduled: VecDeque::new(),
            rng,
            tick: 0,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &ChunkVoidEngine {
        &self.engine
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut GeneratorRegistry {
        &mut self.registry
    }

    pub fn tracker(&self) -> &DeathRoutingTracker {
        &self.tracker
    }

    pub fn holding_world(&self) -> &HoldingWorld {
        &self.holding
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn pending_actions(&self) -> usize {
        self.scheduled.len()
    }

    /// Places the main world's spawn on the origin island.
    pub fn bootstrap<H: Host>(&mut self, host: &mut H) -> Option<DVec3> {
        let id = host.world_id_by_name(&self.settings.world.target_world)?;
        let world = host.world_mut(id)?;
        self.engine.ensure_spawn_on_island(world)
    }

    /// Shapes a freshly generated chunk. Chunks of unrelated worlds are left
    /// alone and yield `None`.
    pub fn handle_chunk_generated<H: Host>(
        &mut self,
        host: &mut H,
        world: WorldId,
        cx: i32,
        cz: i32,
    ) -> Option<ChunkVerdict> {
        let world = host.world_mut(world)?;
        if self.settings.is_holding_world(world.name()) {
            return Some(self.engine.void_holding_chunk(world, cx, cz));
        }
        if self.settings.is_target_world(world.name(), world.dimension()) {
            return Some(self.engine.on_chunk_generated(world, cx, cz));
        }
        None
    }

    pub fn handle_death<H: Host>(&mut self, host: &mut H, player: PlayerId, cause: Option<DamageCause>) {
        let Some(world) = host.player_mut(player).map(|p| p.location().world) else {
            return;
        };
        let in_holding = host
            .world(world)
            .is_some_and(|w| self.settings.is_holding_world(w.name()));
        self.tracker.on_death(player, in_holding, cause);
    }

    /// Returns the respawn location override for a tracked death and queues
    /// the holding-world entry for the next tick.
    pub fn handle_respawn<H: Host>(&mut self, host: &mut H, player: PlayerId) -> Option<Location> {
        let decision = self.tracker.on_respawn(player)?;
        let world = self.holding.ensure_world(host).ok()?;

        self.scheduled.push_back((
            self.tick + 1,
            ScheduledAction::EnterHoldingWorld {
                player,
                spawn_anchors: decision.spawn_anchors,
            },
        ));
        Some(self.holding.spawn_point(world))
    }

    pub fn handle_interact<H: Host>(
        &mut self,
        host: &mut H,
        player: PlayerId,
        clicked: Option<BlockLocation>,
    ) -> EventResponse {
        let held = host
            .player_mut(player)
            .and_then(|p| p.main_hand().map(|stack| stack.material));

        if let Some(item) = held {
            let allowed = host
                .player_mut(player)
                .is_some_and(|p| rules::allow_item_use(&self.settings, &*p, item));
            if !allowed {
                return EventResponse::Cancel;
            }
        }

        let Some(at) = clicked else {
            return EventResponse::Continue;
        };
        let Some(world) = host.world(at.world) else {
            return EventResponse::Continue;
        };

        if rules::is_escape_marker(&self.settings, world, world.block(at.pos)) {
            self.holding.escape(host, player, at);
            return EventResponse::Cancel;
        }

        match create_generator(host, &mut self.registry, &self.settings.generator, player, at) {
            SetupOutcome::Created => EventResponse::Cancel,
            _ => EventResponse::Continue,
        }
    }

    pub fn handle_block_place<H: Host>(
        &mut self,
        host: &mut H,
        player: PlayerId,
        at: BlockLocation,
        material: Material,
    ) -> EventResponse {
        let Some(world) = host.world(at.world) else {
            return EventResponse::Continue;
        };
        if !rules::may_modify_block(&self.settings, world, at.pos.x, at.pos.z) {
            return EventResponse::Cancel;
        }
        let world_name = world.name().to_string();

        if let Some(player) = host.player_mut(player) {
            if let Some(mut hand) = player.main_hand().cloned() {
                if rules::refill_after_place(&self.settings, &world_name, material, &mut hand) {
                    player.set_main_hand(Some(hand));
                }
            }
        }
        EventResponse::Continue
    }

    pub fn handle_block_break<H: Host>(
        &mut self,
        host: &mut H,
        player: Option<PlayerId>,
        at: BlockLocation,
    ) -> EventResponse {
        let Some(world) = host.world(at.world) else {
            return EventResponse::Continue;
        };
        if !rules::may_modify_block(&self.settings, world, at.pos.x, at.pos.z) {
            return EventResponse::Cancel;
        }
        let broken = world.block(at.pos);
        remove_generator(host, &mut self.registry, player, at, broken);
        EventResponse::Continue
    }

    /// Voids the platform chunk before the platform is stamped onto it.
    fn prepare_holding_spawn<H: Host>(&mut self, host: &mut H) {
        let Some(id) = host.world_id_by_name(self.holding.name()) else {
            return;
        };
        if let Some(world) = host.world_mut(id) {
            world.load_chunk(0, 0);
            self.engine.void_holding_chunk(world, 0, 0);
        }
    }

    pub fn dispatch<H: Host>(&mut self, host: &mut H, event: HostEvent) -> EventResponse {
        match event {
            HostEvent::ChunkGenerated { world, cx, cz } => {
                self.handle_chunk_generated(host, world, cx, cz);
                EventResponse::Continue
            }
            HostEvent::PlayerDeath { player, cause } => {
                self.handle_death(host, player, cause);
                EventResponse::Continue
            }
            HostEvent::PlayerRespawn { player } => match self.handle_respawn(host, player) {
                Some(location) => EventResponse::RespawnAt(location),
                None => EventResponse::Continue,
            },
            HostEvent::Interact { player, clicked } => self.handle_interact(host, player, clicked),
            HostEvent::BlockPlace {
                player,
                at,
                material,
            } => self.handle_block_place(host, player, at, material),
            HostEvent::BlockBreak { player, at } => self.handle_block_break(host, player, at),
        }
    }

    /// Advances one server tick: runs actions that came due, then the
    /// generator timer.
    pub fn tick<H: Host>(&mut self, host: &mut H) -> TickSummary {
        self.tick += 1;
        let mut summary = TickSummary::default();

        while let Some(&(due, action)) = self.scheduled.front() {
            if due > self.tick {
                break;
            }
            self.scheduled.pop_front();
            match action {
                ScheduledAction::EnterHoldingWorld {
                    player,
                    spawn_anchors,
                } => {
                    self.prepare_holding_spawn(host);
                    match self.holding.enter(host, player, spawn_anchors, &mut self.rng) {
                        Ok(_) => summary.holding_entries += 1,
                        Err(err) => {
                            tracing::warn!("Holding world entry for {} failed: {}", player, err)
                        }
                    }
                }
            }
        }

        summary.generators = self
            .simulator
            .on_server_tick(host, &mut self.registry, &mut self.rng);
        summary
    }
}
