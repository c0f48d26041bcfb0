//! Tick-driven game server over the in-memory host
//!
//! Events arrive on an unbounded channel from any task and are dispatched
//! serially on the tick loop together with chunks coming back from the
//! loader workers.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::constants::{MAX_CHUNKS_PER_TICK, TICK_MILLIS};
use crate::core::block::Material;
use crate::host::{BlockLocation, Host, Location, MemoryHost, Player, PlayerId, VoxelWorld, WorldId};
use crate::session::{EventResponse, HostEvent, Session, TickSummary};
use crate::world::loader::ChunkLoader;

/// Events accepted by the server.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    Host(HostEvent),
    /// Generate or load every chunk within `radius` of `(cx, cz)`.
    LoadArea {
        world: WorldId,
        cx: i32,
        cz: i32,
        radius: i32,
    },
    Shutdown,
}

/// Running totals across the server's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServerStats {
    pub ticks: u64,
    pub chunks_shaped: usize,
    pub cycles: u32,
    pub holding_entries: usize,
}

pub struct GameServer {
    host: MemoryHost,
    session: Session,
    loader: Option<ChunkLoader>,
    event_tx: mpsc::UnboundedSender<ServerEvent>,
    event_rx: mpsc::UnboundedReceiver<ServerEvent>,
    stats: ServerStats,
    running: bool,
}

impl GameServer {
    pub fn new(host: MemoryHost, session: Session) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            host,
            session,
            loader: None,
            event_tx,
            event_rx,
            stats: ServerStats::default(),
            running: true,
        }
    }

    /// Generates terrain for the loader's world on background workers.
    pub fn with_loader(mut self, loader: ChunkLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn event_sender(&self) -> mpsc::UnboundedSender<ServerEvent> {
        self.event_tx.clone()
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut MemoryHost {
        &mut self.host
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stats(&self) -> ServerStats {
        self.stats
    }

    pub fn pending_chunks(&self) -> usize {
        self.loader.as_ref().map_or(0, ChunkLoader::pending_count)
    }

    pub fn into_host(self) -> MemoryHost {
        self.host
    }

    /// Runs until `max_ticks` have elapsed, a shutdown event arrives, or the
    /// process receives Ctrl-C.
    pub async fn run(&mut self, max_ticks: Option<u64>) {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MILLIS));
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        while self.running {
            tokio::select! {
                _ = interval.tick() => {
                    self.step();
                    if max_ticks.is_some_and(|max| self.stats.ticks >= max) {
                        break;
                    }
                }
                _ = &mut ctrl_c => {
                    tracing::info!("Interrupted, stopping server");
                    break;
                }
            }
        }
    }

    /// One server tick: fresh chunks first, then queued events, then the
    /// session's timers.
    pub fn step(&mut self) -> TickSummary {
        self.pump_chunks();

        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }

        let summary = self.session.tick(&mut self.host);
        self.stats.ticks += 1;
        self.stats.holding_entries += summary.holding_entries;
        if let Some(report) = &summary.generators {
            self.stats.cycles += report.cycles();
        }
        summary
    }

    fn pump_chunks(&mut self) {
        if let Some(loader) = &mut self.loader {
            let world = loader.world();
            for result in loader.poll_results(MAX_CHUNKS_PER_TICK) {
                if let Some(target) = self.host.world_mut(world) {
                    target.insert_generated_chunk(result.cx, result.cz, result.chunk);
                }
            }
        }
        self.shape_fresh_chunks();
    }

    /// Hands every chunk generated since the last call to the session.
    fn shape_fresh_chunks(&mut self) {
        let fresh: Vec<(WorldId, Vec<(i32, i32)>)> = self
            .host
            .worlds_mut()
            .map(|world| (world.id(), world.take_fresh_chunks()))
            .collect();
        for (world, chunks) in fresh {
            for (cx, cz) in chunks {
                if self
                    .session
                    .handle_chunk_generated(&mut self.host, world, cx, cz)
                    .is_some()
                {
                    self.stats.chunks_shaped += 1;
                }
            }
        }
    }

    fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Host(event) => {
                if let Some(at) = event_target(&event) {
                    self.prepare_chunk(at);
                }
                let response = self.session.dispatch(&mut self.host, event);
                self.apply(event, response);
            }
            ServerEvent::LoadArea {
                world,
                cx,
                cz,
                radius,
            } => self.load_area(world, cx, cz, radius),
            ServerEvent::Shutdown => self.running = false,
        }
    }

    /// Loads the chunk holding `at`, shaping it first if that generated
    /// terrain.
    fn prepare_chunk(&mut self, at: BlockLocation) {
        let (cx, cz) = at.chunk();
        let Some(world) = self.host.world_mut(at.world) else {
            return;
        };
        if world.is_chunk_loaded(cx, cz) {
            return;
        }
        world.load_chunk(cx, cz);
        self.shape_fresh_chunks();
    }

    fn load_area(&mut self, world: WorldId, cx: i32, cz: i32, radius: i32) {
        if let Some(loader) = self.loader.as_mut().filter(|l| l.world() == world) {
            let Some(target) = self.host.world(world) else {
                return;
            };
            let requests: Vec<_> = (-radius..=radius)
                .flat_map(|dx| (-radius..=radius).map(move |dz| (dx, dz)))
                .map(|(dx, dz)| (cx + dx, cz + dz, dx * dx + dz * dz))
                .filter(|&(x, z, _)| !target.is_chunk_loaded(x, z))
                .collect();
            loader.request_chunks(&requests);
            return;
        }

        if let Some(target) = self.host.world_mut(world) {
            for x in cx - radius..=cx + radius {
                for z in cz - radius..=cz + radius {
                    target.load_chunk(x, z);
                }
            }
        }
    }

    /// Performs the host side of an event the session did not cancel.
    fn apply(&mut self, event: HostEvent, response: EventResponse) {
        match (event, response) {
            (_, EventResponse::Cancel) => {}
            (HostEvent::BlockPlace { at, material, .. }, _) => {
                if let Some(world) = self.host.world_mut(at.world) {
                    world.set_block(at.pos, material);
                }
            }
            (HostEvent::BlockBreak { at, .. }, _) => {
                if let Some(world) = self.host.world_mut(at.world) {
                    world.set_block(at.pos, Material::Air);
                }
            }
            (HostEvent::PlayerRespawn { player }, EventResponse::RespawnAt(location)) => {
                self.teleport(player, location);
            }
            (HostEvent::PlayerRespawn { player }, _) => {
                let main = self
                    .host
                    .world_id_by_name(&self.session.settings().world.target_world);
                if let Some(location) = main
                    .and_then(|id| self.host.world(id))
                    .map(|w| Location::new(w.id(), w.spawn()))
                {
                    self.teleport(player, location);
                }
            }
            _ => {}
        }
    }

    fn teleport(&mut self, player: PlayerId, to: Location) {
        if let Some(player) = self.host.player_mut(player) {
            player.teleport(to);
        }
    }
}

fn event_target(event: &HostEvent) -> Option<BlockLocation> {
    match *event {
        HostEvent::BlockPlace { at, .. } | HostEvent::BlockBreak { at, .. } => Some(at),
        HostEvent::Interact { clicked, .. } => clicked,
        _ => None,
    }
}
