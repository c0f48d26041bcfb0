//! Skyvoid demo server
//!
//! Runs the session against an in-memory host: loads an area around spawn,
//! shapes it into islands and ticks until the tick budget or Ctrl-C.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use skyvoid::host::{Host, MemoryHost, Terrain, VoxelWorld};
use skyvoid::utils::settings::{load_or_default, load_settings};
use skyvoid::{
    ChunkGenerator, ChunkLoader, Dimension, GameServer, ServerEvent, Session, WorldSnapshot,
    load_snapshot, save_snapshot,
};

/// Void-world island server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (JSON); the per-user config directory is used otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// World seed
    #[arg(long, default_value_t = 2137)]
    seed: i64,

    /// Stop after this many ticks; runs until Ctrl-C when omitted
    #[arg(long)]
    ticks: Option<u64>,

    /// Chunk radius loaded around spawn at startup
    #[arg(long, default_value_t = 4)]
    radius: i32,

    /// Terrain worker threads (defaults to the CPU count)
    #[arg(long)]
    workers: Option<usize>,

    /// Snapshot of the main world to restore from and save to on exit
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => load_settings(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => load_or_default(),
    };

    let mut host = MemoryHost::new();
    let target = settings.world.target_world.clone();
    let main = match args.snapshot.as_ref().filter(|path| path.exists()) {
        Some(path) => {
            let snapshot = load_snapshot(path)
                .with_context(|| format!("failed to read snapshot {}", path.display()))?;
            tracing::info!("Restoring `{}` from {}", snapshot.name, path.display());
            host.insert_world_with(|id| snapshot.restore(id))
        }
        None => host.add_world(&target, Dimension::Overworld, args.seed, Terrain::Generated),
    };
    host.add_world(
        &format!("{}_nether", target),
        Dimension::Nether,
        args.seed,
        Terrain::Generated,
    );

    let (seed, min_y, max_y) = host
        .world(main)
        .map(|w| (w.seed(), w.min_height(), w.max_height()))
        .context("main world missing")?;
    let make_generator = move || ChunkGenerator::new(seed, Dimension::Overworld, min_y, max_y);
    let loader = match args.workers {
        Some(workers) => ChunkLoader::with_worker_count(main, workers, make_generator),
        None => ChunkLoader::new(main, make_generator),
    }
    .context("failed to start terrain workers")?;

    let mut session = Session::new(settings);
    if let Some(spawn) = session.bootstrap(&mut host) {
        tracing::info!("Spawn at {:.1}, {:.1}, {:.1}", spawn.x, spawn.y, spawn.z);
    }

    let mut server = GameServer::new(host, session).with_loader(loader);
    server
        .event_sender()
        .send(ServerEvent::LoadArea {
            world: main,
            cx: 0,
            cz: 0,
            radius: args.radius.max(0),
        })
        .context("event channel closed")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    tracing::info!("Server running");
    runtime.block_on(server.run(args.ticks));

    let stats = server.stats();
    tracing::info!(
        "Stopped after {} ticks: {} chunks shaped, {} generator cycles, {} holding entries",
        stats.ticks,
        stats.chunks_shaped,
        stats.cycles,
        stats.holding_entries
    );

    if let Some(path) = &args.snapshot {
        let host = server.into_host();
        let world = host.world(main).context("main world missing")?;
        save_snapshot(path, &WorldSnapshot::capture(world))
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        tracing::info!("Saved `{}` to {}", world.name(), path.display());
    }

    Ok(())
}
