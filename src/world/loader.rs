//! Background terrain generation
//!
//! Worker threads run the noise generator off the tick thread. They only
//! produce raw chunks; inserting them into a world and handing them to the
//! void engine happens back on the owning thread.

use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use rustc_hash::FxHashSet;

use crate::core::chunk::Chunk;
use crate::host::WorldId;
use crate::world::generator::ChunkGenerator;

const REQUEST_QUEUE: usize = 256;
const RESULT_QUEUE: usize = 64;

#[derive(Clone, Copy, Debug)]
struct ChunkGenRequest {
    cx: i32,
    cz: i32,
}

pub struct ChunkGenResult {
    pub world: WorldId,
    pub cx: i32,
    pub cz: i32,
    pub chunk: Chunk,
}

/// Generates chunks for one world on a pool of worker threads.
pub struct ChunkLoader {
    world: WorldId,
    request_tx: Sender<ChunkGenRequest>,
    result_rx: Receiver<ChunkGenResult>,
    pending: FxHashSet<(i32, i32)>,
}

impl ChunkLoader {
    /// One worker per logical CPU.
    pub fn new<F>(world: WorldId, make_generator: F) -> std::io::Result<Self>
    where
        F: Fn() -> ChunkGenerator,
    {
        Self::with_worker_count(world, num_cpus::get(), make_generator)
    }

    pub fn with_worker_count<F>(
        world: WorldId,
        num_workers: usize,
        make_generator: F,
    ) -> std::io::Result<Self>
    where
        F: Fn() -> ChunkGenerator,
    {
        let num_workers = num_workers.max(1);
        let (request_tx, request_rx) = bounded::<ChunkGenRequest>(REQUEST_QUEUE);
        let (result_tx, result_rx) = bounded::<ChunkGenResult>(RESULT_QUEUE);

        for worker_id in 0..num_workers {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let generator = make_generator();

            thread::Builder::new()
                .name(format!("chunk-gen-{}", worker_id))
                .spawn(move || {
                    while let Ok(req) = rx.recv() {
                        let chunk = generator.generate_chunk(req.cx, req.cz);
                        let result = ChunkGenResult {
                            world,
                            cx: req.cx,
                            cz: req.cz,
                            chunk,
                        };
                        if tx.send(result).is_err() {
                            // Owner dropped the loader
                            break;
                        }
                    }
                })?;
        }

        tracing::info!("Chunk loader started with {} workers", num_workers);
        Ok(ChunkLoader {
            world,
            request_tx,
            result_rx,
            pending: FxHashSet::default(),
        })
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    /// Queues a chunk unless it is already pending. Returns false when the
    /// request queue is full; the chunk can be requested again later.
    pub fn request_chunk(&mut self, cx: i32, cz: i32) -> bool {
        if self.pending.contains(&(cx, cz)) {
            return true;
        }
        match self.request_tx.try_send(ChunkGenRequest { cx, cz }) {
            Ok(()) => {
                self.pending.insert((cx, cz));
                true
            }
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Queues a batch of `(cx, cz, priority)`, lowest priority value first.
    /// Returns how many were accepted.
    pub fn request_chunks(&mut self, requests: &[(i32, i32, i32)]) -> usize {
        let mut sorted: Vec<_> = requests
            .iter()
            .filter(|(cx, cz, _)| !self.pending.contains(&(*cx, *cz)))
            .copied()
            .collect();
        sorted.sort_by_key(|(_, _, priority)| *priority);

        let mut accepted = 0;
        for (cx, cz, _) in sorted {
            if self.pending.len() >= REQUEST_QUEUE || !self.request_chunk(cx, cz) {
                break;
            }
            accepted += 1;
        }
        accepted
    }

    /// Requests every chunk within `radius` of `(cx, cz)`, nearest first.
    #[cfg(test)]
    fn request_square(&mut self, cx: i32, cz: i32, radius: i32) -> usize {
        let requests: Vec<_> = (-radius..=radius)
            .flat_map(|dx| (-radius..=radius).map(move |dz| (cx + dx, cz + dz, dx * dx + dz * dz)))
            .collect();
        self.request_chunks(&requests)
    }

    #[cfg(test)]
    fn is_pending(&self, cx: i32, cz: i32) -> bool {
        self.pending.contains(&(cx, cz))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Non-blocking; returns up to `max_results` finished chunks.
    pub fn poll_results(&mut self, max_results: usize) -> Vec<ChunkGenResult> {
        let mut results = Vec::with_capacity(max_results.min(RESULT_QUEUE));

        for _ in 0..max_results {
            match self.result_rx.try_recv() {
                Ok(result) => {
                    self.pending.remove(&(result.cx, result.cz));
                    results.push(result);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        results
    }

    /// Blocks until one result arrives or every worker is gone.
    #[cfg(test)]
    fn recv_result(&mut self) -> Option<ChunkGenResult> {
        let result = self.result_rx.recv().ok()?;
        self.pending.remove(&(result.cx, result.cz));
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::Dimension;

    fn loader(workers: usize) -> ChunkLoader {
        ChunkLoader::with_worker_count(WorldId(0), workers, || {
            ChunkGenerator::new(7, Dimension::Overworld, 0, 128)
        })
        .unwrap()
    }

    #[test]
    fn duplicate_requests_stay_pending_once() {
        let mut loader = loader(1);
        assert!(loader.request_chunk(0, 0));
        assert!(loader.request_chunk(0, 0));
        assert_eq!(loader.pending_count(), 1);
    }

    #[test]
    fn every_requested_chunk_comes_back() {
        let mut loader = loader(2);
        assert_eq!(loader.request_square(0, 0, 1), 9);

        let mut seen = FxHashSet::default();
        while loader.pending_count() > 0 {
            let result = loader.recv_result().unwrap();
            assert_eq!(result.world, WorldId(0));
            assert!(!result.chunk.is_empty());
            seen.insert((result.cx, result.cz));
        }
        assert_eq!(seen.len(), 9);
        assert!(!loader.is_pending(1, 1));
    }
}
