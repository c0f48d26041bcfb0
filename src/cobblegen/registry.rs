use rustc_hash::FxHashMap;

use crate::host::BlockLocation;

/// Mutable simulation state of one generator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeneratorState {
    /// Banked production, kept within `[0, MAX_PROGRESS]` between ticks.
    pub progress: f64,
    /// Fuel uses already paid for by a consumed item.
    pub fuel_uses_remaining: u32,
}

/// Active generators keyed by their barrel position.
#[derive(Default, Debug)]
pub struct GeneratorRegistry {
    generators: FxHashMap<BlockLocation, GeneratorState>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or resets) the generator at `location`.
    pub fn register(&mut self, location: BlockLocation) {
        self.generators.insert(location, GeneratorState::default());
        tracing::info!(
            "Registered generator in world {} at {}",
            location.world.0,
            location.pos
        );
    }

    /// Returns true if a generator was removed.
    pub fn unregister(&mut self, location: BlockLocation) -> bool {
        let removed = self.generators.remove(&location).is_some();
        if removed {
            tracing::info!(
                "Unregistered generator in world {} at {}",
                location.world.0,
                location.pos
            );
        }
        removed
    }

    pub fn contains(&self, location: BlockLocation) -> bool {
        self.generators.contains_key(&location)
    }

    pub fn state(&self, location: BlockLocation) -> Option<&GeneratorState> {
        self.generators.get(&location)
    }

    pub fn state_mut(&mut self, location: BlockLocation) -> Option<&mut GeneratorState> {
        self.generators.get_mut(&location)
    }

    /// Snapshot of all locations, safe to iterate while unregistering.
    pub fn locations(&self) -> Vec<BlockLocation> {
        self.generators.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}
