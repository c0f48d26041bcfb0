//! Generator tick simulation
//!
//! Every period the simulator walks the registry, adds tool-scaled progress
//! to each generator and converts whole units of progress into production
//! cycles. A cycle mines the nearest stone in the barrel's chunk, pays one
//! fuel use and drops one cobblestone into the barrel.

use glam::IVec3;

use crate::cobblegen::fuel::consume_fuel_use;
use crate::cobblegen::registry::{GeneratorRegistry, GeneratorState};
use crate::cobblegen::search::find_target;
use crate::cobblegen::wear::{Wear, apply_wear};
use crate::constants::{MAX_PROGRESS, TOOL_SLOT};
use crate::core::block::Material;
use crate::core::inventory::Container;
use crate::core::item::{Enchantment, ItemStack};
use crate::core::random::RandomSource;
use crate::host::{BlockLocation, Host, Particle, Sound, VoxelWorld};
use crate::utils::settings::GeneratorSettings;

const TARGET: Material = Material::Stone;
const OUTPUT: Material = Material::Cobblestone;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Produced { tool_broke: bool },
    NoTarget,
    OutputFull,
    NoFuel,
    NoContainer,
}

/// Aggregate of one simulator pass.
#[derive(Debug, Default, PartialEq)]
pub struct TickReport {
    /// Generators whose chunk was unloaded; retried next pass.
    pub deferred: usize,
    /// Stale generators dropped from the registry.
    pub removed: usize,
    /// Generators skipped for lack of a usable tool.
    pub idle: usize,
    pub produced: Vec<(BlockLocation, u32)>,
    pub output_full: Vec<BlockLocation>,
    pub tools_broken: usize,
}

impl TickReport {
    pub fn cycles(&self) -> u32 {
        self.produced.iter().map(|(_, n)| n).sum()
    }
}

/// True when one more unit of output fits, either on a partial output stack
/// or in an empty slot.
pub fn has_output_space(container: &dyn Container) -> bool {
    (0..container.size()).any(|index| match container.slot(index) {
        None => true,
        Some(stack) => stack.material == OUTPUT && !stack.is_full(),
    })
}

/// Adds one unit of output, topping up a partial stack before taking an
/// empty slot.
pub fn add_output(container: &mut dyn Container) -> bool {
    container.add_item(ItemStack::new(OUTPUT, 1)).is_none()
}

pub struct GeneratorTickSimulator {
    settings: GeneratorSettings,
    period: u64,
    elapsed: u64,
}

impl GeneratorTickSimulator {
    pub fn new(settings: GeneratorSettings) -> Self {
        let period = settings.period();
        if settings.enabled {
            tracing::info!("Cobblestone generator timer started, period={} ticks", period);
        }
        Self {
            settings,
            period,
            elapsed: 0,
        }
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    /// Advances the timer by one server tick and runs a pass when the period
    /// has elapsed.
    pub fn on_server_tick<H, R>(
        &mut self,
        host: &mut H,
        registry: &mut GeneratorRegistry,
        rng: &mut R,
    ) -> Option<TickReport>
    where
        H: Host,
        R: RandomSource + ?Sized,
    {
        if !self.settings.enabled {
            return None;
        }
        self.elapsed += 1;
        if self.elapsed < self.period {
            return None;
        }
        self.elapsed = 0;
        Some(self.run(host, registry, rng))
    }

    /// One pass over every registered generator.
    pub fn run<H, R>(&self, host: &mut H, registry: &mut GeneratorRegistry, rng: &mut R) -> TickReport
    where
        H: Host,
        R: RandomSource + ?Sized,
    {
        let mut report = TickReport::default();
        if !self.settings.enabled {
            return report;
        }

        for location in registry.locations() {
            let Some(world) = host.world_mut(location.world) else {
                registry.unregister(location);
                report.removed += 1;
                continue;
            };

            let (cx, cz) = location.chunk();
            if !world.is_chunk_loaded(cx, cz) {
                report.deferred += 1;
                continue;
            }

            let tool = if world.block(location.pos) == Material::Barrel {
                world
                    .container_mut(location.pos)
                    .map(|container| container.slot(TOOL_SLOT).cloned())
            } else {
                None
            };
            let Some(tool) = tool else {
                tracing::info!("Removing stale generator at {}", location.pos);
                registry.unregister(location);
                report.removed += 1;
                continue;
            };

            let speed = tool.as_ref().map_or(0.0, |tool| self.speed_multiplier(tool));
            if speed <= 0.0 {
                report.idle += 1;
                continue;
            }

            let Some(state) = registry.state_mut(location) else {
                continue;
            };
            state.progress += speed;

            let mut produced = 0;
            let mut broke = false;
            while state.progress >= 1.0 {
                match self.run_cycle(world, location.pos, state, rng) {
                    CycleOutcome::Produced { tool_broke } => {
                        produced += 1;
                        state.progress -= 1.0;
                        if tool_broke {
                            broke = true;
                            break;
                        }
                    }
                    CycleOutcome::OutputFull => {
                        report.output_full.push(location);
                        break;
                    }
                    CycleOutcome::NoTarget | CycleOutcome::NoFuel | CycleOutcome::NoContainer => {
                        break;
                    }
                }
            }
            state.progress = state.progress.clamp(0.0, MAX_PROGRESS);

            if produced > 0 {
                self.emit_feedback(world, location);
                report.produced.push((location, produced));
            }
            if broke {
                report.tools_broken += 1;
                if self.settings.sound.on_break {
                    world.play_sound(location.offset(0.5, 0.5, 0.5), Sound::ToolBreak, 0.8, 0.9);
                }
            }
        }

        report
    }

    /// Progress gained per pass for the given tool, 0 for non-tools.
    pub fn speed_multiplier(&self, tool: &ItemStack) -> f64 {
        let Some(tier) = tool.material.tool_tier() else {
            return 0.0;
        };
        let base = self.settings.tier_speed.base_speed(tier);
        if base <= 0.0 {
            return 0.0;
        }
        let level = tool.enchantment_level(Enchantment::Efficiency) as f64;
        base * (1.0 + self.settings.efficiency_per_level * level)
    }

    /// A single production cycle for the generator at `anchor`. Nothing is
    /// changed unless the cycle produces.
    pub fn run_cycle<W, R>(
        &self,
        world: &mut W,
        anchor: IVec3,
        state: &mut GeneratorState,
        rng: &mut R,
    ) -> CycleOutcome
    where
        W: VoxelWorld + ?Sized,
        R: RandomSource + ?Sized,
    {
        let Some(target) = find_target(&*world, anchor, self.settings.vertical_search_range, TARGET)
        else {
            return CycleOutcome::NoTarget;
        };

        {
            let Some(container) = world.container_mut(anchor) else {
                return CycleOutcome::NoContainer;
            };
            if !has_output_space(container) {
                return CycleOutcome::OutputFull;
            }
            if !consume_fuel_use(state, container) {
                return CycleOutcome::NoFuel;
            }
            if !add_output(container) {
                return CycleOutcome::OutputFull;
            }
        }

        world.set_block(target, Material::Air);

        let wear = match world.container_mut(anchor) {
            Some(container) => apply_wear(container, TOOL_SLOT, rng),
            None => Wear::Broke,
        };
        CycleOutcome::Produced {
            tool_broke: wear == Wear::Broke,
        }
    }

    fn emit_feedback<W: VoxelWorld + ?Sized>(&self, world: &mut W, location: BlockLocation) {
        let at = location.offset(0.5, 1.2, 0.5);
        if self.settings.particles {
            world.spawn_particle(at, Particle::CampfireSmoke, 3);
        }
        if self.settings.sound.on_mine {
            world.play_sound(at, Sound::StoneBreak, 0.5, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BARREL_SLOTS;
    use crate::core::block::Dimension;
    use crate::core::random::JavaRandom;
    use crate::host::memory::WorldEffect;
    use crate::host::{MemoryHost, Terrain, WorldId};

    const BARREL: IVec3 = IVec3::new(8, 20, 8);

    fn setup(tool: ItemStack, fuel: Option<ItemStack>) -> (MemoryHost, GeneratorRegistry, BlockLocation) {
        let mut host = MemoryHost::new();
        let id = host.add_world_with_heights("world", Dimension::Overworld, 0, Terrain::Void, 0, 64);
        let world = host.world_mut(id).unwrap();
        for x in 0..16 {
            for z in 0..16 {
                world.set_block(IVec3::new(x, 10, z), Material::Stone);
            }
        }
        world.set_block(BARREL, Material::Barrel);
        let container = world.container_mut(BARREL).unwrap();
        container.set_slot(TOOL_SLOT, Some(tool));
        if let Some(fuel) = fuel {
            container.set_slot(1, Some(fuel));
        }

        let location = BlockLocation::new(id, BARREL);
        let mut registry = GeneratorRegistry::new();
        registry.register(location);
        (host, registry, location)
    }

    fn simulator() -> GeneratorTickSimulator {
        GeneratorTickSimulator::new(GeneratorSettings::default())
    }

    fn cobble(host: &MemoryHost, id: WorldId) -> u32 {
        host.world(id)
            .and_then(|w| w.container(BARREL))
            .map_or(0, |inv| inv.count(Material::Cobblestone))
    }

    #[test]
    fn diamond_pickaxe_runs_one_cycle_per_pass() {
        let (mut host, mut registry, loc) = setup(
            ItemStack::new(Material::DiamondPickaxe, 1),
            Some(ItemStack::new(Material::Coal, 4)),
        );
        let sim = simulator();
        let mut rng = JavaRandom::new(1);

        for pass in 1..=3 {
            let report = sim.run(&mut host, &mut registry, &mut rng);
            assert_eq!(report.cycles(), 1);
            assert_eq!(cobble(&host, loc.world), pass);
        }
        assert_eq!(registry.state(loc).map(|s| s.fuel_uses_remaining), Some(5));
        assert_eq!(registry.state(loc).map(|s| s.progress), Some(0.0));
    }

    #[test]
    fn fractional_speed_banks_progress() {
        let (mut host, mut registry, loc) = setup(
            ItemStack::new(Material::WoodenPickaxe, 1),
            Some(ItemStack::new(Material::Coal, 1)),
        );
        let sim = simulator();
        let mut rng = JavaRandom::new(1);

        for _ in 0..3 {
            assert_eq!(sim.run(&mut host, &mut registry, &mut rng).cycles(), 0);
        }
        assert_eq!(sim.run(&mut host, &mut registry, &mut rng).cycles(), 1);
        assert_eq!(cobble(&host, loc.world), 1);
    }

    #[test]
    fn efficiency_scales_speed() {
        let sim = simulator();
        let tool = ItemStack::new(Material::DiamondPickaxe, 1).with_enchantment(Enchantment::Efficiency, 5);
        assert!((sim.speed_multiplier(&tool) - 2.0).abs() < 1e-9);
        assert_eq!(sim.speed_multiplier(&ItemStack::new(Material::Stick, 1)), 0.0);
    }

    #[test]
    fn progress_is_clamped_when_work_is_blocked() {
        // No fuel: progress accrues but never converts
        let (mut host, mut registry, loc) = setup(ItemStack::new(Material::GoldenPickaxe, 1), None);
        let sim = simulator();
        let mut rng = JavaRandom::new(1);

        for _ in 0..20 {
            sim.run(&mut host, &mut registry, &mut rng);
            let progress = registry.state(loc).map_or(-1.0, |s| s.progress);
            assert!((0.0..=MAX_PROGRESS).contains(&progress));
        }
        assert_eq!(registry.state(loc).map(|s| s.progress), Some(MAX_PROGRESS));
        assert_eq!(cobble(&host, loc.world), 0);
    }

    #[test]
    fn banked_progress_catches_up_after_refuel() {
        let (mut host, mut registry, loc) = setup(ItemStack::new(Material::GoldenPickaxe, 1), None);
        let sim = simulator();
        let mut rng = JavaRandom::new(1);
        for _ in 0..3 {
            sim.run(&mut host, &mut registry, &mut rng);
        }

        let world = host.world_mut(loc.world).unwrap();
        world
            .container_mut(BARREL)
            .unwrap()
            .set_slot(1, Some(ItemStack::new(Material::CoalBlock, 1)));

        // 3.75 banked + 1.25 this pass
        assert_eq!(sim.run(&mut host, &mut registry, &mut rng).cycles(), 5);
    }

    #[test]
    fn tool_breaks_on_the_cycle_reaching_max_damage() {
        let max = Material::DiamondPickaxe.max_durability();
        let tool = ItemStack::new(Material::DiamondPickaxe, 1)
            .with_enchantment(Enchantment::Efficiency, 10)
            .with_damage(max - 1);
        let (mut host, mut registry, loc) = setup(tool, Some(ItemStack::new(Material::Coal, 8)));
        let sim = simulator();
        let mut rng = JavaRandom::new(1);

        let report = sim.run(&mut host, &mut registry, &mut rng);
        assert_eq!(report.cycles(), 1);
        assert_eq!(report.tools_broken, 1);

        let world = host.world(loc.world).unwrap();
        let barrel = world.container(BARREL).unwrap();
        assert!(barrel.slot(TOOL_SLOT).is_none());
        assert!(world.effects.contains(&WorldEffect::Sound(loc.offset(0.5, 0.5, 0.5), Sound::ToolBreak)));
    }

    #[test]
    fn full_barrel_reports_and_keeps_stone() {
        let (mut host, mut registry, loc) = setup(
            ItemStack::new(Material::DiamondPickaxe, 1),
            Some(ItemStack::new(Material::Coal, 64)),
        );
        {
            let world = host.world_mut(loc.world).unwrap();
            let barrel = world.container_mut(BARREL).unwrap();
            for slot in 2..BARREL_SLOTS {
                barrel.set_slot(slot, Some(ItemStack::new(Material::Dirt, 64)));
            }
        }
        let sim = simulator();
        let mut rng = JavaRandom::new(1);

        let report = sim.run(&mut host, &mut registry, &mut rng);
        assert_eq!(report.output_full, vec![loc]);
        assert_eq!(report.cycles(), 0);
        let world = host.world(loc.world).unwrap();
        assert_eq!(world.loaded_chunks().map(|(_, c)| c.count(Material::Stone)).sum::<usize>(), 256);
        assert_eq!(world.container(BARREL).map(|b| b.count(Material::Coal)), Some(64));
    }

    #[test]
    fn partial_output_stack_counts_as_space() {
        let mut inv = crate::core::inventory::Inventory::new(2);
        inv.set_slot(0, Some(ItemStack::new(Material::Dirt, 64)));
        inv.set_slot(1, Some(ItemStack::new(Material::Cobblestone, 63)));
        assert!(has_output_space(&inv));
        assert!(add_output(&mut inv));
        assert!(!has_output_space(&inv));
    }

    #[test]
    fn cycle_mines_nearest_stone_and_emits_feedback() {
        let (mut host, mut registry, loc) = setup(
            ItemStack::new(Material::DiamondPickaxe, 1),
            Some(ItemStack::new(Material::Coal, 1)),
        );
        let sim = simulator();
        sim.run(&mut host, &mut registry, &mut JavaRandom::new(1));

        let world = host.world(loc.world).unwrap();
        assert_eq!(world.block(IVec3::new(8, 10, 8)), Material::Air);
        assert_eq!(world.block(IVec3::new(7, 10, 8)), Material::Stone);
        assert!(world
            .effects
            .contains(&WorldEffect::Particle(loc.offset(0.5, 1.2, 0.5), Particle::CampfireSmoke, 3)));
    }

    #[test]
    fn replaced_barrel_is_unregistered() {
        let (mut host, mut registry, loc) = setup(ItemStack::new(Material::DiamondPickaxe, 1), None);
        host.world_mut(loc.world).unwrap().set_block(BARREL, Material::Stone);

        let report = simulator().run(&mut host, &mut registry, &mut JavaRandom::new(1));
        assert_eq!(report.removed, 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn unloaded_chunk_is_deferred_not_dropped() {
        let (mut host, mut registry, loc) = setup(ItemStack::new(Material::DiamondPickaxe, 1), None);
        host.world_mut(loc.world).unwrap().unload_chunk(0, 0);

        let report = simulator().run(&mut host, &mut registry, &mut JavaRandom::new(1));
        assert_eq!(report.deferred, 1);
        assert!(registry.contains(loc));
    }

    #[test]
    fn timer_fires_once_per_period() {
        let (mut host, mut registry, _) = setup(
            ItemStack::new(Material::DiamondPickaxe, 1),
            Some(ItemStack::new(Material::Coal, 1)),
        );
        let mut sim = simulator();
        let mut rng = JavaRandom::new(1);

        let fired = (0..40)
            .filter(|_| sim.on_server_tick(&mut host, &mut registry, &mut rng).is_some())
            .count();
        assert_eq!(fired, 2);
    }
}
