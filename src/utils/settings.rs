use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_TICKS_PER_CYCLE;
use crate::core::block::Dimension;
use crate::core::item::ToolTier;
use crate::error::Result;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub world: WorldSettings,
    pub protection: ProtectionSettings,
    pub limbo: LimboSettings,
    pub generator: GeneratorSettings,
    pub gameplay: GameplaySettings,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorldSettings {
    pub target_world: String,
    pub region_size_chunks: i32,
    pub spawn_on_island: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            target_world: "world".to_string(),
            region_size_chunks: 64,
            spawn_on_island: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProtectionSettings {
    pub end_portal_room: bool,
    pub end_portal_neighbors: bool,
    pub nether_fortress: bool,
}

impl Default for ProtectionSettings {
    fn default() -> Self {
        Self {
            end_portal_room: true,
            end_portal_neighbors: true,
            nether_fortress: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct LimboSettings {
    pub world_name: String,
    pub platform_y: i32,
    pub cobblestone_stack_size: u32,
    pub anchors_per_entry: u32,
    pub anchor_min_y: i32,
    pub anchor_max_y: i32,
    pub anchor_radius: i32,
}

impl Default for LimboSettings {
    fn default() -> Self {
        Self {
            world_name: "limbo".to_string(),
            platform_y: 64,
            cobblestone_stack_size: 64,
            anchors_per_entry: 3,
            anchor_min_y: 40,
            anchor_max_y: 120,
            anchor_radius: 256,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorSettings {
    pub enabled: bool,
    pub ticks_per_cycle: i64,
    pub vertical_search_range: i32,
    pub efficiency_per_level: f64,
    pub tier_speed: TierSpeeds,
    pub particles: bool,
    pub sound: SoundSettings,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ticks_per_cycle: DEFAULT_TICKS_PER_CYCLE,
            vertical_search_range: 64,
            efficiency_per_level: 0.2,
            tier_speed: TierSpeeds::default(),
            particles: true,
            sound: SoundSettings::default(),
        }
    }
}

impl GeneratorSettings {
    /// Timer period in ticks; non-positive values fall back to the default.
    pub fn period(&self) -> u64 {
        if self.ticks_per_cycle <= 0 {
            DEFAULT_TICKS_PER_CYCLE as u64
        } else {
            self.ticks_per_cycle as u64
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TierSpeeds {
    pub wooden: f64,
    pub stone: f64,
    pub copper: f64,
    pub iron: f64,
    pub gold: f64,
    pub diamond: f64,
    pub netherite: f64,
}

impl Default for TierSpeeds {
    fn default() -> Self {
        Self {
            wooden: 0.25,
            stone: 0.5,
            copper: 0.625,
            iron: 0.75,
            gold: 1.25,
            diamond: 1.0,
            netherite: 1.1,
        }
    }
}

impl TierSpeeds {
    pub fn base_speed(&self, tier: ToolTier) -> f64 {
        match tier {
            ToolTier::Wooden => self.wooden,
            ToolTier::Stone => self.stone,
            ToolTier::Copper => self.copper,
            ToolTier::Iron => self.iron,
            ToolTier::Golden => self.gold,
            ToolTier::Diamond => self.diamond,
            ToolTier::Netherite => self.netherite,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct SoundSettings {
    pub on_create: bool,
    pub on_mine: bool,
    pub on_break: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            on_create: true,
            on_mine: true,
            on_break: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GameplaySettings {
    pub disable_elytra_rocket_boost: bool,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            disable_elytra_rocket_boost: true,
        }
    }
}

impl Settings {
    /// Clamps values into the ranges the simulation relies on.
    pub fn normalized(mut self) -> Self {
        self.world.region_size_chunks = self.world.region_size_chunks.max(1);
        if self.generator.ticks_per_cycle <= 0 {
            self.generator.ticks_per_cycle = DEFAULT_TICKS_PER_CYCLE;
        }
        self.generator.vertical_search_range = self.generator.vertical_search_range.max(1);
        self.limbo.anchor_radius = self.limbo.anchor_radius.max(1);
        self.limbo.anchor_max_y = self.limbo.anchor_max_y.max(self.limbo.anchor_min_y);
        self
    }

    /// The overworld named by `target-world` and its `_nether` companion.
    pub fn is_target_world(&self, name: &str, dimension: Dimension) -> bool {
        if dimension == Dimension::End {
            return false;
        }
        let target = self.world.target_world.as_str();
        name == target
            || name
                .strip_prefix(target)
                .is_some_and(|suffix| suffix == "_nether")
    }

    pub fn is_holding_world(&self, name: &str) -> bool {
        name == self.limbo.world_name
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "skyvoid", "skyvoid")
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, settings)?;
    writer.flush()?;
    Ok(())
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let reader = BufReader::new(File::open(path)?);
    let settings: Settings = serde_json::from_reader(reader)?;
    Ok(settings.normalized())
}

/// Loads from the default location, falling back to defaults when the file
/// is missing or unreadable.
pub fn load_or_default() -> Settings {
    let Some(path) = default_settings_path() else {
        return Settings::default();
    };
    if !path.exists() {
        return Settings::default();
    }
    match load_settings(&path) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("Failed to load {}: {}, using defaults", path.display(), err);
            Settings::default()
        }
    }
}
