pub mod settings;

pub use settings::{
    GameplaySettings, GeneratorSettings, LimboSettings, ProtectionSettings, Settings,
    SoundSettings, TierSpeeds, WorldSettings,
};
