use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    SettingsFormat(#[from] serde_json::Error),

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("not a world snapshot")]
    BadSnapshotHeader,

    #[error("unsupported snapshot version {0}")]
    UnsupportedSnapshotVersion(u32),

    #[error("world `{name}` is unavailable")]
    WorldUnavailable { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
