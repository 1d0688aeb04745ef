use std::path::PathBuf;

use thiserror::Error;

/// Failures at the edges of the inspector: decoding what the panel sent,
/// loading configuration, reading harness input. The popover engine
/// itself never fails.
#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("invalid panel message: {0}")]
    Message(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, InspectorError>;

/// Read a file, attaching its path to any I/O failure.
pub fn read_to_string(path: impl Into<PathBuf>) -> Result<String> {
    let path = path.into();
    std::fs::read_to_string(&path).map_err(|source| InspectorError::Io { path, source })
}
