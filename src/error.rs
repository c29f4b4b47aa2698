use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read work log {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write work log {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[source] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to encode config: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write config: {0}")]
    Write(#[source] io::Error),
}
