//! CLI error type

use std::path::PathBuf;

use datagrid::ConfigError;
use datagrid::GridError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid rows file: {0}")]
    Rows(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    #[error("Failed to initialize logger: {0}")]
    Logger(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
