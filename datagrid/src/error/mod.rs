//! Error types

mod config;
mod data_access;
mod validation;

pub use config::*;
pub use data_access::*;
pub use validation::*;

/// Top-level error for fallible engine operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The table or one of its columns was configured inconsistently.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A collaborator failed to deliver rows or options.
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}
