//! Error types for the world engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! mode during engine startup and the tick loop, one variant per
//! subsystem error.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, giving `main` a single
/// type to propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("configuration error: {0}")]
    Config(#[from] cultivation_core::config::ConfigError),

    /// Startup (world/seed population construction) failed.
    #[error("startup error: {0}")]
    Startup(#[from] cultivation_core::error::StartupError),

    /// A tick of the simulation failed.
    #[error("tick error: {0}")]
    Tick(#[from] cultivation_core::error::TickError),

    /// The save file could not be written or read.
    #[error("save error: {0}")]
    Persist(#[from] cultivation_persist::PersistError),
}
