//! Error types for the render crate.

use thiserror::Error;

/// Errors that can occur while producing bitmaps.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Invalid bitmap dimensions.
    #[error("invalid bitmap dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The background rasterization thread could not be started.
    #[error("failed to spawn raster worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// The background rasterization thread has exited.
    #[error("raster worker disconnected")]
    WorkerDisconnected,
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
