//! # Render Context Errors

use thiserror::Error;

/// Errors raised by the render context fences and lifecycle.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The render thread could not be started.
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The render thread has stopped; nothing submitted will run anymore.
    #[error("render thread has stopped")]
    Stopped,

    /// A blocking fence was requested from the render thread itself.
    #[error("blocking render fence called on the render thread")]
    OnRenderThread,
}

/// Result type for render context operations.
pub type RenderResult<T> = Result<T, RenderError>;
