//! Crate-level error type.

use espalier_core::ObjectError;
use espalier_render::RenderError;
use thiserror::Error;

use crate::platform::ClipboardError;
use crate::theme::ThemeError;

/// Umbrella error for the widget toolkit.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Theme(#[from] ThemeError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// A widget exists but is not of the requested type.
    #[error("widget is not a {expected}")]
    WidgetType { expected: &'static str },
}

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;
