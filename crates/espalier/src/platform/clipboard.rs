//! Clipboard access for copy/paste in text widgets.
//!
//! Widgets talk to the clipboard through the [`Clipboard`] trait. The screen
//! owns one implementation:
//!
//! - [`SystemClipboard`] wraps `arboard` (feature `system-clipboard`, on by default)
//! - [`MemoryClipboard`] keeps the text in process, for tests and headless hosts
//!
//! Clipboard access is best-effort. Callers log failures and carry on.
//!
//! # Example
//!
//! ```
//! use espalier::platform::{Clipboard, MemoryClipboard};
//!
//! let mut clipboard = MemoryClipboard::new();
//! clipboard.set_text("Hello, world!").unwrap();
//! assert_eq!(clipboard.get_text().unwrap(), "Hello, world!");
//! ```

use thiserror::Error;

/// Error type for clipboard operations.
#[derive(Debug, Error)]
#[error("clipboard error: {message}")]
pub struct ClipboardError {
    message: String,
}

impl ClipboardError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(feature = "system-clipboard")]
impl From<arboard::Error> for ClipboardError {
    fn from(err: arboard::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Text clipboard used by editing widgets.
pub trait Clipboard {
    /// Get the current text content.
    fn get_text(&mut self) -> Result<String, ClipboardError>;

    /// Replace the clipboard content with `text`.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The operating system clipboard.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    /// Open the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard is unavailable, for example on a
    /// display-less machine.
    pub fn new() -> Result<Self, ClipboardError> {
        Ok(Self {
            inner: arboard::Clipboard::new()?,
        })
    }
}

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError> {
        self.inner.get_text().map_err(Into::into)
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner.set_text(text).map_err(Into::into)
    }
}

#[cfg(feature = "system-clipboard")]
impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard").finish_non_exhaustive()
    }
}

/// An in-process clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard that already holds `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError> {
        self.text
            .clone()
            .ok_or_else(|| ClipboardError::new("clipboard is empty"))
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

/// The best clipboard available: the system one if it can be opened,
/// otherwise an in-memory one.
pub fn default_clipboard() -> Box<dyn Clipboard> {
    #[cfg(feature = "system-clipboard")]
    {
        match SystemClipboard::new() {
            Ok(clipboard) => return Box::new(clipboard),
            Err(err) => {
                tracing::warn!(target: "espalier::platform", %err, "system clipboard unavailable, using in-memory clipboard");
            }
        }
    }
    Box::new(MemoryClipboard::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_empty() {
        let mut clipboard = MemoryClipboard::new();
        let err = clipboard.get_text().unwrap_err();
        assert_eq!(err.message(), "clipboard is empty");
        assert_eq!(err.to_string(), "clipboard error: clipboard is empty");
    }

    #[test]
    fn test_memory_clipboard_round_trip() {
        let mut clipboard = MemoryClipboard::with_text("a");
        assert_eq!(clipboard.get_text().unwrap(), "a");
        clipboard.set_text("b").unwrap();
        assert_eq!(clipboard.get_text().unwrap(), "b");
    }
}
