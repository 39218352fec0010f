//! Host services the toolkit consumes: clipboard and time.

mod clipboard;
mod clock;

#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard, default_clipboard};
pub use clock::{Clock, ManualClock, SystemClock};
