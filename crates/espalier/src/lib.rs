//! Espalier - a retained-mode widget toolkit.
//!
//! Espalier keeps a tree of controls, routes host input to them, lays them
//! out and repaints them through a small [`Renderer`](espalier_render::Renderer)
//! contract. It does not open windows or rasterize fonts itself: the host
//! supplies a renderer and a [`TextMeasurer`](espalier_render::TextMeasurer),
//! and feeds input events into a [`Screen`].
//!
//! # Example
//!
//! ```
//! use espalier::prelude::*;
//! use espalier::platform::{ManualClock, MemoryClipboard};
//!
//! let mut screen = Screen::builder(Size::new(640.0, 480.0))
//!     .with_clipboard(MemoryClipboard::new())
//!     .with_clock(ManualClock::new())
//!     .build()
//!     .unwrap();
//!
//! let window = screen
//!     .add_widget(screen.root(), Window::new("Name").with_layout(BoxLayout::new(Orientation::Vertical)))
//!     .unwrap();
//! let name = screen
//!     .add_widget(window, TextBox::new("").with_editable(true).with_alignment(TextAlignment::Left))
//!     .unwrap();
//! screen.perform_layout();
//!
//! screen.set_focus(name);
//! for c in "Ada".chars() {
//!     screen.character(c);
//! }
//! screen.key(Key::Enter, KeyAction::Press, KeyboardModifiers::NONE);
//! assert_eq!(screen.widget::<TextBox>(name).unwrap().value(), "Ada");
//!
//! let mut renderer = RecordingRenderer::new();
//! screen.paint(&mut renderer);
//! ```

pub mod platform;
pub mod prelude;
pub mod theme;
pub mod widget;

mod error;
mod screen;

pub use error::{Error, Result};
pub use screen::{Screen, ScreenBuilder};
pub use theme::{Theme, ThemeError};

/// Rendering contracts and geometry.
pub mod render {
    pub use espalier_render::*;
}
