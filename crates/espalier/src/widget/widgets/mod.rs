//! Standard controls.
//!
//! - [`Panel`]: plain container, also used for the screen root
//! - [`Window`]: titled, draggable top-level container
//! - [`Popup`]: container anchored to a window
//! - [`Button`]: push, toggle, radio and popup buttons
//! - [`CheckBox`]: captioned boolean
//! - [`Slider`]: value in `[0, 1]`
//! - [`TextBox`]: single-line editor with validation

mod button;
pub mod button_group;
mod check_box;
pub mod icons;
mod panel;
mod popup;
mod slider;
mod text_box;
mod window;

pub use button::{Button, ButtonMode, ChangeCallback, IconPosition, PushCallback};
pub use check_box::CheckBox;
pub use panel::Panel;
pub use popup::Popup;
pub use slider::Slider;
pub use text_box::{TextAlignment, TextBox, TextBoxCallback};
pub use window::Window;

pub(crate) use popup::refresh_relative_placement;
