//! Commonly used types.
//!
//! ```
//! use espalier::prelude::*;
//! ```

// ============================================================================
// Application
// ============================================================================

pub use crate::{Error, Result, Screen, ScreenBuilder, Theme};

// ============================================================================
// Widget Foundation
// ============================================================================

pub use crate::widget::{
    EventContext, FocusPolicy, Key, KeyAction, KeyboardModifiers, MouseButton, PaintContext,
    Widget, WidgetBase, WidgetEvent,
};

// ============================================================================
// Layout
// ============================================================================

pub use crate::widget::{Alignment, BoxLayout, GridLayout, Layout, Orientation};

// ============================================================================
// Controls
// ============================================================================

pub use crate::widget::widgets::{
    Button, ButtonMode, CheckBox, IconPosition, Panel, Popup, Slider, TextAlignment, TextBox,
    Window,
};

// ============================================================================
// Geometry and Rendering
// ============================================================================

pub use espalier_core::ObjectId;
pub use espalier_render::{Color, Point, RecordingRenderer, Rect, Renderer, Size};
