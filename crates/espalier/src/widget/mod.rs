//! Widget system.
//!
//! This module provides the foundation the controls build on:
//!
//! - [`Widget`]: the trait every control implements
//! - [`WidgetBase`]: geometry, visibility, enabled and focus state
//! - [`WidgetEvent`] and the host-side [`InputEvent`]
//! - [`EventDispatcher`]: hit-testing and event delivery
//! - [`FocusManager`]: the single keyboard focus
//! - [`layout`]: box and grid layout strategies
//! - [`PaintContext`]: clipped drawing in local coordinates
//!
//! Widgets live in a [`WidgetTree`], an arena owned by the
//! [`Screen`](crate::Screen). They refer to each other by [`ObjectId`](espalier_core::ObjectId)
//! only.

mod base;
mod context;
mod dispatcher;
mod events;
mod focus;
pub mod layout;
mod painting;
mod traits;
pub mod widgets;


pub use base::{FocusPolicy, WidgetBase};
pub use context::{EventContext, LayoutContext, MeasureContext, WidgetTree};
pub use dispatcher::{DispatchResult, EventDispatcher};
pub use events::{
    CharacterEvent, FocusInEvent, FocusOutEvent, FocusReason, InputEvent, Key, KeyAction,
    KeyPressEvent, KeyReleaseEvent, KeyboardModifiers, MouseButton, MouseDragEvent,
    MouseMoveEvent, MousePressEvent, MouseReleaseEvent, ScrollEvent, WidgetEvent,
};
pub use focus::FocusManager;
pub use layout::{Alignment, BoxLayout, GridLayout, Layout, LayoutTarget, Orientation};
pub use painting::{PaintContext, RasterKey};
pub use traits::Widget;

pub(crate) use context::{FocusRequest, Requests, Services, absolute_position, measure_widget};
pub(crate) use dispatcher::Dispatch;
