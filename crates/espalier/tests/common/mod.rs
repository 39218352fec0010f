//! Shared setup for the integration tests.

#![allow(dead_code)]

use espalier::platform::{ManualClock, MemoryClipboard};
use espalier::prelude::*;

/// Install a test-friendly subscriber once. `RUST_LOG` selects the targets.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A 640x480 screen with an in-memory clipboard and a manual clock.
///
/// The returned clock shares its time with the screen's.
pub fn screen() -> (Screen, ManualClock) {
    init_tracing();
    let clock = ManualClock::new();
    let screen = Screen::builder(Size::new(640.0, 480.0))
        .with_clipboard(MemoryClipboard::new())
        .with_clock(clock.clone())
        .build()
        .expect("screen");
    (screen, clock)
}

/// Add `widget` under `parent` and give it a fixed geometry.
pub fn place<W: Widget>(screen: &mut Screen, parent: ObjectId, widget: W, rect: Rect) -> ObjectId {
    let id = screen.add_widget(parent, widget).expect("add widget");
    let base = screen.base_mut(id).expect("widget base");
    base.set_pos(rect.origin);
    base.set_size(rect.size);
    id
}

pub fn press(screen: &mut Screen, x: f32, y: f32) -> bool {
    screen.mouse_button(Point::new(x, y), MouseButton::Left, true, KeyboardModifiers::NONE)
}

pub fn release(screen: &mut Screen, x: f32, y: f32) -> bool {
    screen.mouse_button(Point::new(x, y), MouseButton::Left, false, KeyboardModifiers::NONE)
}

pub fn click(screen: &mut Screen, x: f32, y: f32) {
    press(screen, x, y);
    release(screen, x, y);
}

pub fn key(screen: &mut Screen, key: Key, modifiers: KeyboardModifiers) -> bool {
    screen.key(key, KeyAction::Press, modifiers)
}

pub fn type_text(screen: &mut Screen, text: &str) {
    for c in text.chars() {
        screen.character(c);
    }
}
