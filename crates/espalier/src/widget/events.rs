//! Widget event types.
//!
//! The host feeds raw [`InputEvent`]s to the [`Screen`](crate::Screen). The
//! screen turns them into [`WidgetEvent`]s addressed to single widgets, with
//! positions converted to the receiving widget's local coordinates.
//!
//! Every handler answers with a "consumed" flag. An event nobody consumed is
//! simply dropped.

use espalier_render::{Point, Size};

// =========================================================================
// Modifiers, Buttons, Keys
// =========================================================================

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held.
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    pub const CTRL_SHIFT: Self = Self {
        shift: true,
        control: true,
        ..Self::NONE
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }

    /// Check if no modifiers are pressed.
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// The platform shortcut modifier (Control, or Command on macOS hosts that
    /// report it as Meta).
    pub fn shortcut(&self) -> bool {
        self.control || self.meta
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left = 0,
    /// Secondary button (usually right).
    Right = 1,
    /// Middle button (scroll wheel click).
    Middle = 2,
}

impl MouseButton {
    /// Bit of this button in a held-buttons mask.
    #[inline]
    pub fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// Keys the toolkit reacts to. Everything else arrives as `Unknown` with the
/// host's key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Backspace,
    Delete,
    Enter,
    Tab,
    Space,
    Escape,
    Unknown(u16),
}

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

/// Why focus moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusReason {
    /// A mouse press.
    Mouse,
    /// Tab key navigation.
    Tab,
    /// Shift+Tab navigation.
    Backtab,
    /// A widget asked for it, or lost it to a programmatic change.
    #[default]
    Other,
}

// =========================================================================
// Widget Events
// =========================================================================

/// A mouse button went down over the widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MousePressEvent {
    pub button: MouseButton,
    /// Position relative to the receiving widget.
    pub local_pos: Point,
    /// Position relative to the screen.
    pub window_pos: Point,
    pub modifiers: KeyboardModifiers,
}

impl MousePressEvent {
    pub fn new(button: MouseButton, window_pos: Point, modifiers: KeyboardModifiers) -> Self {
        Self {
            button,
            local_pos: window_pos,
            window_pos,
            modifiers,
        }
    }
}

/// A mouse button went up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseReleaseEvent {
    pub button: MouseButton,
    pub local_pos: Point,
    pub window_pos: Point,
    pub modifiers: KeyboardModifiers,
}

impl MouseReleaseEvent {
    pub fn new(button: MouseButton, window_pos: Point, modifiers: KeyboardModifiers) -> Self {
        Self {
            button,
            local_pos: window_pos,
            window_pos,
            modifiers,
        }
    }
}

/// The pointer moved with no capturing widget taking it as a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMoveEvent {
    pub local_pos: Point,
    pub window_pos: Point,
    /// Mask of held buttons, see [`MouseButton::mask`].
    pub buttons: u8,
    pub modifiers: KeyboardModifiers,
}

/// The pointer moved while the receiving widget holds the capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseDragEvent {
    pub local_pos: Point,
    pub window_pos: Point,
    /// Movement since the previous pointer event.
    pub delta: Point,
    pub buttons: u8,
    pub modifiers: KeyboardModifiers,
}

impl MouseDragEvent {
    /// Check whether `button` is held.
    pub fn is_held(&self, button: MouseButton) -> bool {
        self.buttons & button.mask() != 0
    }
}

/// Wheel or trackpad scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub local_pos: Point,
    pub window_pos: Point,
    pub delta: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPressEvent {
    pub key: Key,
    pub modifiers: KeyboardModifiers,
    pub is_repeat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyReleaseEvent {
    pub key: Key,
    pub modifiers: KeyboardModifiers,
}

/// A text character typed while the widget has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterEvent {
    pub character: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusInEvent {
    pub reason: FocusReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusOutEvent {
    pub reason: FocusReason,
}

/// Events delivered to a single widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetEvent {
    MousePress(MousePressEvent),
    MouseRelease(MouseReleaseEvent),
    MouseMove(MouseMoveEvent),
    MouseDrag(MouseDragEvent),
    Scroll(ScrollEvent),
    KeyPress(KeyPressEvent),
    KeyRelease(KeyReleaseEvent),
    Character(CharacterEvent),
    FocusIn(FocusInEvent),
    FocusOut(FocusOutEvent),
    /// The pointer entered the widget's hover path.
    MouseEnter,
    /// The pointer left the widget's hover path.
    MouseLeave,
}

impl WidgetEvent {
    /// Screen position of a pointer event.
    pub fn window_pos(&self) -> Option<Point> {
        match self {
            Self::MousePress(e) => Some(e.window_pos),
            Self::MouseRelease(e) => Some(e.window_pos),
            Self::MouseMove(e) => Some(e.window_pos),
            Self::MouseDrag(e) => Some(e.window_pos),
            Self::Scroll(e) => Some(e.window_pos),
            _ => None,
        }
    }

    /// Copy of this event with the local position recomputed for a widget
    /// whose absolute origin is `origin`.
    pub fn localized(&self, origin: Point) -> Self {
        let mut event = *self;
        match &mut event {
            Self::MousePress(e) => e.local_pos = e.window_pos - origin,
            Self::MouseRelease(e) => e.local_pos = e.window_pos - origin,
            Self::MouseMove(e) => e.local_pos = e.window_pos - origin,
            Self::MouseDrag(e) => e.local_pos = e.window_pos - origin,
            Self::Scroll(e) => e.local_pos = e.window_pos - origin,
            _ => {}
        }
        event
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MousePress(_) => "MousePress",
            Self::MouseRelease(_) => "MouseRelease",
            Self::MouseMove(_) => "MouseMove",
            Self::MouseDrag(_) => "MouseDrag",
            Self::Scroll(_) => "Scroll",
            Self::KeyPress(_) => "KeyPress",
            Self::KeyRelease(_) => "KeyRelease",
            Self::Character(_) => "Character",
            Self::FocusIn(_) => "FocusIn",
            Self::FocusOut(_) => "FocusOut",
            Self::MouseEnter => "MouseEnter",
            Self::MouseLeave => "MouseLeave",
        }
    }
}

// =========================================================================
// Host Input
// =========================================================================

/// One discrete event from the host loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseMove {
        pos: Point,
    },
    MouseButton {
        pos: Point,
        button: MouseButton,
        pressed: bool,
        modifiers: KeyboardModifiers,
    },
    MouseDrag {
        pos: Point,
        delta: Point,
    },
    Scroll {
        pos: Point,
        delta: Point,
    },
    Key {
        key: Key,
        action: KeyAction,
        modifiers: KeyboardModifiers,
    },
    Character(char),
    Resize(Size),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers() {
        assert!(KeyboardModifiers::NONE.none());
        assert!(KeyboardModifiers::CTRL_SHIFT.shift);
        assert!(KeyboardModifiers::CTRL_SHIFT.shortcut());
        assert!(!KeyboardModifiers::SHIFT.shortcut());
    }

    #[test]
    fn test_button_mask() {
        assert_eq!(MouseButton::Left.mask(), 1);
        assert_eq!(MouseButton::Right.mask(), 2);
        assert_eq!(MouseButton::Middle.mask(), 4);
    }

    #[test]
    fn test_localized() {
        let event = WidgetEvent::MousePress(MousePressEvent::new(
            MouseButton::Left,
            Point::new(50.0, 40.0),
            KeyboardModifiers::NONE,
        ));
        let local = event.localized(Point::new(10.0, 15.0));
        match local {
            WidgetEvent::MousePress(e) => {
                assert_eq!(e.local_pos, Point::new(40.0, 25.0));
                assert_eq!(e.window_pos, Point::new(50.0, 40.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(WidgetEvent::MouseEnter.localized(Point::ZERO), WidgetEvent::MouseEnter);
    }
}
