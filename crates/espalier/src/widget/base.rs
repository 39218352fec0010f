//! Widget base implementation.
//!
//! `WidgetBase` holds the state every widget shares: geometry, visibility,
//! enabled and focus flags, an optional font size override and an optional
//! layout for the widget's children. Widgets embed it and hand it out through
//! [`Widget::widget_base`](super::Widget::widget_base).
//!
//! Tree structure (parent and children) is not stored here. It lives in the
//! [`WidgetTree`](super::WidgetTree) arena, so a base can never point at a
//! stale parent.

use std::fmt;

use espalier_render::{Point, Rect, Size};

use super::layout::Layout;

/// How a widget can receive keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusPolicy {
    /// Never takes focus.
    #[default]
    NoFocus,
    /// Takes focus when clicked.
    ClickFocus,
    /// Takes focus through Tab navigation only.
    TabFocus,
    /// Takes focus by click and by Tab.
    StrongFocus,
}

impl FocusPolicy {
    #[inline]
    pub fn accepts_click(self) -> bool {
        matches!(self, Self::ClickFocus | Self::StrongFocus)
    }

    #[inline]
    pub fn accepts_tab(self) -> bool {
        matches!(self, Self::TabFocus | Self::StrongFocus)
    }
}

/// The base implementation for all widgets.
///
/// # Example
///
/// ```
/// use espalier::widget::WidgetBase;
/// use espalier_render::{Point, Size};
///
/// let mut base = WidgetBase::new();
/// base.set_pos(Point::new(10.0, 10.0));
/// base.set_size(Size::new(40.0, 20.0));
///
/// assert!(base.contains(Point::new(49.0, 29.0)));
/// assert!(!base.contains(Point::new(50.0, 15.0)));
/// ```
pub struct WidgetBase {
    /// Position relative to the parent.
    pos: Point,
    size: Size,
    /// Zero on an axis means "not fixed".
    fixed_size: Size,
    visible: bool,
    enabled: bool,
    focus_policy: FocusPolicy,
    focused: bool,
    /// The pointer is over this widget (hover styling).
    mouse_focus: bool,
    font_size: Option<f32>,
    layout: Option<Box<dyn Layout>>,
    name: Option<String>,
    needs_repaint: bool,
}

impl Default for WidgetBase {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetBase {
    pub fn new() -> Self {
        Self {
            pos: Point::ZERO,
            size: Size::ZERO,
            fixed_size: Size::ZERO,
            visible: true,
            enabled: true,
            focus_policy: FocusPolicy::NoFocus,
            focused: false,
            mouse_focus: false,
            font_size: None,
            layout: None,
            name: None,
            needs_repaint: true,
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Position relative to the parent.
    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn set_pos(&mut self, pos: Point) {
        if self.pos != pos {
            self.pos = pos;
            self.update();
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        if self.size != size {
            self.size = size;
            self.update();
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Fixed size; zero on an axis means the layout decides.
    #[inline]
    pub fn fixed_size(&self) -> Size {
        self.fixed_size
    }

    pub fn set_fixed_size(&mut self, size: Size) {
        self.fixed_size = size;
    }

    pub fn set_fixed_width(&mut self, width: f32) {
        self.fixed_size.width = width;
    }

    pub fn set_fixed_height(&mut self, height: f32) {
        self.fixed_size.height = height;
    }

    /// Geometry in parent coordinates.
    #[inline]
    pub fn geometry(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.size)
    }

    /// Local rectangle, origin at (0, 0).
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.size)
    }

    /// Check whether a point in parent coordinates lies inside this widget.
    #[inline]
    pub fn contains(&self, parent_point: Point) -> bool {
        self.geometry().contains(parent_point)
    }

    // =========================================================================
    // Visibility and Enabled State
    // =========================================================================

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.update();
        }
    }

    pub fn show(&mut self) {
        self.set_visible(true);
    }

    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.update();
        }
    }

    // =========================================================================
    // Focus and Hover
    // =========================================================================

    #[inline]
    pub fn focus_policy(&self) -> FocusPolicy {
        self.focus_policy
    }

    pub fn set_focus_policy(&mut self, policy: FocusPolicy) {
        self.focus_policy = policy;
    }

    /// Check whether the widget can take focus at all right now.
    pub fn is_focusable(&self) -> bool {
        self.focus_policy != FocusPolicy::NoFocus && self.visible && self.enabled
    }

    pub fn accepts_click_focus(&self) -> bool {
        self.is_focusable() && self.focus_policy.accepts_click()
    }

    pub fn accepts_tab_focus(&self) -> bool {
        self.is_focusable() && self.focus_policy.accepts_tab()
    }

    #[inline]
    pub fn has_focus(&self) -> bool {
        self.focused
    }

    /// Only the focus manager changes this.
    pub(crate) fn set_focused(&mut self, focused: bool) {
        if self.focused != focused {
            self.focused = focused;
            self.update();
        }
    }

    /// Whether the pointer is over the widget.
    #[inline]
    pub fn mouse_focus(&self) -> bool {
        self.mouse_focus
    }

    pub(crate) fn set_mouse_focus(&mut self, hovered: bool) {
        if self.mouse_focus != hovered {
            self.mouse_focus = hovered;
            self.update();
        }
    }

    // =========================================================================
    // Font and Layout
    // =========================================================================

    /// Font size override, if any.
    #[inline]
    pub fn font_size(&self) -> Option<f32> {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = Some(size);
        self.update();
    }

    /// Font size override, or `default` if there is none.
    #[inline]
    pub fn font_size_or(&self, default: f32) -> f32 {
        self.font_size.unwrap_or(default)
    }

    pub fn layout(&self) -> Option<&dyn Layout> {
        self.layout.as_deref()
    }

    pub fn set_layout(&mut self, layout: Box<dyn Layout>) {
        self.layout = Some(layout);
    }

    pub fn take_layout(&mut self) -> Option<Box<dyn Layout>> {
        self.layout.take()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    // =========================================================================
    // Repaint
    // =========================================================================

    #[inline]
    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    /// Request a repaint of the widget.
    pub fn update(&mut self) {
        self.needs_repaint = true;
    }

    /// Clear the repaint flag (called after painting).
    pub(crate) fn clear_repaint_flag(&mut self) {
        self.needs_repaint = false;
    }
}

impl fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetBase")
            .field("name", &self.name)
            .field("pos", &self.pos)
            .field("size", &self.size)
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("focused", &self.focused)
            .field("has_layout", &self.layout.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_policy() {
        let mut base = WidgetBase::new();
        assert!(!base.is_focusable());
        base.set_focus_policy(FocusPolicy::ClickFocus);
        assert!(base.accepts_click_focus());
        assert!(!base.accepts_tab_focus());
        base.set_enabled(false);
        assert!(!base.accepts_click_focus());
    }

    #[test]
    fn test_repaint_flag() {
        let mut base = WidgetBase::new();
        base.clear_repaint_flag();
        base.set_pos(Point::ZERO);
        assert!(!base.needs_repaint());
        base.set_size(Size::new(1.0, 1.0));
        assert!(base.needs_repaint());
    }

    #[test]
    fn test_font_size_override() {
        let mut base = WidgetBase::new();
        assert_eq!(base.font_size_or(16.0), 16.0);
        base.set_font_size(15.0);
        assert_eq!(base.font_size_or(16.0), 15.0);
    }
}
