//! Push button with toggle, radio and popup modes.
//!
//! # State Machine
//!
//! A button is either released or pushed. On a left press:
//!
//! - `Normal`: becomes pushed
//! - `Toggle`: flips
//! - `Radio`: becomes pushed; every other pushed radio button in its group
//!   (or, without a group, among its siblings) is released
//! - `Popup`: flips like `Toggle`; pushing it releases every other pushed
//!   popup button among its siblings
//!
//! On a left release the primary callback runs if the pointer is still over
//! the button. A `Normal` button then reverts to released wherever the
//! pointer is. The change callback only fires when the pushed state actually
//! changed.

use espalier_core::ObjectId;
use espalier_core::logging::targets;
use espalier_render::text::{FONT_ICONS, FONT_SANS_BOLD};
use espalier_render::{Bitmap, CachedBitmap, Color, Point, Rect, Size};

use super::button_group;
use crate::theme::Theme;
use crate::widget::{
    EventContext, FocusPolicy, MeasureContext, MouseButton, PaintContext, Widget, WidgetBase,
    WidgetEvent,
};

/// Callback run when a button is clicked.
pub type PushCallback = Box<dyn FnMut(&mut EventContext<'_>)>;

/// Callback run when a button's pushed state changes.
pub type ChangeCallback = Box<dyn FnMut(&mut EventContext<'_>, bool)>;

/// How a button reacts to presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonMode {
    /// Pushed while held.
    #[default]
    Normal,
    /// Each press flips the pushed state.
    Toggle,
    /// At most one pushed button per group.
    Radio,
    /// Each press opens or closes a linked popup; at most one pushed per parent.
    Popup,
}

/// Where the icon sits relative to the caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconPosition {
    /// Against the left edge.
    Left,
    /// Left of the centred caption.
    #[default]
    LeftCentered,
    /// Right of the centred caption.
    RightCentered,
    /// Against the right edge.
    Right,
}

/// A clickable button.
///
/// # Example
///
/// ```
/// use espalier::widget::widgets::{Button, ButtonMode};
///
/// let button = Button::new("Bold").with_mode(ButtonMode::Toggle);
/// assert!(!button.is_pushed());
/// assert_eq!(button.caption(), "Bold");
/// ```
pub struct Button {
    base: WidgetBase,
    caption: String,
    icon: Option<char>,
    icon_position: IconPosition,
    mode: ButtonMode,
    pushed: bool,
    group: Vec<ObjectId>,
    popup: Option<ObjectId>,
    background_color: Option<Color>,
    text_color: Option<Color>,
    callback: Option<PushCallback>,
    change_callback: Option<ChangeCallback>,

    caption_cache: CachedBitmap,
    icon_cache: CachedBitmap,
    /// Enabled state the caches were built for.
    painted_enabled: bool,

    async_body: bool,
    /// Size the background-rasterized bodies were built for.
    async_size: Size,
    /// A colour baked into the ready bodies changed.
    body_dirty: bool,
}

impl Button {
    /// Create a released `Normal` button with the given caption.
    pub fn new(caption: impl Into<String>) -> Self {
        let mut base = WidgetBase::new();
        base.set_focus_policy(FocusPolicy::NoFocus);
        Self {
            base,
            caption: caption.into(),
            icon: None,
            icon_position: IconPosition::default(),
            mode: ButtonMode::Normal,
            pushed: false,
            group: Vec::new(),
            popup: None,
            background_color: None,
            text_color: None,
            callback: None,
            change_callback: None,
            caption_cache: CachedBitmap::new(),
            icon_cache: CachedBitmap::new(),
            painted_enabled: true,
            async_body: false,
            async_size: Size::ZERO,
            body_dirty: false,
        }
    }

    // =========================================================================
    // Builder Pattern
    // =========================================================================

    /// Set the press behaviour.
    pub fn with_mode(mut self, mode: ButtonMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set an icon glyph from the icon font.
    pub fn with_icon(mut self, icon: char) -> Self {
        self.set_icon(Some(icon));
        self
    }

    /// Set where the icon sits relative to the caption.
    pub fn with_icon_position(mut self, position: IconPosition) -> Self {
        self.icon_position = position;
        self
    }

    /// Override the theme's button font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.base.set_font_size(size);
        self
    }

    /// Tint the body with a background colour.
    pub fn with_background_color(mut self, color: Color) -> Self {
        self.set_background_color(Some(color));
        self
    }

    /// Set the caption colour used while enabled.
    pub fn with_text_color(mut self, color: Color) -> Self {
        self.set_text_color(Some(color));
        self
    }

    /// Set the callback run when the button is clicked.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut EventContext<'_>) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Set the callback run when the pushed state changes.
    pub fn with_change_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut EventContext<'_>, bool) + 'static,
    {
        self.change_callback = Some(Box::new(callback));
        self
    }

    /// Link a popup that is shown while this button is pushed.
    pub fn with_popup(mut self, popup: ObjectId) -> Self {
        self.popup = Some(popup);
        self
    }

    /// Rasterize the body on the screen's background worker.
    pub fn with_async_body(mut self, enabled: bool) -> Self {
        self.async_body = enabled;
        self
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the caption text.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Set the caption text.
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        let caption = caption.into();
        if self.caption != caption {
            self.caption = caption;
            self.caption_cache.mark_dirty();
            self.base.update();
        }
    }

    /// Returns the icon glyph, if any.
    pub fn icon(&self) -> Option<char> {
        self.icon
    }

    /// Set or clear the icon glyph.
    pub fn set_icon(&mut self, icon: Option<char>) {
        if self.icon != icon {
            self.icon = icon;
            self.icon_cache.mark_dirty();
            self.base.update();
        }
    }

    /// Returns where the icon is placed.
    pub fn icon_position(&self) -> IconPosition {
        self.icon_position
    }

    /// Set where the icon is placed.
    pub fn set_icon_position(&mut self, position: IconPosition) {
        self.icon_position = position;
        self.base.update();
    }

    /// Returns the press behaviour.
    pub fn mode(&self) -> ButtonMode {
        self.mode
    }

    /// Set the press behaviour. The pushed state is kept.
    pub fn set_mode(&mut self, mode: ButtonMode) {
        self.mode = mode;
    }

    /// Check whether the button is pushed.
    pub fn is_pushed(&self) -> bool {
        self.pushed
    }

    /// Change the pushed state without running any callback.
    ///
    /// A linked popup is not touched; use
    /// [`Screen::set_button_pushed`](crate::Screen::set_button_pushed) to keep
    /// it in step.
    pub fn set_pushed(&mut self, pushed: bool) {
        if self.pushed != pushed {
            self.pushed = pushed;
            self.mark_caches_dirty();
        }
    }

    /// Explicit radio group, empty when siblings are scanned instead.
    pub fn group(&self) -> &[ObjectId] {
        &self.group
    }

    /// Set this button's explicit group. See [`button_group::set_group`] to
    /// set it on every member at once.
    pub fn set_group(&mut self, group: Vec<ObjectId>) {
        self.group = group;
    }

    /// Returns the linked popup.
    pub fn popup(&self) -> Option<ObjectId> {
        self.popup
    }

    /// Link or unlink a popup.
    pub fn set_popup(&mut self, popup: Option<ObjectId>) {
        self.popup = popup;
    }

    /// Returns the background tint.
    pub fn background_color(&self) -> Option<Color> {
        self.background_color
    }

    /// Set or clear the background tint.
    pub fn set_background_color(&mut self, color: Option<Color>) {
        if self.background_color != color {
            self.background_color = color;
            self.body_dirty = true;
            self.mark_caches_dirty();
        }
    }

    /// Returns the caption colour override.
    pub fn text_color(&self) -> Option<Color> {
        self.text_color
    }

    /// Set or clear the caption colour override.
    pub fn set_text_color(&mut self, color: Option<Color>) {
        if self.text_color != color {
            self.text_color = color;
            self.mark_caches_dirty();
        }
    }

    /// Replace the click callback.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut EventContext<'_>) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Replace the pushed-state callback.
    pub fn set_change_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut EventContext<'_>, bool) + 'static,
    {
        self.change_callback = Some(Box::new(callback));
    }

    /// Check whether the body is rasterized in the background.
    pub fn has_async_body(&self) -> bool {
        self.async_body
    }

    /// Enable or disable background rasterization of the body.
    pub fn set_async_body(&mut self, enabled: bool) {
        self.async_body = enabled;
        self.base.update();
    }

    /// Whether the caption bitmap must be rebuilt before it is drawn.
    pub fn is_caption_dirty(&self) -> bool {
        self.caption_cache.is_dirty()
    }

    /// Whether the icon bitmap must be rebuilt before it is drawn.
    pub fn is_icon_dirty(&self) -> bool {
        self.icon_cache.is_dirty()
    }

    fn mark_caches_dirty(&mut self) {
        self.caption_cache.mark_dirty();
        self.icon_cache.mark_dirty();
        self.base.update();
    }

    /// Visual-state fingerprint of the body bitmap.
    fn body_state(&self) -> u8 {
        u8::from(self.pushed)
            | (u8::from(self.base.mouse_focus()) << 1)
            | (u8::from(self.base.is_enabled()) << 2)
    }

    fn font_size(&self, theme: &Theme) -> f32 {
        self.base.font_size_or(theme.button_font_size)
    }

    // =========================================================================
    // Group Sweep Support
    // =========================================================================

    /// Release this button on behalf of a sibling's sweep. Returns the linked
    /// popup and the change callback, which the caller runs and hands back.
    pub(super) fn release_for_sweep(&mut self, mode: ButtonMode) -> Option<(Option<ObjectId>, Option<ChangeCallback>)> {
        if self.mode != mode || !self.pushed {
            return None;
        }
        self.pushed = false;
        self.mark_caches_dirty();
        Some((self.popup, self.change_callback.take()))
    }

    pub(super) fn restore_change_callback(&mut self, callback: ChangeCallback) {
        if self.change_callback.is_none() {
            self.change_callback = Some(callback);
        }
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    fn handle_press(&mut self, ctx: &mut EventContext<'_>) {
        if self.mode == ButtonMode::Radio {
            let members = if self.group.is_empty() {
                ctx.parent().map(|p| ctx.children_of(p)).unwrap_or_default()
            } else {
                self.group.clone()
            };
            button_group::release_others(ctx, &members, ButtonMode::Radio);
        }
        if self.mode == ButtonMode::Popup && !self.pushed {
            let siblings = ctx.parent().map(|p| ctx.children_of(p)).unwrap_or_default();
            button_group::release_others(ctx, &siblings, ButtonMode::Popup);
        }

        if matches!(self.mode, ButtonMode::Toggle | ButtonMode::Popup) {
            self.pushed = !self.pushed;
        } else {
            self.pushed = true;
        }
    }

    fn handle_release(&mut self, ctx: &mut EventContext<'_>, local_pos: Point) {
        if !self.pushed {
            return;
        }
        if self.base.rect().contains(local_pos) {
            if let Some(mut callback) = self.callback.take() {
                callback(ctx);
                if self.callback.is_none() {
                    self.callback = Some(callback);
                }
            }
        }
        if self.mode == ButtonMode::Normal {
            self.pushed = false;
        }
    }

    fn pushed_changed(&mut self, ctx: &mut EventContext<'_>) {
        tracing::trace!(target: targets::WIDGETS, id = ?ctx.id(), pushed = self.pushed, "button state changed");
        self.mark_caches_dirty();

        if let Some(popup) = self.popup {
            ctx.set_visible(popup, self.pushed);
            if self.pushed {
                ctx.request_layout(popup);
            }
        }
        if let Some(mut callback) = self.change_callback.take() {
            callback(ctx, self.pushed);
            if self.change_callback.is_none() {
                self.change_callback = Some(callback);
            }
        }
    }

    // =========================================================================
    // Painting
    // =========================================================================

    fn body_colors(&self, theme: &Theme) -> (Color, Color) {
        if self.pushed {
            (theme.button_gradient_top_pushed, theme.button_gradient_bot_pushed)
        } else if self.base.mouse_focus() && self.base.is_enabled() {
            (theme.button_gradient_top_focused, theme.button_gradient_bot_focused)
        } else {
            (theme.button_gradient_top_unfocused, theme.button_gradient_bot_unfocused)
        }
    }

    fn paint_body(&self, ctx: &mut PaintContext<'_>) {
        let theme = ctx.theme();
        let (w, h) = (self.base.width(), self.base.height());

        let mut body = theme.button_gradient_top_unfocused;
        let background = self.background_color.filter(|c| c.a > 0.0);
        if let Some(bg) = background {
            body = bg;
        }
        if self.pushed {
            body = background.map_or(theme.button_gradient_top_pushed, |bg| scale_rgb(bg, 1.5));
        } else if self.base.mouse_focus() && self.base.is_enabled() {
            body = background.map_or(theme.button_gradient_top_focused, |bg| scale_rgb(bg, 0.5));
        }
        ctx.fill_rect(Rect::new(1.0, 1.0, w - 2.0, h - 2.0), body);

        let (light, dark) = if self.pushed {
            (theme.border_dark, theme.border_light)
        } else {
            (theme.border_light, theme.border_dark)
        };

        let top = if self.pushed { 0.5 } else { 1.5 };
        let lr = Rect::new(0.0, top, w - 1.0, h - 1.0 - if self.pushed { 0.0 } else { 1.0 });
        ctx.draw_line(Point::new(lr.left(), lr.top()), Point::new(lr.right(), lr.top()), 1.0, light);
        ctx.draw_line(Point::new(lr.left(), lr.top()), Point::new(lr.left(), lr.bottom()), 1.0, light);

        let dr = Rect::new(0.0, 0.5, w - 1.0, h - 2.0);
        ctx.draw_line(Point::new(dr.left(), dr.bottom()), Point::new(dr.right(), dr.bottom()), 1.0, dark);
        ctx.draw_line(Point::new(dr.right(), dr.top()), Point::new(dr.right(), dr.bottom()), 1.0, dark);

        ctx.stroke_rect(Rect::new(-1.5, -1.0, w + 3.0, h + 1.0), 1.0, theme.border_dark);
    }

    /// Draw the background-rasterized body. Returns `false` when no raster
    /// cache is available and the body must be painted directly.
    fn paint_async_body(&mut self, ctx: &mut PaintContext<'_>) -> bool {
        let id = ctx.id();
        let size = self.base.size();
        let state = self.body_state();
        let (top, bottom) = self.body_colors(ctx.theme());
        let (light, dark) = (ctx.theme().border_light, ctx.theme().border_dark);
        let background = self.background_color.filter(|c| c.a > 0.0);
        let stale = self.async_size != size || self.body_dirty;
        self.async_size = size;

        let Some(cache) = ctx.raster_cache() else {
            return false;
        };
        self.body_dirty = false;
        if stale {
            cache.forget_where(|key| key.0 == id);
        }

        let width = (size.width.max(0.0) as u32) + 2;
        let height = (size.height.max(0.0) as u32) + 2;
        let requested = cache.request((id, state), move || {
            build_body_bitmap(width, height, top, bottom, background, light, dark)
        });
        match requested {
            Ok(Some(bitmap)) => ctx.blit(&bitmap, Point::new(-1.0, -1.0)),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(target: targets::WIDGETS, ?id, %err, "button body rasterization failed");
            }
        }
        true
    }

    fn icon_width(&self, measurer: &dyn espalier_render::TextMeasurer, font_size: f32) -> f32 {
        match self.icon {
            Some(icon) => {
                let mut buf = [0u8; 4];
                let glyph = icon.encode_utf8(&mut buf);
                measurer.width(FONT_ICONS, font_size * 1.5, glyph) + self.base.height() * 0.15
            }
            None => 0.0,
        }
    }
}

/// Scale the colour channels, keeping alpha.
fn scale_rgb(color: Color, factor: f32) -> Color {
    Color::new(
        (color.r * factor).min(1.0),
        (color.g * factor).min(1.0),
        (color.b * factor).min(1.0),
        color.a,
    )
}

fn mix(a: Color, b: Color, t: f32) -> Color {
    Color::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

/// Vertical gradient with a one-pixel frame, light on the top and left edges,
/// dark on the bottom and right.
fn build_body_bitmap(
    width: u32,
    height: u32,
    top: Color,
    bottom: Color,
    background: Option<Color>,
    light: Color,
    dark: Color,
) -> Bitmap {
    let Ok(mut bitmap) = Bitmap::new(width, height) else {
        return Bitmap::empty();
    };
    let span = height.saturating_sub(1).max(1) as f32;
    for y in 0..height {
        let mut color = mix(top, bottom, y as f32 / span);
        if let Some(bg) = background {
            color = mix(color, bg.with_alpha(1.0), bg.a);
        }
        bitmap.fill_row(y, color);
    }
    if width > 0 && height > 0 {
        let (light, dark) = (light.to_rgba8(), dark.to_rgba8());
        for x in 0..width {
            bitmap.set_pixel(x, 0, light);
            bitmap.set_pixel(x, height - 1, dark);
        }
        for y in 0..height {
            bitmap.set_pixel(0, y, light);
            bitmap.set_pixel(width - 1, y, dark);
        }
    }
    bitmap
}

impl Widget for Button {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn preferred_size(&self, ctx: &MeasureContext<'_>) -> Size {
        let font_size = self.font_size(ctx.theme());
        let text_width = ctx.measurer().width(FONT_SANS_BOLD, font_size, &self.caption);
        let icon_width = self.icon_width(ctx.measurer(), font_size);
        Size::new(text_width + icon_width + 20.0, font_size + 10.0)
    }

    fn event(&mut self, ctx: &mut EventContext<'_>, event: &WidgetEvent) -> bool {
        let was_pushed = self.pushed;
        let consumed = match event {
            WidgetEvent::MousePress(e) if e.button == MouseButton::Left => {
                if !self.base.is_enabled() {
                    return false;
                }
                self.handle_press(ctx);
                true
            }
            WidgetEvent::MouseRelease(e) if e.button == MouseButton::Left => {
                if !self.base.is_enabled() {
                    return false;
                }
                self.handle_release(ctx, e.local_pos);
                true
            }
            WidgetEvent::MouseEnter | WidgetEvent::MouseLeave => {
                self.base.update();
                false
            }
            _ => false,
        };
        if self.pushed != was_pushed {
            self.pushed_changed(ctx);
        }
        consumed
    }

    fn paint(&mut self, ctx: &mut PaintContext<'_>) {
        if self.painted_enabled != self.base.is_enabled() {
            self.painted_enabled = self.base.is_enabled();
            self.caption_cache.mark_dirty();
            self.icon_cache.mark_dirty();
        }

        if !(self.async_body && self.paint_async_body(ctx)) {
            self.paint_body(ctx);
        }

        let theme = ctx.theme();
        let font_size = self.font_size(theme);
        let (w, h) = (self.base.width(), self.base.height());
        let text_color = if self.base.is_enabled() {
            self.text_color.unwrap_or(theme.text_color)
        } else {
            theme.disabled_text_color
        };

        let caption = &self.caption;
        let caption_bitmap = self
            .caption_cache
            .get_or_rebuild(|| ctx.rasterize_text(FONT_SANS_BOLD, font_size, caption, text_color));

        let push_offset = if self.pushed { 1.0 } else { 0.0 };
        let center = Point::new(w * 0.5, h * 0.5 + push_offset);
        let text_width = caption_bitmap.size().width;
        let mut text_pos = Point::new(
            center.x - text_width * 0.5,
            center.y - caption_bitmap.size().height * 0.5 - 1.0,
        );

        if let Some(icon) = self.icon {
            let mut buf = [0u8; 4];
            let glyph: &str = icon.encode_utf8(&mut buf);
            let icon_bitmap = self
                .icon_cache
                .get_or_rebuild(|| ctx.rasterize_text(FONT_ICONS, font_size * 1.5, glyph, text_color));
            let icon_width = icon_bitmap.size().width + h * 0.15;
            let mut icon_pos = Point::new(0.0, center.y - icon_bitmap.size().height * 0.5 - 1.0);
            match self.icon_position {
                IconPosition::LeftCentered => {
                    icon_pos.x = center.x - (text_width + icon_width) * 0.5;
                    text_pos.x += icon_width * 0.5;
                }
                IconPosition::RightCentered => {
                    text_pos.x -= icon_width * 0.5;
                    icon_pos.x = center.x + text_width * 0.5 + h * 0.15 - icon_width * 0.5;
                }
                IconPosition::Left => icon_pos.x = 8.0,
                IconPosition::Right => icon_pos.x = w - icon_width - 8.0,
            }
            ctx.blit(&icon_bitmap, icon_pos);
        }

        ctx.blit(&caption_bitmap, text_pos);
    }
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("caption", &self.caption)
            .field("mode", &self.mode)
            .field("pushed", &self.pushed)
            .field("group", &self.group)
            .field("popup", &self.popup)
            .field("async_body", &self.async_body)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use espalier_render::{MonospaceMeasurer, RecordingRenderer};

    #[test]
    fn test_defaults() {
        let button = Button::new("OK");
        assert_eq!(button.mode(), ButtonMode::Normal);
        assert_eq!(button.icon_position(), IconPosition::LeftCentered);
        assert!(!button.is_pushed());
        assert!(button.is_caption_dirty());
        assert_eq!(button.widget_base().focus_policy(), FocusPolicy::NoFocus);
    }

    #[test]
    fn test_set_pushed_marks_caches_dirty() {
        let mut button = Button::new("OK");
        button.caption_cache.get_or_rebuild(Bitmap::empty);
        assert!(!button.is_caption_dirty());
        button.set_pushed(false);
        assert!(!button.is_caption_dirty());
        button.set_pushed(true);
        assert!(button.is_caption_dirty());
    }

    #[test]
    fn test_setters_only_dirty_on_change() {
        let mut button = Button::new("OK");
        button.caption_cache.get_or_rebuild(Bitmap::empty);
        button.set_caption("OK");
        assert!(!button.is_caption_dirty());
        button.set_caption("Cancel");
        assert!(button.is_caption_dirty());

        button.caption_cache.get_or_rebuild(Bitmap::empty);
        button.set_text_color(Some(Color::WHITE));
        assert!(button.is_caption_dirty());
    }

    #[test]
    fn test_release_for_sweep_only_matching_mode() {
        let mut radio = Button::new("A").with_mode(ButtonMode::Radio);
        assert!(radio.release_for_sweep(ButtonMode::Radio).is_none());
        radio.set_pushed(true);
        assert!(radio.release_for_sweep(ButtonMode::Popup).is_none());
        assert!(radio.release_for_sweep(ButtonMode::Radio).is_some());
        assert!(!radio.is_pushed());
    }

    #[test]
    fn test_body_state_fingerprint() {
        let mut button = Button::new("OK");
        assert_eq!(button.body_state(), 0b100);
        button.set_pushed(true);
        assert_eq!(button.body_state(), 0b101);
        button.base.set_enabled(false);
        assert_eq!(button.body_state(), 0b001);
    }

    #[test]
    fn test_body_bitmap_frame() {
        let light = Color::WHITE;
        let dark = Color::BLACK;
        let bitmap = build_body_bitmap(6, 4, Color::from_gray(74, 255), Color::from_gray(58, 255), None, light, dark);
        assert_eq!(bitmap.pixel(2, 0), Some(light.to_rgba8()));
        assert_eq!(bitmap.pixel(2, 3), Some(dark.to_rgba8()));
        assert_eq!(bitmap.pixel(5, 1), Some(dark.to_rgba8()));
        assert_eq!(bitmap.pixel(2, 1).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_scale_rgb_clamps() {
        let color = scale_rgb(Color::new(0.8, 0.2, 0.5, 0.4), 1.5);
        assert_eq!(color.r, 1.0);
        assert!((color.g - 0.3).abs() < 1e-6);
        assert_eq!(color.a, 0.4);
    }

    #[test]
    fn test_caption_rasterized_once() {
        let mut button = Button::new("Go");
        button.base.set_size(Size::new(60.0, 30.0));
        let theme = Theme::default();
        let measurer = MonospaceMeasurer::default();
        let mut renderer = RecordingRenderer::new();
        for _ in 0..3 {
            let mut ctx = PaintContext::new(
                &mut renderer,
                &theme,
                &measurer,
                None,
                ObjectId::default(),
                Point::ZERO,
                Rect::new(0.0, 0.0, 200.0, 200.0),
            );
            button.paint(&mut ctx);
        }
        assert_eq!(renderer.rasterize_count("Go"), 1);
        assert!(!button.is_caption_dirty());
    }
}
