//! Single-line text box with format validation.
//!
//! # Editing
//!
//! A text box shows its committed value until it gains focus. While focused
//! and editable it edits a scratch copy of the value instead:
//!
//! - Focus in: the scratch text is reset to the value and the cursor goes to
//!   the start.
//! - Focus out (or Enter): the scratch text is committed if it matches the
//!   format. An empty scratch text commits the default value. If the
//!   callback rejects the new value, the previous value is restored.
//!
//! Cursor and selection are grapheme indices into the scratch text. A
//! selection exists only while its anchor differs from the cursor.
//!
//! # Spinning
//!
//! A spinnable box reserves a strip on its left edge for spin arrows. Presses
//! there never focus the box, and double-clicking an unfocused spinnable box
//! resets it to its default value.

use std::time::Duration;

use espalier_core::logging::targets;
use espalier_render::text::{FONT_ICONS, FONT_SANS};
use espalier_render::{CachedBitmap, Color, Point, Rect, Size, TextMeasurer};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::icons;
use crate::theme::Theme;
use crate::widget::{
    EventContext, FocusPolicy, Key, KeyboardModifiers, MeasureContext, MouseButton, PaintContext,
    Widget, WidgetBase, WidgetEvent,
};

/// Callback run when a value is committed. Returning `false` rejects it.
pub type TextBoxCallback = Box<dyn FnMut(&mut EventContext<'_>, &str) -> bool>;

/// Horizontal placement of the text inside the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Padding between the box edge and the text.
const TEXT_PADDING: f32 = 3.0;

/// A single-line editable text field.
///
/// # Example
///
/// ```
/// use espalier::widget::widgets::{TextAlignment, TextBox};
///
/// let text_box = TextBox::new("42")
///     .with_editable(true)
///     .with_units("px")
///     .with_format("[0-9]+")
///     .with_alignment(TextAlignment::Right);
/// assert_eq!(text_box.value(), "42");
/// assert!(text_box.is_committed());
/// ```
pub struct TextBox {
    base: WidgetBase,
    editable: bool,
    spinnable: bool,
    committed: bool,
    value: String,
    default_value: String,
    alignment: TextAlignment,
    units: String,
    format: String,
    format_regex: Option<Regex>,
    valid_format: bool,
    /// Scratch text, live while editing.
    temp: String,
    cursor: Option<usize>,
    selection: Option<usize>,
    text_offset: f32,
    last_click: Option<Duration>,
    /// A press on the body of an unfocused spinnable box is held.
    spin_pressed: bool,
    callback: Option<TextBoxCallback>,

    caption_cache: CachedBitmap,
    units_cache: CachedBitmap,
    temp_cache: CachedBitmap,
    painted_enabled: bool,
}

impl TextBox {
    /// Create a read-only, centred box showing `value`.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            base: WidgetBase::new(),
            editable: false,
            spinnable: false,
            committed: true,
            temp: value.clone(),
            value,
            default_value: String::new(),
            alignment: TextAlignment::Center,
            units: String::new(),
            format: String::new(),
            format_regex: None,
            valid_format: true,
            cursor: None,
            selection: None,
            text_offset: 0.0,
            last_click: None,
            spin_pressed: false,
            callback: None,
            caption_cache: CachedBitmap::new(),
            units_cache: CachedBitmap::new(),
            temp_cache: CachedBitmap::new(),
            painted_enabled: true,
        }
    }

    // =========================================================================
    // Builder Pattern
    // =========================================================================

    /// Allow or forbid editing.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.set_editable(editable);
        self
    }

    /// Show the spin area on the left edge.
    pub fn with_spinnable(mut self, spinnable: bool) -> Self {
        self.spinnable = spinnable;
        self
    }

    /// Set the value committed for empty text and restored by a spin-area double click.
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Set the units label drawn after the text.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.set_units(units);
        self
    }

    /// Set the validation pattern. See [`set_format`](Self::set_format).
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.set_format(format);
        self
    }

    /// Set the text alignment.
    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Override the theme's text box font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.base.set_font_size(size);
        self
    }

    /// Set the commit callback. Returning `false` rejects the value.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut EventContext<'_>, &str) -> bool + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the committed value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the committed value. Does not run the callback.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        if self.value != value {
            self.value = value;
            self.caption_cache.mark_dirty();
            self.base.update();
        }
    }

    /// Returns the default value.
    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    /// Set the default value.
    pub fn set_default_value(&mut self, value: impl Into<String>) {
        self.default_value = value.into();
    }

    /// Check whether the text can be edited.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Editable boxes take keyboard focus; read-only ones never do.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
        self.base.set_focus_policy(if editable {
            FocusPolicy::StrongFocus
        } else {
            FocusPolicy::NoFocus
        });
        self.caption_cache.mark_dirty();
    }

    /// Check whether the spin area is shown.
    pub fn is_spinnable(&self) -> bool {
        self.spinnable
    }

    /// Show or hide the spin area.
    pub fn set_spinnable(&mut self, spinnable: bool) {
        self.spinnable = spinnable;
        self.base.update();
    }

    /// Returns the units label.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Set the units label.
    pub fn set_units(&mut self, units: impl Into<String>) {
        let units = units.into();
        if self.units != units {
            self.units = units;
            self.units_cache.mark_dirty();
            self.base.update();
        }
    }

    /// Returns the text alignment.
    pub fn alignment(&self) -> TextAlignment {
        self.alignment
    }

    /// Set the text alignment.
    pub fn set_alignment(&mut self, alignment: TextAlignment) {
        self.alignment = alignment;
        self.base.update();
    }

    /// Returns the validation pattern.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Set the validation pattern. The whole text must match it. An empty
    /// pattern accepts anything, and so does one that fails to compile.
    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
        self.format_regex = if self.format.is_empty() {
            None
        } else {
            match Regex::new(&format!("^(?:{})$", self.format)) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!(
                        target: targets::TEXT_BOX,
                        format = %self.format,
                        %err,
                        "invalid text box format, validation disabled"
                    );
                    None
                }
            }
        };
    }

    /// Replace the commit callback.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut EventContext<'_>, &str) -> bool + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Whether the value is shown (not being edited).
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Scratch text while editing, the value otherwise.
    pub fn editing_text(&self) -> &str {
        if self.committed { &self.value } else { &self.temp }
    }

    /// Whether the scratch text matches the format.
    pub fn is_valid_format(&self) -> bool {
        self.valid_format
    }

    /// Cursor position in graphemes, `None` when not editing.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Selection anchor in graphemes, `None` without a selection.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Horizontal scroll of the scratch text, zero or negative.
    pub fn text_offset(&self) -> f32 {
        self.text_offset
    }

    /// Whether the value bitmap must be rebuilt before it is drawn.
    pub fn is_caption_dirty(&self) -> bool {
        self.caption_cache.is_dirty()
    }

    /// Whether the scratch text bitmap must be rebuilt.
    pub fn is_temp_dirty(&self) -> bool {
        self.temp_cache.is_dirty()
    }

    /// Whether the units bitmap must be rebuilt.
    pub fn is_units_dirty(&self) -> bool {
        self.units_cache.is_dirty()
    }

    /// Check `input` against the format.
    pub fn check_format(&self, input: &str) -> bool {
        input.is_empty() || self.format_regex.as_ref().is_none_or(|regex| regex.is_match(input))
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    fn font_size(&self, theme: &Theme) -> f32 {
        self.base.font_size_or(theme.text_box_font_size)
    }

    fn spin_width(&self, theme: &Theme) -> f32 {
        if self.spinnable {
            theme.text_box_spin_width
        } else {
            0.0
        }
    }

    fn in_spin_area(&self, local: Point, theme: &Theme) -> bool {
        self.spinnable && local.x >= 0.0 && local.x < theme.text_box_spin_width
    }

    /// Width reserved on the right for the units, including padding.
    fn units_extent(&self, measurer: &dyn TextMeasurer, font_size: f32) -> f32 {
        if self.units.is_empty() {
            0.0
        } else {
            measurer.width(FONT_SANS, font_size, &self.units) + 6.0
        }
    }

    /// Left and right edge of the visible text area.
    fn clip_span(&self, measurer: &dyn TextMeasurer, theme: &Theme) -> (f32, f32) {
        let left = self.spin_width(theme) + 1.0;
        let right = self.base.width() - self.units_extent(measurer, self.font_size(theme)) - 1.0;
        (left, right.max(left))
    }

    /// Where a text of `text_width` starts, before scrolling.
    fn text_origin(&self, measurer: &dyn TextMeasurer, theme: &Theme, text_width: f32) -> f32 {
        let units = self.units_extent(measurer, self.font_size(theme));
        let w = self.base.width();
        match self.alignment {
            TextAlignment::Left => TEXT_PADDING + self.spin_width(theme),
            TextAlignment::Right => w - text_width - units - TEXT_PADDING,
            TextAlignment::Center => (w - units - text_width) * 0.5,
        }
    }

    /// Local x of the scratch text's first glyph, scroll included.
    fn temp_origin(&self, measurer: &dyn TextMeasurer, theme: &Theme) -> f32 {
        let width = measurer.width(FONT_SANS, self.font_size(theme), &self.temp);
        self.text_origin(measurer, theme, width) + self.text_offset
    }

    /// Width of the first `index` graphemes of the scratch text.
    fn prefix_width(&self, measurer: &dyn TextMeasurer, font_size: f32, index: usize) -> f32 {
        let end = byte_offset(&self.temp, index);
        measurer.width(FONT_SANS, font_size, &self.temp[..end])
    }

    /// Grapheme index closest to `x`, measured from the start of the text.
    ///
    /// Ties keep the earlier index. The end of the text wins when it is
    /// strictly closer than every interior position.
    fn index_at(&self, measurer: &dyn TextMeasurer, font_size: f32, x: f32) -> usize {
        let len = grapheme_len(&self.temp);
        let mut best = 0;
        let mut best_x = self.prefix_width(measurer, font_size, 0);
        for j in 1..=len {
            let candidate = self.prefix_width(measurer, font_size, j);
            if (best_x - x).abs() > (candidate - x).abs() {
                best = j;
                best_x = candidate;
            }
        }
        let end_x = measurer.width(FONT_SANS, font_size, &self.temp);
        if (best_x - x).abs() > (end_x - x).abs() {
            best = len;
        }
        best
    }

    /// Scroll so the glyphs on both sides of the cursor are visible, moving
    /// by exactly the overflow.
    fn scroll_to_cursor(&mut self, measurer: &dyn TextMeasurer, theme: &Theme) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let font_size = self.font_size(theme);
        let len = grapheme_len(&self.temp);
        let origin = self.temp_origin(measurer, theme);
        let (clip_left, clip_right) = self.clip_span(measurer, theme);

        let prev_x = origin + self.prefix_width(measurer, font_size, cursor.saturating_sub(1));
        let next_x = origin + self.prefix_width(measurer, font_size, (cursor + 1).min(len));

        if next_x > clip_right {
            self.text_offset -= next_x - clip_right;
        } else if prev_x < clip_left {
            self.text_offset += clip_left - prev_x;
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    fn is_editing(&self) -> bool {
        self.editable && self.base.has_focus()
    }

    fn temp_changed(&mut self) {
        self.temp_cache.mark_dirty();
        self.valid_format = self.check_format(&self.temp);
        self.base.update();
    }

    fn begin_edit(&mut self) {
        self.temp = self.value.clone();
        self.temp_cache.mark_dirty();
        self.committed = false;
        self.cursor = Some(0);
        self.selection = None;
        self.text_offset = 0.0;
        self.valid_format = self.check_format(&self.temp);
    }

    /// Commit the scratch text.
    fn commit(&mut self, ctx: &mut EventContext<'_>) {
        let backup = self.value.clone();
        if self.valid_format {
            self.value = if self.temp.is_empty() {
                self.default_value.clone()
            } else {
                self.temp.clone()
            };
        }
        if let Some(mut callback) = self.callback.take() {
            if !callback(ctx, &self.value) {
                tracing::debug!(target: targets::TEXT_BOX, id = ?ctx.id(), "callback rejected value");
                self.value = backup;
            }
            if self.callback.is_none() {
                self.callback = Some(callback);
            }
        }
        self.valid_format = true;
        self.caption_cache.mark_dirty();
        self.committed = true;
        self.cursor = None;
        self.selection = None;
        self.text_offset = 0.0;
        self.base.update();
    }

    /// Extend the selection when shift is held, drop it otherwise.
    fn anchor_selection(&mut self, extend: bool) {
        if extend {
            if self.selection.is_none() {
                self.selection = self.cursor;
            }
        } else {
            self.selection = None;
        }
    }

    fn collapse_selection(&mut self) {
        if self.selection.is_some() && self.selection == self.cursor {
            self.selection = None;
        }
    }

    /// Selected range as `begin..end` grapheme indices.
    fn selection_range(&self) -> Option<(usize, usize)> {
        let (cursor, anchor) = (self.cursor?, self.selection?);
        Some((cursor.min(anchor), cursor.max(anchor)))
    }

    fn delete_selection(&mut self) -> bool {
        let Some((begin, end)) = self.selection_range() else {
            return false;
        };
        let (from, to) = (byte_offset(&self.temp, begin), byte_offset(&self.temp, end));
        self.temp.replace_range(from..to, "");
        self.cursor = Some(begin);
        self.selection = None;
        self.temp_changed();
        true
    }

    fn copy_selection(&self, ctx: &mut EventContext<'_>) -> bool {
        let Some((begin, end)) = self.selection_range() else {
            return false;
        };
        let text = &self.temp[byte_offset(&self.temp, begin)..byte_offset(&self.temp, end)];
        if let Err(err) = ctx.clipboard().set_text(text) {
            tracing::warn!(target: targets::TEXT_BOX, %err, "copy to clipboard failed");
        }
        true
    }

    fn paste(&mut self, ctx: &mut EventContext<'_>) {
        let text = match ctx.clipboard().get_text() {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(target: targets::TEXT_BOX, %err, "paste from clipboard failed");
                return;
            }
        };
        self.insert_at_cursor(&text);
    }

    fn insert_at_cursor(&mut self, text: &str) {
        let cursor = self.cursor.unwrap_or(0);
        let at = byte_offset(&self.temp, cursor);
        self.temp.insert_str(at, text);
        self.cursor = Some(grapheme_len(&self.temp[..at + text.len()]));
        self.temp_changed();
    }

    fn handle_key(&mut self, ctx: &mut EventContext<'_>, key: Key, modifiers: KeyboardModifiers) {
        let len = grapheme_len(&self.temp);
        let cursor = self.cursor.unwrap_or(0);
        match key {
            Key::ArrowLeft => {
                self.anchor_selection(modifiers.shift);
                self.cursor = Some(cursor.saturating_sub(1));
            }
            Key::ArrowRight => {
                self.anchor_selection(modifiers.shift);
                self.cursor = Some((cursor + 1).min(len));
            }
            Key::Home => {
                self.anchor_selection(modifiers.shift);
                self.cursor = Some(0);
            }
            Key::End => {
                self.anchor_selection(modifiers.shift);
                self.cursor = Some(len);
            }
            Key::Backspace => {
                if !self.delete_selection() && cursor > 0 {
                    let (from, to) = (byte_offset(&self.temp, cursor - 1), byte_offset(&self.temp, cursor));
                    self.temp.replace_range(from..to, "");
                    self.cursor = Some(cursor - 1);
                    self.temp_changed();
                }
            }
            Key::Delete => {
                if !self.delete_selection() && cursor < len {
                    let (from, to) = (byte_offset(&self.temp, cursor), byte_offset(&self.temp, cursor + 1));
                    self.temp.replace_range(from..to, "");
                    self.temp_changed();
                }
            }
            Key::Enter => {
                if !self.committed {
                    self.commit(ctx);
                }
                ctx.clear_focus();
                return;
            }
            Key::A if modifiers.shortcut() => {
                self.cursor = Some(len);
                self.selection = Some(0);
            }
            Key::X if modifiers.shortcut() => {
                self.copy_selection(ctx);
                self.delete_selection();
            }
            Key::C if modifiers.shortcut() => {
                self.copy_selection(ctx);
            }
            Key::V if modifiers.shortcut() => {
                self.delete_selection();
                self.paste(ctx);
            }
            _ => {}
        }
        self.collapse_selection();
        self.valid_format = self.check_format(&self.temp);
        self.scroll_to_cursor(ctx.measurer(), ctx.theme());
        self.base.update();
    }

    fn handle_character(&mut self, ctx: &EventContext<'_>, character: char) {
        if character.is_control() {
            return;
        }
        self.delete_selection();
        let mut buf = [0u8; 4];
        self.insert_at_cursor(character.encode_utf8(&mut buf));
        self.scroll_to_cursor(ctx.measurer(), ctx.theme());
    }

    fn is_double_click(&mut self, ctx: &EventContext<'_>) -> bool {
        let now = ctx.now();
        let double = self
            .last_click
            .is_some_and(|last| now.saturating_sub(last) < ctx.theme().double_click_interval());
        self.last_click = Some(now);
        double
    }

    fn handle_press(&mut self, ctx: &mut EventContext<'_>, local: Point, modifiers: KeyboardModifiers) -> bool {
        if self.is_editing() {
            if self.is_double_click(ctx) {
                self.selection = Some(0);
                self.cursor = Some(grapheme_len(&self.temp));
            } else {
                self.anchor_selection(modifiers.shift);
                self.place_cursor(ctx, local);
            }
            self.collapse_selection();
            self.scroll_to_cursor(ctx.measurer(), ctx.theme());
            self.base.update();
            return true;
        }

        if self.spinnable && !self.base.has_focus() {
            if self.in_spin_area(local, ctx.theme()) {
                self.spin_pressed = false;
            } else {
                self.spin_pressed = true;
                if self.is_double_click(ctx) {
                    self.value = self.default_value.clone();
                    self.caption_cache.mark_dirty();
                    if let Some(mut callback) = self.callback.take() {
                        callback(ctx, &self.value);
                        if self.callback.is_none() {
                            self.callback = Some(callback);
                        }
                    }
                    self.spin_pressed = false;
                }
            }
            self.base.update();
            return true;
        }
        false
    }

    fn place_cursor(&mut self, ctx: &EventContext<'_>, local: Point) {
        let font_size = self.font_size(ctx.theme());
        let origin = self.temp_origin(ctx.measurer(), ctx.theme());
        self.cursor = Some(self.index_at(ctx.measurer(), font_size, local.x - origin));
    }
}

fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte offset of grapheme `index`, or the end of the text.
fn byte_offset(text: &str, index: usize) -> usize {
    text.grapheme_indices(true)
        .nth(index)
        .map_or(text.len(), |(offset, _)| offset)
}

impl Widget for TextBox {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn preferred_size(&self, ctx: &MeasureContext<'_>) -> Size {
        let theme = ctx.theme();
        let font_size = self.font_size(theme);
        let height = font_size * 1.4;
        let units = if self.units.is_empty() {
            0.0
        } else {
            ctx.measurer().width(FONT_SANS, font_size, &self.units)
        };
        let text = ctx.measurer().width(FONT_SANS, font_size, &self.value);
        Size::new(height + text + units + self.spin_width(theme), height)
    }

    fn accepts_click_focus_at(&self, local_pos: Point, theme: &Theme) -> bool {
        !self.in_spin_area(local_pos, theme)
    }

    fn event(&mut self, ctx: &mut EventContext<'_>, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::FocusIn(_) => {
                if self.editable {
                    self.begin_edit();
                    self.scroll_to_cursor(ctx.measurer(), ctx.theme());
                    self.base.update();
                }
                true
            }
            WidgetEvent::FocusOut(_) => {
                if self.editable && !self.committed {
                    self.commit(ctx);
                }
                true
            }
            WidgetEvent::MousePress(e) if e.button == MouseButton::Left => {
                self.handle_press(ctx, e.local_pos, e.modifiers)
            }
            WidgetEvent::MouseRelease(e) if e.button == MouseButton::Left => {
                self.spin_pressed = false;
                self.is_editing() || (self.spinnable && !self.base.has_focus())
            }
            WidgetEvent::MouseMove(_) => self.is_editing(),
            WidgetEvent::MouseDrag(e) => {
                if !self.is_editing() {
                    return false;
                }
                if self.selection.is_none() {
                    self.selection = self.cursor;
                }
                self.place_cursor(ctx, e.local_pos);
                self.collapse_selection();
                self.scroll_to_cursor(ctx.measurer(), ctx.theme());
                self.base.update();
                true
            }
            WidgetEvent::KeyPress(e) => {
                // Tab moves focus on.
                if !self.is_editing() || e.key == Key::Tab {
                    return false;
                }
                self.handle_key(ctx, e.key, e.modifiers);
                true
            }
            WidgetEvent::KeyRelease(_) => self.is_editing(),
            WidgetEvent::Character(e) => {
                if !self.is_editing() {
                    return false;
                }
                self.handle_character(ctx, e.character);
                true
            }
            _ => false,
        }
    }

    fn paint(&mut self, ctx: &mut PaintContext<'_>) {
        if self.painted_enabled != self.base.is_enabled() {
            self.painted_enabled = self.base.is_enabled();
            self.caption_cache.mark_dirty();
            self.units_cache.mark_dirty();
        }

        let theme = ctx.theme();
        let measurer = ctx.measurer();
        let font_size = self.font_size(theme);
        let (w, h) = (self.base.width(), self.base.height());
        let enabled = self.base.is_enabled();

        let background = if self.is_editing() {
            if self.valid_format {
                theme.text_box_editing
            } else {
                theme.text_box_invalid
            }
        } else if self.spinnable && self.spin_pressed {
            theme.text_box_editing
        } else {
            theme.text_box_background
        };
        ctx.fill_rect(Rect::new(1.0, 2.0, w - 2.0, h - 2.0), background);
        ctx.stroke_rect(Rect::new(0.5, 0.5, w - 1.0, h - 1.0), 1.0, theme.text_box_border);

        if !self.units.is_empty() {
            let units = &self.units;
            let color = Color::from_gray(255, if enabled { 64 } else { 32 });
            let bitmap = self
                .units_cache
                .get_or_rebuild(|| ctx.rasterize_text(FONT_SANS, font_size, units, color));
            let size = bitmap.size();
            ctx.blit(&bitmap, Point::new(w - size.width - 2.0, (h - size.height) * 0.5));
        }

        if self.spinnable && !self.base.has_focus() {
            let color = if enabled {
                theme.text_color
            } else {
                theme.disabled_text_color
            };
            let arrow_size = font_size * 0.6;
            for (glyph, y) in [(icons::CHEVRON_UP, 1.0), (icons::CHEVRON_DOWN, h * 0.5)] {
                let mut buf = [0u8; 4];
                let bitmap = ctx.rasterize_text(FONT_ICONS, arrow_size, glyph.encode_utf8(&mut buf), color);
                ctx.blit(&bitmap, Point::new(2.0, y));
            }
        }

        let (clip_left, clip_right) = self.clip_span(measurer, theme);
        let previous = ctx.push_clip(Rect::new(clip_left, 1.0, clip_right - clip_left, h - 3.0));

        if self.committed {
            let color = if enabled {
                theme.text_color
            } else {
                theme.disabled_text_color
            };
            let value = &self.value;
            let bitmap = self
                .caption_cache
                .get_or_rebuild(|| ctx.rasterize_text(FONT_SANS, font_size, value, color));
            let size = bitmap.size();
            let x = self.text_origin(measurer, theme, size.width);
            ctx.blit(&bitmap, Point::new(x, (h - size.height) * 0.5));
        } else {
            let origin = self.temp_origin(measurer, theme);
            let temp = &self.temp;
            let color = theme.text_color;
            let bitmap = self
                .temp_cache
                .get_or_rebuild(|| ctx.rasterize_text(FONT_SANS, font_size, temp, color));
            ctx.blit(&bitmap, Point::new(origin, (h - bitmap.size().height) * 0.5));

            if let Some(cursor) = self.cursor {
                let caret_x = origin + self.prefix_width(measurer, font_size, cursor);
                if let Some((begin, end)) = self.selection_range() {
                    let from = origin + self.prefix_width(measurer, font_size, begin);
                    let to = origin + self.prefix_width(measurer, font_size, end);
                    ctx.fill_rect(Rect::new(from, 4.0, to - from, h - 8.0), theme.text_box_selection);
                }
                ctx.draw_line(
                    Point::new(caret_x, 4.0),
                    Point::new(caret_x, h - 4.0),
                    1.0,
                    theme.text_box_caret,
                );
            }
        }

        ctx.restore_clip(previous);
    }
}

impl std::fmt::Debug for TextBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBox")
            .field("value", &self.value)
            .field("temp", &self.temp)
            .field("committed", &self.committed)
            .field("editable", &self.editable)
            .field("cursor", &self.cursor)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use espalier_render::MonospaceMeasurer;

    fn editing(text: &str) -> TextBox {
        let mut text_box = TextBox::new(text).with_editable(true);
        text_box.base.set_size(Size::new(200.0, 28.0));
        text_box.begin_edit();
        text_box
    }

    #[test]
    fn test_grapheme_offsets() {
        let text = "e\u{301}ab";
        assert_eq!(grapheme_len(text), 3);
        assert_eq!(byte_offset(text, 0), 0);
        assert_eq!(byte_offset(text, 1), 3);
        assert_eq!(byte_offset(text, 3), text.len());
        assert_eq!(byte_offset(text, 9), text.len());
    }

    #[test]
    fn test_format_is_full_match() {
        let text_box = TextBox::new("").with_format("[0-9]+");
        assert!(text_box.check_format("123"));
        assert!(!text_box.check_format("12a"));
        assert!(!text_box.check_format("a12"));
        assert!(text_box.check_format(""));
    }

    #[test]
    fn test_invalid_format_accepts_everything() {
        let text_box = TextBox::new("").with_format("([0-9");
        assert!(text_box.check_format("anything"));
    }

    #[test]
    fn test_begin_edit_copies_value() {
        let text_box = editing("hello");
        assert!(!text_box.is_committed());
        assert_eq!(text_box.editing_text(), "hello");
        assert_eq!(text_box.cursor(), Some(0));
        assert_eq!(text_box.selection(), None);
        assert!(text_box.is_temp_dirty());
    }

    #[test]
    fn test_index_at_prefers_closest() {
        let text_box = editing("abcd");
        let measurer = MonospaceMeasurer::default();
        // 20px font, 10px per glyph.
        assert_eq!(text_box.index_at(&measurer, 20.0, 0.0), 0);
        assert_eq!(text_box.index_at(&measurer, 20.0, 14.0), 1);
        assert_eq!(text_box.index_at(&measurer, 20.0, 16.0), 2);
        assert_eq!(text_box.index_at(&measurer, 20.0, 999.0), 4);
        assert_eq!(text_box.index_at(&measurer, 20.0, -50.0), 0);
    }

    #[test]
    fn test_index_at_tie_keeps_earlier() {
        let text_box = editing("abcd");
        let measurer = MonospaceMeasurer::default();
        assert_eq!(text_box.index_at(&measurer, 20.0, 15.0), 1);
    }

    #[test]
    fn test_delete_selection_is_order_normalized() {
        let mut text_box = editing("abcdef");
        text_box.cursor = Some(4);
        text_box.selection = Some(1);
        assert!(text_box.delete_selection());
        assert_eq!(text_box.editing_text(), "aef");
        assert_eq!(text_box.cursor(), Some(1));
        assert_eq!(text_box.selection(), None);
        assert!(!text_box.delete_selection());
    }

    #[test]
    fn test_insert_advances_by_graphemes() {
        let mut text_box = editing("ab");
        text_box.cursor = Some(1);
        text_box.insert_at_cursor("xy");
        assert_eq!(text_box.editing_text(), "axyb");
        assert_eq!(text_box.cursor(), Some(3));
    }

    #[test]
    fn test_scroll_is_flush_with_clip_edge() {
        let theme = Theme::default();
        let measurer = MonospaceMeasurer::default();
        let mut text_box = editing(&"x".repeat(40)).with_alignment(TextAlignment::Left);
        text_box.cursor = Some(40);
        text_box.scroll_to_cursor(&measurer, &theme);

        // Left origin 3, 10px glyphs, right clip edge at 200 - 1 = 199.
        let end_x = 3.0 + text_box.text_offset() + 400.0;
        assert_eq!(end_x, 199.0);

        text_box.cursor = Some(0);
        text_box.scroll_to_cursor(&measurer, &theme);
        assert_eq!(3.0 + text_box.text_offset(), 1.0);
    }
}
