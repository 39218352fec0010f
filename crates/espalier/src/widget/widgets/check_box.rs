//! Check box widget.

use espalier_render::text::{FONT_ICONS, FONT_SANS};
use espalier_render::{CachedBitmap, Color, Point, Rect, Size};

use super::icons;
use crate::widget::{
    EventContext, MeasureContext, MouseButton, PaintContext, Widget, WidgetBase, WidgetEvent,
};

type CheckCallback = Box<dyn FnMut(&mut EventContext<'_>, bool)>;

/// A captioned box that toggles between checked and unchecked.
///
/// The state flips on release, and only when the pointer is still over the
/// widget.
pub struct CheckBox {
    base: WidgetBase,
    caption: String,
    checked: bool,
    pushed: bool,
    callback: Option<CheckCallback>,
    caption_cache: CachedBitmap,
    mark_cache: CachedBitmap,
    painted_enabled: bool,
}

impl CheckBox {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(),
            caption: caption.into(),
            checked: false,
            pushed: false,
            callback: None,
            caption_cache: CachedBitmap::new(),
            mark_cache: CachedBitmap::new(),
            painted_enabled: true,
        }
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut EventContext<'_>, bool) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        let caption = caption.into();
        if self.caption != caption {
            self.caption = caption;
            self.caption_cache.mark_dirty();
            self.base.update();
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Set the state without running the callback.
    pub fn set_checked(&mut self, checked: bool) {
        if self.checked != checked {
            self.checked = checked;
            self.base.update();
        }
    }

    pub fn is_pushed(&self) -> bool {
        self.pushed
    }

    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut EventContext<'_>, bool) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    pub fn is_caption_dirty(&self) -> bool {
        self.caption_cache.is_dirty()
    }
}

impl Widget for CheckBox {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn preferred_size(&self, ctx: &MeasureContext<'_>) -> Size {
        let fixed = self.base.fixed_size();
        if fixed.width > 0.0 && fixed.height > 0.0 {
            return fixed;
        }
        let font_size = self.base.font_size_or(ctx.theme().standard_font_size);
        let text_width = ctx.measurer().width(FONT_SANS, font_size, &self.caption);
        Size::new(text_width + 1.7 * font_size, font_size * 1.3)
    }

    fn event(&mut self, ctx: &mut EventContext<'_>, event: &WidgetEvent) -> bool {
        let (button, pressed, local_pos) = match event {
            WidgetEvent::MousePress(e) => (e.button, true, e.local_pos),
            WidgetEvent::MouseRelease(e) => (e.button, false, e.local_pos),
            _ => return false,
        };
        if !self.base.is_enabled() || button != MouseButton::Left {
            return false;
        }

        if pressed {
            self.pushed = true;
        } else if self.pushed {
            if self.base.rect().contains(local_pos) {
                self.checked = !self.checked;
                if let Some(mut callback) = self.callback.take() {
                    callback(ctx, self.checked);
                    if self.callback.is_none() {
                        self.callback = Some(callback);
                    }
                }
            }
            self.pushed = false;
        }
        self.base.update();
        true
    }

    fn paint(&mut self, ctx: &mut PaintContext<'_>) {
        if self.painted_enabled != self.base.is_enabled() {
            self.painted_enabled = self.base.is_enabled();
            self.caption_cache.mark_dirty();
            self.mark_cache.mark_dirty();
        }

        let theme = ctx.theme();
        let font_size = self.base.font_size_or(theme.standard_font_size);
        let h = self.base.height();
        let text_color = if self.base.is_enabled() {
            theme.text_color
        } else {
            theme.disabled_text_color
        };

        let caption = &self.caption;
        let caption_bitmap = self
            .caption_cache
            .get_or_rebuild(|| ctx.rasterize_text(FONT_SANS, font_size, caption, text_color));
        ctx.blit(
            &caption_bitmap,
            Point::new(1.2 * h + 5.0, (h - caption_bitmap.size().height) * 0.5),
        );

        let fill = if self.pushed {
            Color::from_gray(0, 100)
        } else {
            Color::from_gray(0, 32)
        };
        ctx.stroke_rect(Rect::new(1.5, 1.5, h - 2.0, h - 2.0), 1.0, theme.border_dark);
        ctx.fill_rect(Rect::new(1.0, 1.0, h - 2.0, h - 2.0), fill);

        if self.checked {
            let mut buf = [0u8; 4];
            let glyph: &str = icons::CHECK.encode_utf8(&mut buf);
            let mark = self
                .mark_cache
                .get_or_rebuild(|| ctx.rasterize_text(FONT_ICONS, h * 0.9, glyph, text_color));
            let size = mark.size();
            ctx.blit(&mark, Point::new((h - size.width) * 0.5 + 1.0, (h - size.height) * 0.5));
        }
    }
}

impl std::fmt::Debug for CheckBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckBox")
            .field("caption", &self.caption)
            .field("checked", &self.checked)
            .field("pushed", &self.pushed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_checked_does_not_push() {
        let mut check = CheckBox::new("Wrap").with_checked(true);
        assert!(check.is_checked());
        check.set_checked(false);
        assert!(!check.is_checked());
        assert!(!check.is_pushed());
    }

    #[test]
    fn test_caption_change_marks_dirty() {
        let mut check = CheckBox::new("Wrap");
        check.caption_cache.get_or_rebuild(espalier_render::Bitmap::empty);
        check.set_caption("Wrap");
        assert!(!check.is_caption_dirty());
        check.set_caption("Wrap lines");
        assert!(check.is_caption_dirty());
    }
}
