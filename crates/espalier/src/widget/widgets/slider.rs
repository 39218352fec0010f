//! Horizontal slider.

use espalier_render::{Color, Point, Rect, Size};

use crate::widget::{EventContext, MeasureContext, PaintContext, Widget, WidgetBase, WidgetEvent};

type ValueCallback = Box<dyn FnMut(&mut EventContext<'_>, f32)>;

/// A knob on a track, holding a value in `[0, 1]`.
///
/// Presses and drags move the knob under the pointer and run the callback.
/// Releasing runs the final callback as well.
pub struct Slider {
    base: WidgetBase,
    value: f32,
    highlighted_range: (f32, f32),
    highlight_color: Option<Color>,
    callback: Option<ValueCallback>,
    final_callback: Option<ValueCallback>,
}

impl Slider {
    pub fn new(value: f32) -> Self {
        Self {
            base: WidgetBase::new(),
            value: value.clamp(0.0, 1.0),
            highlighted_range: (0.0, 0.0),
            highlight_color: None,
            callback: None,
            final_callback: None,
        }
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut EventContext<'_>, f32) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Callback run once the pointer is released.
    pub fn with_final_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut EventContext<'_>, f32) + 'static,
    {
        self.final_callback = Some(Box::new(callback));
        self
    }

    pub fn with_highlighted_range(mut self, start: f32, end: f32) -> Self {
        self.highlighted_range = (start, end);
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value.clamp(0.0, 1.0);
        self.base.update();
    }

    pub fn highlighted_range(&self) -> (f32, f32) {
        self.highlighted_range
    }

    pub fn set_highlighted_range(&mut self, start: f32, end: f32) {
        self.highlighted_range = (start, end);
        self.base.update();
    }

    /// Override the theme's highlight colour.
    pub fn set_highlight_color(&mut self, color: Option<Color>) {
        self.highlight_color = color;
        self.base.update();
    }

    fn track(&mut self, ctx: &mut EventContext<'_>, local_pos: Point) {
        let width = self.base.width();
        self.value = if width > 0.0 {
            (local_pos.x / width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.base.update();
        run(&mut self.callback, ctx, self.value);
    }
}

fn run(slot: &mut Option<ValueCallback>, ctx: &mut EventContext<'_>, value: f32) {
    if let Some(mut callback) = slot.take() {
        callback(ctx, value);
        if slot.is_none() {
            *slot = Some(callback);
        }
    }
}

impl Widget for Slider {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn preferred_size(&self, _ctx: &MeasureContext<'_>) -> Size {
        Size::new(70.0, 12.0)
    }

    fn event(&mut self, ctx: &mut EventContext<'_>, event: &WidgetEvent) -> bool {
        if !self.base.is_enabled() {
            return false;
        }
        match event {
            WidgetEvent::MousePress(e) => {
                self.track(ctx, e.local_pos);
                true
            }
            WidgetEvent::MouseDrag(e) => {
                self.track(ctx, e.local_pos);
                true
            }
            WidgetEvent::MouseRelease(e) => {
                self.track(ctx, e.local_pos);
                run(&mut self.final_callback, ctx, self.value);
                true
            }
            _ => false,
        }
    }

    fn paint(&mut self, ctx: &mut PaintContext<'_>) {
        let theme = ctx.theme();
        let (w, h) = (self.base.width(), self.base.height());
        let center_y = h * 0.5;

        let track = Color::from_gray(0, if self.base.is_enabled() { 128 } else { 210 });
        ctx.fill_rect(Rect::new(0.0, center_y - 2.0, w, 6.0), track);

        let (start, end) = self.highlighted_range;
        if start != end {
            let color = self.highlight_color.unwrap_or(theme.slider_highlight);
            ctx.fill_rect(Rect::new(start * w, center_y - 2.0, w * (end - start), 6.0), color);
        }

        let knob = Point::new(self.value * w, center_y);
        let outer = h;
        let inner = h * 0.5;
        ctx.fill_rect(
            Rect::new(knob.x - outer * 0.5, knob.y - outer * 0.5, outer, outer),
            theme.slider_knob_outer,
        );
        ctx.fill_rect(
            Rect::new(knob.x - inner * 0.5, knob.y - inner * 0.5, inner, inner),
            theme.slider_knob_inner,
        );
    }
}

impl std::fmt::Debug for Slider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slider")
            .field("value", &self.value)
            .field("highlighted_range", &self.highlighted_range)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_clamped() {
        let mut slider = Slider::new(3.0);
        assert_eq!(slider.value(), 1.0);
        slider.set_value(-0.5);
        assert_eq!(slider.value(), 0.0);
    }
}
