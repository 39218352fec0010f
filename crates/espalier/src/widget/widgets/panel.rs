//! Plain container widget.

use espalier_render::Color;

use crate::widget::{Layout, PaintContext, Widget, WidgetBase};

/// A container with no behaviour of its own.
///
/// Panels group children under a layout. The screen root is a panel, and so
/// is a window's button panel. A panel paints nothing unless it has a
/// background colour.
#[derive(Debug, Default)]
pub struct Panel {
    base: WidgetBase,
    background: Option<Color>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout used to place the panel's children.
    pub fn with_layout(mut self, layout: impl Layout + 'static) -> Self {
        self.base.set_layout(Box::new(layout));
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_background(&mut self, color: Option<Color>) {
        if self.background != color {
            self.background = color;
            self.base.update();
        }
    }
}

impl Widget for Panel {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn paint(&mut self, ctx: &mut PaintContext<'_>) {
        if let Some(color) = self.background.filter(|c| c.a > 0.0) {
            ctx.fill_rect(self.base.rect(), color);
        }
    }
}
