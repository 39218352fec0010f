//! Paint context and clipping.
//!
//! Widgets paint in local coordinates. [`PaintContext`] translates to absolute
//! pixels and clips every rectangle, line and blit against the current clip
//! before it reaches the [`Renderer`], which is not assumed to clip.

use espalier_core::ObjectId;
use espalier_render::{Bitmap, Color, Point, RasterCache, Rect, Renderer, TextMeasurer};

use crate::theme::Theme;

/// Key of a background-rasterized bitmap: owning widget plus a visual-state
/// fingerprint.
pub type RasterKey = (ObjectId, u8);

/// Context provided during widget painting.
pub struct PaintContext<'a> {
    renderer: &'a mut dyn Renderer,
    theme: &'a Theme,
    measurer: &'a dyn TextMeasurer,
    raster: Option<&'a mut RasterCache<RasterKey>>,
    id: ObjectId,
    /// Absolute position of the widget.
    origin: Point,
    /// Absolute clip rectangle.
    clip: Rect,
}

impl<'a> PaintContext<'a> {
    pub(crate) fn new(
        renderer: &'a mut dyn Renderer,
        theme: &'a Theme,
        measurer: &'a dyn TextMeasurer,
        raster: Option<&'a mut RasterCache<RasterKey>>,
        id: ObjectId,
        origin: Point,
        clip: Rect,
    ) -> Self {
        Self {
            renderer,
            theme,
            measurer,
            raster,
            id,
            origin,
            clip,
        }
    }

    /// The widget being painted.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn theme(&self) -> &'a Theme {
        self.theme
    }

    pub fn measurer(&self) -> &'a dyn TextMeasurer {
        self.measurer
    }

    /// Absolute position of the widget.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Current clip rectangle in absolute coordinates.
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Background rasterizer, when the screen runs one.
    pub fn raster_cache(&mut self) -> Option<&mut RasterCache<RasterKey>> {
        self.raster.as_deref_mut()
    }

    // =========================================================================
    // Clipping
    // =========================================================================

    /// Narrow the clip to `local` (intersected with the current clip) and
    /// return the previous clip for [`restore_clip`](Self::restore_clip).
    pub fn push_clip(&mut self, local: Rect) -> Rect {
        let previous = self.clip;
        let absolute = local.offset(self.origin.x, self.origin.y);
        self.clip = self.clip.intersect(&absolute).unwrap_or(Rect::ZERO);
        previous
    }

    pub fn restore_clip(&mut self, previous: Rect) {
        self.clip = previous;
    }

    fn to_absolute(&self, local: Rect) -> Rect {
        local.offset(self.origin.x, self.origin.y)
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    pub fn fill_rect(&mut self, local: Rect, color: Color) {
        if let Some(visible) = self.to_absolute(local).intersect(&self.clip) {
            self.renderer.fill_rect(visible, color);
        }
    }

    /// Outline a rectangle. When it sticks out of the clip, the visible parts
    /// of its edges are drawn as lines instead.
    pub fn stroke_rect(&mut self, local: Rect, width: f32, color: Color) {
        let absolute = self.to_absolute(local);
        if self.clip.intersect(&absolute) == Some(absolute) {
            self.renderer.stroke_rect(absolute, width, color);
            return;
        }
        let (l, t, r, b) = (local.left(), local.top(), local.right(), local.bottom());
        self.draw_line(Point::new(l, t), Point::new(r, t), width, color);
        self.draw_line(Point::new(r, t), Point::new(r, b), width, color);
        self.draw_line(Point::new(r, b), Point::new(l, b), width, color);
        self.draw_line(Point::new(l, b), Point::new(l, t), width, color);
    }

    pub fn draw_line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        if let Some((a, b)) = self.clip.clip_line(from + self.origin, to + self.origin) {
            self.renderer.draw_line(a, b, width, color);
        }
    }

    /// Draw `bitmap` with its top-left corner at `local`.
    pub fn blit(&mut self, bitmap: &Bitmap, local: Point) {
        if bitmap.is_empty() {
            return;
        }
        let dest = Rect::from_origin_size(local + self.origin, bitmap.size());
        let Some(visible) = dest.intersect(&self.clip) else {
            return;
        };
        let source = Rect::from_origin_size(visible.origin - dest.origin, visible.size);
        self.renderer.blit(bitmap, source, visible.origin);
    }

    /// Rasterize a string through the renderer's font backend.
    pub fn rasterize_text(&mut self, font: &str, size: f32, text: &str, color: Color) -> Bitmap {
        self.renderer.rasterize_text(font, size, text, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use espalier_render::{DrawCommand, MonospaceMeasurer, RecordingRenderer};

    fn ctx<'a>(renderer: &'a mut RecordingRenderer, theme: &'a Theme, measurer: &'a MonospaceMeasurer) -> PaintContext<'a> {
        PaintContext::new(
            renderer,
            theme,
            measurer,
            None,
            ObjectId::default(),
            Point::new(10.0, 10.0),
            Rect::new(0.0, 0.0, 50.0, 50.0),
        )
    }

    #[test]
    fn test_fill_is_translated_and_clipped() {
        let mut renderer = RecordingRenderer::new();
        let theme = Theme::default();
        let measurer = MonospaceMeasurer::default();
        let mut paint = ctx(&mut renderer, &theme, &measurer);
        paint.fill_rect(Rect::new(30.0, 0.0, 20.0, 10.0), Color::WHITE);
        paint.fill_rect(Rect::new(60.0, 0.0, 5.0, 5.0), Color::WHITE);
        drop(paint);
        assert_eq!(
            renderer.commands(),
            &[DrawCommand::FillRect {
                rect: Rect::new(40.0, 10.0, 10.0, 10.0),
                color: Color::WHITE,
            }]
        );
    }

    #[test]
    fn test_stroke_falls_back_to_lines() {
        let mut renderer = RecordingRenderer::new();
        let theme = Theme::default();
        let measurer = MonospaceMeasurer::default();
        let mut paint = ctx(&mut renderer, &theme, &measurer);
        paint.stroke_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, Color::BLACK);
        paint.stroke_rect(Rect::new(30.0, 30.0, 20.0, 20.0), 1.0, Color::BLACK);
        drop(paint);
        let commands = renderer.commands();
        assert!(matches!(commands[0], DrawCommand::StrokeRect { .. }));
        assert!(commands[1..].iter().all(|c| matches!(c, DrawCommand::Line { .. })));
    }

    #[test]
    fn test_blit_crops_source() {
        let mut renderer = RecordingRenderer::new();
        let theme = Theme::default();
        let measurer = MonospaceMeasurer::default();
        let mut paint = ctx(&mut renderer, &theme, &measurer);
        let bitmap = Bitmap::filled(20, 10, Color::WHITE).unwrap();
        paint.blit(&bitmap, Point::new(30.0, 0.0));
        drop(paint);
        assert_eq!(
            renderer.commands(),
            &[DrawCommand::Blit {
                bitmap_size: (20, 10),
                source: Rect::new(0.0, 0.0, 10.0, 10.0),
                dest: Point::new(40.0, 10.0),
            }]
        );
    }

    #[test]
    fn test_push_clip() {
        let mut renderer = RecordingRenderer::new();
        let theme = Theme::default();
        let measurer = MonospaceMeasurer::default();
        let mut paint = ctx(&mut renderer, &theme, &measurer);
        let previous = paint.push_clip(Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(paint.clip(), Rect::new(10.0, 10.0, 5.0, 5.0));
        paint.restore_clip(previous);
        assert_eq!(paint.clip(), Rect::new(0.0, 0.0, 50.0, 50.0));
    }
}
