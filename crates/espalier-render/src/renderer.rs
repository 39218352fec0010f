//! The renderer contract and a headless recording implementation.
//!
//! The [`Renderer`] trait is the only way widgets put pixels on screen. All
//! coordinates are absolute. Implementations are not required to clip; callers
//! clip against their own clip rectangle before issuing commands.

use std::collections::HashMap;

use crate::bitmap::Bitmap;
use crate::text::{MonospaceMeasurer, TextMeasurer};
use crate::types::{Color, Point, Rect};

/// Backend that draws primitives and rasterizes text.
pub trait Renderer {
    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Stroke a rectangle outline.
    fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color);

    /// Draw a straight line.
    fn draw_line(&mut self, from: Point, to: Point, width: f32, color: Color);

    /// Draw the `source` region of `bitmap` with its top-left corner at `dest`.
    fn blit(&mut self, bitmap: &Bitmap, source: Rect, dest: Point);

    /// Rasterize `text` into a new bitmap.
    fn rasterize_text(&mut self, font: &str, size: f32, text: &str, color: Color) -> Bitmap;
}

/// A single recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        width: f32,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Color,
    },
    Blit {
        /// Dimensions of the whole bitmap.
        bitmap_size: (u32, u32),
        source: Rect,
        dest: Point,
    },
}

/// A renderer that records every call instead of drawing.
///
/// Text bitmaps are sized with a [`MonospaceMeasurer`] and filled with the
/// requested colour. The renderer counts how often each string was rasterized,
/// which makes render-cache behaviour observable.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
    rasterized: HashMap<String, usize>,
    rasterize_total: usize,
    measurer: MonospaceMeasurer,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific measurer for text bitmap sizes.
    pub fn with_measurer(measurer: MonospaceMeasurer) -> Self {
        Self {
            measurer,
            ..Self::default()
        }
    }

    /// Recorded commands in submission order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget all recorded commands, keeping rasterization counts.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// How often `text` has been rasterized.
    pub fn rasterize_count(&self, text: &str) -> usize {
        self.rasterized.get(text).copied().unwrap_or(0)
    }

    /// Total number of rasterizations.
    pub fn rasterize_total(&self) -> usize {
        self.rasterize_total
    }

    /// Recorded filled rectangles.
    pub fn filled_rects(&self) -> impl Iterator<Item = (&Rect, &Color)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::FillRect { rect, color } => Some((rect, color)),
            _ => None,
        })
    }

    /// Number of recorded blits.
    pub fn blit_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Blit { .. }))
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color) {
        self.commands
            .push(DrawCommand::StrokeRect { rect, width, color });
    }

    fn draw_line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn blit(&mut self, bitmap: &Bitmap, source: Rect, dest: Point) {
        self.commands.push(DrawCommand::Blit {
            bitmap_size: (bitmap.width(), bitmap.height()),
            source,
            dest,
        });
    }

    fn rasterize_text(&mut self, font: &str, size: f32, text: &str, color: Color) -> Bitmap {
        *self.rasterized.entry(text.to_string()).or_default() += 1;
        self.rasterize_total += 1;
        let bounds = self.measurer.bounds(font, size, text);
        Bitmap::filled(bounds.width.ceil() as u32, bounds.height.ceil() as u32, color)
            .unwrap_or_else(|_| Bitmap::empty())
    }
}
