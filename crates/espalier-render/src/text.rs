//! Text measurement contract.
//!
//! Widgets never shape text themselves. They ask a [`TextMeasurer`] how wide a
//! string is in a given font and size, and hand rasterization to the
//! [`Renderer`](crate::Renderer).

use unicode_segmentation::UnicodeSegmentation;

use crate::types::Size;

/// Font used for regular captions.
pub const FONT_SANS: &str = "sans";
/// Font used for bold captions such as window titles.
pub const FONT_SANS_BOLD: &str = "sans-bold";
/// Icon font used for button and check box glyphs.
pub const FONT_ICONS: &str = "icons";

/// Measures UTF-8 strings in a named font and pixel size.
///
/// Implementations must be deterministic: measuring the same string twice with
/// the same font and size must return the same result. Cursor placement in the
/// text box relies on this.
pub trait TextMeasurer {
    /// Advance width of `text` in pixels.
    fn width(&self, font: &str, size: f32, text: &str) -> f32;

    /// Bounding box of `text` in pixels.
    fn bounds(&self, font: &str, size: f32, text: &str) -> Size {
        Size::new(self.width(font, size, text), size)
    }
}

/// A deterministic measurer that gives every grapheme cluster the same advance.
///
/// Useful for headless hosts and for tests where exact pixel positions matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Advance of one grapheme as a fraction of the font size.
    pub advance_ratio: f32,
}

impl MonospaceMeasurer {
    /// Create a measurer with the given advance ratio.
    pub fn new(advance_ratio: f32) -> Self {
        Self { advance_ratio }
    }

    /// Advance of a single grapheme at `size`.
    pub fn advance(&self, size: f32) -> f32 {
        size * self.advance_ratio
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn width(&self, _font: &str, size: f32, text: &str) -> f32 {
        text.graphemes(true).count() as f32 * self.advance(size)
    }
}
