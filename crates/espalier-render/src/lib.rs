//! Rendering contracts for Espalier.
//!
//! Espalier does not own a rasterizer. This crate defines the narrow seams the
//! widget toolkit talks through, plus the pieces that sit on our side of them:
//!
//! - [`Point`], [`Size`], [`Rect`] and [`Color`] geometry and colour types
//! - [`TextMeasurer`], which measures strings in a named font and size
//! - [`Renderer`], which draws rectangles, lines and bitmaps in absolute pixels
//! - [`CachedBitmap`], the dirty-flag cache every text-painting control uses
//! - [`RasterCache`], a single-flight background rasterizer
//!
//! [`RecordingRenderer`] and [`MonospaceMeasurer`] are deterministic headless
//! implementations for tests and tooling.
//!
//! # Example
//!
//! ```
//! use espalier_render::{CachedBitmap, Color, RecordingRenderer, Renderer, text::FONT_SANS};
//!
//! let mut renderer = RecordingRenderer::new();
//! let mut caption = CachedBitmap::new();
//!
//! for _ in 0..3 {
//!     let bitmap = caption.get_or_rebuild(|| {
//!         renderer.rasterize_text(FONT_SANS, 20.0, "OK", Color::WHITE)
//!     });
//!     assert_eq!(bitmap.width(), 20);
//! }
//! assert_eq!(renderer.rasterize_count("OK"), 1);
//! ```

pub mod bitmap;
mod error;
pub mod raster_cache;
pub mod renderer;
pub mod text;
mod types;

pub use bitmap::{Bitmap, CachedBitmap};
pub use error::{RenderError, RenderResult};
pub use raster_cache::{RasterCache, RasterStats};
pub use renderer::{DrawCommand, RecordingRenderer, Renderer};
pub use text::{MonospaceMeasurer, TextMeasurer};
pub use types::{Color, Point, Rect, Size};
