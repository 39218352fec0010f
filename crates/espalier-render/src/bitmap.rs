//! CPU-side bitmaps and the dirty-flag cache that widgets keep them in.
//!
//! Every control that paints text or icons keeps its rasterized output in a
//! [`CachedBitmap`]. Setters that change the source (caption, colour, icon,
//! pushed state) call [`CachedBitmap::mark_dirty`]; the paint pass calls
//! [`CachedBitmap::get_or_rebuild`], which rebuilds only when dirty.

use std::sync::Arc;

use crate::error::{RenderError, RenderResult};
use crate::types::{Color, Size};

/// Largest accepted bitmap edge in pixels.
pub const MAX_BITMAP_DIMENSION: u32 = 16384;

/// An RGBA8 bitmap with straight alpha, rows top to bottom.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Bitmap {
    /// Create a transparent bitmap.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Create a bitmap filled with one colour.
    pub fn filled(width: u32, height: u32, color: Color) -> RenderResult<Self> {
        if width > MAX_BITMAP_DIMENSION || height > MAX_BITMAP_DIMENSION {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![color.to_rgba8(); (width * height) as usize],
        })
    }

    /// An empty 0x0 bitmap.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size in pixels as floats.
    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Check whether the bitmap has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Set the pixel at `(x, y)`. Out-of-range writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let index = (y * self.width + x) as usize;
            self.pixels[index] = rgba;
        }
    }

    /// Fill row `y` with one colour.
    pub fn fill_row(&mut self, y: u32, color: Color) {
        if y >= self.height {
            return;
        }
        let start = (y * self.width) as usize;
        let end = start + self.width as usize;
        self.pixels[start..end].fill(color.to_rgba8());
    }

    /// Raw pixel bytes, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// A lazily rebuilt bitmap plus its dirty flag.
///
/// A freshly created cache is dirty. After [`get_or_rebuild`](Self::get_or_rebuild)
/// the flag stays clear until the next [`mark_dirty`](Self::mark_dirty); a dirty
/// bitmap is never handed out.
#[derive(Debug, Clone)]
pub struct CachedBitmap {
    dirty: bool,
    bitmap: Option<Arc<Bitmap>>,
}

impl CachedBitmap {
    pub fn new() -> Self {
        Self {
            dirty: true,
            bitmap: None,
        }
    }

    /// Invalidate the cached bitmap.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The cached bitmap if it is current.
    pub fn current(&self) -> Option<&Arc<Bitmap>> {
        if self.dirty {
            None
        } else {
            self.bitmap.as_ref()
        }
    }

    /// Return the cached bitmap, rebuilding it first if dirty.
    pub fn get_or_rebuild<F>(&mut self, rebuild: F) -> Arc<Bitmap>
    where
        F: FnOnce() -> Bitmap,
    {
        match &self.bitmap {
            Some(bitmap) if !self.dirty => bitmap.clone(),
            _ => {
                let bitmap = Arc::new(rebuild());
                self.bitmap = Some(bitmap.clone());
                self.dirty = false;
                bitmap
            }
        }
    }
}

impl Default for CachedBitmap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_filled_and_bytes() {
        let bitmap = Bitmap::filled(2, 1, Color::from_rgba8(1, 2, 3, 4)).unwrap();
        assert_eq!(bitmap.as_bytes(), &[1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(bitmap.pixel(1, 0), Some([1, 2, 3, 4]));
        assert_eq!(bitmap.pixel(2, 0), None);
    }

    #[test]
    fn test_bitmap_dimension_limit() {
        assert!(matches!(
            Bitmap::new(MAX_BITMAP_DIMENSION + 1, 1),
            Err(RenderError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_cached_bitmap_rebuilds_only_when_dirty() {
        let mut cache = CachedBitmap::new();
        assert!(cache.is_dirty());
        assert!(cache.current().is_none());

        let mut builds = 0;
        let first = cache.get_or_rebuild(|| {
            builds += 1;
            Bitmap::empty()
        });
        assert!(!cache.is_dirty());
        let second = cache.get_or_rebuild(|| {
            builds += 1;
            Bitmap::empty()
        });
        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&first, &second));

        cache.mark_dirty();
        assert!(cache.current().is_none());
        cache.get_or_rebuild(|| {
            builds += 1;
            Bitmap::empty()
        });
        assert_eq!(builds, 2);
    }
}
