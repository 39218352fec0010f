//! Layout management.
//!
//! A [`Layout`] is a stateless strategy a container delegates to. It computes
//! the container's preferred size and places the container's children. Two
//! strategies ship with the toolkit:
//!
//! - [`BoxLayout`]: children in a row or a column with fixed spacing
//! - [`GridLayout`]: children on a grid whose columns and rows size to their
//!   largest member
//!
//! A container without a layout gives every child its fixed-or-preferred size
//! and leaves positions alone.
//!
//! # Example
//!
//! ```
//! use espalier::widget::layout::{Alignment, BoxLayout, Orientation};
//!
//! let column = BoxLayout::new(Orientation::Vertical)
//!     .with_alignment(Alignment::Stretch)
//!     .with_margin(10.0)
//!     .with_spacing(6.0);
//! assert_eq!(column.spacing(), 6.0);
//! ```

mod box_layout;
mod grid_layout;

pub use box_layout::BoxLayout;
pub use grid_layout::GridLayout;

use espalier_core::ObjectId;
use espalier_render::Size;

use super::base::WidgetBase;
use super::context::{LayoutContext, MeasureContext};

/// Direction children are stacked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Index of the main axis (0 = x, 1 = y).
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }
}

/// Placement of a child on the cross axis (box) or within its cell (grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    Start,
    #[default]
    Center,
    End,
    /// Take all available space unless the child has a fixed size.
    Stretch,
}

/// The container a layout works on.
#[derive(Debug, Clone, Copy)]
pub struct LayoutTarget<'a> {
    pub base: &'a WidgetBase,
    /// Children taking part in the layout, bottom to top.
    pub children: &'a [ObjectId],
    /// Title bar height to keep clear, zero for untitled containers.
    pub header_height: f32,
}

/// Strategy for sizing a container and placing its children.
pub trait Layout {
    fn preferred_size(&self, ctx: &MeasureContext<'_>, target: &LayoutTarget<'_>) -> Size;

    /// Place the children and lay each of them out in turn.
    fn perform_layout(&self, ctx: &mut LayoutContext<'_>, target: &LayoutTarget<'_>);
}

// =========================================================================
// Helpers
// =========================================================================

#[inline]
pub(crate) fn to_array(size: Size) -> [f32; 2] {
    [size.width, size.height]
}

#[inline]
pub(crate) fn from_array(values: [f32; 2]) -> Size {
    Size::new(values[0], values[1])
}

/// Fixed size where set, preferred size elsewhere.
#[inline]
pub(crate) fn target_size(preferred: Size, fixed: Size) -> [f32; 2] {
    [
        if fixed.width > 0.0 { fixed.width } else { preferred.width },
        if fixed.height > 0.0 { fixed.height } else { preferred.height },
    ]
}

/// Size the container works with: fixed where set, current elsewhere.
#[inline]
pub(crate) fn container_size(base: &WidgetBase) -> [f32; 2] {
    target_size(base.size(), base.fixed_size())
}

/// Default sizing: delegate to the layout, or keep the current size.
pub fn preferred_size_with(
    base: &WidgetBase,
    ctx: &MeasureContext<'_>,
    children: &[ObjectId],
    header_height: f32,
) -> Size {
    match base.layout() {
        Some(layout) => layout.preferred_size(
            ctx,
            &LayoutTarget {
                base,
                children,
                header_height,
            },
        ),
        None => base.size(),
    }
}

/// Default layout: delegate to the layout, or size every child to its
/// fixed-or-preferred size and recurse.
pub fn perform_layout_with(
    base: &WidgetBase,
    ctx: &mut LayoutContext<'_>,
    children: &[ObjectId],
    header_height: f32,
) {
    if let Some(layout) = base.layout() {
        layout.perform_layout(
            ctx,
            &LayoutTarget {
                base,
                children,
                header_height,
            },
        );
        return;
    }

    for &child in children {
        let preferred = ctx.preferred_size_of(child);
        let Some(fixed) = ctx.base_of(child).map(WidgetBase::fixed_size) else {
            continue;
        };
        if let Some(child_base) = ctx.base_mut(child) {
            child_base.set_size(from_array(target_size(preferred, fixed)));
        }
        ctx.layout_child(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_size() {
        let t = target_size(Size::new(30.0, 20.0), Size::new(0.0, 12.0));
        assert_eq!(t, [30.0, 12.0]);
    }

    #[test]
    fn test_orientation_axis() {
        assert_eq!(Orientation::Horizontal.axis(), 0);
        assert_eq!(Orientation::Vertical.axis(), 1);
    }
}
