//! Grid layout: children on a table of columns and rows.

use espalier_core::ObjectId;
use espalier_render::{Point, Size};

use super::{
    Alignment, Layout, LayoutTarget, Orientation, container_size, from_array, target_size,
    to_array,
};
use crate::widget::context::{LayoutContext, MeasureContext};

/// Places visible children on a grid.
///
/// With `Orientation::Horizontal` and a resolution of `n`, children fill rows
/// of `n` columns from left to right, top to bottom; a vertical grid fills
/// columns of `n` rows instead. Each column is as wide as its widest member
/// and each row as tall as its tallest one. Space left in the container is
/// spread evenly over columns and rows.
///
/// # Example
///
/// ```
/// use espalier::widget::layout::{Alignment, GridLayout, Orientation};
///
/// let form = GridLayout::new(Orientation::Horizontal, 2)
///     .with_spacing(0, 10.0)
///     .with_column_alignment(vec![Alignment::End, Alignment::Stretch]);
/// assert_eq!(form.alignment(0, 0), Alignment::End);
/// assert_eq!(form.alignment(0, 5), Alignment::Center);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    orientation: Orientation,
    resolution: usize,
    spacing: [f32; 2],
    margin: f32,
    default_alignment: [Alignment; 2],
    /// Per-column (`[0]`) and per-row (`[1]`) overrides.
    alignment: [Vec<Alignment>; 2],
}

impl GridLayout {
    /// Centered cells, no margin, no spacing. A resolution of zero is
    /// treated as one.
    pub fn new(orientation: Orientation, resolution: usize) -> Self {
        Self {
            orientation,
            resolution: resolution.max(1),
            spacing: [0.0, 0.0],
            margin: 0.0,
            default_alignment: [Alignment::Center, Alignment::Center],
            alignment: [Vec::new(), Vec::new()],
        }
    }

    /// Spacing between columns (`axis` 0) or rows (`axis` 1).
    pub fn with_spacing(mut self, axis: usize, spacing: f32) -> Self {
        self.spacing[axis.min(1)] = spacing;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Alignment for every column (`axis` 0) or row (`axis` 1) without an override.
    pub fn with_default_alignment(mut self, axis: usize, alignment: Alignment) -> Self {
        self.default_alignment[axis.min(1)] = alignment;
        self
    }

    pub fn with_column_alignment(mut self, alignment: Vec<Alignment>) -> Self {
        self.alignment[0] = alignment;
        self
    }

    pub fn with_row_alignment(mut self, alignment: Vec<Alignment>) -> Self {
        self.alignment[1] = alignment;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn spacing(&self, axis: usize) -> f32 {
        self.spacing[axis.min(1)]
    }

    /// Alignment of cell `item` along `axis`.
    pub fn alignment(&self, axis: usize, item: usize) -> Alignment {
        let axis = axis.min(1);
        self.alignment[axis]
            .get(item)
            .copied()
            .unwrap_or(self.default_alignment[axis])
    }

    /// Column widths and row heights.
    fn compute_grid(&self, ctx: &MeasureContext<'_>, children: &[ObjectId]) -> [Vec<f32>; 2] {
        let axis1 = self.orientation.axis();
        let axis2 = (axis1 + 1) % 2;

        let visible: Vec<(ObjectId, Size)> = children
            .iter()
            .filter_map(|&child| {
                let base = ctx.base_of(child)?;
                base.is_visible().then(|| (child, base.fixed_size()))
            })
            .collect();

        let mut dim = [0usize; 2];
        dim[axis1] = self.resolution;
        dim[axis2] = visible.len().div_ceil(self.resolution);

        let mut grid = [vec![0.0f32; dim[0]], vec![0.0f32; dim[1]]];
        for (index, &(child, fixed)) in visible.iter().enumerate() {
            let i1 = index % self.resolution;
            let i2 = index / self.resolution;
            let t = target_size(ctx.preferred_size_of(child), fixed);
            grid[axis1][i1] = grid[axis1][i1].max(t[axis1]);
            grid[axis2][i2] = grid[axis2][i2].max(t[axis2]);
        }
        grid
    }

    fn header_extra(&self, header_height: f32) -> f32 {
        if header_height > 0.0 {
            header_height - self.margin / 2.0
        } else {
            0.0
        }
    }
}

impl Layout for GridLayout {
    fn preferred_size(&self, ctx: &MeasureContext<'_>, target: &LayoutTarget<'_>) -> Size {
        let grid = self.compute_grid(ctx, target.children);
        let mut size = [0.0f32; 2];
        for axis in 0..2 {
            let gaps = grid[axis].len().saturating_sub(1) as f32;
            size[axis] = 2.0 * self.margin + grid[axis].iter().sum::<f32>() + gaps * self.spacing[axis];
        }
        size[1] += self.header_extra(target.header_height);
        from_array(size)
    }

    fn perform_layout(&self, ctx: &mut LayoutContext<'_>, target: &LayoutTarget<'_>) {
        let container = container_size(target.base);
        let mut grid = self.compute_grid(&ctx.measure(), target.children);
        let dim = [grid[0].len(), grid[1].len()];
        let extra = [0.0, self.header_extra(target.header_height)];

        // Spread leftover space evenly.
        for axis in 0..2 {
            if dim[axis] == 0 {
                continue;
            }
            let mut grid_size = 2.0 * self.margin + extra[axis];
            for (i, s) in grid[axis].iter().enumerate() {
                grid_size += s;
                if i + 1 < dim[axis] {
                    grid_size += self.spacing[axis];
                }
            }
            if grid_size < container[axis] {
                let share = (container[axis] - grid_size) / dim[axis] as f32;
                for s in &mut grid[axis] {
                    *s += share;
                }
            }
        }

        let axis1 = self.orientation.axis();
        let axis2 = (axis1 + 1) % 2;
        let start = [self.margin + extra[0], self.margin + extra[1]];
        let mut pos = start;

        let visible: Vec<ObjectId> = target
            .children
            .iter()
            .copied()
            .filter(|&child| ctx.base_of(child).is_some_and(|base| base.is_visible()))
            .collect();
        let mut cells = visible.into_iter();

        for i2 in 0..dim[axis2] {
            pos[axis1] = start[axis1];
            for i1 in 0..dim[axis1] {
                let Some(child) = cells.next() else {
                    return;
                };
                let fixed = ctx
                    .base_of(child)
                    .map(|base| base.fixed_size())
                    .unwrap_or(Size::ZERO);
                let fixed_arr = to_array(fixed);
                let mut t = target_size(ctx.preferred_size_of(child), fixed);
                let mut item_pos = pos;

                for j in 0..2 {
                    let axis = (axis1 + j) % 2;
                    let item = if j == 0 { i1 } else { i2 };
                    let cell = grid[axis][item];
                    match self.alignment(axis, item) {
                        Alignment::Start => {}
                        Alignment::Center => item_pos[axis] += (cell - t[axis]) / 2.0,
                        Alignment::End => item_pos[axis] += cell - t[axis],
                        Alignment::Stretch => {
                            t[axis] = if fixed_arr[axis] > 0.0 { fixed_arr[axis] } else { cell };
                        }
                    }
                }

                if let Some(base) = ctx.base_mut(child) {
                    base.set_pos(Point::new(item_pos[0], item_pos[1]));
                    base.set_size(from_array(t));
                }
                ctx.layout_child(child);
                pos[axis1] += grid[axis1][i1] + self.spacing[axis1];
            }
            pos[axis2] += grid[axis2][i2] + self.spacing[axis2];
        }
    }
}
