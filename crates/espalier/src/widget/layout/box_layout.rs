//! Box layout: children stacked along one axis.

use espalier_render::{Point, Size};

use super::{
    Alignment, Layout, LayoutTarget, Orientation, container_size, from_array, target_size,
    to_array,
};
use crate::widget::context::{LayoutContext, MeasureContext};

/// Places visible children one after another along an axis.
///
/// The container's preferred size is the sum of the children along the main
/// axis, plus spacing between them and a margin around them. On the cross axis
/// it is the largest child plus both margins.
///
/// In a titled window a vertical box starts below the header; a horizontal
/// box is shifted down by the header height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxLayout {
    orientation: Orientation,
    alignment: Alignment,
    margin: f32,
    spacing: f32,
}

impl BoxLayout {
    /// Centered, no margin, no spacing.
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            alignment: Alignment::Center,
            margin: 0.0,
            spacing: 0.0,
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }
}

impl Layout for BoxLayout {
    fn preferred_size(&self, ctx: &MeasureContext<'_>, target: &LayoutTarget<'_>) -> Size {
        let axis1 = self.orientation.axis();
        let axis2 = (axis1 + 1) % 2;
        let mut size = [2.0 * self.margin, 2.0 * self.margin];

        let mut y_offset = 0.0;
        if target.header_height > 0.0 {
            match self.orientation {
                Orientation::Vertical => size[1] += target.header_height - self.margin / 2.0,
                Orientation::Horizontal => y_offset = target.header_height,
            }
        }

        let mut first = true;
        for &child in target.children {
            let Some(base) = ctx.base_of(child) else {
                continue;
            };
            if !base.is_visible() {
                continue;
            }
            if !first {
                size[axis1] += self.spacing;
            }
            first = false;

            let t = target_size(ctx.preferred_size_of(child), base.fixed_size());
            size[axis1] += t[axis1];
            size[axis2] = size[axis2].max(t[axis2] + 2.0 * self.margin);
        }

        Size::new(size[0], size[1] + y_offset)
    }

    fn perform_layout(&self, ctx: &mut LayoutContext<'_>, target: &LayoutTarget<'_>) {
        let axis1 = self.orientation.axis();
        let axis2 = (axis1 + 1) % 2;
        let container = container_size(target.base);

        let mut position = self.margin;
        let mut y_offset = 0.0;
        if target.header_height > 0.0 {
            match self.orientation {
                Orientation::Vertical => position += target.header_height - self.margin / 2.0,
                Orientation::Horizontal => y_offset = target.header_height,
            }
        }

        let mut first = true;
        for &child in target.children {
            let Some(fixed) = ctx
                .base_of(child)
                .filter(|base| base.is_visible())
                .map(|base| base.fixed_size())
            else {
                continue;
            };
            if !first {
                position += self.spacing;
            }
            first = false;

            let fixed_arr = to_array(fixed);
            let mut t = target_size(ctx.preferred_size_of(child), fixed);
            let mut pos = [0.0, y_offset];
            pos[axis1] = position;

            match self.alignment {
                Alignment::Start => pos[axis2] += self.margin,
                Alignment::Center => pos[axis2] += (container[axis2] - t[axis2]) / 2.0,
                Alignment::End => pos[axis2] += container[axis2] - t[axis2] - self.margin * 2.0,
                Alignment::Stretch => {
                    pos[axis2] += self.margin;
                    t[axis2] = if fixed_arr[axis2] > 0.0 {
                        fixed_arr[axis2]
                    } else {
                        container[axis2] - self.margin * 2.0
                    };
                }
            }

            if let Some(base) = ctx.base_mut(child) {
                base.set_pos(Point::new(pos[0], pos[1]));
                base.set_size(from_array(t));
            }
            ctx.layout_child(child);
            position += t[axis1];
        }
    }
}
