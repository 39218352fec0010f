//! Core widget trait definitions.
//!
//! Every control implements [`Widget`]. The trait covers the capability set a
//! node in the tree has: sizing, layout, painting and event handling. All of
//! it has default behaviour, so a leaf control only overrides what it needs.

use std::any::Any;

use espalier_core::ObjectId;
use espalier_render::{Point, Size};

use crate::theme::Theme;

use super::base::WidgetBase;
use super::context::{EventContext, LayoutContext, MeasureContext};
use super::events::WidgetEvent;
use super::layout;
use super::painting::PaintContext;

/// The core trait for all widgets.
///
/// # Required Methods
///
/// - [`widget_base()`](Self::widget_base) / [`widget_base_mut()`](Self::widget_base_mut):
///   access to the embedded [`WidgetBase`]
///
/// # Event Handling
///
/// [`event()`](Self::event) receives one [`WidgetEvent`] at a time and returns
/// `true` if it consumed it. Pointer events are routed to children before
/// their parent, so a container only sees what its children left alone.
///
/// # Example
///
/// ```
/// use espalier::widget::{PaintContext, Widget, WidgetBase};
/// use espalier_render::{Color, Rect};
///
/// struct Swatch {
///     base: WidgetBase,
///     color: Color,
/// }
///
/// impl Widget for Swatch {
///     fn widget_base(&self) -> &WidgetBase { &self.base }
///     fn widget_base_mut(&mut self) -> &mut WidgetBase { &mut self.base }
///
///     fn paint(&mut self, ctx: &mut PaintContext<'_>) {
///         let rect = self.base.rect();
///         ctx.fill_rect(rect, self.color);
///     }
/// }
/// ```
pub trait Widget: Any {
    // =========================================================================
    // Required Methods
    // =========================================================================

    fn widget_base(&self) -> &WidgetBase;

    fn widget_base_mut(&mut self) -> &mut WidgetBase;

    // =========================================================================
    // Identity
    // =========================================================================

    /// Type name used in debug dumps and logs.
    fn type_name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Size the widget would like to have.
    ///
    /// With a layout, the layout decides. Without one, the current size is
    /// the preferred size.
    fn preferred_size(&self, ctx: &MeasureContext<'_>) -> Size {
        let children = self.layout_children(ctx.children());
        layout::preferred_size_with(
            self.widget_base(),
            ctx,
            &children,
            self.header_height(ctx.theme()),
        )
    }

    /// Position and size the children, then recurse into them.
    fn perform_layout(&mut self, ctx: &mut LayoutContext<'_>) {
        let children = self.layout_children(&ctx.children());
        let header = self.header_height(ctx.theme());
        layout::perform_layout_with(self.widget_base(), ctx, &children, header);
    }

    /// The children a layout manages. Containers with chrome children (a
    /// window's button panel) leave those out.
    fn layout_children(&self, children: &[ObjectId]) -> Vec<ObjectId> {
        children.to_vec()
    }

    /// Height reserved at the top for a title bar.
    fn header_height(&self, _theme: &Theme) -> f32 {
        0.0
    }

    // =========================================================================
    // Painting and Events
    // =========================================================================

    /// Draw the widget. Children are painted afterwards by the screen.
    fn paint(&mut self, _ctx: &mut PaintContext<'_>) {}

    /// Handle an event. Return `true` if it was consumed.
    fn event(&mut self, _ctx: &mut EventContext<'_>, _event: &WidgetEvent) -> bool {
        false
    }

    /// Whether a press at `local_pos` should give this widget focus.
    fn accepts_click_focus_at(&self, _local_pos: Point, _theme: &Theme) -> bool {
        true
    }
}

impl dyn Widget {
    /// Downcast to a concrete widget type.
    pub fn downcast_ref<W: Widget>(&self) -> Option<&W> {
        let any: &dyn Any = self;
        any.downcast_ref::<W>()
    }

    /// Downcast to a concrete widget type, mutably.
    pub fn downcast_mut<W: Widget>(&mut self) -> Option<&mut W> {
        let any: &mut dyn Any = self;
        any.downcast_mut::<W>()
    }

    /// Check the concrete type.
    pub fn is<W: Widget>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<W>()
    }
}
