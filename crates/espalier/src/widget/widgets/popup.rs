//! Popup anchored to a window.

use espalier_core::ObjectId;
use espalier_core::logging::targets;
use espalier_render::{Point, Rect};

use crate::widget::layout;
use crate::widget::{
    EventContext, EventDispatcher, LayoutContext, MouseButton, PaintContext, Widget, WidgetBase,
    WidgetEvent, WidgetTree, absolute_position,
};

/// A borderless container placed next to an anchor point of a window.
///
/// Popups are added to the screen root, not to the window they belong to, so
/// they are not clipped by it. Their position is recomputed from the parent
/// window before every paint.
pub struct Popup {
    base: WidgetBase,
    parent_window: Option<ObjectId>,
    anchor_pos: Point,
    anchor_height: f32,
}

impl Popup {
    pub fn new(parent_window: ObjectId) -> Self {
        let mut base = WidgetBase::new();
        base.set_visible(false);
        Self {
            base,
            parent_window: Some(parent_window),
            anchor_pos: Point::ZERO,
            anchor_height: 30.0,
        }
    }

    pub fn with_anchor(mut self, anchor_pos: Point) -> Self {
        self.anchor_pos = anchor_pos;
        self
    }

    pub fn with_anchor_height(mut self, height: f32) -> Self {
        self.anchor_height = height;
        self
    }

    pub fn with_layout(mut self, layout: impl layout::Layout + 'static) -> Self {
        self.base.set_layout(Box::new(layout));
        self
    }

    pub fn parent_window(&self) -> Option<ObjectId> {
        self.parent_window
    }

    pub fn set_parent_window(&mut self, window: Option<ObjectId>) {
        self.parent_window = window;
    }

    /// Anchor position relative to the parent window.
    pub fn anchor_pos(&self) -> Point {
        self.anchor_pos
    }

    pub fn set_anchor_pos(&mut self, anchor_pos: Point) {
        self.anchor_pos = anchor_pos;
    }

    /// Offset of the anchor below the popup's top edge.
    pub fn anchor_height(&self) -> f32 {
        self.anchor_height
    }

    pub fn set_anchor_height(&mut self, height: f32) {
        self.anchor_height = height;
    }
}

/// Hide `popup` if its window is hidden and move it next to its anchor.
///
/// Popups anchored to other popups are placed after them.
pub(crate) fn refresh_relative_placement(tree: &mut WidgetTree, popup: ObjectId) {
    refresh_at_depth(tree, popup, 0);
}

fn refresh_at_depth(tree: &mut WidgetTree, popup: ObjectId, depth: usize) {
    const MAX_CHAIN: usize = 16;

    let Some((window, anchor, anchor_height)) = tree
        .get(popup)
        .and_then(|w| w.downcast_ref::<Popup>())
        .map(|p| (p.parent_window, p.anchor_pos, p.anchor_height))
    else {
        return;
    };
    let Some(window) = window.filter(|&w| tree.contains(w)) else {
        if let Some(base) = tree.get_mut(popup).map(|w| w.widget_base_mut()) {
            base.set_visible(false);
        }
        return;
    };

    if depth < MAX_CHAIN && tree.get(window).is_some_and(|w| w.is::<Popup>()) {
        refresh_at_depth(tree, window, depth + 1);
    } else if depth >= MAX_CHAIN {
        tracing::warn!(target: targets::WIDGETS, ?popup, "popup anchor chain too deep");
    }

    let window_visible = EventDispatcher::is_visible_recursive(tree, window);
    let window_abs = absolute_position(tree, window);
    let parent_abs = match tree.parent(popup).ok().flatten() {
        Some(parent) => absolute_position(tree, parent),
        None => Some(Point::ZERO),
    };

    let Some(base) = tree.get_mut(popup).map(|w| w.widget_base_mut()) else {
        return;
    };
    if !window_visible && base.is_visible() {
        base.set_visible(false);
    }
    if let (Some(window_abs), Some(parent_abs)) = (window_abs, parent_abs) {
        base.set_pos(window_abs - parent_abs + anchor - Point::new(0.0, anchor_height));
    }
}

impl Widget for Popup {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    /// Without a layout, a single child fills the popup.
    fn perform_layout(&mut self, ctx: &mut LayoutContext<'_>) {
        let children = ctx.children();
        if self.base.layout().is_none() && children.len() == 1 {
            let child = children[0];
            let size = self.base.size();
            if let Some(base) = ctx.base_mut(child) {
                base.set_pos(Point::ZERO);
                base.set_size(size);
            }
            ctx.layout_child(child);
        } else {
            layout::perform_layout_with(&self.base, ctx, &children, 0.0);
        }
    }

    fn event(&mut self, _ctx: &mut EventContext<'_>, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::MousePress(e) => e.button == MouseButton::Left,
            WidgetEvent::MouseRelease(e) => e.button == MouseButton::Left,
            WidgetEvent::Scroll(_) => true,
            _ => false,
        }
    }

    fn paint(&mut self, ctx: &mut PaintContext<'_>) {
        let theme = ctx.theme();
        let (w, h) = (self.base.width(), self.base.height());
        let shadow = theme.window_drop_shadow_size;

        ctx.fill_rect(
            Rect::new(-shadow * 0.5, -shadow * 0.5 + 2.0, w + shadow, h + shadow),
            theme.drop_shadow,
        );
        ctx.fill_rect(self.base.rect(), theme.window_popup);
        ctx.stroke_rect(Rect::new(0.5, 0.5, w - 1.0, h - 1.0), 1.0, theme.border_dark);

        // Arrow pointing back at the anchor.
        let tip_y = self.anchor_height;
        for i in 0..15 {
            let x = -15.0 + i as f32;
            let reach = i as f32;
            ctx.draw_line(
                Point::new(x, tip_y - reach),
                Point::new(x, tip_y + reach),
                1.0,
                theme.window_popup,
            );
        }
    }
}

impl std::fmt::Debug for Popup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Popup")
            .field("parent_window", &self.parent_window)
            .field("anchor_pos", &self.anchor_pos)
            .field("anchor_height", &self.anchor_height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::widgets::{Panel, Window};
    use espalier_core::ObjectTree;
    use espalier_render::Size;

    fn boxed(widget: impl Widget) -> Box<dyn Widget> {
        Box::new(widget)
    }

    #[test]
    fn test_starts_hidden() {
        let popup = Popup::new(ObjectId::default());
        assert!(!popup.widget_base().is_visible());
        assert_eq!(popup.anchor_height(), 30.0);
    }

    #[test]
    fn test_refresh_places_next_to_window() {
        let mut tree: WidgetTree = ObjectTree::new();
        let root = tree.insert(boxed(Panel::new()));
        let window = tree
            .insert_child(root, boxed(Window::new("W").with_position(Point::new(100.0, 50.0))))
            .unwrap();
        let popup = tree
            .insert_child(root, boxed(Popup::new(window).with_anchor(Point::new(120.0, 40.0))))
            .unwrap();
        tree.get_mut(popup).unwrap().widget_base_mut().show();

        refresh_relative_placement(&mut tree, popup);
        let base = tree.get(popup).unwrap().widget_base();
        assert_eq!(base.pos(), Point::new(220.0, 60.0));
        assert!(base.is_visible());

        tree.get_mut(window).unwrap().widget_base_mut().hide();
        refresh_relative_placement(&mut tree, popup);
        assert!(!tree.get(popup).unwrap().widget_base().is_visible());
    }

    #[test]
    fn test_single_child_fills_popup() {
        let mut tree: WidgetTree = ObjectTree::new();
        let popup = tree.insert(boxed(Popup::new(ObjectId::default())));
        let child = tree.insert_child(popup, boxed(Panel::new())).unwrap();
        tree.get_mut(popup)
            .unwrap()
            .widget_base_mut()
            .set_size(Size::new(80.0, 40.0));

        let theme = crate::theme::Theme::default();
        let measurer = espalier_render::MonospaceMeasurer::default();
        let mut widget = tree.checkout(popup).unwrap();
        {
            let mut ctx = LayoutContext::new(&mut tree, popup, &theme, &measurer);
            widget.perform_layout(&mut ctx);
        }
        tree.check_in(popup, widget).unwrap();

        let base = tree.get(child).unwrap().widget_base();
        assert_eq!(base.pos(), Point::ZERO);
        assert_eq!(base.size(), Size::new(80.0, 40.0));
    }
}
