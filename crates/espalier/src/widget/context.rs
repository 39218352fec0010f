//! Contexts handed to widgets during measuring, layout and event handling.
//!
//! A widget never owns its children or its theme. Whatever it needs from the
//! rest of the screen arrives through one of these contexts:
//!
//! - [`MeasureContext`]: read-only tree access for `preferred_size`
//! - [`LayoutContext`]: mutable child geometry for `perform_layout`
//! - [`EventContext`]: the tree, the services and deferred requests for `event`
//!
//! During `perform_layout` and `event` the widget itself is checked out of the
//! tree, so looking it up by its own id through the context yields `None`.

use std::time::Duration;

use espalier_core::ObjectId;
use espalier_core::logging::targets;
use espalier_render::{Point, Size, TextMeasurer};

use crate::platform::{Clipboard, Clock};
use crate::theme::Theme;

use super::base::WidgetBase;
use super::traits::Widget;

/// Arena holding every widget of a screen.
pub type WidgetTree = espalier_core::ObjectTree<Box<dyn Widget>>;

/// Host services shared by all widgets of a screen.
pub(crate) struct Services {
    pub(crate) theme: Theme,
    pub(crate) measurer: Box<dyn TextMeasurer>,
    pub(crate) clipboard: Box<dyn Clipboard>,
    pub(crate) clock: Box<dyn Clock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FocusRequest {
    Set(ObjectId),
    Clear,
}

/// Work a handler asked for, carried out by the screen once it returns.
#[derive(Debug, Default)]
pub(crate) struct Requests {
    pub(crate) focus: Option<FocusRequest>,
    pub(crate) layout: Vec<ObjectId>,
}

impl Requests {
    pub(crate) fn is_empty(&self) -> bool {
        self.focus.is_none() && self.layout.is_empty()
    }
}

/// Preferred size of `id`, measured in place.
pub(crate) fn measure_widget(
    tree: &WidgetTree,
    id: ObjectId,
    theme: &Theme,
    measurer: &dyn TextMeasurer,
) -> Size {
    let Some(widget) = tree.get(id) else {
        return Size::ZERO;
    };
    let ctx = MeasureContext {
        tree,
        id,
        theme,
        measurer,
    };
    widget.preferred_size(&ctx)
}

/// Absolute position of `id`: the sum of its own and its ancestors' positions.
///
/// Returns `None` if the widget or one of its ancestors is checked out.
pub(crate) fn absolute_position(tree: &WidgetTree, id: ObjectId) -> Option<Point> {
    let mut position = Point::ZERO;
    let mut current = Some(id);
    while let Some(node) = current {
        position += tree.get(node)?.widget_base().pos();
        current = tree.parent(node).ok().flatten();
    }
    Some(position)
}

// =========================================================================
// MeasureContext
// =========================================================================

/// Read-only context for [`Widget::preferred_size`].
pub struct MeasureContext<'a> {
    tree: &'a WidgetTree,
    id: ObjectId,
    theme: &'a Theme,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> MeasureContext<'a> {
    /// The widget being measured.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn theme(&self) -> &'a Theme {
        self.theme
    }

    pub fn measurer(&self) -> &'a dyn TextMeasurer {
        self.measurer
    }

    /// Children of the measured widget, bottom to top.
    pub fn children(&self) -> &'a [ObjectId] {
        self.tree.children(self.id).unwrap_or(&[])
    }

    pub fn base_of(&self, id: ObjectId) -> Option<&'a WidgetBase> {
        self.tree.get(id).map(|widget| widget.widget_base())
    }

    /// Preferred size of another widget, usually a child.
    pub fn preferred_size_of(&self, id: ObjectId) -> Size {
        measure_widget(self.tree, id, self.theme, self.measurer)
    }
}

// =========================================================================
// LayoutContext
// =========================================================================

/// Context for [`Widget::perform_layout`].
pub struct LayoutContext<'a> {
    tree: &'a mut WidgetTree,
    id: ObjectId,
    theme: &'a Theme,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> LayoutContext<'a> {
    pub(crate) fn new(
        tree: &'a mut WidgetTree,
        id: ObjectId,
        theme: &'a Theme,
        measurer: &'a dyn TextMeasurer,
    ) -> Self {
        Self {
            tree,
            id,
            theme,
            measurer,
        }
    }

    /// The widget being laid out.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn theme(&self) -> &'a Theme {
        self.theme
    }

    pub fn measurer(&self) -> &'a dyn TextMeasurer {
        self.measurer
    }

    /// A measuring view of the same widget.
    pub fn measure(&self) -> MeasureContext<'_> {
        MeasureContext {
            tree: &*self.tree,
            id: self.id,
            theme: self.theme,
            measurer: self.measurer,
        }
    }

    /// Children of the widget being laid out, bottom to top.
    pub fn children(&self) -> Vec<ObjectId> {
        self.tree
            .children(self.id)
            .map(<[ObjectId]>::to_vec)
            .unwrap_or_default()
    }

    /// Children of any widget, bottom to top.
    pub fn children_of(&self, id: ObjectId) -> Vec<ObjectId> {
        self.tree
            .children(id)
            .map(<[ObjectId]>::to_vec)
            .unwrap_or_default()
    }

    pub fn preferred_size_of(&self, id: ObjectId) -> Size {
        measure_widget(&*self.tree, id, self.theme, self.measurer)
    }

    pub fn base_of(&self, id: ObjectId) -> Option<&WidgetBase> {
        self.tree.get(id).map(|widget| widget.widget_base())
    }

    pub fn base_mut(&mut self, id: ObjectId) -> Option<&mut WidgetBase> {
        self.tree.get_mut(id).map(|widget| widget.widget_base_mut())
    }

    /// Run `perform_layout` on another widget, usually a child.
    pub fn layout_child(&mut self, id: ObjectId) {
        let mut widget = match self.tree.checkout(id) {
            Ok(widget) => widget,
            Err(err) => {
                tracing::warn!(target: targets::LAYOUT, ?id, %err, "cannot lay out widget");
                return;
            }
        };
        {
            let mut ctx = LayoutContext::new(self.tree, id, self.theme, self.measurer);
            widget.perform_layout(&mut ctx);
        }
        if let Err(err) = self.tree.check_in(id, widget) {
            tracing::error!(target: targets::LAYOUT, ?id, %err, "check-in after layout failed");
        }
    }
}

// =========================================================================
// EventContext
// =========================================================================

/// Context for [`Widget::event`] and for widget callbacks.
///
/// Focus and layout changes requested here are deferred until the handler
/// returns. Tree edits (visibility, removal, state of other widgets) apply
/// immediately.
pub struct EventContext<'a> {
    id: ObjectId,
    origin: Point,
    tree: &'a mut WidgetTree,
    services: &'a mut Services,
    requests: &'a mut Requests,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(
        id: ObjectId,
        origin: Point,
        tree: &'a mut WidgetTree,
        services: &'a mut Services,
        requests: &'a mut Requests,
    ) -> Self {
        Self {
            id,
            origin,
            tree,
            services,
            requests,
        }
    }

    /// The widget handling the event.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Absolute position of the handling widget.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn theme(&self) -> &Theme {
        &self.services.theme
    }

    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.services.measurer.as_ref()
    }

    pub fn clipboard(&mut self) -> &mut dyn Clipboard {
        self.services.clipboard.as_mut()
    }

    /// Current time from the screen's clock.
    pub fn now(&self) -> Duration {
        self.services.clock.now()
    }

    pub fn tree(&self) -> &WidgetTree {
        &*self.tree
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.tree.parent(self.id).ok().flatten()
    }

    /// Children of `id`, bottom to top.
    pub fn children_of(&self, id: ObjectId) -> Vec<ObjectId> {
        self.tree
            .children(id)
            .map(<[ObjectId]>::to_vec)
            .unwrap_or_default()
    }

    /// Look up another widget by type.
    pub fn widget<W: Widget>(&self, id: ObjectId) -> Option<&W> {
        self.tree.get(id).and_then(|widget| widget.downcast_ref::<W>())
    }

    /// Look up another widget by type, mutably.
    pub fn widget_mut<W: Widget>(&mut self, id: ObjectId) -> Option<&mut W> {
        self.tree
            .get_mut(id)
            .and_then(|widget| widget.downcast_mut::<W>())
    }

    pub fn base_of(&self, id: ObjectId) -> Option<&WidgetBase> {
        self.tree.get(id).map(|widget| widget.widget_base())
    }

    pub fn base_mut(&mut self, id: ObjectId) -> Option<&mut WidgetBase> {
        self.tree.get_mut(id).map(|widget| widget.widget_base_mut())
    }

    /// Show or hide another widget.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) {
        if let Some(base) = self.base_mut(id) {
            base.set_visible(visible);
        }
    }

    /// Absolute position of any widget, including the handling one.
    pub fn absolute_position(&self, id: ObjectId) -> Option<Point> {
        let mut position = Point::ZERO;
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.id {
                return Some(position + self.origin);
            }
            position += self.tree.get(node)?.widget_base().pos();
            current = self.tree.parent(node).ok().flatten();
        }
        Some(position)
    }

    /// Detach a widget from its parent, destroying it unless something else
    /// holds it.
    ///
    /// The handling widget may remove itself or an ancestor. It stays alive
    /// until its handler returns.
    pub fn remove_widget(&mut self, id: ObjectId) -> bool {
        let Some(parent) = self.tree.parent(id).ok().flatten() else {
            return false;
        };
        match self.tree.remove_child(parent, id) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(target: targets::WIDGETS, ?id, %err, "remove_widget failed");
                false
            }
        }
    }

    /// Ask for keyboard focus on the handling widget.
    pub fn request_focus(&mut self) {
        self.requests.focus = Some(FocusRequest::Set(self.id));
    }

    /// Ask for keyboard focus on another widget.
    pub fn request_focus_for(&mut self, id: ObjectId) {
        self.requests.focus = Some(FocusRequest::Set(id));
    }

    /// Ask for focus to be released.
    pub fn clear_focus(&mut self) {
        self.requests.focus = Some(FocusRequest::Clear);
    }

    /// Ask for `id`'s subtree to be laid out again.
    pub fn request_layout(&mut self, id: ObjectId) {
        if !self.requests.layout.contains(&id) {
            self.requests.layout.push(id);
        }
    }
}
