//! Event dispatching and hit-testing.
//!
//! # Event Flow
//!
//! 1. **Checkout**: the target widget's payload is checked out of the tree.
//!    The checkout holds a reference, so a handler that removes its own
//!    widget (a button closing its window) cannot free it mid-call.
//! 2. **Handler**: the widget's `event()` runs with an [`EventContext`].
//! 3. **Check-in**: the payload goes back. If the widget was abandoned during
//!    the call it is destroyed now.
//!
//! Pointer events that are routed by position visit every visible child under
//! the pointer, topmost first, before the container's own handler runs. The
//! first handler that consumes the event stops the walk.

use espalier_core::ObjectId;
use espalier_core::logging::targets;
use espalier_render::Point;

use super::context::{EventContext, Requests, Services, WidgetTree, absolute_position};
use super::events::WidgetEvent;

/// Result of dispatching an event to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// The event was consumed.
    Accepted,
    /// The widget did not consume the event.
    Ignored,
    /// The target widget does not exist or is busy handling another event.
    WidgetNotFound,
}

impl DispatchResult {
    pub fn was_handled(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Everything a handler may touch, borrowed from the screen for one dispatch.
pub(crate) struct Dispatch<'a> {
    pub(crate) tree: &'a mut WidgetTree,
    pub(crate) services: &'a mut Services,
    pub(crate) requests: &'a mut Requests,
}

/// Event dispatcher for the widget system.
pub struct EventDispatcher;

impl EventDispatcher {
    // =========================================================================
    // Hit Testing
    // =========================================================================

    /// Deepest visible widget under `point` (screen coordinates), starting
    /// at `root`.
    pub fn hit_test(tree: &WidgetTree, root: ObjectId, point: Point) -> Option<ObjectId> {
        Self::path_at(tree, root, point).last().copied()
    }

    /// Chain of visible widgets under `point`, from `root` down to the deepest.
    ///
    /// Among overlapping siblings the topmost (last added or raised) wins.
    pub fn path_at(tree: &WidgetTree, root: ObjectId, point: Point) -> Vec<ObjectId> {
        let mut path = Vec::new();
        let Some(base) = tree.get(root).map(|w| w.widget_base()) else {
            return path;
        };
        if !base.is_visible() || !base.contains(point) {
            return path;
        }

        path.push(root);
        let mut current = root;
        let mut local = point - base.pos();
        'descend: loop {
            let children = tree.children(current).unwrap_or(&[]);
            for &child in children.iter().rev() {
                let Some(child_base) = tree.get(child).map(|w| w.widget_base()) else {
                    continue;
                };
                if child_base.is_visible() && child_base.contains(local) {
                    path.push(child);
                    local = local - child_base.pos();
                    current = child;
                    continue 'descend;
                }
            }
            break;
        }
        path
    }

    /// Check that a widget and all its ancestors are visible.
    pub fn is_visible_recursive(tree: &WidgetTree, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match tree.get(node) {
                Some(widget) if widget.widget_base().is_visible() => {}
                _ => return false,
            }
            current = tree.parent(node).ok().flatten();
        }
        true
    }

    // =========================================================================
    // Delivery
    // =========================================================================

    /// Deliver `event` to one widget, without propagation.
    ///
    /// Pointer positions are localized to the widget first.
    pub(crate) fn send_event(
        env: &mut Dispatch<'_>,
        id: ObjectId,
        event: &WidgetEvent,
    ) -> DispatchResult {
        let Some(origin) = absolute_position(env.tree, id) else {
            return DispatchResult::WidgetNotFound;
        };
        let mut widget = match env.tree.checkout(id) {
            Ok(widget) => widget,
            Err(_) => return DispatchResult::WidgetNotFound,
        };

        let event = event.localized(origin);
        let consumed = {
            let mut ctx = EventContext::new(id, origin, env.tree, env.services, env.requests);
            widget.event(&mut ctx, &event)
        };
        tracing::trace!(
            target: targets::DISPATCH,
            ?id,
            widget = widget.type_name(),
            event = event.name(),
            consumed,
            "delivered event"
        );

        match env.tree.check_in(id, widget) {
            Ok(true) => {
                tracing::trace!(target: targets::DISPATCH, ?id, "widget destroyed by its own handler");
            }
            Ok(false) => {}
            Err(err) => {
                tracing::error!(target: targets::DISPATCH, ?id, %err, "check-in after dispatch failed");
            }
        }

        if consumed {
            DispatchResult::Accepted
        } else {
            DispatchResult::Ignored
        }
    }

    /// Route a pointer event by position: children under the pointer first
    /// (topmost first), then `id` itself.
    pub(crate) fn route_positional(env: &mut Dispatch<'_>, id: ObjectId, event: &WidgetEvent) -> bool {
        let Some(point) = event.window_pos() else {
            return false;
        };
        let visible = env
            .tree
            .get(id)
            .is_some_and(|widget| widget.widget_base().is_visible());
        if !visible {
            return false;
        }

        let children: Vec<ObjectId> = env.tree.children(id).map(<[ObjectId]>::to_vec).unwrap_or_default();
        for &child in children.iter().rev() {
            let under_pointer = match (
                env.tree.get(child).map(|w| w.widget_base()),
                absolute_position(env.tree, child),
            ) {
                (Some(base), Some(abs)) => {
                    base.is_visible() && base.rect().contains(point - abs)
                }
                _ => false,
            };
            if under_pointer && Self::route_positional(env, child, event) {
                return true;
            }
        }

        Self::send_event(env, id, event).was_handled()
    }
}
