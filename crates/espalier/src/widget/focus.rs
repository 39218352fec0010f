//! Focus management for widget trees.
//!
//! [`FocusManager`] tracks the single widget that receives keyboard and
//! character events.
//!
//! # Tab Order
//!
//! Tab order is depth-first pre-order over the tree, the order widgets are
//! painted in. Hidden subtrees are skipped. Only widgets with
//! [`FocusPolicy::TabFocus`](super::FocusPolicy::TabFocus) or
//! [`FocusPolicy::StrongFocus`](super::FocusPolicy::StrongFocus) take part.

use espalier_core::ObjectId;
use espalier_core::logging::targets;

use super::context::WidgetTree;
use super::dispatcher::{Dispatch, EventDispatcher};
use super::events::{FocusInEvent, FocusOutEvent, FocusReason, WidgetEvent};

/// Manages keyboard focus for a widget tree.
///
/// When focus changes, the manager:
/// 1. Marks the old widget unfocused and sends it a [`FocusOutEvent`]
/// 2. Marks the new widget focused and sends it a [`FocusInEvent`]
#[derive(Debug, Default)]
pub struct FocusManager {
    focused_widget: Option<ObjectId>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the currently focused widget.
    #[inline]
    pub fn focused_widget(&self) -> Option<ObjectId> {
        self.focused_widget
    }

    #[inline]
    pub fn has_focus(&self, widget_id: ObjectId) -> bool {
        self.focused_widget == Some(widget_id)
    }

    /// Move focus to `widget_id`.
    ///
    /// Returns `false` and leaves focus alone if the widget cannot take focus
    /// (no focus policy, disabled, hidden or gone).
    pub(crate) fn set_focus(
        &mut self,
        env: &mut Dispatch<'_>,
        widget_id: ObjectId,
        reason: FocusReason,
    ) -> bool {
        let can_focus = env
            .tree
            .get(widget_id)
            .is_some_and(|widget| widget.widget_base().is_focusable());
        if !can_focus {
            return false;
        }

        if self.focused_widget == Some(widget_id) {
            return true;
        }

        tracing::debug!(
            target: targets::FOCUS,
            from = ?self.focused_widget,
            to = ?widget_id,
            ?reason,
            "focus change"
        );

        if let Some(old_id) = self.focused_widget.take() {
            Self::unfocus_widget(env, old_id, reason);
        }

        // The old widget's FocusOut handler may have removed the new one.
        if !env.tree.contains(widget_id) {
            return false;
        }
        self.focused_widget = Some(widget_id);
        Self::focus_widget(env, widget_id, reason);
        true
    }

    /// Clear focus. After this no widget has focus.
    pub(crate) fn clear_focus(&mut self, env: &mut Dispatch<'_>, reason: FocusReason) {
        if let Some(old_id) = self.focused_widget.take() {
            tracing::debug!(target: targets::FOCUS, from = ?old_id, ?reason, "focus cleared");
            Self::unfocus_widget(env, old_id, reason);
        }
    }

    /// Move focus to the next widget in tab order, wrapping around.
    pub(crate) fn focus_next(&mut self, env: &mut Dispatch<'_>, root_id: ObjectId) -> bool {
        let tab_order = Self::build_tab_order(env.tree, root_id);
        if tab_order.is_empty() {
            return false;
        }

        let next_id = self
            .focused_widget
            .and_then(|current| tab_order.iter().position(|&id| id == current))
            .map_or(tab_order[0], |pos| tab_order[(pos + 1) % tab_order.len()]);

        self.set_focus(env, next_id, FocusReason::Tab)
    }

    /// Move focus to the previous widget in tab order, wrapping around.
    pub(crate) fn focus_previous(&mut self, env: &mut Dispatch<'_>, root_id: ObjectId) -> bool {
        let tab_order = Self::build_tab_order(env.tree, root_id);
        let Some(&last) = tab_order.last() else {
            return false;
        };

        let prev_id = self
            .focused_widget
            .and_then(|current| tab_order.iter().position(|&id| id == current))
            .map_or(last, |pos| {
                if pos == 0 {
                    last
                } else {
                    tab_order[pos - 1]
                }
            });

        self.set_focus(env, prev_id, FocusReason::Backtab)
    }

    /// Drop focus from a widget that no longer exists, without events.
    pub(crate) fn forget_dead(&mut self, tree: &WidgetTree) {
        if let Some(id) = self.focused_widget {
            if !tree.contains(id) {
                tracing::debug!(target: targets::FOCUS, ?id, "focused widget destroyed");
                self.focused_widget = None;
            }
        }
    }

    /// Widget ids in tab order.
    pub fn build_tab_order(tree: &WidgetTree, root_id: ObjectId) -> Vec<ObjectId> {
        let mut order = Vec::new();
        Self::collect_tab_order(tree, root_id, &mut order);
        order
    }

    fn collect_tab_order(tree: &WidgetTree, widget_id: ObjectId, order: &mut Vec<ObjectId>) {
        let Some(widget) = tree.get(widget_id) else {
            return;
        };
        if !widget.widget_base().is_visible() {
            return;
        }
        if widget.widget_base().accepts_tab_focus() {
            order.push(widget_id);
        }
        for &child_id in tree.children(widget_id).unwrap_or(&[]) {
            Self::collect_tab_order(tree, child_id, order);
        }
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn unfocus_widget(env: &mut Dispatch<'_>, widget_id: ObjectId, reason: FocusReason) {
        if let Some(widget) = env.tree.get_mut(widget_id) {
            widget.widget_base_mut().set_focused(false);
        }
        let event = WidgetEvent::FocusOut(FocusOutEvent { reason });
        EventDispatcher::send_event(env, widget_id, &event);
    }

    fn focus_widget(env: &mut Dispatch<'_>, widget_id: ObjectId, reason: FocusReason) {
        if let Some(widget) = env.tree.get_mut(widget_id) {
            widget.widget_base_mut().set_focused(true);
        }
        let event = WidgetEvent::FocusIn(FocusInEvent { reason });
        EventDispatcher::send_event(env, widget_id, &event);
    }
}
