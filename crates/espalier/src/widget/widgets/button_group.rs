//! Mutual exclusion between buttons.
//!
//! Buttons do not own a group object. A radio button carries the ids of its
//! group (or scans its siblings when it has none), and a press releases every
//! other pushed member through [`release_others`].
//!
//! ```
//! use espalier::Screen;
//! use espalier::widget::widgets::{Button, ButtonMode, button_group};
//! use espalier_render::Size;
//!
//! let mut screen = Screen::new(Size::new(400.0, 300.0)).unwrap();
//! let root = screen.root();
//! let a = screen.add_widget(root, Button::new("A").with_mode(ButtonMode::Radio)).unwrap();
//! let b = screen.add_widget(root, Button::new("B").with_mode(ButtonMode::Radio)).unwrap();
//! button_group::set_group(screen.tree_mut(), &[a, b]);
//! assert_eq!(screen.widget::<Button>(a).unwrap().group(), &[a, b]);
//! ```

use espalier_core::ObjectId;
use espalier_core::logging::targets;

use super::button::{Button, ButtonMode};
use crate::widget::{EventContext, WidgetTree};

/// Make `members` one explicit group. Ids that are not buttons are skipped.
pub fn set_group(tree: &mut WidgetTree, members: &[ObjectId]) {
    for &id in members {
        match tree.get_mut(id).and_then(|w| w.downcast_mut::<Button>()) {
            Some(button) => button.set_group(members.to_vec()),
            None => {
                tracing::warn!(target: targets::WIDGETS, ?id, "button group member is not a button");
            }
        }
    }
}

/// The pushed member of a group, if any.
pub fn pushed_member(tree: &WidgetTree, members: &[ObjectId]) -> Option<ObjectId> {
    members.iter().copied().find(|&id| {
        tree.get(id)
            .and_then(|w| w.downcast_ref::<Button>())
            .is_some_and(Button::is_pushed)
    })
}

/// Release every pushed button in `members` whose mode is `mode`.
///
/// Each released button's linked popup is hidden and its change callback
/// runs with `false`. The handling button is checked out of the tree while
/// this runs, so it is never swept.
pub(crate) fn release_others(ctx: &mut EventContext<'_>, members: &[ObjectId], mode: ButtonMode) {
    for &id in members {
        if id == ctx.id() {
            continue;
        }
        let Some((popup, callback)) = ctx
            .widget_mut::<Button>(id)
            .and_then(|button| button.release_for_sweep(mode))
        else {
            continue;
        };
        tracing::trace!(target: targets::WIDGETS, ?id, ?mode, "released by group sweep");

        if let Some(popup) = popup {
            ctx.set_visible(popup, false);
        }
        if let Some(mut callback) = callback {
            callback(ctx, false);
            if let Some(button) = ctx.widget_mut::<Button>(id) {
                button.restore_change_callback(callback);
            }
        }
    }
}
