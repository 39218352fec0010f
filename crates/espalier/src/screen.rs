//! Application context.
//!
//! A [`Screen`] owns everything one host window needs: the widget tree, the
//! theme, the text measurer, the clipboard, the clock, keyboard focus and the
//! pointer state. The host feeds it one input event at a time and asks it to
//! paint into a [`Renderer`]. Screens are independent, so a host with several
//! windows simply keeps several of them.

use std::time::Duration;

use espalier_core::logging::{format_tree, span_names, targets};
use espalier_core::{ObjectError, ObjectId, PerfSpan};
use espalier_render::{
    MonospaceMeasurer, Point, RasterCache, RasterStats, Rect, Renderer, Size, TextMeasurer,
};

use crate::error::{Error, Result};
use crate::platform::{Clipboard, Clock, SystemClock, default_clipboard};
use crate::theme::Theme;
use crate::widget::widgets::{self, Button, Panel, Popup, Window, button_group};
use crate::widget::{
    Alignment, BoxLayout, CharacterEvent, Dispatch, EventDispatcher, FocusManager, FocusReason,
    FocusRequest, InputEvent, Key, KeyAction, KeyPressEvent, KeyReleaseEvent, KeyboardModifiers,
    Layout, LayoutContext, MouseButton, MouseDragEvent, MouseMoveEvent, MousePressEvent,
    MouseReleaseEvent, Orientation, PaintContext, RasterKey, Requests, ScrollEvent, Services,
    Widget, WidgetBase, WidgetEvent, WidgetTree,
};

/// Rounds of deferred requests handled after one event before giving up.
const MAX_REQUEST_ROUNDS: usize = 8;

/// Borrow the parts of a screen a handler may touch.
macro_rules! dispatch {
    ($screen:expr) => {
        Dispatch {
            tree: &mut $screen.tree,
            services: &mut $screen.services,
            requests: &mut $screen.requests,
        }
    };
}

// =========================================================================
// ScreenBuilder
// =========================================================================

/// Builder for [`Screen`].
///
/// # Example
///
/// ```
/// use espalier::platform::{ManualClock, MemoryClipboard};
/// use espalier::{ScreenBuilder, Theme};
/// use espalier_render::{MonospaceMeasurer, Size};
///
/// let screen = ScreenBuilder::new(Size::new(800.0, 600.0))
///     .with_theme(Theme::default())
///     .with_measurer(MonospaceMeasurer::default())
///     .with_clipboard(MemoryClipboard::new())
///     .with_clock(ManualClock::new())
///     .build()
///     .unwrap();
/// assert_eq!(screen.size(), Size::new(800.0, 600.0));
/// ```
pub struct ScreenBuilder {
    size: Size,
    theme: Theme,
    measurer: Option<Box<dyn TextMeasurer>>,
    clipboard: Option<Box<dyn Clipboard>>,
    clock: Option<Box<dyn Clock>>,
    async_raster: bool,
}

impl ScreenBuilder {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            theme: Theme::default(),
            measurer: None,
            clipboard: None,
            clock: None,
            async_raster: false,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Text measurer. Defaults to [`MonospaceMeasurer`].
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Some(Box::new(measurer));
        self
    }

    /// Clipboard. Defaults to the system clipboard when available.
    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    /// Clock used for double-click detection. Defaults to [`SystemClock`].
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Start a background rasterizer for buttons with an async body.
    pub fn with_async_raster(mut self, enabled: bool) -> Self {
        self.async_raster = enabled;
        self
    }

    pub fn build(self) -> Result<Screen> {
        let raster_cache = if self.async_raster {
            Some(RasterCache::new()?)
        } else {
            None
        };

        let mut root_panel = Panel::new();
        root_panel.widget_base_mut().set_size(self.size);
        root_panel.widget_base_mut().set_name("screen");
        let mut tree = WidgetTree::new();
        let root = tree.insert(Box::new(root_panel));

        tracing::debug!(
            target: targets::WIDGETS,
            size = ?self.size,
            async_raster = self.async_raster,
            "screen created"
        );

        Ok(Screen {
            tree,
            root,
            services: Services {
                theme: self.theme,
                measurer: self
                    .measurer
                    .unwrap_or_else(|| Box::new(MonospaceMeasurer::default())),
                clipboard: self.clipboard.unwrap_or_else(default_clipboard),
                clock: self.clock.unwrap_or_else(|| Box::new(SystemClock::new())),
            },
            focus: FocusManager::new(),
            requests: Requests::default(),
            hover_path: Vec::new(),
            drag_widget: None,
            mouse_pos: Point::ZERO,
            mouse_buttons: 0,
            modifiers: KeyboardModifiers::NONE,
            raster_cache,
        })
    }
}

// =========================================================================
// Screen
// =========================================================================

/// The root of a widget hierarchy, bound to one host window.
///
/// # Example
///
/// ```
/// use espalier::Screen;
/// use espalier::widget::MouseButton;
/// use espalier::widget::widgets::{Button, ButtonMode, Window};
/// use espalier::widget::{BoxLayout, KeyboardModifiers, Orientation};
/// use espalier_render::{Point, RecordingRenderer, Size};
///
/// let mut screen = Screen::new(Size::new(400.0, 300.0)).unwrap();
/// let window = screen
///     .add_widget(screen.root(), Window::new("Tools").with_layout(BoxLayout::new(Orientation::Vertical)))
///     .unwrap();
/// let toggle = screen
///     .add_widget(window, Button::new("Snap").with_mode(ButtonMode::Toggle))
///     .unwrap();
/// screen.perform_layout();
///
/// let pos = screen.absolute_position(toggle).unwrap() + Point::new(5.0, 5.0);
/// screen.mouse_button(pos, MouseButton::Left, true, KeyboardModifiers::NONE);
/// screen.mouse_button(pos, MouseButton::Left, false, KeyboardModifiers::NONE);
/// assert!(screen.widget::<Button>(toggle).unwrap().is_pushed());
///
/// let mut renderer = RecordingRenderer::new();
/// screen.paint(&mut renderer);
/// assert!(!renderer.commands().is_empty());
/// ```
pub struct Screen {
    tree: WidgetTree,
    root: ObjectId,
    services: Services,
    focus: FocusManager,
    requests: Requests,
    /// Widgets under the pointer, root first.
    hover_path: Vec<ObjectId>,
    /// Capture target of the current press.
    drag_widget: Option<ObjectId>,
    mouse_pos: Point,
    mouse_buttons: u8,
    modifiers: KeyboardModifiers,
    raster_cache: Option<RasterCache<RasterKey>>,
}

impl Screen {
    /// Create a screen with default services.
    pub fn new(size: Size) -> Result<Self> {
        ScreenBuilder::new(size).build()
    }

    pub fn builder(size: Size) -> ScreenBuilder {
        ScreenBuilder::new(size)
    }

    // =========================================================================
    // Services
    // =========================================================================

    pub fn theme(&self) -> &Theme {
        &self.services.theme
    }

    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.services.measurer.as_ref()
    }

    pub fn clipboard(&mut self) -> &mut dyn Clipboard {
        self.services.clipboard.as_mut()
    }

    pub fn set_clipboard(&mut self, clipboard: impl Clipboard + 'static) {
        self.services.clipboard = Box::new(clipboard);
    }

    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.services.clock = Box::new(clock);
    }

    /// Current time from the screen's clock.
    pub fn now(&self) -> Duration {
        self.services.clock.now()
    }

    /// Counters of the background rasterizer, if one is running.
    pub fn raster_stats(&self) -> Option<RasterStats> {
        self.raster_cache.as_ref().map(RasterCache::stats)
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// The root panel. It always covers the whole screen.
    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn size(&self) -> Size {
        self.base(self.root).map(WidgetBase::size).unwrap_or(Size::ZERO)
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    /// Add `widget` as the topmost child of `parent`.
    pub fn add_widget<W: Widget>(&mut self, parent: ObjectId, widget: W) -> Result<ObjectId> {
        let type_name = widget.type_name();
        let id = self.tree.insert_child(parent, Box::new(widget))?;
        tracing::trace!(target: targets::WIDGETS, ?id, ?parent, widget = type_name, "widget added");
        Ok(id)
    }

    /// Detach `child` from `parent`. Returns whether it was destroyed.
    ///
    /// If focus is inside the removed subtree it is cleared first, so a text
    /// box being edited commits.
    pub fn remove_widget(&mut self, parent: ObjectId, child: ObjectId) -> Result<bool> {
        if self.tree.parent(child)? != Some(parent) {
            return Err(ObjectError::NotAChild.into());
        }
        if self
            .focus
            .focused_widget()
            .is_some_and(|focused| self.tree.is_ancestor_of(child, focused))
        {
            self.focus.clear_focus(&mut dispatch!(self), FocusReason::Other);
        }
        let destroyed = self.tree.remove_child(parent, child)?;
        self.finish_event();
        Ok(destroyed)
    }

    pub fn widget<W: Widget>(&self, id: ObjectId) -> Option<&W> {
        self.tree.get(id).and_then(|widget| widget.downcast_ref::<W>())
    }

    pub fn widget_mut<W: Widget>(&mut self, id: ObjectId) -> Option<&mut W> {
        self.tree
            .get_mut(id)
            .and_then(|widget| widget.downcast_mut::<W>())
    }

    pub fn base(&self, id: ObjectId) -> Option<&WidgetBase> {
        self.tree.get(id).map(|widget| widget.widget_base())
    }

    pub fn base_mut(&mut self, id: ObjectId) -> Option<&mut WidgetBase> {
        self.tree.get_mut(id).map(|widget| widget.widget_base_mut())
    }

    /// Absolute position of a widget.
    pub fn absolute_position(&self, id: ObjectId) -> Option<Point> {
        crate::widget::absolute_position(&self.tree, id)
    }

    /// Indented dump of the widget tree, for debugging.
    pub fn debug_tree(&self) -> Result<String> {
        let dump = format_tree(&self.tree, self.root, |widget| {
            match widget.widget_base().name() {
                Some(name) => format!("{} \"{}\"", widget.type_name(), name),
                None => widget.type_name().to_string(),
            }
        })?;
        Ok(dump)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn set_layout(&mut self, id: ObjectId, layout: impl Layout + 'static) -> Result<()> {
        let base = self.base_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        base.set_layout(Box::new(layout));
        Ok(())
    }

    /// Lay out the whole screen.
    pub fn perform_layout(&mut self) {
        let _span = PerfSpan::new(span_names::LAYOUT);
        self.layout_widget(self.root);
    }

    /// Lay out the subtree of `id` without touching its own geometry.
    pub fn layout_widget(&mut self, id: ObjectId) {
        {
            let mut ctx = LayoutContext::new(
                &mut self.tree,
                id,
                &self.services.theme,
                self.services.measurer.as_ref(),
            );
            ctx.layout_child(id);
        }
        self.refresh_popups();
    }

    fn refresh_popups(&mut self) {
        let popups: Vec<ObjectId> = self
            .tree
            .children(self.root)
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|&id| self.tree.get(id).is_some_and(|w| w.is::<Popup>()))
            .collect();
        for popup in popups {
            widgets::refresh_relative_placement(&mut self.tree, popup);
        }
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Paint every visible widget, parents before children.
    pub fn paint(&mut self, renderer: &mut dyn Renderer) {
        let _span = PerfSpan::new(span_names::PAINT);

        if let Some(cache) = self.raster_cache.as_mut() {
            let tree = &self.tree;
            let ready = cache.poll(|key: &RasterKey| tree.contains(key.0));
            if ready > 0 {
                tracing::trace!(target: targets::PAINT, ready, "raster results collected");
            }
        }
        self.refresh_popups();

        let clip = Rect::from_origin_size(Point::ZERO, self.size());
        self.paint_widget(renderer, self.root, Point::ZERO, clip);
    }

    fn paint_widget(&mut self, renderer: &mut dyn Renderer, id: ObjectId, parent_origin: Point, clip: Rect) {
        let Some(base) = self.base(id) else {
            return;
        };
        if !base.is_visible() {
            return;
        }
        let origin = parent_origin + base.pos();
        let rect = Rect::from_origin_size(origin, base.size());

        let mut widget = match self.tree.checkout(id) {
            Ok(widget) => widget,
            Err(err) => {
                tracing::warn!(target: targets::PAINT, ?id, %err, "cannot paint widget");
                return;
            }
        };
        {
            let mut ctx = PaintContext::new(
                &mut *renderer,
                &self.services.theme,
                self.services.measurer.as_ref(),
                self.raster_cache.as_mut(),
                id,
                origin,
                clip,
            );
            widget.paint(&mut ctx);
        }
        widget.widget_base_mut().clear_repaint_flag();
        if let Err(err) = self.tree.check_in(id, widget) {
            tracing::error!(target: targets::PAINT, ?id, %err, "check-in after paint failed");
            return;
        }

        let Some(child_clip) = clip.intersect(&rect) else {
            return;
        };
        let children = self.tree.children(id).map(<[ObjectId]>::to_vec).unwrap_or_default();
        for child in children {
            self.paint_widget(renderer, child, origin, child_clip);
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focused(&self) -> Option<ObjectId> {
        self.focus.focused_widget()
    }

    /// Give keyboard focus to `id`. Returns `false` if it cannot take focus.
    pub fn set_focus(&mut self, id: ObjectId) -> bool {
        let changed = self.focus.set_focus(&mut dispatch!(self), id, FocusReason::Other);
        self.finish_event();
        changed
    }

    pub fn clear_focus(&mut self) {
        self.focus.clear_focus(&mut dispatch!(self), FocusReason::Other);
        self.finish_event();
    }

    /// Top-level ancestor of `id`: the child of the root that contains it.
    fn top_level_of(&self, id: ObjectId) -> Option<ObjectId> {
        let mut current = id;
        loop {
            let parent = self.tree.parent(current).ok().flatten()?;
            if parent == self.root {
                return Some(current);
            }
            current = parent;
        }
    }

    /// The modal window keyboard focus is in, if any.
    fn focused_modal_window(&self) -> Option<ObjectId> {
        let window = self.top_level_of(self.focused()?)?;
        self.widget::<Window>(window)
            .is_some_and(Window::is_modal)
            .then_some(window)
    }

    // =========================================================================
    // Windows
    // =========================================================================

    /// Raise a top-level window above its siblings, together with the popups
    /// anchored to it.
    pub fn move_window_to_front(&mut self, window: ObjectId) {
        if let Err(err) = self.tree.raise(window) {
            tracing::warn!(target: targets::WIDGETS, ?window, %err, "cannot raise window");
            return;
        }
        let siblings = self.tree.children(self.root).map(<[ObjectId]>::to_vec).unwrap_or_default();
        for popup in siblings {
            if self.is_anchored_to(popup, window) {
                // Ignored: the popup is a sibling we just listed.
                let _ = self.tree.raise(popup);
            }
        }
    }

    /// Whether `popup` is anchored to `window`, directly or through other popups.
    fn is_anchored_to(&self, popup: ObjectId, window: ObjectId) -> bool {
        let mut current = popup;
        for _ in 0..16 {
            let Some(parent) = self.widget::<Popup>(current).and_then(Popup::parent_window) else {
                return false;
            };
            if parent == window {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Centre a window in its parent. A window without a size is laid out
    /// at its preferred size first.
    pub fn center_window(&mut self, window: ObjectId) {
        let Some(size) = self.base(window).map(WidgetBase::size) else {
            return;
        };
        if size.is_empty() {
            let preferred = crate::widget::measure_widget(
                &self.tree,
                window,
                &self.services.theme,
                self.services.measurer.as_ref(),
            );
            if let Some(base) = self.base_mut(window) {
                base.set_size(preferred);
            }
            self.layout_widget(window);
        }
        let parent_size = self
            .tree
            .parent(window)
            .ok()
            .flatten()
            .and_then(|parent| self.base(parent))
            .map(WidgetBase::size)
            .unwrap_or(Size::ZERO);
        if let Some(base) = self.base_mut(window) {
            let size = base.size();
            base.set_pos(Point::new(
                (parent_size.width - size.width) * 0.5,
                (parent_size.height - size.height) * 0.5,
            ));
        }
    }

    /// Remove a window, releasing focus and capture held inside it.
    pub fn dispose_window(&mut self, window: ObjectId) -> Result<bool> {
        if self.drag_widget.is_some_and(|drag| self.tree.is_ancestor_of(window, drag)) {
            self.drag_widget = None;
        }
        let parent = self.tree.parent(window)?.ok_or(ObjectError::NotAChild)?;
        tracing::debug!(target: targets::WIDGETS, ?window, "disposing window");
        self.remove_widget(parent, window)
    }

    /// The title-bar button panel of `window`, created on first use.
    pub fn window_button_panel(&mut self, window: ObjectId) -> Result<ObjectId> {
        let existing = self
            .widget::<Window>(window)
            .ok_or(Error::WidgetType { expected: "Window" })?
            .button_panel();
        if let Some(panel) = existing.filter(|&panel| self.tree.contains(panel)) {
            return Ok(panel);
        }

        let layout = BoxLayout::new(Orientation::Horizontal)
            .with_alignment(Alignment::Center)
            .with_margin(0.0)
            .with_spacing(4.0);
        let panel = self.add_widget(window, Panel::new().with_layout(layout))?;
        if let Some(window) = self.widget_mut::<Window>(window) {
            window.set_button_panel(panel);
        }
        Ok(panel)
    }

    // =========================================================================
    // Buttons
    // =========================================================================

    /// Set a button's pushed state without running callbacks, showing or
    /// hiding its popup to match.
    pub fn set_button_pushed(&mut self, id: ObjectId, pushed: bool) -> Result<()> {
        let button = self
            .widget_mut::<Button>(id)
            .ok_or(Error::WidgetType { expected: "Button" })?;
        button.set_pushed(pushed);
        let popup = button.popup();
        if let Some(popup) = popup {
            if let Some(base) = self.base_mut(popup) {
                base.set_visible(pushed);
            }
            if pushed {
                self.layout_widget(popup);
            }
        }
        Ok(())
    }

    /// Make `members` an explicit radio or popup group.
    pub fn set_button_group(&mut self, members: &[ObjectId]) {
        button_group::set_group(&mut self.tree, members);
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Current pointer position.
    pub fn mouse_pos(&self) -> Point {
        self.mouse_pos
    }

    /// Widgets under the pointer, root first.
    pub fn hover_path(&self) -> &[ObjectId] {
        &self.hover_path
    }

    /// Widget receiving drag events until the buttons are released.
    pub fn drag_widget(&self) -> Option<ObjectId> {
        self.drag_widget
    }

    /// Feed one host event. Returns whether a widget consumed it.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::MouseMove { pos } => self.mouse_move(pos),
            InputEvent::MouseButton {
                pos,
                button,
                pressed,
                modifiers,
            } => self.mouse_button(pos, button, pressed, modifiers),
            InputEvent::MouseDrag { pos, delta } => self.mouse_drag(pos, delta),
            InputEvent::Scroll { pos, delta } => self.scroll(pos, delta),
            InputEvent::Key {
                key,
                action,
                modifiers,
            } => self.key(key, action, modifiers),
            InputEvent::Character(character) => self.character(character),
            InputEvent::Resize(size) => self.resize(size),
        }
    }

    /// The pointer moved. With a button held this drags the capture widget.
    pub fn mouse_move(&mut self, pos: Point) -> bool {
        let delta = pos - self.mouse_pos;
        if self.mouse_buttons != 0 && self.drag_widget.is_some() {
            return self.mouse_drag(pos, delta);
        }
        self.mouse_pos = pos;
        self.update_hover(pos);

        let event = WidgetEvent::MouseMove(MouseMoveEvent {
            local_pos: pos,
            window_pos: pos,
            buttons: self.mouse_buttons,
            modifiers: self.modifiers,
        });
        let consumed = EventDispatcher::route_positional(&mut dispatch!(self), self.root, &event);
        self.finish_event();
        consumed
    }

    /// The pointer moved by `delta` with a button held.
    pub fn mouse_drag(&mut self, pos: Point, delta: Point) -> bool {
        self.mouse_pos = pos;
        self.update_hover(pos);
        let Some(target) = self.drag_widget else {
            return false;
        };

        let event = WidgetEvent::MouseDrag(MouseDragEvent {
            local_pos: pos,
            window_pos: pos,
            delta,
            buttons: self.mouse_buttons,
            modifiers: self.modifiers,
        });
        let consumed = EventDispatcher::send_event(&mut dispatch!(self), target, &event).was_handled();
        self.finish_event();
        consumed
    }

    /// A mouse button went down or up.
    pub fn mouse_button(
        &mut self,
        pos: Point,
        button: MouseButton,
        pressed: bool,
        modifiers: KeyboardModifiers,
    ) -> bool {
        self.mouse_pos = pos;
        self.modifiers = modifiers;
        let _span = PerfSpan::new(span_names::DISPATCH);

        let consumed = if pressed {
            self.mouse_buttons |= button.mask();
            self.press(pos, button, modifiers)
        } else {
            self.mouse_buttons &= !button.mask();
            self.release(pos, button, modifiers)
        };
        self.finish_event();
        consumed
    }

    fn press(&mut self, pos: Point, button: MouseButton, modifiers: KeyboardModifiers) -> bool {
        let path = EventDispatcher::path_at(&self.tree, self.root, pos);

        if let Some(modal) = self.focused_modal_window() {
            if !path.contains(&modal) {
                tracing::debug!(target: targets::DISPATCH, ?modal, "press outside modal window ignored");
                return true;
            }
        }

        let hit = path.last().copied().filter(|&id| id != self.root);
        if matches!(button, MouseButton::Left | MouseButton::Right) {
            self.drag_widget = hit;
            tracing::debug!(target: targets::DISPATCH, capture = ?hit, "drag capture");
        }

        if let Some(&top) = path.get(1) {
            if self.widget::<Window>(top).is_some() {
                self.move_window_to_front(top);
            }
        }

        match hit {
            None => self.focus.clear_focus(&mut dispatch!(self), FocusReason::Mouse),
            Some(_) => self.click_focus(&path, pos),
        }

        let event = WidgetEvent::MousePress(MousePressEvent::new(button, pos, modifiers));
        EventDispatcher::route_positional(&mut dispatch!(self), self.root, &event)
    }

    /// Focus the deepest widget on `path` that takes click focus, unless it
    /// vetoes at the press position.
    fn click_focus(&mut self, path: &[ObjectId], pos: Point) {
        let candidate = path.iter().rev().copied().find(|&id| {
            self.base(id).is_some_and(WidgetBase::accepts_click_focus)
        });
        let Some(candidate) = candidate else {
            return;
        };
        let Some(origin) = self.absolute_position(candidate) else {
            return;
        };
        let accepts = self
            .tree
            .get(candidate)
            .is_some_and(|widget| widget.accepts_click_focus_at(pos - origin, &self.services.theme));
        if accepts {
            self.focus.set_focus(&mut dispatch!(self), candidate, FocusReason::Mouse);
        }
    }

    fn release(&mut self, pos: Point, button: MouseButton, modifiers: KeyboardModifiers) -> bool {
        let path = EventDispatcher::path_at(&self.tree, self.root, pos);
        let event = WidgetEvent::MouseRelease(MouseReleaseEvent::new(button, pos, modifiers));
        let mut consumed = EventDispatcher::route_positional(&mut dispatch!(self), self.root, &event);

        if let Some(target) = self.drag_widget.filter(|target| !path.contains(target)) {
            consumed |= EventDispatcher::send_event(&mut dispatch!(self), target, &event).was_handled();
        }
        if self.mouse_buttons == 0 {
            self.drag_widget = None;
        }
        consumed
    }

    pub fn scroll(&mut self, pos: Point, delta: Point) -> bool {
        self.mouse_pos = pos;
        let event = WidgetEvent::Scroll(ScrollEvent {
            local_pos: pos,
            window_pos: pos,
            delta,
        });
        let consumed = EventDispatcher::route_positional(&mut dispatch!(self), self.root, &event);
        self.finish_event();
        consumed
    }

    /// A key changed state. Unconsumed Tab and Shift+Tab move focus.
    pub fn key(&mut self, key: Key, action: KeyAction, modifiers: KeyboardModifiers) -> bool {
        self.modifiers = modifiers;
        let event = match action {
            KeyAction::Press | KeyAction::Repeat => WidgetEvent::KeyPress(KeyPressEvent {
                key,
                modifiers,
                is_repeat: action == KeyAction::Repeat,
            }),
            KeyAction::Release => WidgetEvent::KeyRelease(KeyReleaseEvent { key, modifiers }),
        };

        let mut consumed = match self.focus.focused_widget() {
            Some(id) => EventDispatcher::send_event(&mut dispatch!(self), id, &event).was_handled(),
            None => false,
        };
        if !consumed && key == Key::Tab && action != KeyAction::Release {
            consumed = if modifiers.shift {
                self.focus.focus_previous(&mut dispatch!(self), self.root)
            } else {
                self.focus.focus_next(&mut dispatch!(self), self.root)
            };
        }
        self.finish_event();
        consumed
    }

    /// A text character was typed.
    pub fn character(&mut self, character: char) -> bool {
        let Some(id) = self.focus.focused_widget() else {
            return false;
        };
        let event = WidgetEvent::Character(CharacterEvent { character });
        let consumed = EventDispatcher::send_event(&mut dispatch!(self), id, &event).was_handled();
        self.finish_event();
        consumed
    }

    /// The host window changed size.
    pub fn resize(&mut self, size: Size) -> bool {
        if let Some(base) = self.base_mut(self.root) {
            base.set_size(size);
        }
        self.perform_layout();
        true
    }

    fn update_hover(&mut self, pos: Point) {
        let path = EventDispatcher::path_at(&self.tree, self.root, pos);
        let previous = std::mem::take(&mut self.hover_path);

        for &id in previous.iter().rev().filter(|id| !path.contains(id)) {
            if let Some(base) = self.base_mut(id) {
                base.set_mouse_focus(false);
            }
            EventDispatcher::send_event(&mut dispatch!(self), id, &WidgetEvent::MouseLeave);
        }
        for &id in path.iter().filter(|id| !previous.contains(id)) {
            if let Some(base) = self.base_mut(id) {
                base.set_mouse_focus(true);
            }
            EventDispatcher::send_event(&mut dispatch!(self), id, &WidgetEvent::MouseEnter);
        }
        self.hover_path = path;
    }

    // =========================================================================
    // Deferred work
    // =========================================================================

    /// Carry out handler requests and forget widgets that died meanwhile.
    fn finish_event(&mut self) {
        self.process_requests();

        self.focus.forget_dead(&self.tree);
        let tree = &self.tree;
        self.hover_path.retain(|&id| tree.contains(id));
        if self.drag_widget.is_some_and(|id| !tree.contains(id)) {
            self.drag_widget = None;
        }
        if let Some(cache) = self.raster_cache.as_mut() {
            cache.forget_where(|key: &RasterKey| !tree.contains(key.0));
        }
    }

    fn process_requests(&mut self) {
        for _ in 0..MAX_REQUEST_ROUNDS {
            if self.requests.is_empty() {
                return;
            }
            let focus = self.requests.focus.take();
            let layout = std::mem::take(&mut self.requests.layout);

            match focus {
                Some(FocusRequest::Set(id)) => {
                    self.focus.set_focus(&mut dispatch!(self), id, FocusReason::Other);
                }
                Some(FocusRequest::Clear) => {
                    self.focus.clear_focus(&mut dispatch!(self), FocusReason::Other);
                }
                None => {}
            }
            for id in layout {
                if self.tree.contains(id) {
                    self.layout_widget(id);
                }
            }
        }
        if !self.requests.is_empty() {
            tracing::warn!(
                target: targets::DISPATCH,
                rounds = MAX_REQUEST_ROUNDS,
                "handlers keep issuing requests, dropping the rest"
            );
            self.requests = Requests::default();
        }
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("root", &self.root)
            .field("widgets", &self.tree.len())
            .field("focused", &self.focus.focused_widget())
            .field("drag_widget", &self.drag_widget)
            .field("raster_cache", &self.raster_cache)
            .finish_non_exhaustive()
    }
}
