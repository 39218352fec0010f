//! Top-level window widget.

use espalier_core::ObjectId;
use espalier_render::text::FONT_SANS_BOLD;
use espalier_render::{CachedBitmap, Point, Rect, Size};

use crate::theme::Theme;
use crate::widget::layout;
use crate::widget::{
    EventContext, FocusPolicy, LayoutContext, MeasureContext, MouseButton, PaintContext, Widget,
    WidgetBase, WidgetEvent,
};

/// A titled, draggable container.
///
/// Windows are usually direct children of the screen root. Pressing inside
/// one raises it, and dragging its title bar moves it within its parent.
///
/// A window can carry a button panel: a [`Panel`](super::Panel) in the title
/// bar created through [`Screen::window_button_panel`](crate::Screen::window_button_panel).
/// The panel is placed in the top right corner and is not part of the
/// window's layout.
pub struct Window {
    base: WidgetBase,
    title: String,
    modal: bool,
    drag: bool,
    button_panel: Option<ObjectId>,
    title_cache: CachedBitmap,
    /// Focus state the title bitmap was built for.
    title_focused: bool,
}

impl Window {
    pub fn new(title: impl Into<String>) -> Self {
        let mut base = WidgetBase::new();
        base.set_focus_policy(FocusPolicy::ClickFocus);
        Self {
            base,
            title: title.into(),
            modal: false,
            drag: false,
            button_panel: None,
            title_cache: CachedBitmap::new(),
            title_focused: false,
        }
    }

    pub fn with_modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    pub fn with_layout(mut self, layout: impl layout::Layout + 'static) -> Self {
        self.base.set_layout(Box::new(layout));
        self
    }

    pub fn with_position(mut self, pos: Point) -> Self {
        self.base.set_pos(pos);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if self.title != title {
            self.title = title;
            self.title_cache.mark_dirty();
            self.base.update();
        }
    }

    /// A modal window with focus swallows presses outside itself.
    pub fn is_modal(&self) -> bool {
        self.modal
    }

    pub fn set_modal(&mut self, modal: bool) {
        self.modal = modal;
    }

    /// Whether a title-bar drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag
    }

    pub fn button_panel(&self) -> Option<ObjectId> {
        self.button_panel
    }

    pub(crate) fn set_button_panel(&mut self, panel: ObjectId) {
        self.button_panel = Some(panel);
    }

    pub fn is_title_dirty(&self) -> bool {
        self.title_cache.is_dirty()
    }

    fn title_bounds(&self, ctx: &MeasureContext<'_>) -> Size {
        ctx.measurer()
            .bounds(FONT_SANS_BOLD, ctx.theme().window_title_font_size, &self.title)
    }

    fn drag_to(&mut self, ctx: &EventContext<'_>, delta: Point) {
        let parent_size = ctx
            .parent()
            .and_then(|parent| ctx.base_of(parent))
            .map(WidgetBase::size)
            .unwrap_or(Size::ZERO);
        let size = self.base.size();
        let moved = self.base.pos() + delta;
        let x = moved.x.max(0.0).min(parent_size.width - size.width);
        let y = moved.y.max(0.0).min(parent_size.height - size.height);
        self.base.set_pos(Point::new(x, y));
    }
}

impl Widget for Window {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn header_height(&self, theme: &Theme) -> f32 {
        if self.title.is_empty() {
            0.0
        } else {
            theme.window_header_height
        }
    }

    fn layout_children(&self, children: &[ObjectId]) -> Vec<ObjectId> {
        children
            .iter()
            .copied()
            .filter(|&child| Some(child) != self.button_panel)
            .collect()
    }

    fn preferred_size(&self, ctx: &MeasureContext<'_>) -> Size {
        let children = self.layout_children(ctx.children());
        let from_layout = layout::preferred_size_with(
            &self.base,
            ctx,
            &children,
            self.header_height(ctx.theme()),
        );
        let title = self.title_bounds(ctx);
        from_layout.max(Size::new(title.width + 20.0, title.height))
    }

    fn perform_layout(&mut self, ctx: &mut LayoutContext<'_>) {
        let children = self.layout_children(&ctx.children());
        let header = self.header_height(ctx.theme());
        layout::perform_layout_with(&self.base, ctx, &children, header);

        let Some(panel) = self.button_panel else {
            return;
        };
        let cell = ctx.theme().window_panel_cell;
        let font_size = ctx.theme().window_panel_font_size;
        for child in ctx.children_of(panel) {
            if let Some(base) = ctx.base_mut(child) {
                base.set_fixed_size(Size::new(cell, cell));
                base.set_font_size(font_size);
            }
        }
        let preferred = ctx.preferred_size_of(panel);
        let width = self.base.width();
        if let Some(base) = ctx.base_mut(panel) {
            base.set_size(Size::new(width, cell));
            base.set_pos(Point::new(width - (preferred.width + 5.0), 3.0));
        }
        ctx.layout_child(panel);
    }

    fn event(&mut self, ctx: &mut EventContext<'_>, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::MousePress(e) if e.button == MouseButton::Left => {
                self.drag = e.local_pos.y < ctx.theme().window_header_height;
                true
            }
            WidgetEvent::MouseRelease(e) if e.button == MouseButton::Left => {
                self.drag = false;
                true
            }
            WidgetEvent::MouseDrag(e) if self.drag && e.is_held(MouseButton::Left) => {
                self.drag_to(ctx, e.delta);
                true
            }
            WidgetEvent::Scroll(_) => true,
            WidgetEvent::FocusIn(_) | WidgetEvent::FocusOut(_) => {
                self.title_cache.mark_dirty();
                self.base.update();
                false
            }
            WidgetEvent::MouseEnter | WidgetEvent::MouseLeave => {
                self.base.update();
                false
            }
            _ => false,
        }
    }

    fn paint(&mut self, ctx: &mut PaintContext<'_>) {
        let theme = ctx.theme();
        let (w, h) = (self.base.width(), self.base.height());
        let shadow = theme.window_drop_shadow_size;
        let header = self.header_height(theme);

        ctx.fill_rect(
            Rect::new(-shadow * 0.5, -shadow * 0.5 + 2.0, w + shadow, h + shadow),
            theme.drop_shadow,
        );

        let fill = if self.base.mouse_focus() {
            theme.window_fill_focused
        } else {
            theme.window_fill_unfocused
        };
        ctx.fill_rect(self.base.rect(), fill);

        if header > 0.0 {
            let half = (header * 0.5).floor();
            ctx.fill_rect(Rect::new(0.0, 0.0, w, half), theme.window_header_gradient_top);
            ctx.fill_rect(Rect::new(0.0, half, w, header - half), theme.window_header_gradient_bot);
            ctx.draw_line(Point::new(0.5, 0.5), Point::new(w - 0.5, 0.5), 1.0, theme.window_header_sep_top);
            ctx.draw_line(
                Point::new(0.5, header - 1.5),
                Point::new(w - 0.5, header - 1.5),
                1.0,
                theme.window_header_sep_bot,
            );

            let focused = self.base.has_focus();
            if self.title_focused != focused {
                self.title_focused = focused;
                self.title_cache.mark_dirty();
            }
            let color = if focused {
                theme.window_title_focused
            } else {
                theme.window_title_unfocused
            };
            let title = &self.title;
            let bitmap = self.title_cache.get_or_rebuild(|| {
                ctx.rasterize_text(FONT_SANS_BOLD, theme.window_title_font_size, title, color)
            });
            let size = bitmap.size();
            ctx.blit(
                &bitmap,
                Point::new((w - size.width) * 0.5, (header - size.height) * 0.5 - 1.0),
            );
        }

        ctx.stroke_rect(Rect::new(0.5, 0.5, w - 1.0, h - 1.0), 1.0, theme.border_dark);
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("title", &self.title)
            .field("modal", &self.modal)
            .field("drag", &self.drag)
            .field("button_panel", &self.button_panel)
            .finish_non_exhaustive()
    }
}
