//! Tests for input routing, layout and painting at the screen level.

mod common;

use std::time::Duration;

use espalier::platform::{ManualClock, MemoryClipboard};
use espalier::prelude::*;

use common::{click, init_tracing, place, press, release, screen};

// =========================================================================
// Pointer
// =========================================================================

#[test]
fn test_title_bar_drag_moves_window() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let window = place(&mut screen, root, Window::new("Drag me"), Rect::new(10.0, 10.0, 200.0, 150.0));

    press(&mut screen, 50.0, 20.0);
    assert_eq!(screen.drag_widget(), Some(window));
    assert!(screen.widget::<Window>(window).unwrap().is_dragging());
    screen.mouse_move(Point::new(80.0, 40.0));
    release(&mut screen, 80.0, 40.0);
    assert_eq!(screen.base(window).unwrap().pos(), Point::new(40.0, 30.0));
    assert!(!screen.widget::<Window>(window).unwrap().is_dragging());

    // Dragging the body does nothing.
    press(&mut screen, 100.0, 120.0);
    screen.mouse_move(Point::new(150.0, 170.0));
    release(&mut screen, 150.0, 170.0);
    assert_eq!(screen.base(window).unwrap().pos(), Point::new(40.0, 30.0));
}

#[test]
fn test_window_drag_stays_inside_screen() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let window = place(&mut screen, root, Window::new("Edge"), Rect::new(10.0, 10.0, 200.0, 150.0));

    press(&mut screen, 50.0, 20.0);
    screen.mouse_move(Point::new(0.0, 0.0));
    release(&mut screen, 0.0, 0.0);
    assert_eq!(screen.base(window).unwrap().pos(), Point::ZERO);
}

#[test]
fn test_hover_tracks_pointer() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let button = place(&mut screen, root, Button::new("Hover"), Rect::new(10.0, 10.0, 60.0, 30.0));

    screen.mouse_move(Point::new(20.0, 20.0));
    assert_eq!(screen.hover_path(), &[root, button]);
    assert!(screen.base(button).unwrap().mouse_focus());

    screen.mouse_move(Point::new(300.0, 300.0));
    assert_eq!(screen.hover_path(), &[root]);
    assert!(!screen.base(button).unwrap().mouse_focus());
}

#[test]
fn test_press_raises_window() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let back = place(&mut screen, root, Window::new("Back"), Rect::new(0.0, 0.0, 200.0, 200.0));
    let front = place(&mut screen, root, Window::new("Front"), Rect::new(100.0, 100.0, 200.0, 200.0));

    click(&mut screen, 50.0, 50.0);
    assert_eq!(screen.tree().children(root).unwrap(), &[front, back]);
    assert_eq!(screen.focused(), Some(back));

    click(&mut screen, 150.0, 150.0);
    assert_eq!(screen.tree().children(root).unwrap(), &[front, back]);
    assert_eq!(screen.focused(), Some(back));
}

#[test]
fn test_modal_window_blocks_outside_presses() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let button = place(
        &mut screen,
        root,
        Button::new("Behind").with_mode(ButtonMode::Toggle),
        Rect::new(10.0, 10.0, 60.0, 30.0),
    );
    let dialog = place(
        &mut screen,
        root,
        Window::new("Confirm").with_modal(true),
        Rect::new(200.0, 150.0, 200.0, 120.0),
    );
    let ok = place(
        &mut screen,
        dialog,
        Button::new("OK").with_mode(ButtonMode::Toggle),
        Rect::new(10.0, 40.0, 60.0, 30.0),
    );
    assert!(screen.set_focus(dialog));

    assert!(press(&mut screen, 20.0, 20.0));
    release(&mut screen, 20.0, 20.0);
    assert!(!screen.widget::<Button>(button).unwrap().is_pushed());
    assert_eq!(screen.focused(), Some(dialog));

    click(&mut screen, 220.0, 200.0);
    assert!(screen.widget::<Button>(ok).unwrap().is_pushed());
}

#[test]
fn test_handler_removing_its_widget() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let button = place(
        &mut screen,
        root,
        Button::new("Close").with_callback(|ctx| {
            ctx.remove_widget(ctx.id());
        }),
        Rect::new(10.0, 10.0, 60.0, 30.0),
    );

    screen.mouse_move(Point::new(20.0, 20.0));
    click(&mut screen, 20.0, 20.0);
    assert!(!screen.tree().contains(button));
    assert_eq!(screen.hover_path(), &[root]);
    assert_eq!(screen.drag_widget(), None);
    assert!(screen.tree().children(root).unwrap().is_empty());
}

#[test]
fn test_scroll_consumed_by_window() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    place(&mut screen, root, Window::new("Scroll"), Rect::new(10.0, 10.0, 200.0, 150.0));

    assert!(screen.scroll(Point::new(50.0, 50.0), Point::new(0.0, -1.0)));
    assert!(!screen.scroll(Point::new(500.0, 400.0), Point::new(0.0, -1.0)));
}

// =========================================================================
// Layout
// =========================================================================

#[test]
fn test_window_layout_stacks_children_below_title() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let window = screen
        .add_widget(
            root,
            Window::new("Tools").with_layout(
                BoxLayout::new(Orientation::Vertical)
                    .with_margin(6.0)
                    .with_spacing(4.0),
            ),
        )
        .unwrap();
    let first = screen.add_widget(window, Button::new("One")).unwrap();
    let second = screen.add_widget(window, Button::new("Two")).unwrap();
    screen.perform_layout();

    let header = screen.theme().window_header_height;
    let a = screen.base(first).unwrap().geometry();
    let b = screen.base(second).unwrap().geometry();
    assert!(a.top() >= header);
    assert_eq!(b.top(), a.bottom() + 4.0);
    assert_eq!(a.size, Size::new(50.0, 30.0));

    let window_size = screen.base(window).unwrap().size();
    assert!(window_size.height >= b.bottom());
}

#[test]
fn test_resize_updates_root() {
    let (mut screen, _clock) = screen();
    screen.resize(Size::new(800.0, 600.0));
    assert_eq!(screen.size(), Size::new(800.0, 600.0));
    assert_eq!(
        screen.base(screen.root()).unwrap().geometry(),
        Rect::new(0.0, 0.0, 800.0, 600.0)
    );
}

// =========================================================================
// Painting
// =========================================================================

#[test]
fn test_paint_reuses_cached_text() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let button = place(&mut screen, root, Button::new("Snap"), Rect::new(10.0, 10.0, 60.0, 30.0));
    let mut renderer = RecordingRenderer::new();

    screen.paint(&mut renderer);
    assert_eq!(renderer.rasterize_count("Snap"), 1);
    assert!(!screen.base(button).unwrap().needs_repaint());

    screen.paint(&mut renderer);
    assert_eq!(renderer.rasterize_count("Snap"), 1);

    screen.widget_mut::<Button>(button).unwrap().set_caption("Grid");
    assert!(screen.widget::<Button>(button).unwrap().is_caption_dirty());
    assert!(screen.base(button).unwrap().needs_repaint());
    screen.paint(&mut renderer);
    assert_eq!(renderer.rasterize_count("Grid"), 1);
    assert!(!screen.widget::<Button>(button).unwrap().is_caption_dirty());
}

#[test]
fn test_hidden_widgets_not_painted() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let window = place(&mut screen, root, Window::new("Hidden"), Rect::new(10.0, 10.0, 200.0, 150.0));
    place(&mut screen, window, Button::new("Inside"), Rect::new(10.0, 40.0, 60.0, 30.0));
    screen.base_mut(window).unwrap().hide();

    let mut renderer = RecordingRenderer::new();
    screen.paint(&mut renderer);
    assert_eq!(renderer.rasterize_count("Hidden"), 0);
    assert_eq!(renderer.rasterize_count("Inside"), 0);
}

#[test]
fn test_async_button_body_built_once_per_state() {
    init_tracing();
    let mut screen = Screen::builder(Size::new(320.0, 240.0))
        .with_clipboard(MemoryClipboard::new())
        .with_clock(ManualClock::new())
        .with_async_raster(true)
        .build()
        .unwrap();
    let root = screen.root();
    let button = place(
        &mut screen,
        root,
        Button::new("Async").with_async_body(true),
        Rect::new(10.0, 10.0, 60.0, 30.0),
    );
    let mut renderer = RecordingRenderer::new();

    screen.paint(&mut renderer);
    screen.paint(&mut renderer);
    assert_eq!(screen.raster_stats().unwrap().requested, 1);

    for _ in 0..500 {
        if screen.raster_stats().unwrap().built >= 1 {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(screen.raster_stats().unwrap().built, 1);

    renderer.clear_commands();
    screen.paint(&mut renderer);
    assert_eq!(screen.raster_stats().unwrap().requested, 1);
    // Body and caption.
    assert_eq!(renderer.blit_count(), 2);

    // Hovering changes the body's look, so a new build is scheduled.
    screen.mouse_move(Point::new(20.0, 20.0));
    assert!(screen.base(button).unwrap().mouse_focus());
    screen.paint(&mut renderer);
    assert_eq!(screen.raster_stats().unwrap().requested, 2);
}

#[test]
fn test_async_button_body_rebuilt_after_color_change() {
    init_tracing();
    let mut screen = Screen::builder(Size::new(320.0, 240.0))
        .with_clipboard(MemoryClipboard::new())
        .with_clock(ManualClock::new())
        .with_async_raster(true)
        .build()
        .unwrap();
    let root = screen.root();
    let button = place(
        &mut screen,
        root,
        Button::new("Tint").with_async_body(true),
        Rect::new(10.0, 10.0, 60.0, 30.0),
    );
    let mut renderer = RecordingRenderer::new();

    screen.paint(&mut renderer);
    wait_until_built(&screen, 1);

    screen
        .widget_mut::<Button>(button)
        .unwrap()
        .set_background_color(Some(Color::new(1.0, 0.0, 0.0, 1.0)));
    renderer.clear_commands();
    screen.paint(&mut renderer);
    assert_eq!(screen.raster_stats().unwrap().requested, 2);
    // Only the caption; the old body is gone.
    assert_eq!(renderer.blit_count(), 1);

    wait_until_built(&screen, 2);
    renderer.clear_commands();
    screen.paint(&mut renderer);
    assert_eq!(screen.raster_stats().unwrap().requested, 2);
    assert_eq!(renderer.blit_count(), 2);
}

fn wait_until_built(screen: &Screen, count: usize) {
    for _ in 0..500 {
        if screen.raster_stats().unwrap().built >= count {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(screen.raster_stats().unwrap().built, count);
}

#[test]
fn test_screen_without_async_raster() {
    let (screen, _clock) = screen();
    assert!(screen.raster_stats().is_none());
}

#[test]
fn test_debug_tree_lists_widgets() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let window = place(&mut screen, root, Window::new("Main"), Rect::new(0.0, 0.0, 100.0, 100.0));
    screen.base_mut(window).unwrap().set_name("main");
    place(&mut screen, window, Button::new("OK"), Rect::new(0.0, 40.0, 40.0, 20.0));

    let tree = screen.debug_tree().unwrap();
    assert!(tree.contains("\"screen\""));
    assert!(tree.contains("\"main\""));
    assert!(tree.contains("Button"));
}
