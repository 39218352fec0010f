//! Tests for buttons, check boxes and sliders driven through a screen.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use espalier::prelude::*;

use common::{click, place, press, release, screen};

type Changes = Rc<RefCell<Vec<(usize, bool)>>>;

fn recording_button(caption: &str, mode: ButtonMode, index: usize, changes: &Changes) -> Button {
    let changes = Rc::clone(changes);
    Button::new(caption)
        .with_mode(mode)
        .with_change_callback(move |_ctx, pushed| changes.borrow_mut().push((index, pushed)))
}

fn pushed(screen: &Screen, ids: &[ObjectId]) -> Vec<bool> {
    ids.iter()
        .map(|&id| screen.widget::<Button>(id).is_some_and(Button::is_pushed))
        .collect()
}

// =========================================================================
// Buttons
// =========================================================================

#[test]
fn test_normal_button_clicks() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let clicks = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&clicks);
    let button = place(
        &mut screen,
        root,
        Button::new("Go").with_callback(move |_ctx| *counter.borrow_mut() += 1),
        Rect::new(10.0, 10.0, 60.0, 30.0),
    );

    press(&mut screen, 20.0, 20.0);
    assert!(screen.widget::<Button>(button).unwrap().is_pushed());
    release(&mut screen, 20.0, 20.0);
    assert!(!screen.widget::<Button>(button).unwrap().is_pushed());
    assert_eq!(*clicks.borrow(), 1);

    // Released elsewhere: no click, but the button still pops back up.
    press(&mut screen, 20.0, 20.0);
    release(&mut screen, 300.0, 300.0);
    assert!(!screen.widget::<Button>(button).unwrap().is_pushed());
    assert_eq!(*clicks.borrow(), 1);
}

#[test]
fn test_toggle_twice_restores_state() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let changes: Changes = Rc::default();
    let toggle = place(
        &mut screen,
        root,
        recording_button("Snap", ButtonMode::Toggle, 0, &changes),
        Rect::new(10.0, 10.0, 60.0, 30.0),
    );

    click(&mut screen, 20.0, 20.0);
    assert!(screen.widget::<Button>(toggle).unwrap().is_pushed());
    click(&mut screen, 20.0, 20.0);
    assert!(!screen.widget::<Button>(toggle).unwrap().is_pushed());
    assert_eq!(*changes.borrow(), vec![(0, true), (0, false)]);
}

#[test]
fn test_radio_siblings_keep_one_pushed() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let changes: Changes = Rc::default();
    let panel = place(&mut screen, root, Panel::new(), Rect::new(0.0, 0.0, 400.0, 100.0));
    let radios: Vec<ObjectId> = (0..3)
        .map(|i| {
            let button = recording_button(&format!("R{i}"), ButtonMode::Radio, i, &changes);
            place(&mut screen, panel, button, Rect::new(10.0 + 70.0 * i as f32, 10.0, 60.0, 30.0))
        })
        .collect();

    click(&mut screen, 20.0, 20.0);
    assert_eq!(pushed(&screen, &radios), vec![true, false, false]);
    click(&mut screen, 90.0, 20.0);
    assert_eq!(pushed(&screen, &radios), vec![false, true, false]);
    click(&mut screen, 160.0, 20.0);
    assert_eq!(pushed(&screen, &radios), vec![false, false, true]);

    // Clicking the pushed radio again changes nothing.
    click(&mut screen, 160.0, 20.0);
    assert_eq!(pushed(&screen, &radios), vec![false, false, true]);

    assert_eq!(
        *changes.borrow(),
        vec![(0, true), (0, false), (1, true), (1, false), (2, true)]
    );
}

#[test]
fn test_explicit_radio_group_spans_parents() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let changes: Changes = Rc::default();
    let left = place(&mut screen, root, Panel::new(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let right = place(&mut screen, root, Panel::new(), Rect::new(100.0, 0.0, 100.0, 100.0));
    let a = place(
        &mut screen,
        left,
        recording_button("A", ButtonMode::Radio, 0, &changes),
        Rect::new(10.0, 10.0, 60.0, 30.0),
    );
    let b = place(
        &mut screen,
        right,
        recording_button("B", ButtonMode::Radio, 1, &changes),
        Rect::new(10.0, 10.0, 60.0, 30.0),
    );
    screen.set_button_group(&[a, b]);

    click(&mut screen, 20.0, 20.0);
    click(&mut screen, 120.0, 20.0);
    assert_eq!(pushed(&screen, &[a, b]), vec![false, true]);
    assert_eq!(screen.widget::<Button>(a).unwrap().group(), &[a, b]);
}

#[test]
fn test_popup_buttons_show_one_popup() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let window = place(&mut screen, root, Window::new("Menu"), Rect::new(0.0, 0.0, 300.0, 200.0));
    let popups: Vec<ObjectId> = (0..2)
        .map(|_| {
            let popup = Popup::new(window).with_anchor(Point::new(400.0, 300.0));
            place(&mut screen, root, popup, Rect::new(0.0, 0.0, 80.0, 60.0))
        })
        .collect();
    let buttons: Vec<ObjectId> = (0..2)
        .map(|i| {
            let button = Button::new(format!("P{i}"))
                .with_mode(ButtonMode::Popup)
                .with_popup(popups[i]);
            place(&mut screen, window, button, Rect::new(10.0 + 70.0 * i as f32, 40.0, 60.0, 30.0))
        })
        .collect();
    let visible = |screen: &Screen| -> Vec<bool> {
        popups
            .iter()
            .map(|&id| screen.base(id).is_some_and(WidgetBase::is_visible))
            .collect()
    };

    assert_eq!(visible(&screen), vec![false, false]);
    click(&mut screen, 20.0, 50.0);
    assert_eq!(visible(&screen), vec![true, false]);
    click(&mut screen, 90.0, 50.0);
    assert_eq!(visible(&screen), vec![false, true]);
    assert_eq!(pushed(&screen, &buttons), vec![false, true]);

    screen.set_button_pushed(buttons[1], false).unwrap();
    assert_eq!(visible(&screen), vec![false, false]);
}

#[test]
fn test_popup_button_click_again_closes_popup() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let changes: Changes = Rc::default();
    let window = place(&mut screen, root, Window::new("Menu"), Rect::new(0.0, 0.0, 300.0, 200.0));
    let popup = place(
        &mut screen,
        root,
        Popup::new(window).with_anchor(Point::new(400.0, 300.0)),
        Rect::new(400.0, 300.0, 80.0, 60.0),
    );
    let button = place(
        &mut screen,
        window,
        recording_button("More", ButtonMode::Popup, 0, &changes).with_popup(popup),
        Rect::new(10.0, 40.0, 60.0, 30.0),
    );

    click(&mut screen, 20.0, 50.0);
    assert!(screen.widget::<Button>(button).unwrap().is_pushed());
    assert!(screen.base(popup).unwrap().is_visible());

    click(&mut screen, 20.0, 50.0);
    assert!(!screen.widget::<Button>(button).unwrap().is_pushed());
    assert!(!screen.base(popup).unwrap().is_visible());
    assert_eq!(*changes.borrow(), vec![(0, true), (0, false)]);
}

#[test]
fn test_popup_follows_window_visibility() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let window = place(&mut screen, root, Window::new("Menu"), Rect::new(20.0, 20.0, 300.0, 200.0));
    let popup = place(
        &mut screen,
        root,
        Popup::new(window).with_anchor(Point::new(310.0, 50.0)),
        Rect::new(0.0, 0.0, 80.0, 60.0),
    );
    let button = place(
        &mut screen,
        window,
        Button::new("More").with_mode(ButtonMode::Popup).with_popup(popup),
        Rect::new(10.0, 40.0, 60.0, 30.0),
    );
    screen.set_button_pushed(button, true).unwrap();

    let mut renderer = RecordingRenderer::new();
    screen.paint(&mut renderer);
    assert_eq!(screen.base(popup).unwrap().pos(), Point::new(330.0, 40.0));
    assert!(screen.base(popup).unwrap().is_visible());

    screen.base_mut(window).unwrap().hide();
    screen.paint(&mut renderer);
    assert!(!screen.base(popup).unwrap().is_visible());
}

#[test]
fn test_disabled_button_ignores_presses() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let changes: Changes = Rc::default();
    let toggle = place(
        &mut screen,
        root,
        recording_button("Off", ButtonMode::Toggle, 0, &changes),
        Rect::new(10.0, 10.0, 60.0, 30.0),
    );
    screen.base_mut(toggle).unwrap().set_enabled(false);

    click(&mut screen, 20.0, 20.0);
    assert!(!screen.widget::<Button>(toggle).unwrap().is_pushed());
    assert!(changes.borrow().is_empty());
}

// =========================================================================
// Check Box
// =========================================================================

#[test]
fn test_check_box_toggles_on_release_inside() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let check = place(
        &mut screen,
        root,
        CheckBox::new("Wrap").with_callback(move |_ctx, checked| log.borrow_mut().push(checked)),
        Rect::new(10.0, 10.0, 100.0, 20.0),
    );

    press(&mut screen, 15.0, 15.0);
    assert!(screen.widget::<CheckBox>(check).unwrap().is_pushed());
    assert!(!screen.widget::<CheckBox>(check).unwrap().is_checked());
    release(&mut screen, 15.0, 15.0);
    assert!(screen.widget::<CheckBox>(check).unwrap().is_checked());

    // Dragged off before release: unchanged.
    press(&mut screen, 15.0, 15.0);
    release(&mut screen, 400.0, 400.0);
    assert!(screen.widget::<CheckBox>(check).unwrap().is_checked());
    assert!(!screen.widget::<CheckBox>(check).unwrap().is_pushed());

    click(&mut screen, 15.0, 15.0);
    assert_eq!(*seen.borrow(), vec![true, false]);
}

// =========================================================================
// Slider
// =========================================================================

#[test]
fn test_slider_tracks_captured_drag() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let values = Rc::new(RefCell::new(Vec::new()));
    let finals = Rc::new(RefCell::new(Vec::new()));
    let (v, f) = (Rc::clone(&values), Rc::clone(&finals));
    let slider = place(
        &mut screen,
        root,
        Slider::new(0.0)
            .with_callback(move |_ctx, value| v.borrow_mut().push(value))
            .with_final_callback(move |_ctx, value| f.borrow_mut().push(value)),
        Rect::new(20.0, 20.0, 100.0, 12.0),
    );

    press(&mut screen, 70.0, 26.0);
    assert_eq!(screen.drag_widget(), Some(slider));
    assert_eq!(screen.widget::<Slider>(slider).unwrap().value(), 0.5);

    screen.mouse_move(Point::new(95.0, 26.0));
    assert_eq!(screen.widget::<Slider>(slider).unwrap().value(), 0.75);

    // Leaving the slider keeps the capture and clamps.
    screen.mouse_move(Point::new(300.0, 200.0));
    assert_eq!(screen.widget::<Slider>(slider).unwrap().value(), 1.0);

    release(&mut screen, 300.0, 200.0);
    assert_eq!(screen.drag_widget(), None);
    assert_eq!(*values.borrow(), vec![0.5, 0.75, 1.0, 1.0]);
    assert_eq!(*finals.borrow(), vec![1.0]);
}
