//! Tests for text box editing through a screen.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use espalier::prelude::*;

use common::{click, key, place, screen, type_text};

const FIELD: Rect = Rect::new(10.0, 10.0, 200.0, 28.0);

fn editable(value: &str) -> TextBox {
    TextBox::new(value)
        .with_editable(true)
        .with_alignment(TextAlignment::Left)
}

fn text_box(screen: &Screen, id: ObjectId) -> &TextBox {
    screen.widget::<TextBox>(id).expect("text box")
}

#[test]
fn test_typing_then_enter_commits() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let field = place(
        &mut screen,
        root,
        editable("").with_callback(move |_ctx, value| {
            log.borrow_mut().push(value.to_string());
            true
        }),
        FIELD,
    );

    click(&mut screen, 50.0, 20.0);
    assert_eq!(screen.focused(), Some(field));
    assert!(!text_box(&screen, field).is_committed());

    type_text(&mut screen, "abc");
    assert_eq!(text_box(&screen, field).editing_text(), "abc");
    assert_eq!(text_box(&screen, field).value(), "");
    assert_eq!(text_box(&screen, field).cursor(), Some(3));

    key(&mut screen, Key::Enter, KeyboardModifiers::NONE);
    assert_eq!(text_box(&screen, field).value(), "abc");
    assert!(text_box(&screen, field).is_committed());
    assert_eq!(screen.focused(), None);
    assert_eq!(*seen.borrow(), vec!["abc".to_string()]);
}

#[test]
fn test_invalid_format_keeps_old_value() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let field = place(&mut screen, root, editable("12").with_format("[0-9]+"), FIELD);

    click(&mut screen, 50.0, 20.0);
    key(&mut screen, Key::End, KeyboardModifiers::NONE);
    type_text(&mut screen, "x");
    assert!(!text_box(&screen, field).is_valid_format());

    key(&mut screen, Key::Enter, KeyboardModifiers::NONE);
    assert_eq!(text_box(&screen, field).value(), "12");
    assert!(text_box(&screen, field).is_valid_format());
}

#[test]
fn test_callback_can_reject_value() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let field = place(
        &mut screen,
        root,
        editable("good").with_callback(|_ctx, value| value != "bad"),
        FIELD,
    );

    screen.set_focus(field);
    key(&mut screen, Key::A, KeyboardModifiers::CTRL);
    type_text(&mut screen, "bad");
    key(&mut screen, Key::Enter, KeyboardModifiers::NONE);
    assert_eq!(text_box(&screen, field).value(), "good");
}

#[test]
fn test_empty_text_commits_default_value() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let field = place(&mut screen, root, editable("7").with_default_value("0"), FIELD);

    screen.set_focus(field);
    key(&mut screen, Key::Delete, KeyboardModifiers::NONE);
    assert_eq!(text_box(&screen, field).editing_text(), "");
    key(&mut screen, Key::Enter, KeyboardModifiers::NONE);
    assert_eq!(text_box(&screen, field).value(), "0");
}

#[test]
fn test_focus_loss_commits() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let field = place(&mut screen, root, editable(""), FIELD);

    screen.set_focus(field);
    type_text(&mut screen, "draft");
    click(&mut screen, 400.0, 400.0);
    assert_eq!(screen.focused(), None);
    assert_eq!(text_box(&screen, field).value(), "draft");
}

#[test]
fn test_double_click_selects_all() {
    let (mut screen, clock) = screen();
    let root = screen.root();
    let field = place(&mut screen, root, editable("hello"), FIELD);

    click(&mut screen, 50.0, 20.0);
    clock.advance_ms(100);
    click(&mut screen, 50.0, 20.0);
    assert_eq!(text_box(&screen, field).selection(), Some(0));
    assert_eq!(text_box(&screen, field).cursor(), Some(5));

    type_text(&mut screen, "z");
    assert_eq!(text_box(&screen, field).editing_text(), "z");

    // Too slow for a double click.
    clock.advance_ms(1000);
    click(&mut screen, 50.0, 20.0);
    clock.advance_ms(1000);
    click(&mut screen, 50.0, 20.0);
    assert_eq!(text_box(&screen, field).selection(), None);
}

#[test]
fn test_spinnable_double_click_resets_to_default() {
    let (mut screen, clock) = screen();
    let root = screen.root();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let field = place(
        &mut screen,
        root,
        TextBox::new("5")
            .with_spinnable(true)
            .with_default_value("0")
            .with_callback(move |_ctx, value| {
                log.borrow_mut().push(value.to_string());
                true
            }),
        FIELD,
    );

    click(&mut screen, 100.0, 20.0);
    assert_eq!(text_box(&screen, field).value(), "5");
    clock.advance_ms(50);
    click(&mut screen, 100.0, 20.0);
    assert_eq!(text_box(&screen, field).value(), "0");
    assert_eq!(*seen.borrow(), vec!["0".to_string()]);
}

#[test]
fn test_spin_area_does_not_take_focus() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let field = place(&mut screen, root, editable("5").with_spinnable(true), FIELD);

    click(&mut screen, 15.0, 20.0);
    assert_eq!(screen.focused(), None);
    click(&mut screen, 100.0, 20.0);
    assert_eq!(screen.focused(), Some(field));
}

#[test]
fn test_copy_and_paste() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let field = place(&mut screen, root, editable("hello"), FIELD);

    screen.set_focus(field);
    key(&mut screen, Key::A, KeyboardModifiers::CTRL);
    key(&mut screen, Key::C, KeyboardModifiers::CTRL);
    assert_eq!(screen.clipboard().get_text().unwrap(), "hello");

    key(&mut screen, Key::End, KeyboardModifiers::NONE);
    key(&mut screen, Key::V, KeyboardModifiers::CTRL);
    assert_eq!(text_box(&screen, field).editing_text(), "hellohello");
    assert_eq!(text_box(&screen, field).cursor(), Some(10));

    key(&mut screen, Key::Home, KeyboardModifiers::SHIFT);
    key(&mut screen, Key::X, KeyboardModifiers::CTRL);
    assert_eq!(text_box(&screen, field).editing_text(), "");
    assert_eq!(screen.clipboard().get_text().unwrap(), "hellohello");
}

#[test]
fn test_selection_editing_keys() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let field = place(&mut screen, root, editable("abcdef"), FIELD);

    screen.set_focus(field);
    key(&mut screen, Key::ArrowRight, KeyboardModifiers::NONE);
    key(&mut screen, Key::ArrowRight, KeyboardModifiers::SHIFT);
    key(&mut screen, Key::ArrowRight, KeyboardModifiers::SHIFT);
    assert_eq!(text_box(&screen, field).selection(), Some(1));
    assert_eq!(text_box(&screen, field).cursor(), Some(3));

    key(&mut screen, Key::Backspace, KeyboardModifiers::NONE);
    assert_eq!(text_box(&screen, field).editing_text(), "adef");
    assert_eq!(text_box(&screen, field).cursor(), Some(1));

    key(&mut screen, Key::Backspace, KeyboardModifiers::NONE);
    key(&mut screen, Key::Backspace, KeyboardModifiers::NONE);
    assert_eq!(text_box(&screen, field).editing_text(), "def");
    assert_eq!(text_box(&screen, field).cursor(), Some(0));
}

#[test]
fn test_tab_moves_between_fields() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let first = place(&mut screen, root, editable(""), FIELD);
    let second = place(&mut screen, root, editable(""), Rect::new(10.0, 50.0, 200.0, 28.0));

    assert!(key(&mut screen, Key::Tab, KeyboardModifiers::NONE));
    assert_eq!(screen.focused(), Some(first));
    type_text(&mut screen, "one");

    key(&mut screen, Key::Tab, KeyboardModifiers::NONE);
    assert_eq!(screen.focused(), Some(second));
    assert_eq!(text_box(&screen, first).value(), "one");

    key(&mut screen, Key::Tab, KeyboardModifiers::SHIFT);
    assert_eq!(screen.focused(), Some(first));
}

#[test]
fn test_read_only_box_ignores_typing() {
    let (mut screen, _clock) = screen();
    let root = screen.root();
    let field = place(&mut screen, root, TextBox::new("fixed"), FIELD);

    assert!(!screen.set_focus(field));
    click(&mut screen, 50.0, 20.0);
    assert_eq!(screen.focused(), None);
    type_text(&mut screen, "x");
    assert_eq!(text_box(&screen, field).editing_text(), "fixed");
}
