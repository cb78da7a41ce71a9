//! Level 5: Keyboard Tests
//!
//! Tests shortcuts delivered as slint window events: undo/redo, delete,
//! escape, select-all, and modifier tracking.

mod common;

use common::harness::EditorHarness;
use serde_json::{json, Value};
use slint::platform::{Key, WindowEvent};
use slint_node_interaction::{InteractionContext, Modifiers, PanelSurface};

fn add_node(harness: &EditorHarness) {
    assert!(harness.run("node.add", json!({ "kind": "n", "x": 0.0, "y": 600.0 })).success);
}

// ============================================================================
// Undo / Redo Shortcuts
// ============================================================================

#[test]
fn test_ctrl_z_undoes() {
    let harness = EditorHarness::new();
    add_node(&harness);
    assert_eq!(harness.node_count(), 3);

    let results = harness.shortcut(&[Key::Control], "z");
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(harness.node_count(), 2);
    assert_eq!(harness.redo_len(), 1);
}

#[test]
fn test_ctrl_shift_z_and_ctrl_y_redo() {
    let harness = EditorHarness::new();
    add_node(&harness);
    add_node(&harness);
    harness.shortcut(&[Key::Control], "z");
    harness.shortcut(&[Key::Control], "z");
    assert_eq!(harness.node_count(), 2);

    harness.shortcut(&[Key::Control, Key::Shift], "Z");
    assert_eq!(harness.node_count(), 3);

    harness.shortcut(&[Key::Control], "y");
    assert_eq!(harness.node_count(), 4);
    assert_eq!((harness.undo_len(), harness.redo_len()), (2, 0));
}

#[test]
fn test_plain_z_does_nothing() {
    let harness = EditorHarness::new();
    add_node(&harness);

    assert!(harness.type_text("z").is_empty());
    assert_eq!(harness.node_count(), 3);
}

#[test]
fn test_undo_with_empty_history_reports_failure() {
    let harness = EditorHarness::new();
    let results = harness.shortcut(&[Key::Control], "z");
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    assert_eq!(results[0].error_message(), "Nothing to undo");
}

#[test]
fn test_key_repeat_keeps_undoing() {
    let harness = EditorHarness::new();
    add_node(&harness);
    add_node(&harness);

    harness.key_press(Key::Control);
    harness.dispatch(WindowEvent::KeyPressed { text: "z".into() });
    harness.dispatch(WindowEvent::KeyPressRepeated { text: "z".into() });
    harness.dispatch(WindowEvent::KeyReleased { text: "z".into() });
    harness.key_release(Key::Control);

    assert_eq!(harness.node_count(), 2);
    assert_eq!(harness.redo_len(), 2);
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn test_delete_key_removes_selected_node() {
    let harness = EditorHarness::new();
    let (x, y) = harness.node_center(1).unwrap();
    harness.click(x, y);
    assert_eq!(harness.selected(), vec![1]);

    let results = harness.key_tap(Key::Delete);
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert!(harness.node(1).is_none());
    assert_eq!(harness.connection_count(), 0);
    assert!(harness.selected().is_empty());
}

#[test]
fn test_backspace_also_deletes() {
    let harness = EditorHarness::new();
    harness.run("selection.node", json!({ "id": 2 }));
    harness.key_tap(Key::Backspace);
    assert!(harness.node(2).is_none());
}

#[test]
fn test_delete_with_modifier_is_ignored() {
    let harness = EditorHarness::new();
    harness.run("selection.node", json!({ "id": 2 }));

    let results = harness.shortcut(&[Key::Shift], &char::from(Key::Delete).to_string());
    assert!(results.is_empty());
    assert_eq!(harness.node_count(), 2);
}

#[test]
fn test_delete_without_selection_is_ignored() {
    let harness = EditorHarness::new();
    assert!(harness.key_tap(Key::Delete).is_empty());
    assert_eq!(harness.node_count(), 2);
}

#[test]
fn test_delete_then_undo_restores_node_and_connection() {
    let harness = EditorHarness::new();
    let (x, y) = harness.node_center(2).unwrap();
    harness.click(x, y);
    harness.key_tap(Key::Delete);
    assert_eq!((harness.node_count(), harness.connection_count()), (1, 0));

    harness.shortcut(&[Key::Control], "z");
    assert_eq!((harness.node_count(), harness.connection_count()), (2, 1));
    assert_eq!(harness.selected(), vec![2], "restored nodes come back selected");
}

// ============================================================================
// Escape / Select all
// ============================================================================

#[test]
fn test_escape_clears_selection() {
    let harness = EditorHarness::new();
    harness.run("selection.node", json!({ "id": 1 }));
    harness.run("selection.node", json!({ "id": 2, "additive": true }));

    harness.key_tap(Key::Escape);
    assert!(harness.selected().is_empty());
}

#[test]
fn test_escape_in_modal_closes_it() {
    let harness = EditorHarness::new();
    harness.run("panel.open", json!({ "panel": "modal" }));
    harness.run("selection.node", json!({ "id": 1 }));
    harness.editor.set_context(InteractionContext::Modal, Value::Null);

    let results = harness.key_tap(Key::Escape);
    assert_eq!(results[0].data().unwrap()["open"], json!(false));
    assert!(!harness.panels.borrow().is_open("modal"));
    assert_eq!(harness.selected(), vec![1]);
}

#[test]
fn test_ctrl_a_selects_every_node() {
    let harness = EditorHarness::new();
    add_node(&harness);

    harness.shortcut(&[Key::Control], "a");
    let mut selected = harness.selected();
    selected.sort();
    assert_eq!(selected, vec![1, 2, 3]);
}

// ============================================================================
// Modifier tracking
// ============================================================================

#[test]
fn test_modifiers_follow_press_and_release() {
    let harness = EditorHarness::new();
    harness.key_press(Key::Control);
    harness.key_press(Key::Shift);
    assert_eq!(harness.editor.translator().borrow().modifiers(), Modifiers::control_shift());

    harness.key_release(Key::Shift);
    assert_eq!(harness.editor.translator().borrow().modifiers(), Modifiers::control());

    harness.key_release(Key::Control);
    assert_eq!(harness.editor.translator().borrow().modifiers(), Modifiers::NONE);
}

#[test]
fn test_focus_loss_releases_modifiers() {
    let harness = EditorHarness::new();
    add_node(&harness);

    harness.key_press(Key::Control);
    harness.dispatch(WindowEvent::WindowActiveChanged(false));
    harness.type_text("z");

    assert_eq!(harness.node_count(), 3, "z without ctrl must not undo");
}

#[test]
fn test_key_release_does_not_fire_rules() {
    let harness = EditorHarness::new();
    add_node(&harness);

    harness.key_press(Key::Control);
    let results = harness.dispatch(WindowEvent::KeyReleased { text: "z".into() });
    harness.key_release(Key::Control);

    assert!(results.is_empty());
    assert_eq!(harness.node_count(), 3);
}
