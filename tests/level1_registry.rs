//! Level 1: Command Pipeline Tests
//!
//! Tests registration, lookup, validation, panic containment, default
//! notifications, effect forwarding and the in-flight guard.

mod common;

use common::harness::EditorHarness;
use serde_json::json;
use slint_node_interaction::{
    CommandCategory, CommandError, CommandMetadata, CommandResult, Effect, EffectKind, FnCommand,
    ValidationResult,
};
use std::cell::Cell;
use std::rc::Rc;

fn meta(name: &str) -> CommandMetadata {
    CommandMetadata::new(name, CommandCategory::GraphMutation)
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_builtins_are_registered() {
    let harness = EditorHarness::empty();
    let executor = harness.editor.executor();

    for id in [
        "node.add",
        "node.remove",
        "node.move",
        "connection.add",
        "selection.delete",
        "selection.node",
        "view.zoom",
        "panel.toggle",
        "history.undo",
        "history.redo",
    ] {
        assert!(executor.has(id), "{id} should be registered");
    }
}

#[test]
fn test_registering_same_id_replaces_command() {
    let harness = EditorHarness::empty();
    let executor = harness.editor.executor();
    let before = executor.command_ids().len();

    executor.register(FnCommand::new("custom.ping", meta("Ping"), |_, _| async {
        Ok(CommandResult::ok().with_data(json!(1)))
    }));
    executor.register(FnCommand::new("custom.ping", meta("Ping Again"), |_, _| async {
        Ok(CommandResult::ok().with_data(json!(2)))
    }));

    assert_eq!(executor.command_ids().len(), before + 1);
    assert_eq!(executor.get("custom.ping").unwrap().metadata().name, "Ping Again");
    let result = harness.run("custom.ping", json!({}));
    assert_eq!(result.data(), Some(&json!(2)));
}

#[test]
fn test_command_ids_are_sorted() {
    let harness = EditorHarness::empty();
    let ids = harness.editor.executor().command_ids();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

// ============================================================================
// Dispatch outcomes
// ============================================================================

#[test]
fn test_unknown_command_fails_without_notification() {
    let harness = EditorHarness::empty();
    let result = harness.run("does.not.exist", json!({}));

    assert!(!result.success);
    assert_eq!(result.error_message(), "Command 'does.not.exist' not found");
    assert!(result.data().is_none());
    assert!(harness.notifications.notifications().is_empty());
}

#[test]
fn test_validation_failure_skips_execution() {
    let harness = EditorHarness::empty();
    let ran = Rc::new(Cell::new(false));
    {
        let ran = ran.clone();
        harness.editor.executor().register(
            FnCommand::new("custom.guarded", meta("Guarded"), move |_, _| {
                ran.set(true);
                async { Ok(CommandResult::ok()) }
            })
            .with_validate(|payload, _| {
                if payload.get("ok").is_some() {
                    ValidationResult::ok()
                } else {
                    ValidationResult::invalid("missing ok")
                }
            }),
        );
    }

    let result = harness.run("custom.guarded", json!({}));
    assert!(!result.success);
    assert_eq!(result.error_message(), "missing ok");
    assert!(!ran.get(), "execute must not run after a failed validation");
    assert!(harness.notifications.errors().is_empty());

    let result = harness.run("custom.guarded", json!({ "ok": true }));
    assert!(result.success);
    assert!(ran.get());
}

#[test]
fn test_builtin_validation_reports_field_errors() {
    let harness = EditorHarness::empty();
    let result = harness.run("node.add", json!({ "x": "left" }));

    assert!(!result.success);
    let fields = &result.metadata["field_errors"];
    assert!(fields["kind"].is_string());
    assert!(fields["x"].is_string());
    assert!(fields["y"].is_string());
    assert_eq!(harness.node_count(), 0);
}

#[test]
fn test_execution_error_is_contained_and_notified() {
    let harness = EditorHarness::empty();
    harness.editor.executor().register(FnCommand::new("custom.fail", meta("Fail"), |_, _| async {
        Err(CommandError::execution("disk full"))
    }));

    let result = harness.run("custom.fail", json!({}));
    assert!(!result.success);
    assert_eq!(result.error_message(), "disk full");
    assert_eq!(
        harness.notifications.errors(),
        vec![("custom.fail".to_string(), "disk full".to_string())]
    );
    assert_eq!(harness.undo_len(), 0);
}

#[test]
fn test_panicking_command_is_contained() {
    let harness = EditorHarness::empty();
    harness.editor.executor().register(
        FnCommand::new("custom.panic", meta("Panic").undoable(), |_, _| async {
            if true {
                panic!("exploded");
            }
            Ok(CommandResult::ok())
        }),
    );

    let result = harness.run("custom.panic", json!({}));
    assert!(!result.success);
    assert_eq!(result.error_message(), "exploded");
    assert_eq!(harness.undo_len(), 0, "failed commands are never recorded");
    assert!(!harness.editor.executor().is_running("custom.panic"));

    // The executor keeps working afterwards
    assert!(harness.run("node.add", json!({ "kind": "n", "x": 0.0, "y": 0.0 })).success);
}

#[test]
fn test_panicking_validation_is_contained() {
    let harness = EditorHarness::empty();
    harness.editor.executor().register(
        FnCommand::new("custom.bad_validate", meta("Bad"), |_, _| async { Ok(CommandResult::ok()) })
            .with_validate(|_, _| panic!("validator broke")),
    );

    let result = harness.run("custom.bad_validate", json!({}));
    assert!(!result.success);
    assert_eq!(result.error_message(), "validator broke");
}

// ============================================================================
// Notifications and effects
// ============================================================================

#[test]
fn test_success_without_effects_gets_default_notification() {
    let harness = EditorHarness::empty();
    harness.run("node.add", json!({ "kind": "n", "x": 0.0, "y": 0.0 }));
    assert_eq!(harness.notifications.successes(), vec!["node.add".to_string()]);
}

#[test]
fn test_effects_replace_default_notification() {
    let harness = EditorHarness::new();
    let result = harness.run("navigation.focus_node", json!({ "id": 2 }));

    assert!(result.success);
    let navigations = harness.effects.navigations.borrow();
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0]["node"], json!(2));
    assert_eq!(navigations[0]["x"], json!(475.0));
    assert_eq!(navigations[0]["y"], json!(240.0));
    assert!(harness.notifications.successes().is_empty());
}

#[test]
fn test_toast_effect_reaches_notifier() {
    let harness = EditorHarness::empty();
    harness.run("node.add", json!({ "kind": "n", "x": 0.0, "y": 0.0 }));
    harness.notifications.take();

    let result = harness.run("history.undo", json!({}));
    assert!(result.success);
    assert_eq!(harness.notifications.last_message().as_deref(), Some("Undo: Add Node"));
    assert!(harness.notifications.successes().is_empty());
}

#[test]
fn test_custom_effects_are_forwarded() {
    let harness = EditorHarness::empty();
    harness.editor.executor().register(FnCommand::new("custom.fanfare", meta("Fanfare"), |_, _| async {
        Ok(CommandResult::ok()
            .with_effect(Effect::new(EffectKind::Animation, json!({ "name": "pulse" })))
            .with_effect(Effect::new(EffectKind::Sound, json!({ "clip": "ding" }))))
    }));

    assert!(harness.run("custom.fanfare", json!({})).success);
    assert_eq!(*harness.effects.animations.borrow(), vec![json!({ "name": "pulse" })]);
    assert_eq!(*harness.effects.sounds.borrow(), vec![json!({ "clip": "ding" })]);
}

// ============================================================================
// In-flight guard
// ============================================================================

#[test]
fn test_reentrant_dispatch_of_running_command_fails() {
    let harness = EditorHarness::empty();
    let executor = harness.editor.executor();
    let weak = Rc::downgrade(executor);
    executor.register(FnCommand::new("custom.reenter", meta("Reenter"), move |_, _| {
        let weak = weak.clone();
        async move {
            let Some(executor) = weak.upgrade() else {
                return Err(CommandError::execution("executor gone"));
            };
            let inner = executor.execute("custom.reenter", json!({}), None).await;
            Ok(CommandResult::ok().with_data(json!({ "inner": inner.error })))
        }
    }));

    let result = harness.run("custom.reenter", json!({}));
    assert!(result.success);
    assert_eq!(
        result.data().unwrap()["inner"],
        json!("Command 'custom.reenter' is already running")
    );
    assert!(!executor.is_running("custom.reenter"));

    // A later dispatch is accepted again
    assert!(harness.run("custom.reenter", json!({})).success);
}

#[test]
fn test_different_command_may_run_while_another_is_in_flight() {
    let harness = EditorHarness::empty();
    let executor = harness.editor.executor();
    let weak = Rc::downgrade(executor);
    executor.register(FnCommand::new("custom.outer", meta("Outer"), move |_, _| {
        let weak = weak.clone();
        async move {
            let Some(executor) = weak.upgrade() else {
                return Err(CommandError::execution("executor gone"));
            };
            let inner = executor
                .execute("node.add", json!({ "kind": "n", "x": 5.0, "y": 5.0 }), None)
                .await;
            Ok(CommandResult::ok().with_data(json!({ "inner": inner.success })))
        }
    }));

    let result = harness.run("custom.outer", json!({}));
    assert_eq!(result.data().unwrap()["inner"], json!(true));
    assert_eq!(harness.node_count(), 1);
}
