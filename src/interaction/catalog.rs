//! The stock interaction rules of a graph editor.
//!
//! Every rule dispatches one of the built-in commands. Applications usually
//! register this catalog and then add or override rules by id.

use super::{
    Condition, EventKind, EventMatcher, InputEvent, InteractionContext, InteractionDefinition,
    ModifierMatch, Modifiers, Selector,
};
use crate::gesture::{GestureType, PointerKind, SwipeDirection};
use serde_json::{json, Value};

/// Zoom factor per wheel notch.
pub const WHEEL_ZOOM_FACTOR: f32 = 1.1;

/// Screen pixels a press must travel before its release counts as a drag.
pub const DRAG_THRESHOLD: f32 = 4.0;

/// Panel opened by a long press on a node.
pub const INSPECTOR_PANEL: &str = "inspector";
/// Panel toggled by horizontal swipes.
pub const SIDEBAR_PANEL: &str = "sidebar";
/// Panel closed by Escape in the modal context.
pub const MODAL_PANEL: &str = "modal";

fn node_selector() -> Selector {
    Selector::tag("node")
}

fn node_id(event: &InputEvent) -> Value {
    json!(event.target.node_id)
}

fn shift(held: bool) -> ModifierMatch {
    ModifierMatch {
        shift: Some(held),
        ..ModifierMatch::default()
    }
}

fn keyboard() -> Vec<InteractionDefinition> {
    vec![
        InteractionDefinition::new(
            "history.undo",
            EventMatcher::key("z", Modifiers::control()).prevent_default(),
            "history.undo",
        )
        .with_priority(100)
        .with_description("Undo the last change"),
        InteractionDefinition::new(
            "history.redo",
            EventMatcher::key("z", Modifiers::control_shift()).prevent_default(),
            "history.redo",
        )
        .with_priority(100)
        .with_description("Redo the last undone change"),
        InteractionDefinition::new(
            "history.redo.alt",
            EventMatcher::key("y", Modifiers::control()).prevent_default(),
            "history.redo",
        )
        .with_priority(100),
        InteractionDefinition::new(
            "modal.close",
            EventMatcher::key("Escape", Modifiers::NONE).stop_propagation(),
            "panel.close",
        )
        .in_context(InteractionContext::Modal)
        .with_payload(|_| json!({ "panel": MODAL_PANEL }))
        .with_priority(90)
        .with_description("Close the modal"),
        InteractionDefinition::new(
            "selection.delete",
            EventMatcher::new(EventKind::KeyDown)
                .or_key("Delete")
                .or_key("Backspace")
                .with_modifiers(ModifierMatch::none())
                .prevent_default(),
            "selection.delete",
        )
        .in_context(InteractionContext::Canvas)
        .when(Condition::HasSelection)
        .with_priority(50)
        .with_description("Delete the selection"),
        InteractionDefinition::new(
            "selection.all",
            EventMatcher::key("a", Modifiers::control()).prevent_default(),
            "selection.all",
        )
        .in_context(InteractionContext::Canvas)
        .with_priority(50),
        InteractionDefinition::new(
            "selection.clear.escape",
            EventMatcher::key("Escape", Modifiers::NONE),
            "selection.clear",
        )
        .with_priority(10)
        .with_description("Clear the selection"),
    ]
}

fn mouse() -> Vec<InteractionDefinition> {
    vec![
        InteractionDefinition::new(
            "node.drag",
            EventMatcher::new(EventKind::PointerUp).with_selector(node_selector()),
            "node.move",
        )
        .when(Condition::DragDistanceAtLeast(DRAG_THRESHOLD))
        .with_payload(|e| {
            let delta = e.world_delta();
            json!({ "node": e.target.node_id, "dx": delta.x, "dy": delta.y })
        })
        .with_priority(30),
        InteractionDefinition::new(
            "node.select",
            EventMatcher::new(EventKind::Click)
                .with_selector(node_selector())
                .with_modifiers(shift(false)),
            "selection.node",
        )
        .with_payload(|e| json!({ "id": node_id(e) }))
        .with_priority(20),
        InteractionDefinition::new(
            "node.toggle",
            EventMatcher::new(EventKind::Click)
                .with_selector(node_selector())
                .with_modifiers(shift(true)),
            "selection.node",
        )
        .with_payload(|e| json!({ "id": node_id(e), "additive": true }))
        .with_priority(20),
        InteractionDefinition::new(
            "connection.select",
            EventMatcher::new(EventKind::Click).with_selector(Selector::tag("connection")),
            "selection.connection",
        )
        .with_payload(|e| json!({ "id": e.target.connection_id, "additive": e.modifiers.shift }))
        .with_priority(20),
        InteractionDefinition::new(
            "canvas.add_node",
            EventMatcher::new(EventKind::DoubleClick).with_selector(Selector::tag("canvas")),
            "node.add",
        )
        .in_context(InteractionContext::Canvas)
        .with_payload(|e| json!({ "kind": "node", "x": e.world_position.x, "y": e.world_position.y }))
        .with_priority(10),
        InteractionDefinition::new(
            "canvas.clear",
            EventMatcher::new(EventKind::Click)
                .with_selector(Selector::tag("canvas"))
                .with_modifiers(shift(false)),
            "selection.clear",
        ),
        InteractionDefinition::new("canvas.wheel_zoom", EventMatcher::new(EventKind::Wheel).prevent_default(), "view.zoom")
            .with_payload(|e| {
                let scale = if e.wheel_delta.y < 0.0 {
                    WHEEL_ZOOM_FACTOR
                } else if e.wheel_delta.y > 0.0 {
                    1.0 / WHEEL_ZOOM_FACTOR
                } else {
                    1.0
                };
                json!({ "scale": scale })
            }),
    ]
}

fn gestures() -> Vec<InteractionDefinition> {
    let gesture = |kind| EventMatcher::new(EventKind::Gesture(kind));
    vec![
        InteractionDefinition::new("gesture.pinch_zoom", gesture(GestureType::Pinch).prevent_default(), "view.zoom")
            .with_payload(|e| json!({ "scale": e.gesture.as_ref().and_then(|g| g.scale).unwrap_or(1.0) })),
        InteractionDefinition::new("gesture.pan", gesture(GestureType::Pan).prevent_default(), "view.pan")
            .with_payload(|e| {
                let delta = e.gesture.as_ref().map(|g| g.delta).unwrap_or_default();
                json!({ "dx": delta.x, "dy": delta.y })
            }),
        InteractionDefinition::new(
            "gesture.tap_node",
            gesture(GestureType::Tap)
                .with_selector(node_selector())
                .with_pointer_kind(PointerKind::Touch),
            "selection.node",
        )
        .with_payload(|e| json!({ "id": node_id(e) })),
        InteractionDefinition::new(
            "gesture.long_press_node",
            gesture(GestureType::LongPress).with_selector(node_selector()),
            "panel.open",
        )
        .with_payload(|e| json!({ "panel": INSPECTOR_PANEL, "node": node_id(e) }))
        .with_description("Open the inspector for a node"),
        InteractionDefinition::new(
            "gesture.swipe_left",
            gesture(GestureType::Swipe)
                .with_swipe_direction(SwipeDirection::Left)
                .with_pointer_kind(PointerKind::Touch),
            "panel.toggle",
        )
        .with_payload(|_| json!({ "panel": SIDEBAR_PANEL })),
        InteractionDefinition::new(
            "gesture.swipe_right",
            gesture(GestureType::Swipe)
                .with_swipe_direction(SwipeDirection::Right)
                .with_pointer_kind(PointerKind::Touch),
            "panel.toggle",
        )
        .with_payload(|_| json!({ "panel": SIDEBAR_PANEL })),
    ]
}

/// Keyboard, mouse and gesture rules for the built-in commands.
pub fn default_catalog() -> Vec<InteractionDefinition> {
    let mut catalog = keyboard();
    catalog.extend(mouse());
    catalog.extend(gestures());
    catalog
}
