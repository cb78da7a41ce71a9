//! Input events as seen by the interaction router.

use super::EventTarget;
use crate::gesture::{GestureEvent, GestureType, PointerKind};
use crate::geometry::Point;
use slint::SharedString;
use std::cell::Cell;

/// What happened, at the granularity interaction rules match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    DoubleClick,
    ContextMenu,
    PointerDown,
    PointerMove,
    PointerUp,
    Wheel,
    KeyDown,
    KeyUp,
    Gesture(GestureType),
}

/// Keyboard modifier state at the time of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    pub fn control() -> Self {
        Self {
            control: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn control_shift() -> Self {
        Self {
            control: true,
            shift: true,
            ..Self::NONE
        }
    }
}

/// An event handed to [`InteractionRouter::route`](super::InteractionRouter::route).
///
/// Positions are in screen space; `world_*` fields are filled by the editor
/// from the viewport transform and default to the screen values.
/// `prevent_default` and `stop_propagation` use interior mutability so the
/// router can flag a shared event.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub kind: EventKind,
    pub target: EventTarget,
    pub position: Point,
    pub world_position: Point,
    /// Where the press that led to this event started.
    pub origin: Point,
    pub world_origin: Point,
    pub key: Option<SharedString>,
    pub modifiers: Modifiers,
    /// Wheel delta, positive when scrolling down.
    pub wheel_delta: Point,
    pub gesture: Option<GestureEvent>,
    pub pointer_kind: PointerKind,
    pub time_ms: u64,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl InputEvent {
    pub fn new(kind: EventKind, target: EventTarget) -> Self {
        Self {
            kind,
            target,
            position: Point::ZERO,
            world_position: Point::ZERO,
            origin: Point::ZERO,
            world_origin: Point::ZERO,
            key: None,
            modifiers: Modifiers::NONE,
            wheel_delta: Point::ZERO,
            gesture: None,
            pointer_kind: PointerKind::Mouse,
            time_ms: 0,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn click(target: EventTarget, position: Point) -> Self {
        Self::new(EventKind::Click, target).at(position)
    }

    pub fn double_click(target: EventTarget, position: Point) -> Self {
        Self::new(EventKind::DoubleClick, target).at(position)
    }

    pub fn key_down(key: impl Into<SharedString>, modifiers: Modifiers) -> Self {
        let mut event = Self::new(EventKind::KeyDown, EventTarget::canvas());
        event.key = Some(key.into());
        event.modifiers = modifiers;
        event
    }

    pub fn wheel(target: EventTarget, position: Point, delta: Point) -> Self {
        let mut event = Self::new(EventKind::Wheel, target).at(position);
        event.wheel_delta = delta;
        event
    }

    /// Wrap a recognized gesture. The target falls back to the canvas.
    pub fn from_gesture(gesture: GestureEvent) -> Self {
        let target = gesture.target.clone().unwrap_or_else(EventTarget::canvas);
        let mut event = Self::new(EventKind::Gesture(gesture.kind), target).at(gesture.position);
        event.origin = gesture.start_position;
        event.world_origin = gesture.start_position;
        event.pointer_kind = gesture.pointer_kind;
        event.time_ms = gesture.timestamp_ms;
        event.gesture = Some(gesture);
        event
    }

    /// Set both screen and world position (and the press origin).
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self.world_position = position;
        self.origin = position;
        self.world_origin = position;
        self
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self.world_origin = origin;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_pointer_kind(mut self, kind: PointerKind) -> Self {
        self.pointer_kind = kind;
        self
    }

    pub fn with_time(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    /// Screen-space distance between the press origin and this event.
    pub fn drag_distance(&self) -> f32 {
        self.origin.distance_to(self.position)
    }

    /// World-space displacement since the press origin.
    pub fn world_delta(&self) -> Point {
        self.world_position - self.world_origin
    }
}
