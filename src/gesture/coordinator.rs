//! Drives the recognizer set from pointer or touch streams.

use super::{
    Gesture, GestureRecognizer, GestureType, LongPressRecognizer, PanRecognizer, PinchRecognizer,
    PointerSample, RotateRecognizer, SwipeDirection, SwipeRecognizer, TapRecognizer,
};
use crate::config::{GestureSettings, InputMode};
use crate::geometry::Point;
use crate::interaction::EventTarget;
use serde::{Deserialize, Serialize};
use slint::platform::PointerEventButton;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// The device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One event of the unified pointer stream.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: u32,
    pub phase: PointerPhase,
    pub position: Point,
    pub time_ms: u64,
    pub target: Option<EventTarget>,
    pub button: PointerEventButton,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn new(pointer_id: u32, phase: PointerPhase, position: Point, time_ms: u64) -> Self {
        Self {
            pointer_id,
            phase,
            position,
            time_ms,
            target: None,
            button: PointerEventButton::Left,
            kind: PointerKind::Touch,
        }
    }

    pub fn with_target(mut self, target: EventTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_button(mut self, button: PointerEventButton) -> Self {
        self.button = button;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u32,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// Raw touch event, used when the pointer stream is unavailable.
///
/// `touches` lists the points still down after the event, `changed` the points
/// this event is about (for `End`, the lifted points at their final position).
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub touches: Vec<TouchPoint>,
    pub changed: Vec<TouchPoint>,
    pub time_ms: u64,
    pub target: Option<EventTarget>,
}

impl TouchEvent {
    pub fn new(
        phase: TouchPhase,
        touches: Vec<TouchPoint>,
        changed: Vec<TouchPoint>,
        time_ms: u64,
    ) -> Self {
        Self {
            phase,
            touches,
            changed,
            time_ms,
            target: None,
        }
    }

    pub fn with_target(mut self, target: EventTarget) -> Self {
        self.target = Some(target);
        self
    }
}

/// A recognized gesture, flattened for handlers and the interaction router.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureType,
    /// Centroid of the current points.
    pub position: Point,
    /// Centroid of the start points.
    pub start_position: Point,
    pub delta: Point,
    pub duration_ms: u64,
    pub scale: Option<f32>,
    pub angle: Option<f32>,
    pub direction: Option<SwipeDirection>,
    pub velocity: Option<f32>,
    pub target: Option<EventTarget>,
    pub pointer_count: usize,
    pub pointer_kind: PointerKind,
    pub timestamp_ms: u64,
}

impl GestureEvent {
    fn from_gesture(gesture: Gesture, pointer_kind: PointerKind, timestamp_ms: u64) -> Self {
        let data = gesture.data;
        let start_position = Point::centroid(&data.start_points).unwrap_or_default();
        let position = Point::centroid(&data.current_points).unwrap_or(start_position);
        Self {
            kind: gesture.kind,
            position,
            start_position,
            delta: data.delta,
            duration_ms: data.duration_ms,
            scale: data.scale,
            angle: data.angle,
            direction: data.direction,
            velocity: data.velocity,
            target: data.target,
            pointer_count: data.start_points.len().max(data.current_points.len()),
            pointer_kind,
            timestamp_ms,
        }
    }
}

pub type GestureHandler = Rc<dyn Fn(&GestureEvent)>;

#[derive(Debug, Clone)]
struct Session {
    target: Option<EventTarget>,
    kind: PointerKind,
}

/// Owns the active-gesture state and feeds every recognizer the same stream.
///
/// Recognizers are consulted in registration order; the first one holding a
/// gesture at a terminal event wins. After a terminal event the session ends
/// and pointers still down are ignored until every pointer has been lifted
/// and a new one goes down.
pub struct GestureCoordinator {
    input_mode: InputMode,
    recognizers: Vec<Box<dyn GestureRecognizer>>,
    handlers: HashMap<GestureType, GestureHandler>,
    pointers: BTreeMap<u32, Point>,
    session: Option<Session>,
}

impl Default for GestureCoordinator {
    fn default() -> Self {
        Self::new(&GestureSettings::default(), InputMode::default())
    }
}

impl GestureCoordinator {
    /// Coordinator with the six stock recognizers: tap, long-press, swipe,
    /// pinch, rotate, pan.
    pub fn new(settings: &GestureSettings, input_mode: InputMode) -> Self {
        Self::with_recognizers(
            vec![
                Box::new(TapRecognizer::new(settings)),
                Box::new(LongPressRecognizer::new(settings)),
                Box::new(SwipeRecognizer::new(settings)),
                Box::new(PinchRecognizer::new(settings)),
                Box::new(RotateRecognizer::new(settings)),
                Box::new(PanRecognizer::new(settings)),
            ],
            input_mode,
        )
    }

    pub fn with_recognizers(
        recognizers: Vec<Box<dyn GestureRecognizer>>,
        input_mode: InputMode,
    ) -> Self {
        Self {
            input_mode,
            recognizers,
            handlers: HashMap::new(),
            pointers: BTreeMap::new(),
            session: None,
        }
    }

    pub fn recognizer_kinds(&self) -> Vec<GestureType> {
        self.recognizers.iter().map(|r| r.kind()).collect()
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Switch streams. Any session in progress is cancelled.
    pub fn set_input_mode(&mut self, mode: InputMode) {
        if mode != self.input_mode {
            self.cancel_all();
            self.pointers.clear();
            self.input_mode = mode;
        }
    }

    /// Register the handler for `kind`, replacing any previous one.
    pub fn register_handler(&mut self, kind: GestureType, handler: impl Fn(&GestureEvent) + 'static) {
        self.handlers.insert(kind, Rc::new(handler));
    }

    pub fn unregister_handler(&mut self, kind: GestureType) -> bool {
        self.handlers.remove(&kind).is_some()
    }

    pub fn has_handler(&self, kind: GestureType) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn active_pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// Feed one pointer event. Returns the gesture recognized at a terminal
    /// event, after its handler (if any) ran.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Option<GestureEvent> {
        if self.input_mode != InputMode::Pointer {
            return None;
        }
        match event.phase {
            PointerPhase::Down => {
                let first = self.pointers.is_empty();
                self.pointers.insert(event.pointer_id, event.position);
                if first {
                    self.begin(event.target.clone(), event.kind, event.time_ms);
                } else if self.session.is_some() && self.pointers.len() == 2 {
                    self.restart(event.time_ms);
                }
                None
            }
            PointerPhase::Move => {
                let pos = self.pointers.get_mut(&event.pointer_id)?;
                *pos = event.position;
                if self.session.is_some() {
                    let sample = self.sample(event.time_ms);
                    self.recognizers.iter_mut().for_each(|r| r.update(&sample));
                }
                None
            }
            PointerPhase::Up => {
                let pos = self.pointers.get_mut(&event.pointer_id)?;
                *pos = event.position;
                let result = if self.session.is_some() {
                    let sample = self.sample(event.time_ms);
                    self.finish(&sample)
                } else {
                    None
                };
                self.pointers.remove(&event.pointer_id);
                result
            }
            PointerPhase::Cancel => {
                self.pointers.remove(&event.pointer_id);
                self.cancel_all();
                None
            }
        }
    }

    /// Feed one raw touch event. Only consulted in [`InputMode::Touch`].
    pub fn handle_touch(&mut self, event: &TouchEvent) -> Option<GestureEvent> {
        if self.input_mode != InputMode::Touch {
            return None;
        }
        match event.phase {
            TouchPhase::Start => {
                let first = self.pointers.is_empty();
                self.set_touches(&event.touches);
                if first && !self.pointers.is_empty() {
                    self.begin(event.target.clone(), PointerKind::Touch, event.time_ms);
                } else if self.session.is_some() && self.pointers.len() == 2 {
                    self.restart(event.time_ms);
                }
                None
            }
            TouchPhase::Move => {
                self.set_touches(&event.touches);
                if self.session.is_some() {
                    let sample = self.sample(event.time_ms);
                    self.recognizers.iter_mut().for_each(|r| r.update(&sample));
                }
                None
            }
            TouchPhase::End => {
                for touch in event.touches.iter().chain(&event.changed) {
                    self.pointers.insert(touch.id, touch.position);
                }
                let result = if self.session.is_some() {
                    let sample = self.sample(event.time_ms);
                    self.finish(&sample)
                } else {
                    None
                };
                self.set_touches(&event.touches);
                result
            }
            TouchPhase::Cancel => {
                self.set_touches(&event.touches);
                self.cancel_all();
                None
            }
        }
    }

    /// Cancel every recognizer and end the session.
    pub fn cancel_all(&mut self) {
        self.recognizers.iter_mut().for_each(|r| r.cancel());
        self.session = None;
    }

    fn set_touches(&mut self, touches: &[TouchPoint]) {
        self.pointers = touches.iter().map(|t| (t.id, t.position)).collect();
    }

    fn sample(&self, time_ms: u64) -> PointerSample {
        PointerSample::new(self.pointers.values().copied().collect(), time_ms)
            .with_target(self.session.as_ref().and_then(|s| s.target.clone()))
    }

    fn begin(&mut self, target: Option<EventTarget>, kind: PointerKind, time_ms: u64) {
        self.session = Some(Session { target, kind });
        let sample = self.sample(time_ms);
        tracing::trace!(points = sample.points.len(), "gesture session started");
        self.recognizers.iter_mut().for_each(|r| r.start(&sample));
    }

    fn restart(&mut self, time_ms: u64) {
        let sample = self.sample(time_ms);
        tracing::trace!(points = sample.points.len(), "gesture session restarted");
        self.recognizers.iter_mut().for_each(|r| r.start(&sample));
    }

    fn finish(&mut self, sample: &PointerSample) -> Option<GestureEvent> {
        self.recognizers.iter_mut().for_each(|r| r.end(sample));
        let recognized = self.recognizers.iter().find_map(|r| r.gesture());
        let kind = self
            .session
            .as_ref()
            .map(|s| s.kind)
            .unwrap_or(PointerKind::Touch);
        self.cancel_all();

        let event = GestureEvent::from_gesture(recognized?, kind, sample.time_ms);
        tracing::debug!(gesture = ?event.kind, pointers = event.pointer_count, "gesture recognized");
        if let Some(handler) = self.handlers.get(&event.kind).cloned() {
            handler(&event);
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::init_testing_backend;
    use std::cell::RefCell;

    fn down(id: u32, x: f32, y: f32, t: u64) -> PointerEvent {
        PointerEvent::new(id, PointerPhase::Down, Point::new(x, y), t)
    }

    fn mv(id: u32, x: f32, y: f32, t: u64) -> PointerEvent {
        PointerEvent::new(id, PointerPhase::Move, Point::new(x, y), t)
    }

    fn up(id: u32, x: f32, y: f32, t: u64) -> PointerEvent {
        PointerEvent::new(id, PointerPhase::Up, Point::new(x, y), t)
    }

    // ========================================================================
    // Pointer stream
    // ========================================================================

    #[test]
    fn test_tap_scenario() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::default();
        coordinator.handle_pointer(&down(1, 100.0, 200.0, 0).with_target(EventTarget::node(3)));
        let event = coordinator
            .handle_pointer(&up(1, 100.0, 200.0, 120))
            .expect("tap");

        assert_eq!(event.kind, GestureType::Tap);
        assert_eq!(event.start_position, Point::new(100.0, 200.0));
        assert_eq!(event.target.and_then(|t| t.node_id), Some(3));
        assert_eq!(event.pointer_count, 1);
        assert!(!coordinator.is_tracking());
    }

    #[test]
    fn test_tap_scenario_with_large_move() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::default();
        coordinator.handle_pointer(&down(1, 100.0, 200.0, 0));
        coordinator.handle_pointer(&mv(1, 200.0, 200.0, 50));
        // Too slow for a swipe, moved too far for a tap.
        assert!(coordinator.handle_pointer(&up(1, 200.0, 200.0, 800)).is_none());
    }

    #[test]
    fn test_swipe_over_tap() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::default();
        coordinator.handle_pointer(&down(1, 0.0, 0.0, 0));
        coordinator.handle_pointer(&mv(1, -60.0, 0.0, 40));
        let event = coordinator.handle_pointer(&up(1, -120.0, 0.0, 80)).expect("swipe");
        assert_eq!(event.kind, GestureType::Swipe);
        assert_eq!(event.direction, Some(SwipeDirection::Left));
    }

    #[test]
    fn test_second_pointer_restarts_with_two_points() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::default();
        coordinator.handle_pointer(&down(1, 0.0, 0.0, 0));
        coordinator.handle_pointer(&down(2, 100.0, 0.0, 10));
        coordinator.handle_pointer(&mv(2, 200.0, 0.0, 50));
        let event = coordinator.handle_pointer(&up(2, 200.0, 0.0, 60)).expect("pinch");

        assert_eq!(event.kind, GestureType::Pinch);
        assert!((event.scale.unwrap() - 2.0).abs() < 1e-4);
        assert_eq!(event.pointer_count, 2);

        // The remaining pointer is ignored until it lifts.
        assert!(coordinator.handle_pointer(&up(1, 0.0, 0.0, 70)).is_none());
        assert_eq!(coordinator.active_pointer_count(), 0);
    }

    #[test]
    fn test_two_finger_pan() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::default();
        coordinator.handle_pointer(&down(1, 0.0, 0.0, 0));
        coordinator.handle_pointer(&down(2, 100.0, 0.0, 0));
        // Small alternating steps keep the finger vector close to horizontal.
        for step in 1..=4 {
            let y = step as f32 * 10.0;
            let t = step as u64 * 20;
            coordinator.handle_pointer(&mv(1, 0.0, y, t));
            coordinator.handle_pointer(&mv(2, 100.0, y, t));
        }
        let event = coordinator.handle_pointer(&up(1, 0.0, 40.0, 100)).expect("pan");
        assert_eq!(event.kind, GestureType::Pan);
        assert_eq!(event.delta, Point::new(0.0, 40.0));
        assert_eq!(event.position, Point::new(50.0, 40.0));
    }

    #[test]
    fn test_handler_invoked_and_last_registration_wins() {
        init_testing_backend();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = GestureCoordinator::default();
        {
            let hits = hits.clone();
            coordinator.register_handler(GestureType::Tap, move |_| hits.borrow_mut().push("first"));
        }
        {
            let hits = hits.clone();
            coordinator.register_handler(GestureType::Tap, move |_| hits.borrow_mut().push("second"));
        }
        coordinator.handle_pointer(&down(1, 5.0, 5.0, 0));
        coordinator.handle_pointer(&up(1, 5.0, 5.0, 10));
        assert_eq!(*hits.borrow(), vec!["second"]);
    }

    #[test]
    fn test_cancel_discards_session() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::default();
        coordinator.handle_pointer(&down(1, 5.0, 5.0, 0));
        coordinator.handle_pointer(&PointerEvent::new(
            1,
            PointerPhase::Cancel,
            Point::new(5.0, 5.0),
            10,
        ));
        assert!(!coordinator.is_tracking());
        assert!(coordinator.handle_pointer(&up(1, 5.0, 5.0, 20)).is_none());
    }

    #[test]
    fn test_long_press_reported_on_release() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::default();
        coordinator.handle_pointer(&down(1, 5.0, 5.0, 0));
        i_slint_backend_testing::mock_elapsed_time(std::time::Duration::from_millis(600));
        let event = coordinator.handle_pointer(&up(1, 5.0, 5.0, 600)).expect("long press");
        assert_eq!(event.kind, GestureType::LongPress);
    }

    #[test]
    fn test_pointer_events_ignored_in_touch_mode() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::new(&GestureSettings::default(), InputMode::Touch);
        coordinator.handle_pointer(&down(1, 5.0, 5.0, 0));
        assert!(coordinator.handle_pointer(&up(1, 5.0, 5.0, 10)).is_none());
    }

    // ========================================================================
    // Touch stream
    // ========================================================================

    #[test]
    fn test_touch_stream_pinch() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::new(&GestureSettings::default(), InputMode::Touch);
        let a = TouchPoint::new(1, 0.0, 0.0);
        let b = TouchPoint::new(2, 100.0, 0.0);
        coordinator.handle_touch(&TouchEvent::new(TouchPhase::Start, vec![a], vec![a], 0));
        coordinator.handle_touch(&TouchEvent::new(TouchPhase::Start, vec![a, b], vec![b], 5));

        let b_far = TouchPoint::new(2, 50.0, 0.0);
        coordinator.handle_touch(&TouchEvent::new(TouchPhase::Move, vec![a, b_far], vec![b_far], 30));
        let event = coordinator
            .handle_touch(&TouchEvent::new(TouchPhase::End, vec![a], vec![b_far], 40))
            .expect("pinch");
        assert_eq!(event.kind, GestureType::Pinch);
        assert!((event.scale.unwrap() - 0.5).abs() < 1e-4);
        assert_eq!(coordinator.active_pointer_count(), 1);
    }

    #[test]
    fn test_touch_tap() {
        init_testing_backend();
        let mut coordinator = GestureCoordinator::new(&GestureSettings::default(), InputMode::Touch);
        let a = TouchPoint::new(7, 100.0, 200.0);
        coordinator.handle_touch(&TouchEvent::new(TouchPhase::Start, vec![a], vec![a], 0));
        let event = coordinator
            .handle_touch(&TouchEvent::new(TouchPhase::End, vec![], vec![a], 100))
            .expect("tap");
        assert_eq!(event.kind, GestureType::Tap);
        assert_eq!(event.pointer_kind, PointerKind::Touch);
    }
}
