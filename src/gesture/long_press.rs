use super::{Gesture, GestureData, GestureRecognizer, GestureType, PointerSample};
use crate::config::GestureSettings;
use crate::geometry::Point;
use crate::interaction::EventTarget;
use slint::{Timer, TimerMode};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum LongPressState {
    Idle,
    Pending {
        start: Point,
        start_time: u64,
        last: Point,
        target: Option<EventTarget>,
    },
    Recognized,
    Rejected,
}

#[derive(Debug)]
struct Shared {
    state: LongPressState,
    gesture: Option<Gesture>,
}

impl Shared {
    /// Deadline reached while still pending: recognize.
    fn fire(&mut self, delay_ms: u64) {
        let LongPressState::Pending {
            start,
            start_time,
            last,
            target,
        } = std::mem::replace(&mut self.state, LongPressState::Recognized)
        else {
            return;
        };
        tracing::debug!(x = start.x, y = start.y, "long press recognized");
        self.gesture = Some(Gesture {
            kind: GestureType::LongPress,
            start_time,
            last_update: start_time + delay_ms,
            data: GestureData {
                start_points: vec![start],
                current_points: vec![last],
                delta: last - start,
                duration_ms: delay_ms,
                target,
                ..Default::default()
            },
        });
    }
}

/// Recognizes a stationary press held for the long-press delay.
///
/// Recognition is time-triggered: `start` arms a single-shot [`slint::Timer`]
/// that fires after the delay. Moving past the distance gate, ending or
/// cancelling before the deadline disarms it. An `end` whose timestamp is past
/// the deadline also recognizes, so a busy event loop cannot swallow a press
/// that was held long enough.
pub struct LongPressRecognizer {
    max_distance: f32,
    delay_ms: u64,
    shared: Rc<RefCell<Shared>>,
    timer: Timer,
}

impl Default for LongPressRecognizer {
    fn default() -> Self {
        Self::new(&GestureSettings::default())
    }
}

impl LongPressRecognizer {
    pub fn new(settings: &GestureSettings) -> Self {
        Self {
            max_distance: settings.long_press_max_distance,
            delay_ms: settings.long_press_delay_ms,
            shared: Rc::new(RefCell::new(Shared {
                state: LongPressState::Idle,
                gesture: None,
            })),
            timer: Timer::default(),
        }
    }

    /// Whether the deferred callback is still armed.
    pub fn is_pending(&self) -> bool {
        matches!(self.shared.borrow().state, LongPressState::Pending { .. })
    }

    fn reject(&mut self) {
        self.timer.stop();
        self.shared.borrow_mut().state = LongPressState::Rejected;
    }
}

impl GestureRecognizer for LongPressRecognizer {
    fn kind(&self) -> GestureType {
        GestureType::LongPress
    }

    fn start(&mut self, sample: &PointerSample) {
        self.timer.stop();
        {
            let mut shared = self.shared.borrow_mut();
            shared.gesture = None;
            shared.state = match sample.points.as_slice() {
                [p] => LongPressState::Pending {
                    start: *p,
                    start_time: sample.time_ms,
                    last: *p,
                    target: sample.target.clone(),
                },
                _ => LongPressState::Rejected,
            };
        }
        if !self.is_pending() {
            return;
        }

        let shared = Rc::downgrade(&self.shared);
        let delay_ms = self.delay_ms;
        self.timer.start(
            TimerMode::SingleShot,
            Duration::from_millis(delay_ms),
            move || {
                if let Some(shared) = shared.upgrade() {
                    shared.borrow_mut().fire(delay_ms);
                }
            },
        );
    }

    fn update(&mut self, sample: &PointerSample) {
        let moved_too_far = {
            let mut shared = self.shared.borrow_mut();
            let LongPressState::Pending { start, last, .. } = &mut shared.state else {
                return;
            };
            match sample.points.as_slice() {
                [p] if start.distance_to(*p) <= self.max_distance => {
                    *last = *p;
                    false
                }
                _ => true,
            }
        };
        if moved_too_far {
            tracing::trace!("long press cancelled by movement");
            self.reject();
        }
    }

    fn end(&mut self, sample: &PointerSample) {
        self.update(sample);
        let deadline_passed = match &self.shared.borrow().state {
            LongPressState::Pending { start_time, .. } => {
                sample.time_ms.saturating_sub(*start_time) >= self.delay_ms
            }
            _ => false,
        };
        self.timer.stop();
        let mut shared = self.shared.borrow_mut();
        if deadline_passed {
            shared.fire(self.delay_ms);
        } else if matches!(shared.state, LongPressState::Pending { .. }) {
            shared.state = LongPressState::Rejected;
        }
    }

    fn cancel(&mut self) {
        self.timer.stop();
        let mut shared = self.shared.borrow_mut();
        shared.state = LongPressState::Idle;
        shared.gesture = None;
    }

    fn gesture(&self) -> Option<Gesture> {
        self.shared.borrow().gesture.clone()
    }
}
