use super::{Gesture, GestureData, GestureRecognizer, GestureType, PointerSample};
use crate::config::GestureSettings;
use crate::geometry::Point;
use crate::interaction::EventTarget;

#[derive(Debug, Clone, PartialEq)]
enum TapState {
    Idle,
    Tracking {
        start: Point,
        start_time: u64,
        last: Point,
        target: Option<EventTarget>,
    },
    /// Moved too far or started with more than one point.
    Rejected,
}

/// Recognizes a short, stationary single-point press.
#[derive(Debug, Clone)]
pub struct TapRecognizer {
    max_distance: f32,
    max_duration_ms: u64,
    state: TapState,
    gesture: Option<Gesture>,
}

impl Default for TapRecognizer {
    fn default() -> Self {
        Self::new(&GestureSettings::default())
    }
}

impl TapRecognizer {
    pub fn new(settings: &GestureSettings) -> Self {
        Self {
            max_distance: settings.tap_max_distance,
            max_duration_ms: settings.tap_max_duration_ms,
            state: TapState::Idle,
            gesture: None,
        }
    }
}

impl GestureRecognizer for TapRecognizer {
    fn kind(&self) -> GestureType {
        GestureType::Tap
    }

    fn start(&mut self, sample: &PointerSample) {
        self.gesture = None;
        self.state = match sample.points.as_slice() {
            [p] => TapState::Tracking {
                start: *p,
                start_time: sample.time_ms,
                last: *p,
                target: sample.target.clone(),
            },
            _ => TapState::Rejected,
        };
    }

    fn update(&mut self, sample: &PointerSample) {
        let TapState::Tracking { start, last, .. } = &mut self.state else {
            return;
        };
        match sample.points.as_slice() {
            [p] if start.distance_to(*p) <= self.max_distance => *last = *p,
            _ => {
                tracing::trace!("tap rejected by movement");
                self.state = TapState::Rejected;
            }
        }
    }

    fn end(&mut self, sample: &PointerSample) {
        self.update(sample);
        let TapState::Tracking {
            start,
            start_time,
            last,
            target,
        } = std::mem::replace(&mut self.state, TapState::Idle)
        else {
            self.state = TapState::Idle;
            return;
        };

        let duration = sample.time_ms.saturating_sub(start_time);
        if duration <= self.max_duration_ms {
            self.gesture = Some(Gesture {
                kind: GestureType::Tap,
                start_time,
                last_update: sample.time_ms,
                data: GestureData {
                    start_points: vec![start],
                    current_points: vec![last],
                    delta: last - start,
                    duration_ms: duration,
                    target,
                    ..Default::default()
                },
            });
        }
    }

    fn cancel(&mut self) {
        self.state = TapState::Idle;
        self.gesture = None;
    }

    fn gesture(&self) -> Option<Gesture> {
        self.gesture.clone()
    }
}
