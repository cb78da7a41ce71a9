use super::{Gesture, GestureData, GestureRecognizer, GestureType, PointerSample};
use crate::config::GestureSettings;
use crate::geometry::Point;
use crate::interaction::EventTarget;

#[derive(Debug, Clone, PartialEq)]
enum PinchState {
    Idle,
    Tracking {
        start: (Point, Point),
        start_time: u64,
        initial_distance: f32,
        target: Option<EventTarget>,
    },
}

/// Two-finger scale gesture.
///
/// Once the scale leaves the dead zone the gesture stays recognized for the
/// rest of the session and keeps reporting the latest scale. Lifting a finger
/// before `end` clears it.
#[derive(Debug, Clone)]
pub struct PinchRecognizer {
    min_scale_delta: f32,
    state: PinchState,
    gesture: Option<Gesture>,
}

impl Default for PinchRecognizer {
    fn default() -> Self {
        Self::new(&GestureSettings::default())
    }
}

impl PinchRecognizer {
    pub fn new(settings: &GestureSettings) -> Self {
        Self {
            min_scale_delta: settings.pinch_min_scale_delta,
            state: PinchState::Idle,
            gesture: None,
        }
    }
}

impl GestureRecognizer for PinchRecognizer {
    fn kind(&self) -> GestureType {
        GestureType::Pinch
    }

    fn start(&mut self, sample: &PointerSample) {
        self.gesture = None;
        self.state = match sample.points.as_slice() {
            [a, b] if a.distance_to(*b) > 0.0 => PinchState::Tracking {
                start: (*a, *b),
                start_time: sample.time_ms,
                initial_distance: a.distance_to(*b),
                target: sample.target.clone(),
            },
            _ => PinchState::Idle,
        };
    }

    fn update(&mut self, sample: &PointerSample) {
        let PinchState::Tracking {
            start,
            start_time,
            initial_distance,
            target,
        } = &self.state
        else {
            return;
        };
        let Some((a, b)) = sample.two() else {
            tracing::trace!("pinch lost its second point");
            self.state = PinchState::Idle;
            self.gesture = None;
            return;
        };

        let scale = a.distance_to(b) / initial_distance;
        if self.gesture.is_none() && (scale - 1.0).abs() < self.min_scale_delta {
            return;
        }
        let start_mid = start.0.midpoint(start.1);
        self.gesture = Some(Gesture {
            kind: GestureType::Pinch,
            start_time: *start_time,
            last_update: sample.time_ms,
            data: GestureData {
                start_points: vec![start.0, start.1],
                current_points: vec![a, b],
                delta: a.midpoint(b) - start_mid,
                duration_ms: sample.time_ms.saturating_sub(*start_time),
                target: target.clone(),
                scale: Some(scale),
                ..Default::default()
            },
        });
    }

    fn end(&mut self, sample: &PointerSample) {
        self.update(sample);
        self.state = PinchState::Idle;
    }

    fn cancel(&mut self) {
        self.state = PinchState::Idle;
        self.gesture = None;
    }

    fn gesture(&self) -> Option<Gesture> {
        self.gesture.clone()
    }
}
