use super::{
    normalize_degrees, vector_angle, Gesture, GestureData, GestureRecognizer, GestureType,
    PointerSample,
};
use crate::config::GestureSettings;
use crate::geometry::Point;
use crate::interaction::EventTarget;

#[derive(Debug, Clone, PartialEq)]
enum RotateState {
    Idle,
    Tracking {
        start: (Point, Point),
        start_time: u64,
        initial_angle: f32,
        target: Option<EventTarget>,
    },
}

/// Two-finger rotation. Reports the signed angle, in degrees, between the
/// finger vector at start and now.
#[derive(Debug, Clone)]
pub struct RotateRecognizer {
    min_angle: f32,
    state: RotateState,
    gesture: Option<Gesture>,
}

impl Default for RotateRecognizer {
    fn default() -> Self {
        Self::new(&GestureSettings::default())
    }
}

impl RotateRecognizer {
    pub fn new(settings: &GestureSettings) -> Self {
        Self {
            min_angle: settings.rotate_min_angle,
            state: RotateState::Idle,
            gesture: None,
        }
    }
}

impl GestureRecognizer for RotateRecognizer {
    fn kind(&self) -> GestureType {
        GestureType::Rotate
    }

    fn start(&mut self, sample: &PointerSample) {
        self.gesture = None;
        self.state = match sample.points.as_slice() {
            [a, b] => RotateState::Tracking {
                start: (*a, *b),
                start_time: sample.time_ms,
                initial_angle: vector_angle(*a, *b),
                target: sample.target.clone(),
            },
            _ => RotateState::Idle,
        };
    }

    fn update(&mut self, sample: &PointerSample) {
        let RotateState::Tracking {
            start,
            start_time,
            initial_angle,
            target,
        } = &self.state
        else {
            return;
        };
        let Some((a, b)) = sample.two() else {
            self.state = RotateState::Idle;
            self.gesture = None;
            return;
        };

        let angle = normalize_degrees(vector_angle(a, b) - initial_angle);
        if self.gesture.is_none() && angle.abs() < self.min_angle {
            return;
        }
        self.gesture = Some(Gesture {
            kind: GestureType::Rotate,
            start_time: *start_time,
            last_update: sample.time_ms,
            data: GestureData {
                start_points: vec![start.0, start.1],
                current_points: vec![a, b],
                delta: a.midpoint(b) - start.0.midpoint(start.1),
                duration_ms: sample.time_ms.saturating_sub(*start_time),
                target: target.clone(),
                angle: Some(angle),
                ..Default::default()
            },
        });
    }

    fn end(&mut self, sample: &PointerSample) {
        self.update(sample);
        self.state = RotateState::Idle;
    }

    fn cancel(&mut self) {
        self.state = RotateState::Idle;
        self.gesture = None;
    }

    fn gesture(&self) -> Option<Gesture> {
        self.gesture.clone()
    }
}
