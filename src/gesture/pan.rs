use super::{Gesture, GestureData, GestureRecognizer, GestureType, PointerSample};
use crate::config::GestureSettings;
use crate::geometry::Point;
use crate::interaction::EventTarget;

#[derive(Debug, Clone, PartialEq)]
enum PanState {
    Idle,
    Tracking {
        start: (Point, Point),
        start_mid: Point,
        start_time: u64,
        target: Option<EventTarget>,
    },
}

/// Two-finger pan, tracked by the midpoint of both fingers.
#[derive(Debug, Clone)]
pub struct PanRecognizer {
    min_distance: f32,
    state: PanState,
    gesture: Option<Gesture>,
}

impl Default for PanRecognizer {
    fn default() -> Self {
        Self::new(&GestureSettings::default())
    }
}

impl PanRecognizer {
    pub fn new(settings: &GestureSettings) -> Self {
        Self {
            min_distance: settings.pan_min_distance,
            state: PanState::Idle,
            gesture: None,
        }
    }
}

impl GestureRecognizer for PanRecognizer {
    fn kind(&self) -> GestureType {
        GestureType::Pan
    }

    fn start(&mut self, sample: &PointerSample) {
        self.gesture = None;
        self.state = match sample.points.as_slice() {
            [a, b] => PanState::Tracking {
                start: (*a, *b),
                start_mid: a.midpoint(*b),
                start_time: sample.time_ms,
                target: sample.target.clone(),
            },
            _ => PanState::Idle,
        };
    }

    fn update(&mut self, sample: &PointerSample) {
        let PanState::Tracking {
            start,
            start_mid,
            start_time,
            target,
        } = &self.state
        else {
            return;
        };
        let Some((a, b)) = sample.two() else {
            self.state = PanState::Idle;
            self.gesture = None;
            return;
        };

        let delta = a.midpoint(b) - *start_mid;
        let distance = delta.length();
        if self.gesture.is_none() && distance < self.min_distance {
            return;
        }
        let duration = sample.time_ms.saturating_sub(*start_time);
        self.gesture = Some(Gesture {
            kind: GestureType::Pan,
            start_time: *start_time,
            last_update: sample.time_ms,
            data: GestureData {
                start_points: vec![start.0, start.1],
                current_points: vec![a, b],
                delta,
                duration_ms: duration,
                target: target.clone(),
                velocity: Some(distance / duration.max(1) as f32),
                ..Default::default()
            },
        });
    }

    fn end(&mut self, sample: &PointerSample) {
        self.update(sample);
        self.state = PanState::Idle;
    }

    fn cancel(&mut self) {
        self.state = PanState::Idle;
        self.gesture = None;
    }

    fn gesture(&self) -> Option<Gesture> {
        self.gesture.clone()
    }
}
