use super::{Gesture, GestureData, GestureRecognizer, GestureType, PointerSample, SwipeDirection};
use crate::config::GestureSettings;
use crate::geometry::Point;
use crate::interaction::EventTarget;

#[derive(Debug, Clone, PartialEq)]
enum SwipeState {
    Idle,
    Tracking {
        start: Point,
        start_time: u64,
        last: Point,
        target: Option<EventTarget>,
    },
    Rejected,
}

/// Recognizes a fast single-point flick.
///
/// Evaluated on `end`: the displacement must reach the minimum distance within
/// the maximum duration, at or above the minimum velocity.
#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    min_distance: f32,
    max_duration_ms: u64,
    min_velocity: f32,
    state: SwipeState,
    gesture: Option<Gesture>,
}

impl Default for SwipeRecognizer {
    fn default() -> Self {
        Self::new(&GestureSettings::default())
    }
}

impl SwipeRecognizer {
    pub fn new(settings: &GestureSettings) -> Self {
        Self {
            min_distance: settings.swipe_min_distance,
            max_duration_ms: settings.swipe_max_duration_ms,
            min_velocity: settings.swipe_min_velocity,
            state: SwipeState::Idle,
            gesture: None,
        }
    }
}

/// Dominant axis wins; ties go to the vertical axis.
fn direction_of(delta: Point) -> SwipeDirection {
    if delta.x.abs() > delta.y.abs() {
        if delta.x > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if delta.y > 0.0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    }
}

impl GestureRecognizer for SwipeRecognizer {
    fn kind(&self) -> GestureType {
        GestureType::Swipe
    }

    fn start(&mut self, sample: &PointerSample) {
        self.gesture = None;
        self.state = match sample.points.as_slice() {
            [p] => SwipeState::Tracking {
                start: *p,
                start_time: sample.time_ms,
                last: *p,
                target: sample.target.clone(),
            },
            _ => SwipeState::Rejected,
        };
    }

    fn update(&mut self, sample: &PointerSample) {
        if let SwipeState::Tracking { last, .. } = &mut self.state {
            match sample.points.as_slice() {
                [p] => *last = *p,
                _ => self.state = SwipeState::Rejected,
            }
        }
    }

    fn end(&mut self, sample: &PointerSample) {
        self.update(sample);
        let SwipeState::Tracking {
            start,
            start_time,
            last,
            target,
        } = std::mem::replace(&mut self.state, SwipeState::Idle)
        else {
            return;
        };

        let delta = last - start;
        let distance = delta.length();
        let duration = sample.time_ms.saturating_sub(start_time);
        let velocity = distance / duration.max(1) as f32;

        if distance >= self.min_distance
            && duration <= self.max_duration_ms
            && velocity >= self.min_velocity
        {
            let direction = direction_of(delta);
            tracing::debug!(?direction, distance, velocity, "swipe recognized");
            self.gesture = Some(Gesture {
                kind: GestureType::Swipe,
                start_time,
                last_update: sample.time_ms,
                data: GestureData {
                    start_points: vec![start],
                    current_points: vec![last],
                    delta,
                    duration_ms: duration,
                    target,
                    direction: Some(direction),
                    velocity: Some(velocity),
                    ..Default::default()
                },
            });
        }
    }

    fn cancel(&mut self) {
        self.state = SwipeState::Idle;
        self.gesture = None;
    }

    fn gesture(&self) -> Option<Gesture> {
        self.gesture.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swipe(from: (f32, f32), to: (f32, f32), duration: u64) -> Option<Gesture> {
        let mut r = SwipeRecognizer::default();
        r.start(&PointerSample::at(from.0, from.1, 0));
        r.update(&PointerSample::at(to.0, to.1, duration / 2));
        r.end(&PointerSample::at(to.0, to.1, duration));
        r.gesture()
    }

    #[test]
    fn test_fast_horizontal_flick_is_swipe_right() {
        let g = swipe((0.0, 0.0), (120.0, 10.0), 100).expect("swipe");
        assert_eq!(g.data.direction, Some(SwipeDirection::Right));
        assert!((g.data.velocity.unwrap() - 120.4155 / 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_directions() {
        assert_eq!(
            swipe((200.0, 0.0), (0.0, 0.0), 100).unwrap().data.direction,
            Some(SwipeDirection::Left)
        );
        assert_eq!(
            swipe((0.0, 0.0), (0.0, 80.0), 100).unwrap().data.direction,
            Some(SwipeDirection::Down)
        );
        assert_eq!(
            swipe((0.0, 80.0), (5.0, 0.0), 100).unwrap().data.direction,
            Some(SwipeDirection::Up)
        );
    }

    #[test]
    fn test_short_distance_rejected() {
        assert!(swipe((0.0, 0.0), (49.0, 0.0), 50).is_none());
    }

    #[test]
    fn test_slow_swipe_rejected() {
        // 60px over 400ms = 0.15 px/ms
        assert!(swipe((0.0, 0.0), (60.0, 0.0), 400).is_none());
    }

    #[test]
    fn test_long_duration_rejected() {
        assert!(swipe((0.0, 0.0), (400.0, 0.0), 501).is_none());
    }

    #[test]
    fn test_two_point_start_rejected() {
        let mut r = SwipeRecognizer::default();
        r.start(&PointerSample::pair((0.0, 0.0), (10.0, 0.0), 0));
        r.end(&PointerSample::at(200.0, 0.0, 50));
        assert!(r.gesture().is_none());
    }
}
