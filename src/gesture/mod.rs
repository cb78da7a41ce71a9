//! Gesture recognition.
//!
//! Six independent recognizers ([`TapRecognizer`], [`LongPressRecognizer`],
//! [`SwipeRecognizer`], [`PinchRecognizer`], [`RotateRecognizer`],
//! [`PanRecognizer`]) share the [`GestureRecognizer`] lifecycle and are driven
//! in lockstep by the [`GestureCoordinator`]. Each one turns a stream of
//! [`PointerSample`]s into at most one recognized [`Gesture`].

mod coordinator;
mod long_press;
mod pan;
mod pinch;
mod rotate;
mod swipe;
mod tap;

pub use coordinator::{
    GestureCoordinator, GestureEvent, GestureHandler, PointerEvent, PointerKind, PointerPhase,
    TouchEvent, TouchPhase, TouchPoint,
};
pub use long_press::LongPressRecognizer;
pub use pan::PanRecognizer;
pub use pinch::PinchRecognizer;
pub use rotate::RotateRecognizer;
pub use swipe::SwipeRecognizer;
pub use tap::TapRecognizer;

use crate::geometry::Point;
use crate::interaction::EventTarget;
use serde::{Deserialize, Serialize};

/// The kinds of gesture the recognizers can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureType {
    Tap,
    LongPress,
    Swipe,
    Pinch,
    Rotate,
    Pan,
}

impl GestureType {
    pub fn as_str(self) -> &'static str {
        match self {
            GestureType::Tap => "tap",
            GestureType::LongPress => "long-press",
            GestureType::Swipe => "swipe",
            GestureType::Pinch => "pinch",
            GestureType::Rotate => "rotate",
            GestureType::Pan => "pan",
        }
    }
}

/// Four-way swipe direction in screen coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

/// One observation of the active touch points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerSample {
    pub points: Vec<Point>,
    pub time_ms: u64,
    pub target: Option<EventTarget>,
}

impl PointerSample {
    pub fn new(points: Vec<Point>, time_ms: u64) -> Self {
        Self {
            points,
            time_ms,
            target: None,
        }
    }

    /// Single-point sample.
    pub fn at(x: f32, y: f32, time_ms: u64) -> Self {
        Self::new(vec![Point::new(x, y)], time_ms)
    }

    /// Two-point sample.
    pub fn pair(a: (f32, f32), b: (f32, f32), time_ms: u64) -> Self {
        Self::new(vec![a.into(), b.into()], time_ms)
    }

    pub fn with_target(mut self, target: Option<EventTarget>) -> Self {
        self.target = target;
        self
    }

    pub(crate) fn two(&self) -> Option<(Point, Point)> {
        match self.points.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }
}

/// Measurements attached to a recognized gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureData {
    pub start_points: Vec<Point>,
    pub current_points: Vec<Point>,
    pub delta: Point,
    pub duration_ms: u64,
    pub target: Option<EventTarget>,
    pub scale: Option<f32>,
    /// Degrees, normalized to (-180, 180].
    pub angle: Option<f32>,
    pub direction: Option<SwipeDirection>,
    /// Pixels per millisecond.
    pub velocity: Option<f32>,
}

/// A recognized gesture. Lives until the coordinator clears gesture state.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub kind: GestureType,
    pub start_time: u64,
    pub last_update: u64,
    pub data: GestureData,
}

/// Uniform lifecycle shared by every recognizer.
///
/// `start` always resets any previously recognized gesture. `gesture` returns
/// the recognized gesture, if any, without consuming it.
pub trait GestureRecognizer {
    fn kind(&self) -> GestureType;
    fn start(&mut self, sample: &PointerSample);
    fn update(&mut self, sample: &PointerSample);
    fn end(&mut self, sample: &PointerSample);
    fn cancel(&mut self);
    fn gesture(&self) -> Option<Gesture>;
}

/// Normalize an angle in degrees to (-180, 180].
pub fn normalize_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Angle of the vector `a → b` in degrees.
pub(crate) fn vector_angle(a: Point, b: Point) -> f32 {
    let d = b - a;
    d.y.atan2(d.x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees_range() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(720.0 + 45.0), 45.0);
    }

    #[test]
    fn test_vector_angle_quadrants() {
        let o = Point::ZERO;
        assert_eq!(vector_angle(o, Point::new(1.0, 0.0)), 0.0);
        assert!((vector_angle(o, Point::new(0.0, 1.0)) - 90.0).abs() < 1e-4);
        assert!((vector_angle(o, Point::new(-1.0, 0.0)) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_sample_helpers() {
        let s = PointerSample::pair((0.0, 0.0), (10.0, 0.0), 5);
        assert_eq!(s.two(), Some((Point::ZERO, Point::new(10.0, 0.0))));
        assert_eq!(PointerSample::at(1.0, 2.0, 0).two(), None);
    }
}
