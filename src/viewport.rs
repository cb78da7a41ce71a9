//! Zoom and pan of the canvas.
//!
//! Screen coordinates relate to world coordinates as
//! `screen = world * zoom + pan`.

use crate::geometry::Point;
use crate::surfaces::ViewportSurface;

/// Reference [`ViewportSurface`]. Zoom is clamped to `[min_zoom, max_zoom]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    zoom: f32,
    pan: Point,
    min_zoom: f32,
    max_zoom: f32,
    /// Visible area in screen pixels, used by `center_on`.
    size: (f32, f32),
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(0.1, 4.0)
    }
}

impl ViewportState {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ZERO,
            min_zoom,
            max_zoom: max_zoom.max(min_zoom),
            size: (800.0, 600.0),
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = (width, height);
    }

    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.zoom + self.pan.x, world.y * self.zoom + self.pan.y)
    }
}

impl ViewportSurface for ViewportState {
    fn zoom(&self) -> f32 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    fn pan(&self) -> Point {
        self.pan
    }

    fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan = self.pan + Point::new(dx, dy);
    }

    fn center_on(&mut self, world: Point) {
        let (w, h) = self.size;
        self.pan = Point::new(w / 2.0 - world.x * self.zoom, h / 2.0 - world.y * self.zoom);
    }

    fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Point::ZERO;
    }

    fn screen_to_world(&self, screen: Point) -> Point {
        let z = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        Point::new((screen.x - self.pan.x) / z, (screen.y - self.pan.y) / z)
    }
}
