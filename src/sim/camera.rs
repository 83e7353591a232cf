//! Camera controller
//!
//! One view transform derived from the two tracked player positions:
//! center chases their midpoint, zoom widens with the distance between
//! them, and the resulting viewport is clamped inside the map
//! boundaries - per axis, unless the map is smaller than the view on
//! that axis, in which case the view centers on it.

use glam::Vec2;

use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};
use crate::smoothing;

use super::rect::Rect;

/// Exponential-decay rates for center and zoom chasing
const CENTER_RATE: f32 = 4.0;
const ZOOM_RATE: f32 = 2.0;

/// Zoom bounds: 1.0 shows the base viewport, larger shows more
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 2.0;

/// Player distance at which zoom starts growing past the minimum
const ZOOM_DISTANCE: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct Camera {
    pub center: Vec2,
    pub zoom: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: MIN_ZOOM,
        }
    }

    /// Advance the camera one tick toward framing both players.
    pub fn update(&mut self, a: Vec2, b: Vec2, bounds: Rect, dt: f32) {
        let target_center = (a + b) * 0.5;
        // Monotonic in distance; zero distance lands on the minimum
        let target_zoom = (a.distance(b) / ZOOM_DISTANCE).clamp(MIN_ZOOM, MAX_ZOOM);

        self.center += (target_center - self.center) * smoothing(CENTER_RATE, dt);
        self.zoom += (target_zoom - self.zoom) * smoothing(ZOOM_RATE, dt);

        self.center = clamp_center(self.center, self.zoom, bounds);
    }

    /// The world-space rectangle currently visible
    pub fn visible(&self) -> Rect {
        let half_w = VIEW_WIDTH * self.zoom / 2.0;
        let half_h = VIEW_HEIGHT * self.zoom / 2.0;
        Rect::new(
            self.center.x - half_w,
            self.center.y - half_h,
            half_w * 2.0,
            half_h * 2.0,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep the visible rectangle inside the boundaries on each axis
/// independently; center on any axis the map is smaller than the view.
fn clamp_center(center: Vec2, zoom: f32, bounds: Rect) -> Vec2 {
    let half_w = VIEW_WIDTH * zoom / 2.0;
    let half_h = VIEW_HEIGHT * zoom / 2.0;

    let x = if bounds.w <= half_w * 2.0 {
        bounds.x + bounds.w / 2.0
    } else {
        center.x.clamp(bounds.x + half_w, bounds.right() - half_w)
    };
    let y = if bounds.h <= half_h * 2.0 {
        bounds.y + bounds.h / 2.0
    } else {
        center.y.clamp(bounds.y + half_h, bounds.top() - half_h)
    };

    Vec2::new(x, y)
}
