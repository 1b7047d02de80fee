//! Pixel-space geometry: the point type, timed interpolation, and the
//! moving-point interception solver shared by all predator/prey checks.

use serde::{Deserialize, Serialize};

use crate::GameTime;

/// Absolute position on the map measured in whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    x: i32,
    y: i32,
}

impl PixelPoint {
    /// Creates a new point at the provided pixel position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal position in pixels.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical position in pixels.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }
}

/// Euclidean distance between two points. Never rounded internally.
#[must_use]
pub fn distance(from: PixelPoint, to: PixelPoint) -> f64 {
    let dx = f64::from(to.x - from.x);
    let dy = f64::from(to.y - from.y);
    dx.hypot(dy)
}

/// Linear time-based interpolation of a single coordinate.
///
/// Returns `end` once `now >= end_time`. A zero-length interval counts as
/// already complete, so `end_time <= start_time` also yields `end`.
/// Otherwise the result is `start + (end - start) * elapsed / total`,
/// truncated toward zero.
#[must_use]
pub fn coordinate_change(
    start: i32,
    end: i32,
    start_time: GameTime,
    end_time: GameTime,
    now: GameTime,
) -> i32 {
    if now >= end_time || end_time <= start_time {
        return end;
    }
    let total = (end_time - start_time) as i64;
    let elapsed = now.saturating_sub(start_time) as i64;
    let travelled = i64::from(end - start) * elapsed / total;
    start + travelled as i32
}

/// Computes where a hunter standing at `hunter` could ambush a runner moving
/// along the straight segment `path_start -> path_end` at `path_velocity`.
///
/// The ambush point is the point on the runner's line closest to the hunter.
/// The hunter needs `distance(hunter, ambush) / hunter_velocity` time units
/// to reach it; during that time the runner covers
/// `path_velocity * time` pixels along its line. If the runner's planned
/// path is strictly shorter than that travel, the runner reaches its goal
/// first and no interception is possible.
///
/// A runner without a committed target (`path_end` is `None`) cannot be
/// intercepted. A vertical path (equal x at both ends) is special-cased so
/// the line's slope is never undefined.
#[must_use]
pub fn intercept(
    path_start: PixelPoint,
    path_end: Option<PixelPoint>,
    path_velocity: f32,
    hunter: PixelPoint,
    hunter_velocity: f32,
) -> Option<PixelPoint> {
    let path_end = path_end?;

    let sx = f64::from(path_start.x);
    let sy = f64::from(path_start.y);
    let ex = f64::from(path_end.x);
    let ey = f64::from(path_end.y);
    let hx = f64::from(hunter.x);
    let hy = f64::from(hunter.y);

    let (ambush_x, ambush_y) = if path_start.x == path_end.x {
        // Vertical line: the closest point shares the path's x.
        (sx, hy)
    } else {
        let slope = (ey - sy) / (ex - sx);
        let offset = sy - slope * sx;
        let ambush_x = (hx + slope * (hy - offset)) / (slope * slope + 1.0);
        (ambush_x, slope * ambush_x + offset)
    };

    let hunter_time = (hx - ambush_x).hypot(hy - ambush_y) / f64::from(hunter_velocity);
    let runner_travel = f64::from(path_velocity) * hunter_time;

    if distance(path_start, path_end) < runner_travel {
        return None;
    }
    Some(PixelPoint::new(ambush_x as i32, ambush_y as i32))
}
