// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Geometry Helpers

//! Planar geometry used by layout, edge generation and motion.
//!
//! Everything here works in canvas pixels with `f64` coordinates. Any
//! operation that divides by a length is guarded with [`EPSILON`] so that
//! degenerate layouts (all nodes on one spot, zero-sized canvas) never push
//! `NaN` or infinities into node positions.

use serde::{Deserialize, Serialize};

/// Smallest length treated as non-zero.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Squared Euclidean distance; cheaper than [`distance`] for ordering.
pub fn distance2(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

pub fn distance(a: Point, b: Point) -> f64 {
    distance2(a, b).sqrt()
}

/// Linear interpolation between two points, `t` clamped to [0, 1].
pub fn lerp(a: Point, b: Point, t: f64) -> Point {
    let t = t.clamp(0.0, 1.0);
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Signed area of the triangle (a, b, c), doubled.
fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Orientation of ordered triplet (a, b, c): 1 counter-clockwise,
/// -1 clockwise, 0 collinear within [`EPSILON`].
fn orientation(a: Point, b: Point, c: Point) -> i32 {
    let v = cross(a, b, c);
    if v > EPSILON {
        1
    } else if v < -EPSILON {
        -1
    } else {
        0
    }
}

/// Strict segment crossing test.
///
/// Returns `true` only when the two segments cross at a single interior
/// point. Touching at an endpoint and collinear overlap both count as
/// "not crossing"; callers that share an endpoint by identity should skip
/// the test entirely rather than rely on floating point to detect it.
pub fn segments_cross(p1: Point, q1: Point, p2: Point, q2: Point) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);
    o1 * o2 < 0 && o3 * o4 < 0
}

/// Map `value` from `[min, min + span]` onto `[0, 1]`.
///
/// A span below [`EPSILON`] maps everything to the midpoint.
pub fn normalize(value: f64, min: f64, span: f64) -> f64 {
    if span.abs() < EPSILON || !span.is_finite() {
        return 0.5;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// Usable extent of one canvas axis after removing a margin on both sides.
pub fn usable_extent(extent: f64, margin: f64) -> f64 {
    (extent - 2.0 * margin).max(0.0)
}

/// Place normalized `t` on an axis of length `extent` inside `margin`.
///
/// The margin shrinks to half the extent on tiny canvases so the result
/// always stays within `[0, extent]`.
pub fn fit_axis(t: f64, extent: f64, margin: f64) -> f64 {
    let extent = extent.max(0.0);
    let margin = margin.min(extent / 2.0);
    margin + t.clamp(0.0, 1.0) * usable_extent(extent, margin)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
