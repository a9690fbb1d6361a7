//! Geometry and exponential smoothing helpers shared by the filter and
//! aggregator stages.

use super::landmarks::{Point2, Point3};

/// Linear interpolation helper.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One exponential smoothing step: move `prev` toward `raw` by `alpha`.
pub fn smooth(prev: f32, raw: f32, alpha: f32) -> f32 {
    lerp(prev, raw, alpha)
}

/// Component-wise exponential smoothing. A missing previous value seeds
/// directly from `raw`.
pub fn smooth_point(prev: Option<Point3>, raw: Point3, alpha: f32) -> Point3 {
    match prev {
        Some(p) => Point3 {
            x: smooth(p.x, raw.x, alpha),
            y: smooth(p.y, raw.y, alpha),
            z: smooth(p.z, raw.z, alpha),
        },
        None => raw,
    }
}

/// Euclidean distance between two 3D points.
pub fn distance3(a: &Point3, b: &Point3) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Euclidean distance in the image plane.
pub fn distance2(a: &Point2, b: &Point2) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

pub fn midpoint3(a: &Point3, b: &Point3) -> Point3 {
    Point3 {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
        z: (a.z + b.z) / 2.0,
    }
}

pub fn midpoint2(a: &Point2, b: &Point2) -> Point2 {
    Point2 {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}

/// Map raw image coordinates (0..1, origin top-left) to the centered
/// convention (-1..1, origin at image center, both axes flipped).
/// Depth passes through unscaled.
pub fn to_centered(raw: &Point3) -> Point3 {
    Point3 {
        x: -(2.0 * raw.x - 1.0),
        y: -(2.0 * raw.y - 1.0),
        z: raw.z,
    }
}

// ── Tests ──────────────────────────────────────────────────
