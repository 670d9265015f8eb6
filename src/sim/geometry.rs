//! Segment geometry primitives
//!
//! Pure functions shared by the physics kernel and plane picking.

use glam::Vec2;

use crate::normalize_angle;

/// Point where segment `a1-a2` crosses segment `b1-b2`
///
/// Uses the parametric (ua, ub) line intersection. Returns `None` when either
/// segment has zero length, when the lines are parallel, or when the crossing
/// lies outside either segment. Touching at an endpoint counts as a hit.
pub fn segment_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    if a1 == a2 || b1 == b2 {
        return None;
    }

    let denominator = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if denominator == 0.0 {
        return None;
    }

    let ua = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / denominator;
    let ub = ((a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x)) / denominator;

    if !(0.0..=1.0).contains(&ua) || !(0.0..=1.0).contains(&ub) {
        return None;
    }

    Some(Vec2::new(a1.x + ua * (a2.x - a1.x), a1.y + ua * (a2.y - a1.y)))
}

/// Mirror a travel direction about a segment's direction
///
/// Both angles are in [0, 2π); the result is `2 * plane_angle - ball_angle`
/// wrapped into the same range.
#[inline]
pub fn reflect_angle(plane_angle: f32, ball_angle: f32) -> f32 {
    let difference = normalize_angle(plane_angle - ball_angle);
    normalize_angle(plane_angle + difference)
}

/// Shortest distance from `point` to segment `a-b`
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let line = b - a;
    let len_sq = line.length_squared();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(line) / len_sq).clamp(0.0, 1.0);
    point.distance(a + line * t)
}
