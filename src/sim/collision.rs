//! Collision primitives for axis-aligned boxes
//!
//! Every rectangle is described by its centre plus full width and height.
//! These are pure predicates; resolution lives with the entities that use them.

use super::vector::Vector2;

/// Check if a point lies inside (or exactly on the edge of) a rectangle
pub fn point_in_rect(point: Vector2, rect_center: Vector2, w: f64, h: f64) -> bool {
    point.x >= rect_center.x - w / 2.0
        && point.x <= rect_center.x + w / 2.0
        && point.y >= rect_center.y - h / 2.0
        && point.y <= rect_center.y + h / 2.0
}

/// Check a horizontal segment against a rectangle
///
/// Returns `None` when `p1` and `p2` do not share a y; callers treat that
/// as "no collision". Otherwise true when either endpoint's x falls inside
/// the rectangle's x-span and the segment's y inside its y-span.
pub fn hseg_vs_rect(
    p1: Vector2,
    p2: Vector2,
    rect_center: Vector2,
    w: f64,
    h: f64,
) -> Option<bool> {
    if p1.y != p2.y {
        return None;
    }
    let left = rect_center.x - w / 2.0;
    let right = rect_center.x + w / 2.0;
    let x_overlap = (left <= p1.x && right >= p1.x) || (left <= p2.x && right >= p2.x);
    let y_overlap = p1.y >= rect_center.y - h / 2.0 && p1.y <= rect_center.y + h / 2.0;
    Some(x_overlap && y_overlap)
}

/// Approximate segment overlap: tests the endpoints of `b` against the
/// coordinate intervals spanned by `a1..a2`
///
/// This is an interval test, not a true intersection. It expects `a1` to be
/// the smaller corner on both axes, which holds for a platform's top edge
/// written left to right.
pub fn seg_vs_seg(a1: Vector2, a2: Vector2, b1: Vector2, b2: Vector2) -> bool {
    let x_overlap = (a1.x <= b1.x && a2.x >= b1.x) || (a1.x <= b2.x && a2.x >= b2.x);
    let y_overlap = (a1.y <= b1.y && a2.y >= b1.y) || (a1.y <= b2.y && a2.y >= b2.y);
    x_overlap && y_overlap
}

/// Check a circle against a rectangle
///
/// Hit when the centre is inside the rectangle grown by the diameter along
/// either axis, or any corner is within `radius` of the centre.
pub fn circle_vs_rect(
    circle_center: Vector2,
    radius: f64,
    rect_center: Vector2,
    w: f64,
    h: f64,
) -> bool {
    if point_in_rect(circle_center, rect_center, w, h + radius * 2.0) {
        return true;
    }
    if point_in_rect(circle_center, rect_center, w + radius * 2.0, h) {
        return true;
    }
    let half = Vector2::new(w / 2.0, h / 2.0);
    let corners = [
        rect_center - half,
        rect_center + Vector2::new(-half.x, half.y),
        rect_center + half,
        rect_center + Vector2::new(half.x, -half.y),
    ];
    corners.iter().any(|corner| circle_center.distance(*corner) <= radius)
}

/// Check whether two centres are closer than the given radius (inclusive)
#[inline]
pub fn within_radius(a: Vector2, b: Vector2, radius: f64) -> bool {
    a.distance(b) <= radius
}
