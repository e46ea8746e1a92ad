//! Ring normalization primitives
//!
//! Every boolean operation expects its operands closed and wound clockwise.
//! These helpers establish that invariant and answer the containment queries
//! used when filtering facilities.

use crate::domain::{DEFAULT_EPSILON, Point, Region, Ring};

/// Rotational direction of a ring in a y-up plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

pub fn is_closed(ring: &Ring, epsilon: f64) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => ring.len() > 1 && first.approx_eq(&last, epsilon),
        _ => false,
    }
}

/// Append the first point if the ring is not already closed. Idempotent.
pub fn close(ring: &Ring) -> Ring {
    close_with(ring, DEFAULT_EPSILON)
}

pub fn close_with(ring: &Ring, epsilon: f64) -> Ring {
    let mut points = ring.points().to_vec();
    if let Some(first) = ring.first()
        && !is_closed(ring, epsilon)
    {
        points.push(first);
    }
    Ring::new(points)
}

/// Number of pairwise-distinct points, ignoring the closing duplicate
pub fn distinct_point_count(ring: &Ring, epsilon: f64) -> usize {
    let mut distinct: Vec<Point> = Vec::with_capacity(ring.len());
    for p in ring.points() {
        if !distinct.iter().any(|d| d.approx_eq(p, epsilon)) {
            distinct.push(*p);
        }
    }
    distinct.len()
}

/// True when fewer than 3 distinct points remain after closing
pub fn is_degenerate(ring: &Ring) -> bool {
    distinct_point_count(&close(ring), DEFAULT_EPSILON) < 3
}

/// Shoelace signed area. Positive for counter-clockwise rings.
pub fn signed_area(ring: &Ring) -> f64 {
    let pts = ring.points();
    let n = pts.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

pub fn area(ring: &Ring) -> f64 {
    signed_area(ring).abs()
}

/// Area of the exterior minus its holes
pub fn region_area(region: &Region) -> f64 {
    area(&region.exterior) - region.holes.iter().map(area).sum::<f64>()
}

/// `None` for zero-area rings, which have no meaningful orientation
pub fn winding(ring: &Ring) -> Option<Winding> {
    let a = signed_area(ring);
    if a > 0.0 {
        Some(Winding::CounterClockwise)
    } else if a < 0.0 {
        Some(Winding::Clockwise)
    } else {
        None
    }
}

/// Reverse the point order if the ring does not already wind as `desired`
pub fn normalize_winding(ring: &Ring, desired: Winding) -> Ring {
    match winding(ring) {
        Some(w) if w != desired => ring.points().iter().rev().copied().collect(),
        _ => ring.clone(),
    }
}

/// Closed and clockwise: the precondition for the boolean clipper
pub fn normalize(ring: &Ring) -> Ring {
    normalize_winding(&close(ring), Winding::Clockwise)
}

/// Even-odd ray casting. Accepts open or closed rings.
///
/// Points exactly on an edge may land on either side, but the answer is
/// stable for a given ring.
pub fn point_in_polygon(point: Point, ring: &Ring) -> bool {
    let pts = ring.points();
    let n = pts.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = pts[i];
        let pj = pts[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Inside the exterior and outside every hole
pub fn region_contains(region: &Region, point: Point) -> bool {
    point_in_polygon(point, &region.exterior)
        && !region.holes.iter().any(|h| point_in_polygon(point, h))
}

/// Area-weighted centroid; falls back to the vertex mean for zero-area rings
pub fn centroid(ring: &Ring) -> Option<Point> {
    let closed = close(ring);
    let pts = closed.points();
    if pts.is_empty() {
        return None;
    }

    let mut a = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for w in pts.windows(2) {
        let cross = w[0].x * w[1].y - w[1].x * w[0].y;
        a += cross;
        cx += (w[0].x + w[1].x) * cross;
        cy += (w[0].y + w[1].y) * cross;
    }

    if a.abs() < f64::EPSILON {
        let n = ring.len() as f64;
        let sx: f64 = ring.points().iter().map(|p| p.x).sum();
        let sy: f64 = ring.points().iter().map(|p| p.y).sum();
        return Some(Point::new(sx / n, sy / n));
    }

    a *= 0.5;
    Some(Point::new(cx / (6.0 * a), cy / (6.0 * a)))
}
