use std::fmt;

/// Tolerance for planar coordinates (projected meters or raw plane units)
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// A 2-D coordinate pair. Axis meaning (x/y or lat/lng) is opaque to the engine.
///
/// Points are deliberately not `PartialEq`: coordinates come from drag gestures
/// and float round trips, so comparisons go through [`Point::approx_eq`].
#[derive(Debug, Clone, Copy, Default)]
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

    /// True when both coordinate deltas are strictly below `epsilon`
    pub fn approx_eq(&self, other: &Point, epsilon: f64) -> bool {
        points_equal(*self, *other, epsilon)
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub fn points_equal(a: Point, b: Point, epsilon: f64) -> bool {
    (a.x - b.x).abs() < epsilon && (a.y - b.y).abs() < epsilon
}
