use crate::domain::{Point, Ring};

/// Axis-aligned working extent used to close unbounded Voronoi cells
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create bounds from a set of points
    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut min_x = f64::MAX;
        let mut max_x = f64::MIN;
        let mut min_y = f64::MAX;
        let mut max_y = f64::MIN;

        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    pub fn from_ring(ring: &Ring) -> Option<Self> {
        Self::from_points(ring.points())
    }

    /// Expand bounds to include another set of points
    pub fn expand(&mut self, points: &[Point]) {
        for p in points {
            self.min_x = self.min_x.min(p.x);
            self.max_x = self.max_x.max(p.x);
            self.min_y = self.min_y.min(p.y);
            self.max_y = self.max_y.max(p.y);
        }
    }

    /// Grow every side by `ratio` of the larger dimension, at least `min_margin`.
    ///
    /// The floor keeps a single point or a collinear set from producing a
    /// zero-width box.
    pub fn padded(&self, ratio: f64, min_margin: f64) -> Self {
        let margin = (self.width().max(self.height()) * ratio).max(min_margin);
        Self {
            min_x: self.min_x - margin,
            max_x: self.max_x + margin,
            min_y: self.min_y - margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Closed clockwise rectangle, suitable for rendering and clipping
    pub fn to_ring(&self) -> Ring {
        Ring::new(vec![
            Point::new(self.min_x, self.min_y),
            Point::new(self.min_x, self.max_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.min_x, self.min_y),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon::{Winding, winding};

    #[test]
    fn test_bounds_from_points() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1000.0, 2000.0),
            Point::new(500.0, 1000.0),
        ];
        let bounds = BoundingBox::from_points(&points).unwrap();

        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 1000.0);
        assert_eq!(bounds.min_y, 0.0);
        assert_eq!(bounds.max_y, 2000.0);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_padded_uses_floor_for_single_point() {
        let bounds = BoundingBox::from_points(&[Point::new(5.0, 5.0)])
            .unwrap()
            .padded(0.1, 1.0);
        assert_eq!(bounds.width(), 2.0);
        assert_eq!(bounds.height(), 2.0);
    }

    #[test]
    fn test_padded_ratio() {
        let bounds = BoundingBox::from_points(&[Point::new(0.0, 0.0), Point::new(100.0, 50.0)])
            .unwrap()
            .padded(0.1, 0.0);
        assert_eq!(bounds.min_x, -10.0);
        assert_eq!(bounds.max_y, 60.0);
    }

    #[test]
    fn test_to_ring_is_closed_clockwise() {
        let ring = BoundingBox::from_points(&[Point::new(0.0, 0.0), Point::new(2.0, 3.0)])
            .unwrap()
            .to_ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(winding(&ring), Some(Winding::Clockwise));
    }
}
