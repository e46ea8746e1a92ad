use super::Point;
use crate::error::{PartitionError, Result};

/// A simple polygon ring, not necessarily closed.
#[derive(Debug, Clone, Default)]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    /// Wrap points without validation. Use [`Ring::try_new`] at input boundaries.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a ring, rejecting NaN or infinite coordinates
    pub fn try_new(points: Vec<Point>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(PartitionError::InvalidCoordinate { x: bad.x, y: bad.y });
        }
        Ok(Self { points })
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self> {
        Self::try_new(coords.iter().copied().map(Point::from).collect())
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Point-by-point comparison with tolerance; ring lengths must match
    pub fn approx_eq(&self, other: &Ring, epsilon: f64) -> bool {
        self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(&other.points)
                .all(|(a, b)| a.approx_eq(b, epsilon))
    }

    pub fn to_coords(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|&p| p.into()).collect()
    }
}

impl FromIterator<Point> for Ring {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A clipped service area: one exterior ring plus obstacle holes.
///
/// Holes only appear when an obstacle lies strictly inside a cell. An empty
/// exterior means the cell was fully covered by obstacles.
#[derive(Debug, Clone, Default)]
pub struct Region {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Region {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    pub fn from_ring(exterior: Ring) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    pub fn approx_eq(&self, other: &Region, epsilon: f64) -> bool {
        self.exterior.approx_eq(&other.exterior, epsilon)
            && self.holes.len() == other.holes.len()
            && self
                .holes
                .iter()
                .zip(&other.holes)
                .all(|(a, b)| a.approx_eq(b, epsilon))
    }
}
