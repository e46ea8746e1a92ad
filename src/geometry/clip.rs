//! Boolean clipping between rings
//!
//! Intersection and difference are delegated to `geo`'s sweep-line
//! `BooleanOps`, which handles concave and touching inputs. This module owns
//! the conversion to and from `geo` types, the normalization precondition,
//! degeneracy checks, and the reduction of multi-part results to the single
//! region a cell can hold.

use std::panic::{AssertUnwindSafe, catch_unwind};

use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};

use super::polygon::{
    distinct_point_count, is_degenerate, normalize, region_area, region_contains,
};
use crate::domain::{DEFAULT_EPSILON, Point, Region, Ring};
use crate::error::{PartitionError, Result};

/// Result parts smaller than this are slivers and are discarded
const MIN_PART_AREA: f64 = 1e-9;

/// Union of all obstacle rings, built once per partition
#[derive(Debug, Clone)]
pub struct ObstacleUnion {
    shape: MultiPolygon<f64>,
    skipped: usize,
}

impl ObstacleUnion {
    pub fn is_empty(&self) -> bool {
        self.shape.0.is_empty()
    }

    /// Number of input obstacles ignored because they were degenerate
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn parts(&self) -> Vec<Region> {
        self.shape.iter().map(from_geo).collect()
    }
}

/// Overlap of `a` and `b`, keeping the largest part if the overlap is split.
///
/// `Ok(None)` when they do not overlap or either operand is degenerate.
pub fn intersect(a: &Region, b: &Region) -> Result<Option<Region>> {
    intersect_anchored(a, b, None)
}

/// Like [`intersect`], but prefers the part containing `anchor`
pub fn intersect_anchored(
    a: &Region,
    b: &Region,
    anchor: Option<Point>,
) -> Result<Option<Region>> {
    let (ga, gb) = match (to_geo(a), to_geo(b)) {
        (Ok(ga), Ok(gb)) => (ga, gb),
        (Err(PartitionError::DegeneratePolygon { .. }), _)
        | (_, Err(PartitionError::DegeneratePolygon { .. })) => return Ok(None),
        (Err(e), _) | (_, Err(e)) => return Err(e),
    };
    let result = guarded(|| ga.intersection(&gb))?;
    select_part(result, anchor)
}

/// `a` with the overlap of `b` removed.
///
/// Returns `a` unchanged if they do not overlap or `b` has no area, and
/// `Ok(None)` if `b` covers `a` entirely.
pub fn difference(a: &Region, b: &Region) -> Result<Option<Region>> {
    difference_anchored(a, b, None)
}

pub fn difference_anchored(
    a: &Region,
    b: &Region,
    anchor: Option<Point>,
) -> Result<Option<Region>> {
    let ga = to_geo(a)?;
    let gb = match to_geo(b) {
        Ok(p) => p,
        Err(PartitionError::DegeneratePolygon { .. }) => return Ok(Some(a.clone())),
        Err(e) => return Err(e),
    };

    let overlap = guarded(|| ga.intersection(&gb))?;
    if overlap.0.is_empty() {
        return Ok(Some(a.clone()));
    }

    let result = guarded(|| ga.difference(&gb))?;
    select_part(result, anchor)
}

/// Subtract the union of all obstacles from `a` in a single operation
pub fn subtract_obstacles(
    a: &Region,
    obstacles: &ObstacleUnion,
    anchor: Option<Point>,
) -> Result<Option<Region>> {
    if obstacles.is_empty() {
        return Ok(Some(a.clone()));
    }
    let ga = to_geo(a)?;
    let result = guarded(|| ga.difference(&obstacles.shape))?;
    select_part(result, anchor)
}

/// Merge obstacle rings so overlapping obstacles are removed exactly once.
///
/// Degenerate rings are skipped and counted.
pub fn union_obstacles(rings: &[Ring]) -> Result<ObstacleUnion> {
    let mut skipped = 0;
    let mut shape: Option<MultiPolygon<f64>> = None;

    for ring in rings {
        let poly = match to_geo(&Region::from_ring(ring.clone())) {
            Ok(p) => p,
            Err(PartitionError::DegeneratePolygon { .. }) => {
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        shape = Some(match shape {
            None => MultiPolygon::new(vec![poly]),
            Some(acc) => guarded(|| acc.union(&poly))?,
        });
    }

    Ok(ObstacleUnion {
        shape: shape.unwrap_or_else(|| MultiPolygon::new(Vec::new())),
        skipped,
    })
}

/// Reduce a boolean result to one region.
///
/// Slivers are dropped first. Among the remaining parts the one containing
/// `anchor` wins, otherwise the one with the largest area.
fn select_part(result: MultiPolygon<f64>, anchor: Option<Point>) -> Result<Option<Region>> {
    if result.0.is_empty() {
        return Ok(None);
    }

    let raw_parts = result.0.len();
    let mut parts: Vec<(Region, f64)> = result
        .iter()
        .map(from_geo)
        .filter(|r| distinct_point_count(&r.exterior, DEFAULT_EPSILON) >= 3)
        .map(|r| {
            let a = region_area(&r);
            (r, a)
        })
        .filter(|(_, a)| *a > MIN_PART_AREA)
        .collect();

    if parts.is_empty() {
        return Err(PartitionError::ClipFailure {
            reason: format!("{} result part(s), all slivers", raw_parts),
        });
    }

    if parts.len() > 1 {
        tracing::debug!(parts = parts.len(), "clip produced multiple parts");
    }

    if let Some(anchor) = anchor
        && let Some(pos) = parts.iter().position(|(r, _)| region_contains(r, anchor))
    {
        return Ok(Some(parts.swap_remove(pos).0));
    }

    let mut best = 0;
    for (i, (_, a)) in parts.iter().enumerate() {
        if *a > parts[best].1 {
            best = i;
        }
    }
    Ok(Some(parts.swap_remove(best).0))
}

/// Run a boolean operation, turning a panic inside the sweep into a clip failure
fn guarded<F>(op: F) -> Result<MultiPolygon<f64>>
where
    F: FnOnce() -> MultiPolygon<f64>,
{
    catch_unwind(AssertUnwindSafe(op)).map_err(|_| PartitionError::ClipFailure {
        reason: "boolean operation aborted on malformed input".to_string(),
    })
}

fn to_line_string(ring: &Ring) -> LineString<f64> {
    ring.points()
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect()
}

fn to_geo(region: &Region) -> Result<Polygon<f64>> {
    if is_degenerate(&region.exterior) {
        return Err(PartitionError::DegeneratePolygon {
            points: distinct_point_count(&region.exterior, DEFAULT_EPSILON),
        });
    }
    let exterior = to_line_string(&normalize(&region.exterior));
    let holes = region
        .holes
        .iter()
        .filter(|h| !is_degenerate(h))
        .map(|h| to_line_string(&normalize(h)))
        .collect();
    Ok(Polygon::new(exterior, holes))
}

fn from_ring_coords(ls: &LineString<f64>) -> Ring {
    normalize(&ls.coords().map(|c| Point::new(c.x, c.y)).collect())
}

fn from_geo(poly: &Polygon<f64>) -> Region {
    Region::new(
        from_ring_coords(poly.exterior()),
        poly.interiors().iter().map(from_ring_coords).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon::{Winding, area, winding};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        Region::from_ring(Ring::from_coords(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)]).unwrap())
    }

    #[test]
    fn test_intersect_overlapping_squares() {
        let r = intersect(&rect(0.0, 0.0, 10.0, 10.0), &rect(5.0, 5.0, 15.0, 15.0))
            .unwrap()
            .unwrap();
        assert!((area(&r.exterior) - 25.0).abs() < 1e-9);
        assert_eq!(winding(&r.exterior), Some(Winding::Clockwise));
    }

    #[test]
    fn test_intersect_disjoint() {
        let r = intersect(&rect(0.0, 0.0, 1.0, 1.0), &rect(5.0, 5.0, 6.0, 6.0)).unwrap();
        assert!(r.is_none());
    }

    #[test]
    fn test_intersect_degenerate_input_is_empty() {
        let line = Region::from_ring(Ring::from_coords(&[(0.0, 0.0), (1.0, 1.0)]).unwrap());
        let square = rect(0.0, 0.0, 1.0, 1.0);
        assert!(intersect(&line, &square).unwrap().is_none());
        assert!(intersect(&square, &line).unwrap().is_none());
        assert!(intersect(&square, &Region::empty()).unwrap().is_none());
    }

    #[test]
    fn test_intersect_does_not_mutate_inputs() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let before = a.clone();
        let _ = intersect(&a, &b).unwrap();
        assert!(a.approx_eq(&before, f64::MIN_POSITIVE));
    }

    #[test]
    fn test_difference_disjoint_returns_a() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let r = difference(&a, &rect(5.0, 5.0, 6.0, 6.0)).unwrap().unwrap();
        assert!(r.approx_eq(&a, DEFAULT_EPSILON));
    }

    #[test]
    fn test_difference_full_cover_is_empty() {
        let r = difference(&rect(2.0, 2.0, 3.0, 3.0), &rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert!(r.is_none());
    }

    #[test]
    fn test_difference_removes_corner() {
        let r = difference(&rect(0.0, 0.0, 10.0, 10.0), &rect(5.0, 5.0, 15.0, 15.0))
            .unwrap()
            .unwrap();
        assert!((region_area(&r) - 75.0).abs() < 1e-9);
        assert!(r.holes.is_empty());
    }

    #[test]
    fn test_difference_interior_obstacle_makes_hole() {
        let r = difference(&rect(0.0, 0.0, 10.0, 10.0), &rect(4.0, 4.0, 6.0, 6.0))
            .unwrap()
            .unwrap();
        assert_eq!(r.holes.len(), 1);
        assert!((region_area(&r) - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_difference_split_keeps_anchor_part() {
        // A vertical bar splits the square into a 3-wide left and 5-wide right part
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let bar = rect(3.0, -1.0, 5.0, 11.0);

        let largest = difference(&a, &bar).unwrap().unwrap();
        assert!((region_area(&largest) - 50.0).abs() < 1e-9);

        let anchored = difference_anchored(&a, &bar, Some(Point::new(1.0, 5.0)))
            .unwrap()
            .unwrap();
        assert!((region_area(&anchored) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_obstacles_merges_overlap() {
        let rings = vec![
            rect(0.0, 0.0, 2.0, 2.0).exterior,
            rect(1.0, 0.0, 3.0, 2.0).exterior,
            Ring::from_coords(&[(0.0, 0.0), (1.0, 1.0)]).unwrap(),
        ];
        let union = union_obstacles(&rings).unwrap();
        assert_eq!(union.skipped(), 1);
        let parts = union.parts();
        assert_eq!(parts.len(), 1);
        assert!((region_area(&parts[0]) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_subtract_obstacles() {
        let rings = vec![
            rect(0.0, 0.0, 2.0, 10.0).exterior,
            rect(8.0, 0.0, 10.0, 10.0).exterior,
        ];
        let union = union_obstacles(&rings).unwrap();
        let cell = rect(0.0, 0.0, 10.0, 10.0);
        let r = subtract_obstacles(&cell, &union, Some(Point::new(5.0, 5.0)))
            .unwrap()
            .unwrap();
        assert!((region_area(&r) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_subtract_empty_union_is_identity() {
        let union = union_obstacles(&[]).unwrap();
        assert!(union.is_empty());
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let r = subtract_obstacles(&a, &union, None).unwrap().unwrap();
        assert!(r.approx_eq(&a, DEFAULT_EPSILON));
    }
}
