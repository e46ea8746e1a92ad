//! Applying a constraint set to facility points and Voronoi cells
//!
//! Each stage maps the previous cell collection to a new one. A cell that
//! fails to clip keeps its pre-clip shape and carries a record of why.

use crate::domain::{ConstraintSet, Point, Region, Ring};
use crate::error::{PartitionError, Result};
use crate::geometry::clip::{
    difference_anchored, intersect_anchored, subtract_obstacles, union_obstacles,
};
use crate::geometry::polygon::{is_degenerate, point_in_polygon};

/// Why a point was left out of the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    OutsideBoundary,
    InsideObstacle,
}

/// Pipeline stage at which a cell kept its previous shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipStage {
    Outer,
    Obstacles,
}

/// A cell after constraints, with any fallbacks taken on the way
#[derive(Debug, Clone)]
pub struct ClippedCell {
    pub region: Region,
    pub fallbacks: Vec<(ClipStage, PartitionError)>,
}

/// The outer ring if it can bound anything. Degenerate rings count as absent.
fn usable_outer(constraints: &ConstraintSet) -> Option<&Ring> {
    if !constraints.has_outer() {
        return None;
    }
    if is_degenerate(&constraints.outer) {
        tracing::debug!(
            points = constraints.outer.len(),
            "outer constraint is degenerate, treating as unconstrained"
        );
        return None;
    }
    Some(&constraints.outer)
}

/// `None` if the point may host a facility
pub fn classify_point(point: Point, constraints: &ConstraintSet) -> Option<ExclusionReason> {
    if let Some(outer) = usable_outer(constraints)
        && !point_in_polygon(point, outer)
    {
        return Some(ExclusionReason::OutsideBoundary);
    }
    if constraints
        .inner
        .iter()
        .any(|obstacle| point_in_polygon(point, obstacle))
    {
        return Some(ExclusionReason::InsideObstacle);
    }
    None
}

/// Keep points inside the outer ring and outside every obstacle.
///
/// An empty outer ring skips the boundary test entirely.
pub fn filter_points(points: &[Point], constraints: &ConstraintSet) -> Vec<Point> {
    points
        .iter()
        .copied()
        .filter(|&p| classify_point(p, constraints).is_none())
        .collect()
}

/// Clip every cell to the outer ring, then remove the obstacles.
///
/// `anchors[i]` is the facility owning `cells[i]`; when a clip splits a cell
/// the part holding the anchor is kept. Both slices must have the same length.
pub fn apply_to_cells(
    cells: &[Ring],
    anchors: &[Point],
    constraints: &ConstraintSet,
) -> Vec<ClippedCell> {
    debug_assert_eq!(cells.len(), anchors.len(), "one anchor per cell");

    let bounded: Vec<ClippedCell> = match usable_outer(constraints) {
        Some(outer) => {
            let outer = Region::from_ring(outer.clone());
            cells
                .iter()
                .zip(anchors)
                .map(|(cell, &anchor)| clip_to_outer(cell, &outer, anchor))
                .collect()
        }
        None => cells
            .iter()
            .map(|cell| ClippedCell {
                region: Region::from_ring(cell.clone()),
                fallbacks: Vec::new(),
            })
            .collect(),
    };

    if constraints.inner.is_empty() {
        return bounded;
    }
    remove_obstacles(bounded, anchors, &constraints.inner)
}

fn clip_to_outer(cell: &Ring, outer: &Region, anchor: Point) -> ClippedCell {
    let region = Region::from_ring(cell.clone());
    let outcome = intersect_anchored(&region, outer, Some(anchor)).and_then(|clipped| {
        clipped.ok_or_else(|| PartitionError::ClipFailure {
            reason: "cell does not overlap the outer boundary".to_string(),
        })
    });

    match outcome {
        Ok(clipped) => ClippedCell {
            region: clipped,
            fallbacks: Vec::new(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "outer clip failed, keeping unclipped cell");
            ClippedCell {
                region,
                fallbacks: vec![(ClipStage::Outer, e)],
            }
        }
    }
}

/// Overlapping obstacles are merged first so the result does not depend on
/// their order. If the merge itself fails, obstacles are subtracted one at a
/// time instead.
fn remove_obstacles(
    cells: Vec<ClippedCell>,
    anchors: &[Point],
    obstacles: &[Ring],
) -> Vec<ClippedCell> {
    let union = match union_obstacles(obstacles) {
        Ok(u) => {
            if u.skipped() > 0 {
                tracing::warn!(skipped = u.skipped(), "degenerate obstacles ignored");
            }
            Some(u)
        }
        Err(e) => {
            tracing::warn!(error = %e, "obstacle union failed, subtracting sequentially");
            None
        }
    };

    cells
        .into_iter()
        .zip(anchors)
        .map(|(mut cell, &anchor)| {
            let outcome = match &union {
                Some(u) => subtract_obstacles(&cell.region, u, Some(anchor)),
                None => subtract_each(&cell.region, obstacles, anchor),
            };
            match outcome {
                Ok(Some(region)) => cell.region = region,
                Ok(None) => cell.region = Region::empty(),
                Err(e) => {
                    tracing::warn!(error = %e, "obstacle clip failed, keeping previous cell");
                    cell.fallbacks.push((ClipStage::Obstacles, e));
                }
            }
            cell
        })
        .collect()
}

fn subtract_each(region: &Region, obstacles: &[Ring], anchor: Point) -> Result<Option<Region>> {
    let mut current = region.clone();
    for obstacle in obstacles {
        let obstacle = Region::from_ring(obstacle.clone());
        match difference_anchored(&current, &obstacle, Some(anchor))? {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon::region_area;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Ring {
        Ring::from_coords(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)]).unwrap()
    }

    fn constraints() -> ConstraintSet {
        ConstraintSet::new(rect(0.0, 0.0, 10.0, 10.0), vec![rect(2.0, 2.0, 4.0, 4.0)])
    }

    #[test]
    fn test_classify_point() {
        let c = constraints();
        assert_eq!(classify_point(Point::new(5.0, 5.0), &c), None);
        assert_eq!(
            classify_point(Point::new(12.0, 5.0), &c),
            Some(ExclusionReason::OutsideBoundary)
        );
        assert_eq!(
            classify_point(Point::new(3.0, 3.0), &c),
            Some(ExclusionReason::InsideObstacle)
        );
    }

    #[test]
    fn test_empty_outer_means_unconstrained() {
        let c = ConstraintSet::new(Ring::empty(), vec![rect(2.0, 2.0, 4.0, 4.0)]);
        let kept = filter_points(&[Point::new(100.0, 100.0), Point::new(3.0, 3.0)], &c);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].approx_eq(&Point::new(100.0, 100.0), 1e-9));
    }

    #[test]
    fn test_apply_clips_to_outer() {
        let c = ConstraintSet::new(rect(0.0, 0.0, 10.0, 10.0), Vec::new());
        let cells = vec![rect(-5.0, -5.0, 5.0, 15.0)];
        let out = apply_to_cells(&cells, &[Point::new(2.0, 5.0)], &c);
        assert_eq!(out.len(), 1);
        assert!(out[0].fallbacks.is_empty());
        assert!((region_area(&out[0].region) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_keeps_cell_without_overlap() {
        let c = ConstraintSet::new(rect(0.0, 0.0, 10.0, 10.0), Vec::new());
        let cells = vec![rect(20.0, 20.0, 30.0, 30.0)];
        let out = apply_to_cells(&cells, &[Point::new(25.0, 25.0)], &c);
        assert_eq!(out[0].fallbacks.len(), 1);
        assert_eq!(out[0].fallbacks[0].0, ClipStage::Outer);
        assert!((region_area(&out[0].region) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_subtracts_overlapping_obstacles_once() {
        let c = ConstraintSet::new(
            Ring::empty(),
            vec![rect(0.0, 0.0, 4.0, 10.0), rect(2.0, 0.0, 6.0, 10.0)],
        );
        let cells = vec![rect(0.0, 0.0, 10.0, 10.0)];
        let out = apply_to_cells(&cells, &[Point::new(8.0, 5.0)], &c);
        assert!((region_area(&out[0].region) - 40.0).abs() < 1e-9);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "one anchor per cell")]
    fn test_apply_rejects_missing_anchor() {
        let c = ConstraintSet::new(rect(0.0, 0.0, 10.0, 10.0), Vec::new());
        let cells = vec![rect(0.0, 0.0, 5.0, 5.0), rect(5.0, 0.0, 10.0, 5.0)];
        apply_to_cells(&cells, &[Point::new(1.0, 1.0)], &c);
    }

    #[test]
    fn test_apply_fully_covered_cell_is_empty() {
        let c = ConstraintSet::new(Ring::empty(), vec![rect(-1.0, -1.0, 11.0, 11.0)]);
        let cells = vec![rect(0.0, 0.0, 10.0, 10.0)];
        let out = apply_to_cells(&cells, &[Point::new(5.0, 5.0)], &c);
        assert!(out[0].region.is_empty());
        assert!(out[0].fallbacks.is_empty());
    }

    #[test]
    fn test_subtract_each_matches_union() {
        let obstacles = vec![rect(0.0, 0.0, 4.0, 10.0), rect(2.0, 0.0, 6.0, 10.0)];
        let region = Region::from_ring(rect(0.0, 0.0, 10.0, 10.0));
        let r = subtract_each(&region, &obstacles, Point::new(8.0, 5.0))
            .unwrap()
            .unwrap();
        assert!((region_area(&r) - 40.0).abs() < 1e-9);
    }
}
