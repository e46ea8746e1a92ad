//! Bounded Voronoi cells from a point set
//!
//! Sites are triangulated with `spade`; each cell is then the working
//! rectangle cut by the perpendicular bisector of every Delaunay neighbor.
//! Only Delaunay neighbors can contribute a Voronoi edge, so the result is
//! the exact Voronoi cell restricted to the rectangle, and unbounded
//! perimeter cells come out closed without any special casing.

use std::collections::HashMap;

use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, Point2, Triangulation};

use super::bounds::BoundingBox;
use super::polygon::normalize;
use crate::domain::{DEFAULT_EPSILON, Point, Ring};
use crate::error::{PartitionError, Result};

/// Default padding around the point extent, as a share of its larger side
pub const DEFAULT_MARGIN_RATIO: f64 = 0.1;

/// Padding used when the extent collapses to a single point
pub const MIN_MARGIN: f64 = 1.0;

/// Cells for the distinct input points, mapped back to input indices
#[derive(Debug, Clone)]
pub struct VoronoiDiagram {
    /// Closed clockwise cell rings, one per distinct site
    pub cells: Vec<Ring>,
    /// Input indices of the distinct sites; `sites[i]` owns `cells[i]`
    pub sites: Vec<usize>,
    /// `(dropped, kept)` input indices for coincident points
    pub duplicates: Vec<(usize, usize)>,
    /// Rectangle that closes perimeter cells. `None` for an empty input.
    pub bounds: Option<BoundingBox>,
}

impl VoronoiDiagram {
    fn empty(bounds: Option<BoundingBox>) -> Self {
        Self {
            cells: Vec::new(),
            sites: Vec::new(),
            duplicates: Vec::new(),
            bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Diagram over `points`, bounded by their padded extent
pub fn generate(points: &[Point]) -> Result<VoronoiDiagram> {
    let bounds = BoundingBox::from_points(points);
    match bounds.map(|b| b.padded(DEFAULT_MARGIN_RATIO, MIN_MARGIN)) {
        Some(b) => generate_within(points, b, DEFAULT_EPSILON),
        None => Ok(VoronoiDiagram::empty(None)),
    }
}

/// Diagram over `points`, bounded by `extent`.
///
/// The extent is grown to cover every site so each site lies inside its own
/// cell. Points within `epsilon` of an earlier point are dropped and
/// reported in `duplicates`. Fewer than two distinct sites yield no cells,
/// though `sites` still lists the survivor.
pub fn generate_within(
    points: &[Point],
    extent: BoundingBox,
    epsilon: f64,
) -> Result<VoronoiDiagram> {
    if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
        return Err(PartitionError::InvalidCoordinate { x: bad.x, y: bad.y });
    }

    let mut bounds = extent;
    bounds.expand(points);

    let (sites, duplicates) = dedup_sites(points, epsilon);
    if !duplicates.is_empty() {
        tracing::warn!(count = duplicates.len(), "coincident points dropped from diagram");
    }
    if sites.len() < 2 {
        let mut diagram = VoronoiDiagram::empty(Some(bounds));
        diagram.sites = sites;
        diagram.duplicates = duplicates;
        return Ok(diagram);
    }

    let neighbors = delaunay_neighbors(points, &sites)?;

    let frame = [
        Point::new(bounds.min_x, bounds.min_y),
        Point::new(bounds.max_x, bounds.min_y),
        Point::new(bounds.max_x, bounds.max_y),
        Point::new(bounds.min_x, bounds.max_y),
    ];

    let cells = sites
        .iter()
        .zip(&neighbors)
        .map(|(&site, adjacent)| {
            let origin = points[site];
            let mut cell = frame.to_vec();
            for &other in adjacent {
                cell = clip_half_plane(&cell, origin, points[sites[other]]);
                if cell.is_empty() {
                    break;
                }
            }
            normalize(&Ring::new(cell))
        })
        .collect();

    tracing::debug!(sites = sites.len(), "voronoi diagram built");

    Ok(VoronoiDiagram {
        cells,
        sites,
        duplicates,
        bounds: Some(bounds),
    })
}

/// First occurrence wins; later coincident points map to it.
///
/// Identical coordinates always coincide, even with a zero `epsilon`: the
/// triangulation would merge them into one vertex.
fn dedup_sites(points: &[Point], epsilon: f64) -> (Vec<usize>, Vec<(usize, usize)>) {
    let mut sites: Vec<usize> = Vec::with_capacity(points.len());
    let mut duplicates = Vec::new();

    let coincide = |a: &Point, b: &Point| (a.x == b.x && a.y == b.y) || a.approx_eq(b, epsilon);
    for (i, p) in points.iter().enumerate() {
        match sites.iter().find(|&&s| coincide(&points[s], p)) {
            Some(&kept) => duplicates.push((i, kept)),
            None => sites.push(i),
        }
    }

    (sites, duplicates)
}

/// Delaunay adjacency as indices into `sites`
fn delaunay_neighbors(points: &[Point], sites: &[usize]) -> Result<Vec<Vec<usize>>> {
    let mut triangulation = DelaunayTriangulation::<Point2<f64>>::new();
    let mut handles: Vec<FixedVertexHandle> = Vec::with_capacity(sites.len());
    let mut slot_of: HashMap<FixedVertexHandle, usize> = HashMap::with_capacity(sites.len());

    for (slot, &site) in sites.iter().enumerate() {
        let p = points[site];
        let handle = triangulation
            .insert(Point2::new(p.x, p.y))
            .map_err(|e| PartitionError::Triangulation(format!("{:?} at {}", e, p)))?;
        handles.push(handle);
        slot_of.entry(handle).or_insert(slot);
    }

    Ok(handles
        .iter()
        .map(|&handle| {
            triangulation
                .vertex(handle)
                .out_edges()
                .filter_map(|edge| slot_of.get(&edge.to().fix()).copied())
                .collect()
        })
        .collect())
}

/// Sutherland-Hodgman against one bisector: keep the side closer to `site`
fn clip_half_plane(polygon: &[Point], site: Point, other: Point) -> Vec<Point> {
    let nx = other.x - site.x;
    let ny = other.y - site.y;
    let mx = (site.x + other.x) * 0.5;
    let my = (site.y + other.y) * 0.5;
    let side = |p: Point| (p.x - mx) * nx + (p.y - my) * ny;

    let n = polygon.len();
    let mut output = Vec::with_capacity(n + 1);
    for i in 0..n {
        let current = polygon[i];
        let next = polygon[(i + 1) % n];
        let dc = side(current);
        let dn = side(next);

        if dc <= 0.0 {
            output.push(current);
        }
        if (dc <= 0.0) != (dn <= 0.0) {
            let t = dc / (dc - dn);
            output.push(Point::new(
                current.x + t * (next.x - current.x),
                current.y + t * (next.y - current.y),
            ));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon::{area, point_in_polygon};

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert!(generate(&[]).unwrap().is_empty());
        assert!(generate(&pts(&[(3.0, 4.0)])).unwrap().is_empty());
    }

    #[test]
    fn test_two_points_split_by_bisector() {
        let points = pts(&[(0.0, 0.0), (10.0, 0.0)]);
        let extent = BoundingBox {
            min_x: -10.0,
            max_x: 20.0,
            min_y: -10.0,
            max_y: 10.0,
        };
        let diagram = generate_within(&points, extent, DEFAULT_EPSILON).unwrap();
        assert_eq!(diagram.len(), 2);
        assert!((area(&diagram.cells[0]) - 300.0).abs() < 1e-9);
        assert!((area(&diagram.cells[1]) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_cells_contain_their_sites() {
        let points = pts(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0), (4.0, 3.0), (8.0, 7.0)]);
        let diagram = generate(&points).unwrap();
        assert_eq!(diagram.len(), points.len());
        for (cell, &site) in diagram.cells.iter().zip(&diagram.sites) {
            assert!(point_in_polygon(points[site], cell));
        }
    }

    #[test]
    fn test_cells_tile_the_bounds() {
        let points = pts(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0), (4.0, 3.0)]);
        let diagram = generate(&points).unwrap();
        let bounds = diagram.bounds.unwrap();
        let total: f64 = diagram.cells.iter().map(area).sum();
        assert!((total - bounds.width() * bounds.height()).abs() < 1e-6);
    }

    #[test]
    fn test_duplicates_are_mapped() {
        let points = pts(&[(0.0, 0.0), (10.0, 0.0), (0.0, 1e-12), (5.0, 10.0)]);
        let diagram = generate(&points).unwrap();
        assert_eq!(diagram.len(), 3);
        assert_eq!(diagram.sites, vec![0, 1, 3]);
        assert_eq!(diagram.duplicates, vec![(2, 0)]);
    }

    #[test]
    fn test_identical_points_merge_with_zero_epsilon() {
        let points = pts(&[(0.0, 0.0), (10.0, 0.0), (0.0, 0.0)]);
        let extent = BoundingBox::from_points(&points).unwrap().padded(0.1, 1.0);
        let diagram = generate_within(&points, extent, 0.0).unwrap();
        assert_eq!(diagram.len(), 2);
        assert_eq!(diagram.sites, vec![0, 1]);
        assert_eq!(diagram.duplicates, vec![(2, 0)]);
    }

    #[test]
    fn test_collinear_sites() {
        let points = pts(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
        let diagram = generate(&points).unwrap();
        assert_eq!(diagram.len(), 3);
        for (cell, &site) in diagram.cells.iter().zip(&diagram.sites) {
            assert!(point_in_polygon(points[site], cell));
        }
    }

    #[test]
    fn test_rejects_nan() {
        let err = generate(&pts(&[(0.0, 0.0), (f64::NAN, 1.0)]));
        assert!(matches!(err, Err(PartitionError::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_clip_half_plane_keeps_near_side() {
        let square = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let clipped = clip_half_plane(&square, Point::new(1.0, 2.0), Point::new(3.0, 2.0));
        let ring = Ring::new(clipped);
        assert!((area(&ring) - 8.0).abs() < 1e-9);
    }
}
