use std::fmt;

use super::constraints::{ClipStage, ExclusionReason, apply_to_cells, classify_point};
use crate::domain::{ConstraintSet, DEFAULT_EPSILON, Facility, FacilityId, Point, Region, Ring};
use crate::error::{PartitionError, Result};
use crate::geometry::bounds::BoundingBox;
use crate::geometry::polygon::is_degenerate;
use crate::geometry::voronoi::{DEFAULT_MARGIN_RATIO, MIN_MARGIN, generate_within};

/// Caller-selected behavior for one partition run
#[derive(Debug, Clone)]
pub struct PartitionOptions {
    /// Filter facilities and clip cells against the constraint set
    pub apply_constraints: bool,
    /// Coincidence tolerance for facility coordinates
    pub epsilon: f64,
    /// Padding of the working extent, as a share of its larger side
    pub margin_ratio: f64,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            apply_constraints: true,
            epsilon: DEFAULT_EPSILON,
            margin_ratio: DEFAULT_MARGIN_RATIO,
        }
    }
}

impl PartitionOptions {
    pub fn unconstrained() -> Self {
        Self {
            apply_constraints: false,
            ..Self::default()
        }
    }
}

/// One facility's service area
#[derive(Debug, Clone)]
pub struct Cell {
    pub facility: FacilityId,
    pub region: Region,
}

/// Why a facility has no cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    OutsideBoundary,
    InsideObstacle,
    /// Coincident with an earlier facility, which received the cell
    Duplicate { of: FacilityId },
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::OutsideBoundary => write!(f, "outside boundary"),
            Exclusion::InsideObstacle => write!(f, "inside obstacle"),
            Exclusion::Duplicate { of } => write!(f, "duplicate of {}", of),
        }
    }
}

impl From<ExclusionReason> for Exclusion {
    fn from(reason: ExclusionReason) -> Self {
        match reason {
            ExclusionReason::OutsideBoundary => Exclusion::OutsideBoundary,
            ExclusionReason::InsideObstacle => Exclusion::InsideObstacle,
        }
    }
}

/// A cell that kept its pre-clip shape at some stage
#[derive(Debug, Clone)]
pub struct ClipFallback {
    pub facility: FacilityId,
    pub stage: ClipStage,
    pub error: PartitionError,
}

#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Final cells, aligned with `survivors`
    pub cells: Vec<Cell>,
    pub survivors: Vec<FacilityId>,
    pub excluded: Vec<(FacilityId, Exclusion)>,
    pub fallbacks: Vec<ClipFallback>,
    /// Working extent of the diagram. `None` when there was nothing to bound.
    pub bounds: Option<BoundingBox>,
    /// `bounds` as a closed rectangle, for display
    pub bounding_polygon: Ring,
}

impl Partition {
    pub fn cell_for(&self, id: FacilityId) -> Option<&Cell> {
        self.cells.iter().find(|c| c.facility == id)
    }
}

/// Filter, diagram, clip.
///
/// Stateless: the same facilities, constraints and options always produce
/// the same partition.
pub fn compute_partition(
    facilities: &[Facility],
    constraints: &ConstraintSet,
    options: &PartitionOptions,
) -> Result<Partition> {
    let mut excluded = Vec::new();
    let candidates: Vec<&Facility> = if options.apply_constraints {
        facilities
            .iter()
            .filter(|f| match classify_point(f.point, constraints) {
                Some(reason) => {
                    excluded.push((f.id, Exclusion::from(reason)));
                    false
                }
                None => true,
            })
            .collect()
    } else {
        facilities.iter().collect()
    };

    tracing::debug!(
        total = facilities.len(),
        candidates = candidates.len(),
        "facilities filtered"
    );

    let points: Vec<Point> = candidates.iter().map(|f| f.point).collect();
    let Some(extent) = working_extent(&points, constraints, options) else {
        return Ok(Partition {
            excluded,
            ..Partition::default()
        });
    };

    let diagram = generate_within(&points, extent, options.epsilon)?;
    for &(dropped, kept) in &diagram.duplicates {
        excluded.push((
            candidates[dropped].id,
            Exclusion::Duplicate {
                of: candidates[kept].id,
            },
        ));
    }

    let survivors: Vec<FacilityId> = diagram.sites.iter().map(|&i| candidates[i].id).collect();
    let anchors: Vec<Point> = diagram.sites.iter().map(|&i| points[i]).collect();
    let bounds = diagram.bounds.unwrap_or(extent);

    // A lone facility serves the whole working area
    let rings = if survivors.len() == 1 {
        vec![bounds.to_ring()]
    } else {
        diagram.cells
    };

    let mut fallbacks = Vec::new();
    let regions: Vec<Region> = if options.apply_constraints {
        apply_to_cells(&rings, &anchors, constraints)
            .into_iter()
            .zip(&survivors)
            .map(|(clipped, &facility)| {
                fallbacks.extend(clipped.fallbacks.into_iter().map(|(stage, error)| {
                    ClipFallback {
                        facility,
                        stage,
                        error,
                    }
                }));
                clipped.region
            })
            .collect()
    } else {
        rings.into_iter().map(Region::from_ring).collect()
    };

    let cells = survivors
        .iter()
        .zip(regions)
        .map(|(&facility, region)| Cell { facility, region })
        .collect();

    tracing::debug!(
        cells = survivors.len(),
        excluded = excluded.len(),
        fallbacks = fallbacks.len(),
        "partition computed"
    );

    Ok(Partition {
        cells,
        survivors,
        excluded,
        fallbacks,
        bounds: Some(bounds),
        bounding_polygon: bounds.to_ring(),
    })
}

/// With an active outer constraint the diagram only needs to cover it;
/// otherwise it is sized from the facilities themselves.
fn working_extent(
    points: &[Point],
    constraints: &ConstraintSet,
    options: &PartitionOptions,
) -> Option<BoundingBox> {
    let outer_active = options.apply_constraints
        && constraints.has_outer()
        && !is_degenerate(&constraints.outer);

    let base = if outer_active {
        BoundingBox::from_ring(&constraints.outer)
    } else {
        BoundingBox::from_points(points)
    };
    base.map(|b| b.padded(options.margin_ratio, MIN_MARGIN))
}
