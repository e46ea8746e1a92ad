use thiserror::Error;

use crate::domain::{FacilityId, Point};

/// Conditions reported by the partition engine.
///
/// Clip and degeneracy conditions are recovered locally by the engine (the
/// pre-clip cell is kept and the error is recorded in the partition report).
/// Identity failures are returned to the caller.
#[derive(Debug, Clone, Error)]
pub enum PartitionError {
    #[error("degenerate polygon: {points} distinct points, need at least 3")]
    DegeneratePolygon { points: usize },

    #[error("clip failure: {reason}")]
    ClipFailure { reason: String },

    #[error("no facility with id {0}")]
    UnknownFacility(FacilityId),

    #[error("position {at} matches {matches} facilities, expected exactly one")]
    UnresolvedIdentity { at: Point, matches: usize },

    #[error("invalid coordinate ({x}, {y}): coordinates must be finite")]
    InvalidCoordinate { x: f64, y: f64 },

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

pub type Result<T> = std::result::Result<T, PartitionError>;
