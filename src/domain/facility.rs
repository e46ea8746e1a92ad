use std::fmt;

use super::Point;
use crate::error::{PartitionError, Result};

/// Stable facility identity. Issued by [`FacilitySet`] and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacilityId(pub u64);

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A service point (bike or metro station) with display metadata
#[derive(Debug, Clone)]
pub struct Facility {
    pub id: FacilityId,
    pub point: Point,
    pub name: String,
    pub tag: Option<String>,
}

/// Caller-owned facility list.
///
/// All mutation goes through ids. Position lookup via [`FacilitySet::locate`]
/// exists for callers that only hold a coordinate, and fails loudly when the
/// position is ambiguous.
#[derive(Debug, Clone, Default)]
pub struct FacilitySet {
    facilities: Vec<Facility>,
    next_id: u64,
}

impl FacilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        point: Point,
        name: impl Into<String>,
        tag: Option<String>,
    ) -> Result<FacilityId> {
        if !point.is_finite() {
            return Err(PartitionError::InvalidCoordinate {
                x: point.x,
                y: point.y,
            });
        }
        let id = FacilityId(self.next_id);
        self.next_id += 1;
        self.facilities.push(Facility {
            id,
            point,
            name: name.into(),
            tag,
        });
        Ok(id)
    }

    pub fn get(&self, id: FacilityId) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.id == id)
    }

    pub fn move_to(&mut self, id: FacilityId, point: Point) -> Result<()> {
        if !point.is_finite() {
            return Err(PartitionError::InvalidCoordinate {
                x: point.x,
                y: point.y,
            });
        }
        let facility = self
            .facilities
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(PartitionError::UnknownFacility(id))?;
        facility.point = point;
        Ok(())
    }

    pub fn remove(&mut self, id: FacilityId) -> Result<Facility> {
        let index = self
            .facilities
            .iter()
            .position(|f| f.id == id)
            .ok_or(PartitionError::UnknownFacility(id))?;
        Ok(self.facilities.remove(index))
    }

    /// Find the single facility at `point` (within `epsilon` on both axes)
    pub fn locate(&self, point: Point, epsilon: f64) -> Result<FacilityId> {
        let mut matches = self
            .facilities
            .iter()
            .filter(|f| f.point.approx_eq(&point, epsilon));
        match (matches.next(), matches.count()) {
            (Some(f), 0) => Ok(f.id),
            (first, rest) => Err(PartitionError::UnresolvedIdentity {
                at: point,
                matches: usize::from(first.is_some()) + rest,
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Facility> {
        self.facilities.iter()
    }

    pub fn as_slice(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}
