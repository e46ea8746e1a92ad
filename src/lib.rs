//! stationzones - constrained Voronoi service areas for bike and metro stations
//!
//! The engine is stateless: callers own a [`domain::FacilitySet`] and a
//! [`domain::ConstraintSet`] and call [`partition::compute_partition`] after
//! every change.

pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod io;
pub mod partition;

pub use domain::{ConstraintSet, Facility, FacilityId, FacilitySet, Point, Region, Ring};
pub use error::PartitionError;
pub use partition::{Partition, PartitionOptions, compute_partition};
