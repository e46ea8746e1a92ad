pub mod constraints;
pub mod facility;
pub mod point;
pub mod ring;

pub use constraints::ConstraintSet;
pub use facility::{Facility, FacilityId, FacilitySet};
pub use point::{DEFAULT_EPSILON, Point, points_equal};
pub use ring::{Region, Ring};
