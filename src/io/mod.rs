//! Dataset loaders and the GeoJSON writer used by the CLI
//!
//! Nothing in here is needed by the partition engine itself.

pub mod constraints;
pub mod geojson;
pub mod stations;

pub use constraints::{ConstraintFile, load_constraints};
pub use geojson::write_geojson;
pub use stations::{StationRecord, load_stations, to_facility_set};

use crate::domain::Point;
use crate::geometry::Projector;

/// How dataset (lat, lng) pairs map onto the engine's plane
#[derive(Debug, Clone)]
pub enum CoordFrame {
    /// Local meters around a center point
    Projected(Projector),
    /// Raw degrees, x = lng and y = lat
    Degrees,
}

impl CoordFrame {
    pub fn to_plane(&self, lat: f64, lng: f64) -> Point {
        match self {
            CoordFrame::Projected(projector) => projector.project(lat, lng),
            CoordFrame::Degrees => Point::new(lng, lat),
        }
    }

    /// GeoJSON position order: `[lng, lat]`
    pub fn to_lnglat(&self, p: Point) -> [f64; 2] {
        match self {
            CoordFrame::Projected(projector) => {
                let (lat, lng) = projector.unproject(p);
                [lng, lat]
            }
            CoordFrame::Degrees => [p.x, p.y],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projected_round_trip() {
        let frame = CoordFrame::Projected(Projector::new((52.52, 13.40)));
        let p = frame.to_plane(52.53, 13.41);
        let [lng, lat] = frame.to_lnglat(p);
        assert!((lat - 52.53).abs() < 1e-9);
        assert!((lng - 13.41).abs() < 1e-9);
    }
}
