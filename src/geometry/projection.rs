use crate::domain::{Point, Ring};

/// Meters per degree of latitude (and of longitude at the equator)
const METERS_PER_DEGREE: f64 = 111320.0;

/// Simple equirectangular projection from WGS84 to local meters
///
/// Uses approximation suitable for city-scale station networks:
/// - x = (lon - center_lon) * cos(center_lat) * 111320
/// - y = (lat - center_lat) * 111320
///
/// Running the engine in meters makes the coincidence epsilon and the
/// bisectors isotropic; degrees of longitude shrink with latitude.
#[derive(Debug, Clone)]
pub struct Projector {
    center_lat: f64,
    center_lon: f64,
    cos_lat: f64,
}

impl Projector {
    /// Create a new projector centered at the given coordinates
    ///
    /// # Arguments
    /// * `center` - (lat, lon) center point in WGS84
    pub fn new(center: (f64, f64)) -> Self {
        let (lat, lon) = center;
        Self {
            center_lat: lat,
            center_lon: lon,
            cos_lat: lat.to_radians().cos(),
        }
    }

    /// Center on the mean of a set of (lat, lon) coordinates
    pub fn centered_on(coords: &[(f64, f64)]) -> Option<Self> {
        if coords.is_empty() {
            return None;
        }
        let n = coords.len() as f64;
        let lat = coords.iter().map(|c| c.0).sum::<f64>() / n;
        let lon = coords.iter().map(|c| c.1).sum::<f64>() / n;
        Some(Self::new((lat, lon)))
    }

    /// Project a lat/lon point to local meters
    pub fn project(&self, lat: f64, lon: f64) -> Point {
        let x = (lon - self.center_lon) * self.cos_lat * METERS_PER_DEGREE;
        let y = (lat - self.center_lat) * METERS_PER_DEGREE;
        Point::new(x, y)
    }

    /// Inverse of [`Projector::project`], returning (lat, lon)
    pub fn unproject(&self, p: Point) -> (f64, f64) {
        let lat = p.y / METERS_PER_DEGREE + self.center_lat;
        let lon = p.x / (self.cos_lat * METERS_PER_DEGREE) + self.center_lon;
        (lat, lon)
    }

    /// Project a ring given as (lat, lon) pairs
    pub fn project_ring(&self, coords: &[(f64, f64)]) -> Ring {
        coords
            .iter()
            .map(|&(lat, lon)| self.project(lat, lon))
            .collect()
    }

    pub fn unproject_ring(&self, ring: &Ring) -> Vec<(f64, f64)> {
        ring.points().iter().map(|&p| self.unproject(p)).collect()
    }
}
