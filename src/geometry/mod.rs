pub mod bounds;
pub mod clip;
pub mod polygon;
pub mod projection;
pub mod voronoi;

pub use bounds::BoundingBox;
pub use clip::{ObstacleUnion, difference, intersect, union_obstacles};
pub use polygon::{Winding, close, is_degenerate, normalize_winding, point_in_polygon};
pub use projection::Projector;
pub use voronoi::{VoronoiDiagram, generate};
