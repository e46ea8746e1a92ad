pub mod constraints;
pub mod service;

pub use constraints::{
    ClipStage, ClippedCell, ExclusionReason, apply_to_cells, classify_point, filter_points,
};
pub use service::{
    Cell, ClipFallback, Exclusion, Partition, PartitionOptions, compute_partition,
};
