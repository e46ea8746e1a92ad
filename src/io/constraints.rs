use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::CoordFrame;
use crate::domain::{ConstraintSet, Ring};

/// Constraint dataset: one allowed area and any number of obstacles.
///
/// Coordinates are `[lat, lng]` pairs. A missing or empty `outer` means the
/// area is unconstrained.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstraintFile {
    #[serde(default)]
    pub outer: Vec<[f64; 2]>,
    #[serde(default)]
    pub inner: Vec<Vec<[f64; 2]>>,
}

impl ConstraintFile {
    pub fn to_constraint_set(&self, frame: &CoordFrame) -> Result<ConstraintSet> {
        let outer = to_ring(&self.outer, frame).context("Invalid outer constraint")?;
        let inner = self
            .inner
            .iter()
            .enumerate()
            .map(|(i, ring)| {
                to_ring(ring, frame).with_context(|| format!("Invalid inner constraint {}", i))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ConstraintSet::new(outer, inner))
    }

    /// Every coordinate, for centering a projection
    pub fn coords(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.outer
            .iter()
            .chain(self.inner.iter().flatten())
            .map(|&[lat, lng]| (lat, lng))
    }
}

pub fn load_constraints(path: &Path) -> Result<ConstraintFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read constraints file: {}", path.display()))?;
    parse_constraints(&contents)
        .with_context(|| format!("Failed to parse constraints file: {}", path.display()))
}

pub fn parse_constraints(contents: &str) -> Result<ConstraintFile> {
    serde_json::from_str(contents).context("Invalid constraint JSON")
}

fn to_ring(coords: &[[f64; 2]], frame: &CoordFrame) -> Result<Ring> {
    let points = coords
        .iter()
        .map(|&[lat, lng]| frame.to_plane(lat, lng))
        .collect();
    Ok(Ring::try_new(points)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outer_and_inner() {
        let json = r#"{
            "outer": [[0, 0], [0, 10], [10, 10], [10, 0]],
            "inner": [[[2, 2], [2, 4], [4, 4], [4, 2]]]
        }"#;
        let file = parse_constraints(json).unwrap();
        assert_eq!(file.outer.len(), 4);
        assert_eq!(file.inner.len(), 1);
        assert_eq!(file.coords().count(), 8);

        let set = file.to_constraint_set(&CoordFrame::Degrees).unwrap();
        assert!(set.has_outer());
        // lat maps to y, lng to x
        let p = set.outer.points()[1];
        assert_eq!((p.x, p.y), (10.0, 0.0));
    }

    #[test]
    fn test_missing_outer_is_unconstrained() {
        let file = parse_constraints(r#"{"inner": []}"#).unwrap();
        let set = file.to_constraint_set(&CoordFrame::Degrees).unwrap();
        assert!(set.is_unconstrained());
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(parse_constraints(r#"{"outer": [["a", 1]]}"#).is_err());
        assert!(parse_constraints(r#"{"outer": [[1]]}"#).is_err());
    }
}
