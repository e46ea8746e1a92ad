use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::CoordFrame;
use crate::domain::{FacilitySet, Region, Ring};
use crate::geometry::polygon::{Winding, close, normalize_winding};
use crate::partition::Partition;

/// Write a partition as a GeoJSON FeatureCollection
///
/// Features, in order:
/// - one Polygon per cell (`kind: "cell"`); fully covered cells get a null geometry
/// - the working extent (`kind: "bounds"`)
/// - one Point per station (`kind: "station"` or `"excluded"` with a reason)
pub fn write_geojson(
    path: &Path,
    partition: &Partition,
    facilities: &FacilitySet,
    frame: &CoordFrame,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create GeoJSON file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let collection = to_feature_collection(partition, facilities, frame);
    serde_json::to_writer_pretty(&mut writer, &collection)
        .context("Failed to serialize GeoJSON")?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

pub fn to_feature_collection(
    partition: &Partition,
    facilities: &FacilitySet,
    frame: &CoordFrame,
) -> Value {
    let mut features = Vec::new();

    for cell in &partition.cells {
        let facility = facilities.get(cell.facility);
        let geometry = if cell.region.is_empty() {
            Value::Null
        } else {
            json!({
                "type": "Polygon",
                "coordinates": region_coordinates(&cell.region, frame),
            })
        };
        features.push(json!({
            "type": "Feature",
            "properties": {
                "kind": "cell",
                "id": cell.facility.0,
                "name": facility.map(|f| f.name.as_str()),
                "tag": facility.and_then(|f| f.tag.as_deref()),
            },
            "geometry": geometry,
        }));
    }

    if !partition.bounding_polygon.is_empty() {
        features.push(json!({
            "type": "Feature",
            "properties": { "kind": "bounds" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [ring_coordinates(&partition.bounding_polygon, Winding::CounterClockwise, frame)],
            },
        }));
    }

    for facility in facilities.iter() {
        let exclusion = partition
            .excluded
            .iter()
            .find(|(id, _)| *id == facility.id)
            .map(|(_, reason)| reason);
        let mut properties = json!({
            "kind": if exclusion.is_some() { "excluded" } else { "station" },
            "id": facility.id.0,
            "name": facility.name,
            "tag": facility.tag,
        });
        if let Some(reason) = exclusion {
            properties["reason"] = Value::from(reason.to_string());
        }
        features.push(json!({
            "type": "Feature",
            "properties": properties,
            "geometry": {
                "type": "Point",
                "coordinates": frame.to_lnglat(facility.point),
            },
        }));
    }

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// RFC 7946 winding: exterior counter-clockwise, holes clockwise
fn region_coordinates(region: &Region, frame: &CoordFrame) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(ring_coordinates(&region.exterior, Winding::CounterClockwise, frame))
        .chain(
            region
                .holes
                .iter()
                .map(|h| ring_coordinates(h, Winding::Clockwise, frame)),
        )
        .collect()
}

fn ring_coordinates(ring: &Ring, winding: Winding, frame: &CoordFrame) -> Vec<[f64; 2]> {
    normalize_winding(&close(ring), winding)
        .points()
        .iter()
        .map(|&p| frame.to_lnglat(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConstraintSet, Point};
    use crate::partition::{PartitionOptions, compute_partition};
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> (FacilitySet, Partition) {
        let mut set = FacilitySet::new();
        set.add(Point::new(0.0, 0.0), "West", Some("bike".into())).unwrap();
        set.add(Point::new(10.0, 0.0), "East", None).unwrap();
        set.add(Point::new(10.0, 0.0), "East again", None).unwrap();
        let partition = compute_partition(
            set.as_slice(),
            &ConstraintSet::unconstrained(),
            &PartitionOptions::unconstrained(),
        )
        .unwrap();
        (set, partition)
    }

    #[test]
    fn test_feature_collection_layout() {
        let (set, partition) = sample();
        let fc = to_feature_collection(&partition, &set, &CoordFrame::Degrees);
        let features = fc["features"].as_array().unwrap();

        // 2 cells + bounds + 3 stations
        assert_eq!(features.len(), 6);
        assert_eq!(features[0]["properties"]["kind"], "cell");
        assert_eq!(features[0]["properties"]["name"], "West");
        assert_eq!(features[2]["properties"]["kind"], "bounds");
        assert_eq!(features[5]["properties"]["kind"], "excluded");
        assert_eq!(features[5]["properties"]["reason"], "duplicate of #1");
    }

    #[test]
    fn test_cell_rings_are_closed_ccw() {
        let (set, partition) = sample();
        let fc = to_feature_collection(&partition, &set, &CoordFrame::Degrees);
        let ring = fc["features"][0]["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.first(), ring.last());

        let pts: Vec<(f64, f64)> = ring
            .iter()
            .map(|c| (c[0].as_f64().unwrap(), c[1].as_f64().unwrap()))
            .collect();
        let signed: f64 = pts
            .windows(2)
            .map(|w| w[0].0 * w[1].1 - w[1].0 * w[0].1)
            .sum();
        assert!(signed > 0.0);
    }

    #[test]
    fn test_write_geojson() {
        let (set, partition) = sample();
        let dir = tempdir().unwrap();
        let path = dir.path().join("zones.geojson");
        write_geojson(&path, &partition, &set, &CoordFrame::Degrees).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["type"], "FeatureCollection");
    }
}
