use anyhow::{Context, Result, bail};
use csv::StringRecord;
use serde::Deserialize;
use std::path::Path;

use super::CoordFrame;
use crate::domain::FacilitySet;

/// A station row as it appears in a dataset, in WGS84 degrees
///
/// Aliases cover the usual CSV header spellings; headers are matched
/// case-insensitively.
#[derive(Debug, Clone, Deserialize)]
pub struct StationRecord {
    #[serde(alias = "station")]
    pub name: String,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lon", alias = "long", alias = "longitude")]
    pub lng: f64,
    #[serde(default, alias = "type", alias = "kind")]
    pub tag: Option<String>,
}

/// Load stations from a `.json` array or a CSV file with a header row
pub fn load_stations(path: &Path) -> Result<Vec<StationRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stations file: {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let records = if is_json {
        parse_stations_json(&contents)
    } else {
        parse_stations_csv(&contents)
    };
    records.with_context(|| format!("Failed to parse stations file: {}", path.display()))
}

pub fn parse_stations_json(contents: &str) -> Result<Vec<StationRecord>> {
    let records: Vec<StationRecord> =
        serde_json::from_str(contents).context("Invalid station JSON")?;
    for (i, r) in records.iter().enumerate() {
        validate_coords(r, i + 1)?;
    }
    Ok(records)
}

/// Parse CSV with columns `name`, `lat`, `lng` (or `lon`) and optional `tag`.
///
/// Column order is taken from the header. Quoted fields follow RFC 4180 and
/// may contain commas or line breaks. Errors name the line a row starts on.
pub fn parse_stations_csv(contents: &str) -> Result<Vec<StationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .context("Invalid CSV header")?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("Malformed CSV row")?;
        let line = row.position().map_or(0, |p| p.line() as usize);
        let record: StationRecord = row
            .deserialize(Some(&headers))
            .with_context(|| format!("Row {}: invalid station", line))?;
        validate_coords(&record, line)?;
        records.push(record);
    }

    Ok(records)
}

/// Register records in order; the n-th record gets the n-th id
pub fn to_facility_set(records: &[StationRecord], frame: &CoordFrame) -> Result<FacilitySet> {
    let mut set = FacilitySet::new();
    for r in records {
        set.add(frame.to_plane(r.lat, r.lng), r.name.clone(), r.tag.clone())
            .with_context(|| format!("Station '{}' has invalid coordinates", r.name))?;
    }
    Ok(set)
}

fn validate_coords(record: &StationRecord, row: usize) -> Result<()> {
    if !record.lat.is_finite() || !record.lng.is_finite() {
        bail!("Row {}: coordinates must be finite", row);
    }
    if !(-90.0..=90.0).contains(&record.lat) || !(-180.0..=180.0).contains(&record.lng) {
        bail!(
            "Row {}: ({}, {}) is not a valid lat/lng pair",
            row,
            record.lat,
            record.lng
        );
    }
    Ok(())
}
