//! CSV export of the workout journal.
//!
//! A reporting surface over the store: rows append to an existing file, with
//! headers written only when the file is fresh. The JSON snapshot remains
//! the source of truth; nothing here is read back.

use crate::{Result, WorkoutRecord, WorkoutStore};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    created_at: String,
    kind: &'static str,
    lat: f64,
    lng: f64,
    distance_km: f64,
    duration_min: f64,
    description: String,
    cadence_spm: Option<f64>,
    pace_min_per_km: Option<f64>,
    elevation_gain_m: Option<f64>,
    speed_km_per_h: Option<f64>,
}

impl From<&WorkoutRecord> for CsvRow {
    fn from(record: &WorkoutRecord) -> Self {
        CsvRow {
            id: record.id.clone(),
            created_at: record.created_at.to_rfc3339(),
            kind: record.kind.as_str(),
            lat: record.coords.lat,
            lng: record.coords.lng,
            distance_km: record.distance_km,
            duration_min: record.duration_min,
            description: record.description.clone(),
            cadence_spm: record.cadence_spm,
            pace_min_per_km: record.pace_min_per_km,
            elevation_gain_m: record.elevation_gain_m,
            speed_km_per_h: record.speed_km_per_h,
        }
    }
}

/// Append every stored workout to `csv_path`, creating the file (with
/// headers) if needed. Returns the number of rows written.
pub fn export_store(store: &WorkoutStore, csv_path: &Path) -> Result<usize> {
    let records = store.to_records();
    if records.is_empty() {
        tracing::info!("No workouts to export");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in &records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} workouts to {:?}", records.len(), csv_path);
    Ok(records.len())
}
