//! In-memory workout collection and its serialization contract.
//!
//! The store keeps workouts in insertion order and never removes entries
//! within a session. [`WorkoutRecord`] is the flat snapshot shape that goes
//! through persistence; rehydrated records carry their stored derived
//! metrics verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Coords, Metrics, Workout, WorkoutKind};

/// Ordered collection of recorded workouts. Append-only within a session.
#[derive(Clone, Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a workout. Always succeeds; ids are not checked for
    /// duplicates beyond their natural uniqueness.
    pub fn add(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    /// Linear scan by id. A miss is a normal outcome (e.g. a stale id from
    /// a previous session), not an error.
    pub fn find_by_id(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|workout| workout.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Workout> {
        self.workouts.iter()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Snapshot every workout as a flat record, preserving insertion order.
    pub fn to_records(&self) -> Vec<WorkoutRecord> {
        self.workouts.iter().map(WorkoutRecord::from).collect()
    }

    /// Replace the store's contents with previously persisted records,
    /// preserving their order. No re-validation: persisted data is trusted
    /// field-for-field, and derived metrics are not recomputed.
    pub fn load_records(&mut self, records: Vec<WorkoutRecord>) {
        self.workouts = records.into_iter().map(Workout::from).collect();
    }
}

/// Flat, structure-only snapshot of a workout.
///
/// The kind-specific fields are optional so a running record carries no
/// elevation columns and vice versa.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub coords: Coords,
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence_spm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace_min_per_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_km_per_h: Option<f64>,
}

impl From<&Workout> for WorkoutRecord {
    fn from(workout: &Workout) -> Self {
        let mut record = WorkoutRecord {
            id: workout.id().to_string(),
            created_at: workout.created_at(),
            coords: workout.coords(),
            kind: workout.kind(),
            distance_km: workout.distance_km(),
            duration_min: workout.duration_min(),
            description: workout.description().to_string(),
            cadence_spm: None,
            pace_min_per_km: None,
            elevation_gain_m: None,
            speed_km_per_h: None,
        };

        match workout.metrics() {
            Metrics::Running {
                cadence_spm,
                pace_min_per_km,
            } => {
                record.cadence_spm = Some(*cadence_spm);
                record.pace_min_per_km = Some(*pace_min_per_km);
            }
            Metrics::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => {
                record.elevation_gain_m = Some(*elevation_gain_m);
                record.speed_km_per_h = Some(*speed_km_per_h);
            }
        }

        record
    }
}

impl From<WorkoutRecord> for Workout {
    fn from(record: WorkoutRecord) -> Self {
        // Missing kind-specific fields read back as 0; nothing is derived
        // on load.
        let metrics = match record.kind {
            WorkoutKind::Running => Metrics::Running {
                cadence_spm: record.cadence_spm.unwrap_or(0.0),
                pace_min_per_km: record.pace_min_per_km.unwrap_or(0.0),
            },
            WorkoutKind::Cycling => Metrics::Cycling {
                elevation_gain_m: record.elevation_gain_m.unwrap_or(0.0),
                speed_km_per_h: record.speed_km_per_h.unwrap_or(0.0),
            },
        };

        Workout::rehydrate(
            record.id,
            record.created_at,
            record.coords,
            record.distance_km,
            record.duration_min,
            record.description,
            metrics,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn running(day: u32) -> Workout {
        Workout::running_at(
            Utc.with_ymd_and_hms(2025, 4, day, 9, 30, 0).unwrap(),
            Coords { lat: 51.5, lng: -0.1 },
            5.0,
            25.0,
            180.0,
        )
    }

    fn cycling(day: u32) -> Workout {
        Workout::cycling_at(
            Utc.with_ymd_and_hms(2025, 4, day, 18, 0, 0).unwrap(),
            Coords { lat: 48.85, lng: 2.35 },
            10.0,
            40.0,
            200.0,
        )
    }

    #[test]
    fn test_find_by_id_returns_added_workout() {
        let mut store = WorkoutStore::new();
        let workout = running(14);
        let id = workout.id().to_string();
        store.add(workout);

        let found = store.find_by_id(&id).expect("workout should be found");
        assert_eq!(found.id(), id);
        assert_eq!(found.kind(), WorkoutKind::Running);
    }

    #[test]
    fn test_find_by_id_miss_is_none() {
        let mut store = WorkoutStore::new();
        store.add(running(14));

        assert!(store.find_by_id("0000000000").is_none());
    }

    #[test]
    fn test_records_preserve_insertion_order() {
        let mut store = WorkoutStore::new();
        store.add(running(14));
        store.add(cycling(15));
        store.add(running(16));

        let records = store.to_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind, WorkoutKind::Running);
        assert_eq!(records[1].kind, WorkoutKind::Cycling);
        assert_eq!(records[2].kind, WorkoutKind::Running);
    }

    #[test]
    fn test_round_trip_matches_field_for_field() {
        let mut store = WorkoutStore::new();
        store.add(running(14));
        store.add(cycling(15));

        let mut rehydrated = WorkoutStore::new();
        rehydrated.load_records(store.to_records());

        assert_eq!(store.to_records(), rehydrated.to_records());
    }

    #[test]
    fn test_load_records_replaces_contents() {
        let mut store = WorkoutStore::new();
        store.add(running(14));

        store.load_records(vec![WorkoutRecord::from(&cycling(20))]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().map(Workout::kind), Some(WorkoutKind::Cycling));
    }

    #[test]
    fn test_kind_specific_fields_survive_round_trip() {
        let mut store = WorkoutStore::new();
        store.add(running(14));

        let records = store.to_records();
        assert_eq!(records[0].cadence_spm, Some(180.0));
        assert_eq!(records[0].pace_min_per_km, Some(5.0));
        assert_eq!(records[0].elevation_gain_m, None);
        assert_eq!(records[0].speed_km_per_h, None);
    }

    #[test]
    fn test_record_missing_metric_fields_rehydrates_as_zero() {
        let mut record = WorkoutRecord::from(&running(14));
        record.cadence_spm = None;
        record.pace_min_per_km = None;

        let workout = Workout::from(record);
        match workout.metrics() {
            Metrics::Running {
                cadence_spm,
                pace_min_per_km,
            } => {
                assert_eq!(*cadence_spm, 0.0);
                assert_eq!(*pace_min_per_km, 0.0);
            }
            other => panic!("Expected running metrics, got {:?}", other),
        }
    }
}
