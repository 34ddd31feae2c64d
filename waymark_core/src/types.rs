//! Core domain types for the waymark workout journal.
//!
//! This module defines the fundamental types used throughout the system:
//! - Map coordinates
//! - Workout kinds and their derived performance metrics
//! - The workout entity itself

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// English month names, indexed by `Datelike::month0`.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A latitude/longitude pair on the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

/// Kind of workout
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "running" => Some(WorkoutKind::Running),
            "cycling" => Some(WorkoutKind::Cycling),
            _ => None,
        }
    }

    /// Capitalized form used in workout descriptions.
    pub fn label(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    /// Emoji shown in marker popups and list entries.
    pub fn icon(self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃",
            WorkoutKind::Cycling => "🚴",
        }
    }
}

/// Kind-specific input and its derived performance metric.
///
/// The derived value is computed once at construction and stored with the
/// entity; it is never recomputed from distance/duration afterwards.
#[derive(Clone, Debug, PartialEq)]
pub enum Metrics {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

impl Metrics {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            Metrics::Running { .. } => WorkoutKind::Running,
            Metrics::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// A recorded workout.
///
/// Fields are set at construction and read through accessors; there are no
/// setters. Inputs are assumed to have passed [`crate::validate`] — a zero
/// distance yields an infinite pace rather than an error here.
#[derive(Clone, Debug)]
pub struct Workout {
    id: String,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    description: String,
    metrics: Metrics,
}

impl Workout {
    /// Record a running workout, deriving pace (min/km).
    pub fn running(coords: Coords, distance_km: f64, duration_min: f64, cadence_spm: f64) -> Self {
        Self::running_at(Utc::now(), coords, distance_km, duration_min, cadence_spm)
    }

    /// Record a cycling workout, deriving speed (km/h).
    pub fn cycling(
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Self {
        Self::cycling_at(Utc::now(), coords, distance_km, duration_min, elevation_gain_m)
    }

    /// Like [`Workout::running`] with an explicit creation time.
    pub fn running_at(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Self {
        let metrics = Metrics::Running {
            cadence_spm,
            pace_min_per_km: duration_min / distance_km,
        };
        Self::build(created_at, coords, distance_km, duration_min, metrics)
    }

    /// Like [`Workout::cycling`] with an explicit creation time.
    pub fn cycling_at(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Self {
        let metrics = Metrics::Cycling {
            elevation_gain_m,
            speed_km_per_h: distance_km / (duration_min / 60.0),
        };
        Self::build(created_at, coords, distance_km, duration_min, metrics)
    }

    fn build(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        metrics: Metrics,
    ) -> Self {
        Self {
            id: short_id(created_at),
            description: describe(metrics.kind(), created_at),
            created_at,
            coords,
            distance_km,
            duration_min,
            metrics,
        }
    }

    /// Restore an entity from previously persisted parts.
    ///
    /// Derived values are taken as stored, never recomputed.
    pub(crate) fn rehydrate(
        id: String,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        description: String,
        metrics: Metrics,
    ) -> Self {
        Self {
            id,
            created_at,
            coords,
            distance_km,
            duration_min,
            description,
            metrics,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn kind(&self) -> WorkoutKind {
        self.metrics.kind()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Id derived from the creation timestamp: decimal milliseconds truncated to
/// the last 10 digits. Two workouts created in the same millisecond would
/// collide; accepted for a single-user journal.
fn short_id(at: DateTime<Utc>) -> String {
    let millis = at.timestamp_millis().to_string();
    let start = millis.len().saturating_sub(10);
    millis[start..].to_string()
}

/// "Running on April 14" style description.
fn describe(kind: WorkoutKind, at: DateTime<Utc>) -> String {
    format!(
        "{} on {} {}",
        kind.label(),
        MONTH_NAMES[at.month0() as usize],
        at.day()
    )
}
