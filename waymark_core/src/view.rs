//! Render-request interfaces for the external UI collaborators.
//!
//! The core never draws anything. It hands these payloads to whatever map,
//! form, and list implementations the host injects into the session.

use crate::{Coords, Metrics, Workout, WorkoutKind, WorkoutRecord};

/// Caption for the marker placed while the form is open.
pub const PENDING_MARKER_CAPTION: &str = "Enter activity details";

/// Popup style for a placed marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Un-labeled marker at a fresh map click.
    Pending,
    /// Labeled marker for a recorded workout.
    Kind(WorkoutKind),
}

impl MarkerStyle {
    /// Popup style class, if the marker carries one.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            MarkerStyle::Pending => None,
            MarkerStyle::Kind(WorkoutKind::Running) => Some("running-popup"),
            MarkerStyle::Kind(WorkoutKind::Cycling) => Some("cycling-popup"),
        }
    }
}

/// Raw string fields read from the form collaborator.
#[derive(Clone, Debug, Default)]
pub struct RawFields {
    pub kind: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

/// Formatted payload for one list row.
///
/// Built from a live entity or an inert persisted record; either way the
/// values are read by field name, nothing is derived here.
#[derive(Clone, Debug, PartialEq)]
pub struct ListEntry {
    pub id: String,
    pub css_class: &'static str,
    pub icon: &'static str,
    pub description: String,
    pub distance_km: f64,
    pub duration_min: f64,
    /// Pace for running, speed for cycling.
    pub metric_value: f64,
    pub metric_unit: &'static str,
    /// Cadence for running, elevation gain for cycling.
    pub extra_value: f64,
    pub extra_unit: &'static str,
}

impl ListEntry {
    fn build(
        id: String,
        kind: WorkoutKind,
        description: String,
        distance_km: f64,
        duration_min: f64,
        metric_value: f64,
        extra_value: f64,
    ) -> Self {
        let (metric_unit, extra_unit) = match kind {
            WorkoutKind::Running => ("min/km", "spm"),
            WorkoutKind::Cycling => ("km/h", "m"),
        };

        Self {
            id,
            css_class: kind.as_str(),
            icon: kind.icon(),
            description,
            distance_km,
            duration_min,
            metric_value,
            metric_unit,
            extra_value,
            extra_unit,
        }
    }
}

impl From<&Workout> for ListEntry {
    fn from(workout: &Workout) -> Self {
        let (metric_value, extra_value) = match workout.metrics() {
            Metrics::Running {
                cadence_spm,
                pace_min_per_km,
            } => (*pace_min_per_km, *cadence_spm),
            Metrics::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => (*speed_km_per_h, *elevation_gain_m),
        };

        Self::build(
            workout.id().to_string(),
            workout.kind(),
            workout.description().to_string(),
            workout.distance_km(),
            workout.duration_min(),
            metric_value,
            extra_value,
        )
    }
}

impl From<&WorkoutRecord> for ListEntry {
    fn from(record: &WorkoutRecord) -> Self {
        let (metric_value, extra_value) = match record.kind {
            WorkoutKind::Running => (
                record.pace_min_per_km.unwrap_or(0.0),
                record.cadence_spm.unwrap_or(0.0),
            ),
            WorkoutKind::Cycling => (
                record.speed_km_per_h.unwrap_or(0.0),
                record.elevation_gain_m.unwrap_or(0.0),
            ),
        };

        Self::build(
            record.id.clone(),
            record.kind,
            record.description.clone(),
            record.distance_km,
            record.duration_min,
            metric_value,
            extra_value,
        )
    }
}

/// The interactive map collaborator.
pub trait MapView {
    fn render(&mut self, center: Coords, zoom: u8);
    fn place_marker(&mut self, coords: Coords, caption: &str, style: MarkerStyle);
    fn pan_to(&mut self, coords: Coords, zoom: u8);
}

/// The workout input form collaborator.
pub trait FormView {
    fn show(&mut self);
    fn hide(&mut self);
    fn focus_first_field(&mut self);
    fn toggle_cadence_elevation(&mut self);
}

/// The workout list collaborator.
pub trait ListView {
    fn push_entry(&mut self, entry: ListEntry);
}

impl<T: MapView + ?Sized> MapView for &mut T {
    fn render(&mut self, center: Coords, zoom: u8) {
        (**self).render(center, zoom)
    }

    fn place_marker(&mut self, coords: Coords, caption: &str, style: MarkerStyle) {
        (**self).place_marker(coords, caption, style)
    }

    fn pan_to(&mut self, coords: Coords, zoom: u8) {
        (**self).pan_to(coords, zoom)
    }
}

impl<T: FormView + ?Sized> FormView for &mut T {
    fn show(&mut self) {
        (**self).show()
    }

    fn hide(&mut self) {
        (**self).hide()
    }

    fn focus_first_field(&mut self) {
        (**self).focus_first_field()
    }

    fn toggle_cadence_elevation(&mut self) {
        (**self).toggle_cadence_elevation()
    }
}

impl<T: ListView + ?Sized> ListView for &mut T {
    fn push_entry(&mut self, entry: ListEntry) {
        (**self).push_entry(entry)
    }
}
