//! Raw form-field validation.
//!
//! Fields arrive from the form collaborator as raw strings and are checked
//! here before any entity is constructed.

use crate::WorkoutKind;

/// Check raw form fields against the domain constraints.
///
/// `distance` and `duration` are always checked; `cadence` only for running
/// and `elevation` only for cycling. The field irrelevant to the kind is
/// treated as the literal value 0, which always passes. A checked field must
/// parse fully as a number and be finite and non-negative.
///
/// The bound is `>= 0`, not `> 0`: a zero distance or duration validates and
/// later produces a non-finite pace/speed. Callers surface a user-facing
/// notice when this returns `false`.
pub fn fields_are_valid(
    kind: WorkoutKind,
    distance: &str,
    duration: &str,
    cadence: &str,
    elevation: &str,
) -> bool {
    let kind_field = match kind {
        WorkoutKind::Running => cadence,
        WorkoutKind::Cycling => elevation,
    };

    [distance, duration, kind_field]
        .iter()
        .all(|field| is_non_negative_number(field))
}

fn is_non_negative_number(raw: &str) -> bool {
    raw.trim()
        .parse::<f64>()
        .map(|value| value.is_finite() && value >= 0.0)
        .unwrap_or(false)
}
