use crate::model::{
    constants::{FIELD_SIZE_MULTIPLIERS, SMALL_FIELD_MULTIPLIER},
    structures::event_level::EventLevel
};

/// Scales a raw result by how competitive the event was.
///
/// `raw_points * field_size_multiplier(field_size) * event_level.multiplier()`
pub fn weighted_points(raw_points: f64, field_size: i64, event_level: EventLevel) -> f64 {
    raw_points * field_size_multiplier(field_size) * event_level.multiplier()
}

/// Multiplier for the number of distinct finishers in an event. Non-decreasing in
/// `field_size`; fields under 5 riders get [`SMALL_FIELD_MULTIPLIER`].
pub fn field_size_multiplier(field_size: i64) -> f64 {
    FIELD_SIZE_MULTIPLIERS
        .iter()
        .find(|(minimum, _)| field_size >= *minimum)
        .map_or(SMALL_FIELD_MULTIPLIER, |(_, multiplier)| *multiplier)
}

/// The points a result is worth before weighting. Split-run events (DH qualifying +
/// final) store nothing in `points` and score each run separately.
pub fn raw_points(points: Option<f64>, run_1_points: Option<f64>, run_2_points: Option<f64>) -> f64 {
    match points {
        Some(p) if p > 0.0 => p,
        _ => run_1_points.unwrap_or(0.0) + run_2_points.unwrap_or(0.0)
    }
}
