use crate::model::constants::{LAST_12_MONTHS, LOOKBACK_MONTHS, MONTHS_13_24_WEIGHT};
use chrono::{Months, NaiveDate};

/// # How this works
/// - The ranking is computed as of some date D (`as_of`).
/// - Results from the 12 months up to and including D count at full weight.
/// - Results from months 13 to 24 before D count at half weight.
/// - Anything older than 24 months, or dated after D, does not count.
///
/// Points are accumulated into the two buckets unweighted. The half weight is only
/// applied by [`total_ranking_points`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayBucket {
    Last12Months,
    Months13To24
}

/// Places `event_date` into a bucket relative to `as_of`, or `None` when it falls
/// outside the 24 month window.
pub fn classify(event_date: NaiveDate, as_of: NaiveDate) -> Option<DecayBucket> {
    if event_date > as_of || event_date < window_start(as_of) {
        return None;
    }

    if event_date >= last_12_months_start(as_of) {
        Some(DecayBucket::Last12Months)
    } else {
        Some(DecayBucket::Months13To24)
    }
}

/// The earliest event date inside the lookback window (inclusive).
pub fn window_start(as_of: NaiveDate) -> NaiveDate {
    months_before(as_of, LOOKBACK_MONTHS)
}

/// The earliest event date counted at full weight (inclusive).
pub fn last_12_months_start(as_of: NaiveDate) -> NaiveDate {
    months_before(as_of, LAST_12_MONTHS)
}

pub fn total_ranking_points(points_last_12_months: f64, points_months_13_24: f64) -> f64 {
    points_last_12_months + points_months_13_24 * MONTHS_13_24_WEIGHT
}

/// Calendar month subtraction. Days past the end of the target month clamp to its
/// last day (Feb 29 minus 12 months is Feb 28).
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN)
}
