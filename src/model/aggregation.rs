use crate::{
    database::db_structs::EligibleResult,
    error::RankingError,
    model::{
        decay::{classify, total_ranking_points, DecayBucket},
        scoring::weighted_points
    }
};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

/// Per-rider accumulators for one discipline as of one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiderTotals {
    pub rider_id: i32,
    pub club_id: Option<i32>,
    pub points_last_12_months: f64,
    /// Unweighted; see [`RiderTotals::total_ranking_points`]
    pub points_months_13_24: f64,
    pub events_count: i32
}

impl RiderTotals {
    fn new(rider_id: i32, club_id: Option<i32>) -> RiderTotals {
        RiderTotals {
            rider_id,
            club_id,
            points_last_12_months: 0.0,
            points_months_13_24: 0.0,
            events_count: 0
        }
    }

    pub fn total_ranking_points(&self) -> f64 {
        total_ranking_points(self.points_last_12_months, self.points_months_13_24)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClubTotals {
    pub club_id: i32,
    pub points_last_12_months: f64,
    pub points_months_13_24: f64,
    pub riders_count: i32,
    pub events_count: i32
}

impl ClubTotals {
    pub fn total_ranking_points(&self) -> f64 {
        total_ranking_points(self.points_last_12_months, self.points_months_13_24)
    }
}

#[derive(Debug, Default)]
pub struct Aggregation {
    /// Riders with a nonzero total, in order of first appearance in the input
    pub riders: Vec<RiderTotals>,
    /// Riders whose calculation failed. They are absent from `riders`.
    pub failures: Vec<RankingError>
}

struct Accumulator {
    totals: RiderTotals,
    failure: Option<String>
}

/// Buckets weighted result points per rider relative to `as_of`.
///
/// Every result inside the 24 month window adds to `events_count`. A rider whose
/// results contain points that are negative or not finite fails as a whole and is
/// reported in [`Aggregation::failures`]. Riders ending with zero points are dropped.
pub fn aggregate(results: &[EligibleResult], as_of: NaiveDate) -> Aggregation {
    let mut accumulators: IndexMap<i32, Accumulator> = IndexMap::new();

    for result in results {
        let Some(bucket) = classify(result.event_date, as_of) else {
            continue;
        };

        let accumulator = accumulators.entry(result.rider_id).or_insert_with(|| Accumulator {
            totals: RiderTotals::new(result.rider_id, result.club_id),
            failure: None
        });

        if accumulator.failure.is_some() {
            continue;
        }

        let points = weighted_points(result.raw_points, result.field_size, result.event_level);
        if !points.is_finite() || points < 0.0 {
            accumulator.failure = Some(format!(
                "result {} at event {} has unusable points ({})",
                result.result_id, result.event_id, result.raw_points
            ));
            continue;
        }

        match bucket {
            DecayBucket::Last12Months => accumulator.totals.points_last_12_months += points,
            DecayBucket::Months13To24 => accumulator.totals.points_months_13_24 += points
        }
        accumulator.totals.events_count += 1;
    }

    let mut aggregation = Aggregation::default();
    for (rider_id, accumulator) in accumulators {
        if let Some(reason) = accumulator.failure {
            aggregation
                .failures
                .push(RankingError::InvalidResult { rider_id, reason });
            continue;
        }

        let totals = accumulator.totals;
        if totals.points_last_12_months + totals.points_months_13_24 == 0.0 {
            continue;
        }

        aggregation.riders.push(totals);
    }

    aggregation
}

/// Sums rider accumulators per club. Riders without a club are not counted.
pub fn aggregate_clubs(riders: &[RiderTotals]) -> Vec<ClubTotals> {
    let mut clubs: IndexMap<i32, ClubTotals> = IndexMap::new();

    for rider in riders {
        let Some(club_id) = rider.club_id else {
            continue;
        };

        let club = clubs.entry(club_id).or_insert(ClubTotals {
            club_id,
            points_last_12_months: 0.0,
            points_months_13_24: 0.0,
            riders_count: 0,
            events_count: 0
        });

        club.points_last_12_months += rider.points_last_12_months;
        club.points_months_13_24 += rider.points_months_13_24;
        club.riders_count += 1;
        club.events_count += rider.events_count;
    }

    clubs.into_values().collect()
}
