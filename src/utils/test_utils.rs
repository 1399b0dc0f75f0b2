use crate::{
    database::db_structs::EligibleResult,
    model::{aggregation::RiderTotals, structures::event_level::EventLevel}
};
use chrono::{Duration, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

pub fn generate_result(
    rider_id: i32,
    event_id: i32,
    event_date: NaiveDate,
    raw_points: f64,
    field_size: i64,
    event_level: EventLevel
) -> EligibleResult {
    EligibleResult {
        result_id: event_id * 10_000 + rider_id,
        rider_id,
        club_id: None,
        event_id,
        event_date,
        event_level,
        field_size,
        raw_points
    }
}

pub fn generate_rider_totals(rider_id: i32, points_last_12_months: f64, points_months_13_24: f64) -> RiderTotals {
    RiderTotals {
        rider_id,
        club_id: None,
        points_last_12_months,
        points_months_13_24,
        events_count: 1
    }
}

/// Generates a season of results: `n_events` events spaced one week apart starting at
/// `first_event`, each finished by a random subset of `n_riders` riders.
/// Riders are spread over `n_clubs` clubs (rider id modulo club count); pass 0 for
/// no club affiliation.
///
/// Seeded, so the same arguments always produce the same results.
pub fn generate_results(
    n_riders: i32,
    n_events: i32,
    n_clubs: i32,
    first_event: NaiveDate,
    seed: u64
) -> Vec<EligibleResult> {
    if n_riders < 1 {
        panic!("Number of riders must be at least 1");
    }

    let levels = [
        EventLevel::Local,
        EventLevel::Regional,
        EventLevel::National,
        EventLevel::NationalChampionship,
        EventLevel::Ews,
        EventLevel::Unknown
    ];

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut results = Vec::new();

    for event_id in 1..=n_events {
        let event_date = first_event + Duration::weeks((event_id - 1) as i64);
        let event_level = levels[rng.random_range(0..levels.len())];

        let finishers: Vec<i32> = (1..=n_riders).filter(|_| rng.random_bool(0.6)).collect();
        let field_size = finishers.len() as i64;

        for (i, rider_id) in finishers.iter().enumerate() {
            // Winner takes the most points, decreasing with finishing position
            let raw_points = ((field_size - i as i64) * 10) as f64;

            results.push(EligibleResult {
                result_id: event_id * 10_000 + rider_id,
                rider_id: *rider_id,
                club_id: (n_clubs > 0).then(|| rider_id % n_clubs + 1),
                event_id,
                event_date,
                event_level,
                field_size,
                raw_points
            });
        }
    }

    results
}
