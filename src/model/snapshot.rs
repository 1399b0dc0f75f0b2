use std::{cmp::Ordering, collections::HashMap};

use chrono::NaiveDate;
use itertools::Itertools;

use crate::{
    database::db_structs::{ClubRankingSnapshot, RankingSnapshot},
    model::{
        aggregation::{ClubTotals, RiderTotals},
        structures::discipline::Discipline
    }
};

/// Something that can be placed on a leaderboard.
trait Standing {
    fn id(&self) -> i32;
    fn total(&self) -> f64;
    fn recent(&self) -> f64;
}

impl Standing for RiderTotals {
    fn id(&self) -> i32 {
        self.rider_id
    }

    fn total(&self) -> f64 {
        self.total_ranking_points()
    }

    fn recent(&self) -> f64 {
        self.points_last_12_months
    }
}

impl Standing for ClubTotals {
    fn id(&self) -> i32 {
        self.club_id
    }

    fn total(&self) -> f64 {
        self.total_ranking_points()
    }

    fn recent(&self) -> f64 {
        self.points_last_12_months
    }
}

/// Leaderboard order: total descending. Equal totals are broken by full-weight
/// (last 12 months) points descending, then by id ascending, so every position is
/// unique and reproducible.
fn standings_order<T: Standing>(a: &T, b: &T) -> Ordering {
    b.total()
        .total_cmp(&a.total())
        .then_with(|| b.recent().total_cmp(&a.recent()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Sorts and pairs each entry with its 1-based position.
fn rank<T: Standing>(entries: &[T]) -> Vec<(i32, &T)> {
    entries
        .iter()
        .sorted_by(|a, b| standings_order(*a, *b))
        .enumerate()
        .map(|(i, entry)| (i as i32 + 1, entry))
        .collect()
}

/// Positive when the entry moved up the leaderboard.
pub fn position_change(previous_position: Option<i32>, ranking_position: i32) -> Option<i32> {
    previous_position.map(|previous| previous - ranking_position)
}

/// Builds the ranked rider rows for one `(discipline, snapshot_date)`.
///
/// `previous_positions` maps rider id to the position of the rider's most recent
/// earlier snapshot. Riders missing from it are new.
pub fn build_rider_snapshot(
    discipline: Discipline,
    snapshot_date: NaiveDate,
    riders: &[RiderTotals],
    previous_positions: &HashMap<i32, i32>
) -> Vec<RankingSnapshot> {
    rank(riders)
        .into_iter()
        .map(|(position, rider)| {
            let previous_position = previous_positions.get(&rider.rider_id).copied();

            RankingSnapshot {
                rider_id: rider.rider_id,
                discipline,
                snapshot_date,
                total_ranking_points: rider.total_ranking_points(),
                points_last_12_months: rider.points_last_12_months,
                points_months_13_24: rider.points_months_13_24,
                events_count: rider.events_count,
                ranking_position: position,
                previous_position,
                position_change: position_change(previous_position, position)
            }
        })
        .collect()
}

pub fn build_club_snapshot(
    discipline: Discipline,
    snapshot_date: NaiveDate,
    clubs: &[ClubTotals],
    previous_positions: &HashMap<i32, i32>
) -> Vec<ClubRankingSnapshot> {
    rank(clubs)
        .into_iter()
        .map(|(position, club)| {
            let previous_position = previous_positions.get(&club.club_id).copied();

            ClubRankingSnapshot {
                club_id: club.club_id,
                discipline,
                snapshot_date,
                total_ranking_points: club.total_ranking_points(),
                points_last_12_months: club.points_last_12_months,
                points_months_13_24: club.points_months_13_24,
                riders_count: club.riders_count,
                events_count: club.events_count,
                ranking_position: position,
                previous_position,
                position_change: position_change(previous_position, position)
            }
        })
        .collect()
}
