use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::{
    database::{
        db::DbClient,
        db_structs::{ClubRankingSnapshot, DeletedRows, EligibleResult, RankingSnapshot}
    },
    error::RankingError,
    model::{
        aggregation::{aggregate, aggregate_clubs},
        constants::RETENTION_MONTHS,
        snapshot::{build_club_snapshot, build_rider_snapshot},
        structures::discipline::Discipline
    }
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Snapshots dated more than this many months before the run date are deleted
    pub retention_months: u32
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            retention_months: RETENTION_MONTHS
        }
    }
}

/// The complete computed state of one `(discipline, snapshot_date)`.
#[derive(Debug)]
pub struct SnapshotSet {
    pub discipline: Discipline,
    pub snapshot_date: NaiveDate,
    pub as_of: NaiveDate,
    pub riders: Vec<RankingSnapshot>,
    pub clubs: Vec<ClubRankingSnapshot>,
    /// Riders left out because their results could not be scored
    pub failures: Vec<RankingError>
}

/// Computes the rider and club standings of `discipline` from `results` as of
/// `as_of`, labelled `snapshot_date`. Pure: everything it needs is passed in.
pub fn compute_snapshot(
    discipline: Discipline,
    snapshot_date: NaiveDate,
    as_of: NaiveDate,
    results: &[EligibleResult],
    previous_rider_positions: &HashMap<i32, i32>,
    previous_club_positions: &HashMap<i32, i32>
) -> SnapshotSet {
    let aggregation = aggregate(results, as_of);
    let club_totals = aggregate_clubs(&aggregation.riders);

    SnapshotSet {
        discipline,
        snapshot_date,
        as_of,
        riders: build_rider_snapshot(discipline, snapshot_date, &aggregation.riders, previous_rider_positions),
        clubs: build_club_snapshot(discipline, snapshot_date, &club_totals, previous_club_positions),
        failures: aggregation.failures
    }
}

/// First day of the month containing `date`. Monthly snapshots are labelled with it.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisciplineSummary {
    pub discipline: Discipline,
    pub riders: usize,
    pub clubs: usize,
    pub rider_errors: usize
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub snapshot_date: NaiveDate,
    pub as_of: NaiveDate,
    pub disciplines: Vec<DisciplineSummary>,
    pub deleted: DeletedRows
}

impl RefreshSummary {
    pub fn rider_errors(&self) -> usize {
        self.disciplines.iter().map(|d| d.rider_errors).sum()
    }
}

pub struct RankingEngine {
    db: DbClient,
    config: EngineConfig
}

impl RankingEngine {
    pub fn new(db: DbClient, config: EngineConfig) -> RankingEngine {
        RankingEngine { db, config }
    }

    pub fn db(&self) -> &DbClient {
        &self.db
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Verifies every input and snapshot table exists before anything is computed.
    pub async fn check_prerequisites(&self) -> Result<(), RankingError> {
        self.db.ensure_tables().await
    }

    /// Computes one snapshot from the database and atomically replaces whatever
    /// was stored for the same `(discipline, snapshot_date)`.
    ///
    /// Riders whose results cannot be scored are logged and left out. Any database
    /// failure aborts this snapshot and leaves the stored one untouched.
    pub async fn rebuild_snapshot(
        &mut self,
        discipline: Discipline,
        snapshot_date: NaiveDate,
        as_of: NaiveDate
    ) -> Result<SnapshotSet, RankingError> {
        let results = self.db.get_eligible_results(discipline, as_of).await?;
        let previous_riders = self.db.get_previous_positions(discipline, snapshot_date).await?;
        let previous_clubs = self
            .db
            .get_previous_club_positions(discipline, snapshot_date)
            .await?;

        let set = compute_snapshot(
            discipline,
            snapshot_date,
            as_of,
            &results,
            &previous_riders,
            &previous_clubs
        );

        for failure in &set.failures {
            warn!("{} {}: skipping rider: {}", discipline, snapshot_date, failure);
        }

        self.db
            .replace_snapshot(discipline, snapshot_date, &set.riders, &set.clubs)
            .await?;

        Ok(set)
    }

    /// The monthly job: recomputes the current month's snapshot for every
    /// discipline as of `run_date`, then deletes expired snapshots.
    ///
    /// The snapshot is dated the first of the month even when `run_date` is
    /// later, so a mid-month run holds results newer than its date. It replaces
    /// a backfilled event snapshot dated the first of that month, and an event
    /// snapshot dated later in the same month is still what
    /// `get_latest_snapshot_date` reports.
    pub async fn refresh(&mut self, run_date: NaiveDate) -> Result<RefreshSummary, RankingError> {
        self.check_prerequisites().await?;

        let snapshot_date = month_start(run_date);
        info!("Refreshing {} snapshots as of {}", snapshot_date, run_date);

        let mut disciplines = Vec::new();
        for discipline in Discipline::iter() {
            let set = self.rebuild_snapshot(discipline, snapshot_date, run_date).await?;
            info!(
                "{}: {} riders, {} clubs ranked, {} riders skipped",
                discipline,
                set.riders.len(),
                set.clubs.len(),
                set.failures.len()
            );

            disciplines.push(DisciplineSummary {
                discipline,
                riders: set.riders.len(),
                clubs: set.clubs.len(),
                rider_errors: set.failures.len()
            });
        }

        let deleted = self.clean_expired(run_date).await?;

        Ok(RefreshSummary {
            snapshot_date,
            as_of: run_date,
            disciplines,
            deleted
        })
    }
}
