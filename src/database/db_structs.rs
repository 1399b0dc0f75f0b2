use crate::model::structures::{discipline::Discipline, event_level::EventLevel};
use chrono::NaiveDate;
use serde::Serialize;

/// A finished result that counts toward the ranking, joined with what scoring needs
/// from its event.
#[derive(Debug, Clone, Serialize)]
pub struct EligibleResult {
    pub result_id: i32,
    pub rider_id: i32,
    pub club_id: Option<i32>,
    pub event_id: i32,
    pub event_date: NaiveDate,
    pub event_level: EventLevel,
    /// Distinct finishers in the event, across all classes
    pub field_size: i64,
    pub raw_points: f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingSnapshot {
    pub rider_id: i32,
    pub discipline: Discipline,
    pub snapshot_date: NaiveDate,
    pub total_ranking_points: f64,
    pub points_last_12_months: f64,
    /// Stored without the 0.5 decay applied
    pub points_months_13_24: f64,
    pub events_count: i32,
    pub ranking_position: i32,
    /// `None` when the rider has no earlier snapshot
    pub previous_position: Option<i32>,
    pub position_change: Option<i32>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClubRankingSnapshot {
    pub club_id: i32,
    pub discipline: Discipline,
    pub snapshot_date: NaiveDate,
    pub total_ranking_points: f64,
    pub points_last_12_months: f64,
    pub points_months_13_24: f64,
    pub riders_count: i32,
    pub events_count: i32,
    pub ranking_position: i32,
    pub previous_position: Option<i32>,
    pub position_change: Option<i32>
}

#[derive(Debug, Clone, Serialize)]
pub struct ClubStanding {
    pub club_name: Option<String>,
    #[serde(flatten)]
    pub snapshot: ClubRankingSnapshot
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub snapshot_date: Option<NaiveDate>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub items: Vec<T>
}

impl<T> Page<T> {
    pub fn empty(page: i64, per_page: i64) -> Self {
        Page {
            snapshot_date: None,
            page,
            per_page,
            total: 0,
            items: Vec::new()
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.per_page <= 0 {
            return 0;
        }

        (self.total + self.per_page - 1) / self.per_page
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStatus {
    pub name: String,
    pub present: bool,
    pub row_count: Option<i64>
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletedRows {
    pub ranking_snapshots: u64,
    pub club_ranking_snapshots: u64
}
