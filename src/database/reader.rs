use super::{
    db::DbClient,
    db_structs::{ClubRankingSnapshot, ClubStanding, Page, RankingSnapshot}
};
use crate::model::{constants::MAX_PER_PAGE, structures::discipline::Discipline};
use chrono::NaiveDate;
use tokio_postgres::{Error, Row};

/// Clamps a requested page to `page >= 1` and `1 <= per_page <= MAX_PER_PAGE`.
pub fn page_bounds(page: i64, per_page: i64) -> (i64, i64) {
    (page.max(1), per_page.clamp(1, MAX_PER_PAGE))
}

impl DbClient {
    pub async fn get_latest_snapshot_date(&self, discipline: Discipline) -> Result<Option<NaiveDate>, Error> {
        let row = self
            .client()
            .query_one(
                "SELECT MAX(snapshot_date) FROM ranking_snapshots WHERE discipline = $1",
                &[&discipline.as_str()]
            )
            .await?;

        row.try_get(0)
    }

    pub async fn get_latest_club_snapshot_date(&self, discipline: Discipline) -> Result<Option<NaiveDate>, Error> {
        let row = self
            .client()
            .query_one(
                "SELECT MAX(snapshot_date) FROM club_ranking_snapshots WHERE discipline = $1",
                &[&discipline.as_str()]
            )
            .await?;

        row.try_get(0)
    }

    /// One page of the latest rider snapshot of `discipline`, by position.
    /// Empty when nothing has been computed yet.
    pub async fn get_standings(
        &self,
        discipline: Discipline,
        page: i64,
        per_page: i64
    ) -> Result<Page<RankingSnapshot>, Error> {
        let (page, per_page) = page_bounds(page, per_page);
        let Some(snapshot_date) = self.get_latest_snapshot_date(discipline).await? else {
            return Ok(Page::empty(page, per_page));
        };

        let total: i64 = self
            .client()
            .query_one(
                "SELECT COUNT(*) FROM ranking_snapshots WHERE discipline = $1 AND snapshot_date = $2",
                &[&discipline.as_str(), &snapshot_date]
            )
            .await?
            .try_get(0)?;

        let offset = (page - 1) * per_page;
        let rows = self
            .client()
            .query(
                "SELECT rider_id, snapshot_date, total_ranking_points, points_last_12_months, points_months_13_24, \
                events_count, ranking_position, previous_position, position_change \
                FROM ranking_snapshots WHERE discipline = $1 AND snapshot_date = $2 \
                ORDER BY ranking_position LIMIT $3 OFFSET $4",
                &[&discipline.as_str(), &snapshot_date, &per_page, &offset]
            )
            .await?;

        let items = rows
            .iter()
            .map(|row| rider_snapshot_from_row(row, discipline))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            snapshot_date: Some(snapshot_date),
            page,
            per_page,
            total,
            items
        })
    }

    /// Every stored snapshot row of one rider in `discipline`, oldest first.
    pub async fn get_rider_history(
        &self,
        rider_id: i32,
        discipline: Discipline
    ) -> Result<Vec<RankingSnapshot>, Error> {
        let rows = self
            .client()
            .query(
                "SELECT rider_id, snapshot_date, total_ranking_points, points_last_12_months, points_months_13_24, \
                events_count, ranking_position, previous_position, position_change \
                FROM ranking_snapshots WHERE rider_id = $1 AND discipline = $2 \
                ORDER BY snapshot_date",
                &[&rider_id, &discipline.as_str()]
            )
            .await?;

        rows.iter()
            .map(|row| rider_snapshot_from_row(row, discipline))
            .collect()
    }

    /// One page of the latest club snapshot of `discipline`. Club names are
    /// filled in only when the `clubs` table exists.
    pub async fn get_club_standings(
        &self,
        discipline: Discipline,
        page: i64,
        per_page: i64
    ) -> Result<Page<ClubStanding>, Error> {
        let (page, per_page) = page_bounds(page, per_page);
        let Some(snapshot_date) = self.get_latest_club_snapshot_date(discipline).await? else {
            return Ok(Page::empty(page, per_page));
        };

        let total: i64 = self
            .client()
            .query_one(
                "SELECT COUNT(*) FROM club_ranking_snapshots WHERE discipline = $1 AND snapshot_date = $2",
                &[&discipline.as_str(), &snapshot_date]
            )
            .await?
            .try_get(0)?;

        let (club_name, club_join) = match self.table_exists("clubs").await? {
            true => ("cl.name::TEXT", "LEFT JOIN clubs cl ON cl.id = s.club_id"),
            false => ("NULL::TEXT", "")
        };
        let query = format!(
            "SELECT s.club_id, s.snapshot_date, s.total_ranking_points, s.points_last_12_months, \
            s.points_months_13_24, s.riders_count, s.events_count, s.ranking_position, s.previous_position, \
            s.position_change, {} AS club_name \
            FROM club_ranking_snapshots s {} \
            WHERE s.discipline = $1 AND s.snapshot_date = $2 \
            ORDER BY s.ranking_position LIMIT $3 OFFSET $4",
            club_name, club_join
        );

        let offset = (page - 1) * per_page;
        let rows = self
            .client()
            .query(
                query.as_str(),
                &[&discipline.as_str(), &snapshot_date, &per_page, &offset]
            )
            .await?;

        let items = rows
            .iter()
            .map(|row| -> Result<ClubStanding, Error> {
                Ok(ClubStanding {
                    club_name: row.try_get("club_name")?,
                    snapshot: club_snapshot_from_row(row, discipline)?
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Page {
            snapshot_date: Some(snapshot_date),
            page,
            per_page,
            total,
            items
        })
    }
}

fn rider_snapshot_from_row(row: &Row, discipline: Discipline) -> Result<RankingSnapshot, Error> {
    Ok(RankingSnapshot {
        rider_id: row.try_get("rider_id")?,
        discipline,
        snapshot_date: row.try_get("snapshot_date")?,
        total_ranking_points: row.try_get("total_ranking_points")?,
        points_last_12_months: row.try_get("points_last_12_months")?,
        points_months_13_24: row.try_get("points_months_13_24")?,
        events_count: row.try_get("events_count")?,
        ranking_position: row.try_get("ranking_position")?,
        previous_position: row.try_get("previous_position")?,
        position_change: row.try_get("position_change")?
    })
}

fn club_snapshot_from_row(row: &Row, discipline: Discipline) -> Result<ClubRankingSnapshot, Error> {
    Ok(ClubRankingSnapshot {
        club_id: row.try_get("club_id")?,
        discipline,
        snapshot_date: row.try_get("snapshot_date")?,
        total_ranking_points: row.try_get("total_ranking_points")?,
        points_last_12_months: row.try_get("points_last_12_months")?,
        points_months_13_24: row.try_get("points_months_13_24")?,
        riders_count: row.try_get("riders_count")?,
        events_count: row.try_get("events_count")?,
        ranking_position: row.try_get("ranking_position")?,
        previous_position: row.try_get("previous_position")?,
        position_change: row.try_get("position_change")?
    })
}
