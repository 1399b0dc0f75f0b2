use super::{db::DbClient, db_structs::EligibleResult, query::ResultQuery};
use crate::model::{
    decay::window_start,
    scoring::raw_points,
    structures::{discipline::Discipline, event_level::EventLevel}
};
use chrono::NaiveDate;
use tokio_postgres::{Error, Row};
use tracing::debug;

impl DbClient {
    /// Every eligible result of `discipline` inside the lookback window ending at
    /// `as_of`, in event date order.
    pub async fn get_eligible_results(
        &self,
        discipline: Discipline,
        as_of: NaiveDate
    ) -> Result<Vec<EligibleResult>, Error> {
        let query = ResultQuery::eligible(discipline, window_start(as_of), as_of);
        let rows = self
            .client()
            .query(query.results_sql().as_str(), &query.params())
            .await?;

        let results = rows.iter().map(result_from_row).collect::<Result<Vec<_>, _>>()?;
        debug!("Fetched {} eligible {} results as of {}", results.len(), discipline, as_of);

        Ok(results)
    }

    /// Distinct dates within `[from, to]` on which `discipline` held an event
    /// with at least one eligible result.
    pub async fn get_event_dates(
        &self,
        discipline: Discipline,
        from: NaiveDate,
        to: NaiveDate
    ) -> Result<Vec<NaiveDate>, Error> {
        let query = ResultQuery::eligible(discipline, from, to);
        let rows = self
            .client()
            .query(query.event_dates_sql().as_str(), &query.params())
            .await?;

        rows.iter().map(|row| row.try_get("event_date")).collect()
    }
}

fn result_from_row(row: &Row) -> Result<EligibleResult, Error> {
    let event_level: Option<String> = row.try_get("event_level")?;

    Ok(EligibleResult {
        result_id: row.try_get("result_id")?,
        rider_id: row.try_get("rider_id")?,
        club_id: row.try_get("club_id")?,
        event_id: row.try_get("event_id")?,
        event_date: row.try_get("event_date")?,
        event_level: EventLevel::from(event_level.as_deref()),
        field_size: row.try_get("field_size")?,
        raw_points: raw_points(
            row.try_get("points")?,
            row.try_get("run_1_points")?,
            row.try_get("run_2_points")?
        )
    })
}
