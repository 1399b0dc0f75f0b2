use super::db_structs::{ClubRankingSnapshot, DeletedRows, RankingSnapshot, TableStatus};
use crate::{error::RankingError, model::structures::discipline::Discipline};
use chrono::NaiveDate;
use postgres_types::ToSql;
use std::collections::HashMap;
use tokio_postgres::{Client, Error, NoTls};
use tracing::{debug, error, info};

/// Tables owned by other parts of the platform that the ranking reads from.
pub const INPUT_TABLES: [&str; 4] = ["results", "events", "classes", "riders"];
/// Tables the ranking writes.
pub const SNAPSHOT_TABLES: [&str; 2] = ["ranking_snapshots", "club_ranking_snapshots"];
/// Only needed for club names on the read path.
pub const OPTIONAL_TABLES: [&str; 1] = ["clubs"];

const SNAPSHOT_SCHEMA: &str = include_str!("schema.sql");

pub struct DbClient {
    client: Client
}

impl DbClient {
    // Connect to the database and return a DbClient instance
    pub async fn connect(connection_str: &str) -> Result<Self, Error> {
        let (client, connection) = tokio_postgres::connect(connection_str, NoTls).await?;

        // Spawn the connection object to run in the background
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("connection error: {}", e);
            }
        });

        Ok(DbClient { client })
    }

    // Access the underlying Client
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool, Error> {
        let row = self
            .client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
                WHERE table_schema::TEXT = current_schema() AND table_name::TEXT = $1)",
                &[&table]
            )
            .await?;

        row.try_get(0)
    }

    /// Fails with [`RankingError::MissingTables`] naming every absent input or
    /// snapshot table. Nothing is computed when this fails.
    pub async fn ensure_tables(&self) -> Result<(), RankingError> {
        let mut missing = Vec::new();
        for table in INPUT_TABLES.iter().chain(SNAPSHOT_TABLES.iter()) {
            if !self.table_exists(table).await? {
                missing.push(table.to_string());
            }
        }

        if !missing.is_empty() {
            return Err(RankingError::MissingTables(missing));
        }

        Ok(())
    }

    /// Presence and row count of every table the engine touches. Never fails: a
    /// table that cannot be inspected is reported as absent.
    pub async fn table_statuses(&self) -> Vec<TableStatus> {
        let mut statuses = Vec::new();

        for table in INPUT_TABLES
            .iter()
            .chain(SNAPSHOT_TABLES.iter())
            .chain(OPTIONAL_TABLES.iter())
        {
            let present = self.table_exists(table).await.unwrap_or(false);
            let row_count = match present {
                true => self.row_count(table).await.ok(),
                false => None
            };

            statuses.push(TableStatus {
                name: table.to_string(),
                present,
                row_count
            });
        }

        statuses
    }

    // Table names only ever come from the constant lists above
    async fn row_count(&self, table: &str) -> Result<i64, Error> {
        let row = self
            .client
            .query_one(format!("SELECT COUNT(*) FROM {}", table).as_str(), &[])
            .await?;

        row.try_get(0)
    }

    /// Creates the snapshot tables and indexes if they do not exist yet.
    pub async fn create_snapshot_tables(&self) -> Result<(), Error> {
        self.client.batch_execute(SNAPSHOT_SCHEMA).await?;
        info!("Snapshot tables are in place");

        Ok(())
    }

    /// Position of each rider's most recent snapshot dated before `before`.
    pub async fn get_previous_positions(
        &self,
        discipline: Discipline,
        before: NaiveDate
    ) -> Result<HashMap<i32, i32>, Error> {
        self.previous_positions("ranking_snapshots", "rider_id", discipline, before)
            .await
    }

    pub async fn get_previous_club_positions(
        &self,
        discipline: Discipline,
        before: NaiveDate
    ) -> Result<HashMap<i32, i32>, Error> {
        self.previous_positions("club_ranking_snapshots", "club_id", discipline, before)
            .await
    }

    async fn previous_positions(
        &self,
        table: &str,
        id_column: &str,
        discipline: Discipline,
        before: NaiveDate
    ) -> Result<HashMap<i32, i32>, Error> {
        let query = format!(
            "SELECT DISTINCT ON ({id}) {id} AS id, ranking_position FROM {table} \
            WHERE discipline = $1 AND snapshot_date < $2 \
            ORDER BY {id}, snapshot_date DESC",
            id = id_column,
            table = table
        );
        let rows = self
            .client
            .query(query.as_str(), &[&discipline.as_str(), &before])
            .await?;

        let mut positions = HashMap::with_capacity(rows.len());
        for row in rows {
            positions.insert(row.try_get("id")?, row.try_get("ranking_position")?);
        }

        Ok(positions)
    }

    pub async fn snapshot_exists(&self, discipline: Discipline, snapshot_date: NaiveDate) -> Result<bool, Error> {
        let row = self
            .client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM ranking_snapshots WHERE discipline = $1 AND snapshot_date = $2)",
                &[&discipline.as_str(), &snapshot_date]
            )
            .await?;

        row.try_get(0)
    }

    /// Replaces every rider and club row of `(discipline, snapshot_date)` in one
    /// transaction. Readers see either the old rows or the new ones, never a mix.
    /// If anything fails the transaction is dropped, which rolls it back.
    pub async fn replace_snapshot(
        &mut self,
        discipline: Discipline,
        snapshot_date: NaiveDate,
        riders: &[RankingSnapshot],
        clubs: &[ClubRankingSnapshot]
    ) -> Result<(), Error> {
        let discipline_str = discipline.as_str();
        let transaction = self.client.transaction().await?;

        let deleted_riders = transaction
            .execute(
                "DELETE FROM ranking_snapshots WHERE discipline = $1 AND snapshot_date = $2",
                &[&discipline_str, &snapshot_date]
            )
            .await?;
        let deleted_clubs = transaction
            .execute(
                "DELETE FROM club_ranking_snapshots WHERE discipline = $1 AND snapshot_date = $2",
                &[&discipline_str, &snapshot_date]
            )
            .await?;

        if !riders.is_empty() {
            let rider_ids: Vec<i32> = riders.iter().map(|r| r.rider_id).collect();
            let totals: Vec<f64> = riders.iter().map(|r| r.total_ranking_points).collect();
            let last_12: Vec<f64> = riders.iter().map(|r| r.points_last_12_months).collect();
            let months_13_24: Vec<f64> = riders.iter().map(|r| r.points_months_13_24).collect();
            let events: Vec<i32> = riders.iter().map(|r| r.events_count).collect();
            let positions: Vec<i32> = riders.iter().map(|r| r.ranking_position).collect();
            let previous: Vec<Option<i32>> = riders.iter().map(|r| r.previous_position).collect();
            let changes: Vec<Option<i32>> = riders.iter().map(|r| r.position_change).collect();

            let values: &[&(dyn ToSql + Sync)] = &[
                &discipline_str,
                &snapshot_date,
                &rider_ids,
                &totals,
                &last_12,
                &months_13_24,
                &events,
                &positions,
                &previous,
                &changes
            ];

            transaction
                .execute(
                    "INSERT INTO ranking_snapshots (rider_id, discipline, snapshot_date, total_ranking_points, \
                    points_last_12_months, points_months_13_24, events_count, ranking_position, \
                    previous_position, position_change) \
                    SELECT u.rider_id, $1::TEXT, $2::DATE, u.total, u.last_12, u.months_13_24, u.events_count, \
                    u.ranking_position, u.previous_position, u.position_change \
                    FROM UNNEST($3::INT4[], $4::FLOAT8[], $5::FLOAT8[], $6::FLOAT8[], $7::INT4[], $8::INT4[], \
                    $9::INT4[], $10::INT4[]) \
                    AS u(rider_id, total, last_12, months_13_24, events_count, ranking_position, \
                    previous_position, position_change)",
                    values
                )
                .await?;
        }

        if !clubs.is_empty() {
            let club_ids: Vec<i32> = clubs.iter().map(|c| c.club_id).collect();
            let totals: Vec<f64> = clubs.iter().map(|c| c.total_ranking_points).collect();
            let last_12: Vec<f64> = clubs.iter().map(|c| c.points_last_12_months).collect();
            let months_13_24: Vec<f64> = clubs.iter().map(|c| c.points_months_13_24).collect();
            let riders_count: Vec<i32> = clubs.iter().map(|c| c.riders_count).collect();
            let events: Vec<i32> = clubs.iter().map(|c| c.events_count).collect();
            let positions: Vec<i32> = clubs.iter().map(|c| c.ranking_position).collect();
            let previous: Vec<Option<i32>> = clubs.iter().map(|c| c.previous_position).collect();
            let changes: Vec<Option<i32>> = clubs.iter().map(|c| c.position_change).collect();

            let values: &[&(dyn ToSql + Sync)] = &[
                &discipline_str,
                &snapshot_date,
                &club_ids,
                &totals,
                &last_12,
                &months_13_24,
                &riders_count,
                &events,
                &positions,
                &previous,
                &changes
            ];

            transaction
                .execute(
                    "INSERT INTO club_ranking_snapshots (club_id, discipline, snapshot_date, total_ranking_points, \
                    points_last_12_months, points_months_13_24, riders_count, events_count, ranking_position, \
                    previous_position, position_change) \
                    SELECT u.club_id, $1::TEXT, $2::DATE, u.total, u.last_12, u.months_13_24, u.riders_count, \
                    u.events_count, u.ranking_position, u.previous_position, u.position_change \
                    FROM UNNEST($3::INT4[], $4::FLOAT8[], $5::FLOAT8[], $6::FLOAT8[], $7::INT4[], $8::INT4[], \
                    $9::INT4[], $10::INT4[], $11::INT4[]) \
                    AS u(club_id, total, last_12, months_13_24, riders_count, events_count, ranking_position, \
                    previous_position, position_change)",
                    values
                )
                .await?;
        }

        transaction.commit().await?;

        debug!(
            "Replaced {} {} snapshot: {} -> {} rider rows, {} -> {} club rows",
            discipline,
            snapshot_date,
            deleted_riders,
            riders.len(),
            deleted_clubs,
            clubs.len()
        );

        Ok(())
    }

    /// Hard-deletes rider and club snapshot rows dated before `cutoff`.
    pub async fn delete_expired_snapshots(&self, cutoff: NaiveDate) -> Result<DeletedRows, Error> {
        let ranking_snapshots = self
            .client
            .execute("DELETE FROM ranking_snapshots WHERE snapshot_date < $1", &[&cutoff])
            .await?;
        let club_ranking_snapshots = self
            .client
            .execute("DELETE FROM club_ranking_snapshots WHERE snapshot_date < $1", &[&cutoff])
            .await?;

        Ok(DeletedRows {
            ranking_snapshots,
            club_ranking_snapshots
        })
    }
}
