use chrono::NaiveDate;
use tracing::info;

use crate::{
    database::db_structs::DeletedRows,
    error::RankingError,
    model::{decay::months_before, ranking_engine::RankingEngine}
};

/// Snapshots dated strictly before the returned date are expired.
pub fn retention_cutoff(as_of: NaiveDate, retention_months: u32) -> NaiveDate {
    months_before(as_of, retention_months)
}

impl RankingEngine {
    /// Deletes rider and club snapshots older than the configured retention,
    /// relative to `as_of`.
    pub async fn clean_expired(&self, as_of: NaiveDate) -> Result<DeletedRows, RankingError> {
        let cutoff = retention_cutoff(as_of, self.config().retention_months);
        let deleted = self.db().delete_expired_snapshots(cutoff).await?;

        info!(
            "Deleted snapshots dated before {}: {} rider rows, {} club rows",
            cutoff, deleted.ranking_snapshots, deleted.club_ranking_snapshots
        );

        Ok(deleted)
    }
}
