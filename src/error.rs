use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error(
        "Missing required tables: {}. Apply the schema migration (or run `ranking-engine init-schema` \
        for the snapshot tables) before retrying",
        .0.join(", ")
    )]
    MissingTables(Vec<String>),

    #[error("Invalid result for rider {rider_id}: {reason}")]
    InvalidResult { rider_id: i32, reason: String }
}
