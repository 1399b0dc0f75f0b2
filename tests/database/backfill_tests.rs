use approx::assert_abs_diff_eq;
use ranking_engine::model::{
    backfill::BackfillRange,
    ranking_engine::{EngineConfig, RankingEngine},
    structures::discipline::Discipline
};
use serial_test::serial;
use tokio_postgres::Client;

use super::test_helpers::{as_of, ymd, TestDatabase};
use crate::common::init_test_env;

/// Every stored rider row except the surrogate key and insert time, in a
/// stable order.
async fn dump_snapshots(client: &Client) -> Vec<String> {
    client
        .query(
            "SELECT rider_id, discipline, snapshot_date, total_ranking_points, points_last_12_months, \
            points_months_13_24, events_count, ranking_position, previous_position, position_change \
            FROM ranking_snapshots ORDER BY discipline, snapshot_date, ranking_position",
            &[]
        )
        .await
        .expect("Failed to dump snapshots")
        .iter()
        .map(|row| {
            let rider_id: i32 = row.get(0);
            let discipline: String = row.get(1);
            let snapshot_date: chrono::NaiveDate = row.get(2);
            let total: f64 = row.get(3);
            let position: i32 = row.get(7);
            let previous: Option<i32> = row.get(8);
            format!(
                "{} {} {} {} {} {:?}",
                discipline, snapshot_date, position, rider_id, total, previous
            )
        })
        .collect()
}

fn seeded_range() -> BackfillRange {
    BackfillRange {
        from: ymd(2024, 1, 1),
        to: as_of()
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_backfill_writes_one_snapshot_per_event_date() {
    init_test_env();
    let test_db = TestDatabase::seeded().await.expect("Failed to create test database");
    let db_client = test_db.db_client().await.expect("Failed to connect");

    let mut engine = RankingEngine::new(db_client, EngineConfig::default());
    let summary = engine.backfill(seeded_range(), false).await.expect("Backfill failed");

    // ENDURO: 2024-03-01, 2025-03-01. DH: 2025-05-10. GRAVITY: all three.
    assert_eq!(summary.event_dates, 3);
    assert_eq!(summary.snapshots_written, 6);
    assert_eq!(summary.snapshots_skipped, 0);
    assert_eq!(summary.snapshot_errors, 0);
    assert_eq!(summary.rider_errors, 0);

    let history = engine
        .db()
        .get_rider_history(3, Discipline::Gravity)
        .await
        .expect("Failed to read history");
    let dates: Vec<_> = history.iter().map(|s| s.snapshot_date).collect();
    assert_eq!(dates, vec![ymd(2025, 3, 1), ymd(2025, 5, 10)]);

    // Each snapshot is computed as of its own date. On 2025-03-01 event 2 is
    // exactly 12 months old and still counts in full, so rider 1 keeps the lead.
    let rider_2 = engine.db().get_rider_history(2, Discipline::Enduro).await.unwrap();
    assert_eq!(rider_2.len(), 2);
    assert_eq!(rider_2[0].snapshot_date, ymd(2024, 3, 1));
    assert_eq!(rider_2[0].ranking_position, 2);
    assert_eq!(rider_2[0].previous_position, None);
    assert_eq!(rider_2[1].snapshot_date, ymd(2025, 3, 1));
    assert_eq!(rider_2[1].ranking_position, 2);
    assert_eq!(rider_2[1].previous_position, Some(2));
    assert_eq!(rider_2[1].position_change, Some(0));
    assert_abs_diff_eq!(rider_2[1].points_last_12_months, 65.5, epsilon = 1e-9);
    assert_abs_diff_eq!(rider_2[1].points_months_13_24, 0.0);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_backfill_is_idempotent() {
    init_test_env();
    let test_db = TestDatabase::seeded().await.expect("Failed to create test database");
    let db_client = test_db.db_client().await.expect("Failed to connect");
    let check_client = test_db.get_client().await.expect("Failed to get client");

    let mut engine = RankingEngine::new(db_client, EngineConfig::default());
    engine.backfill(seeded_range(), false).await.expect("Backfill failed");
    let first = dump_snapshots(&check_client).await;

    engine.backfill(seeded_range(), false).await.expect("Backfill failed");
    let second = dump_snapshots(&check_client).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_backfill_resumes_with_skip_existing() {
    init_test_env();
    let test_db = TestDatabase::seeded().await.expect("Failed to create test database");
    let db_client = test_db.db_client().await.expect("Failed to connect");

    let mut engine = RankingEngine::new(db_client, EngineConfig::default());

    // An interrupted run that only got through the first event date
    engine
        .backfill(
            BackfillRange {
                from: ymd(2024, 1, 1),
                to: ymd(2024, 12, 31)
            },
            false
        )
        .await
        .expect("Backfill failed");

    let summary = engine.backfill(seeded_range(), true).await.expect("Backfill failed");

    assert_eq!(summary.snapshots_skipped, 2);
    assert_eq!(summary.snapshots_written, 4);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_backfill_empty_range() {
    init_test_env();
    let test_db = TestDatabase::seeded().await.expect("Failed to create test database");
    let db_client = test_db.db_client().await.expect("Failed to connect");

    let mut engine = RankingEngine::new(db_client, EngineConfig::default());
    let summary = engine
        .backfill(
            BackfillRange {
                from: ymd(2020, 1, 1),
                to: ymd(2020, 12, 31)
            },
            false
        )
        .await
        .expect("Backfill failed");

    assert_eq!(summary.event_dates, 0);
    assert_eq!(summary.snapshots_written, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_backfill_requires_snapshot_tables() {
    init_test_env();
    let test_db = TestDatabase::new().await.expect("Failed to create test database");
    let db_client = test_db.db_client().await.expect("Failed to connect");

    let mut engine = RankingEngine::new(db_client, EngineConfig::default());
    assert!(engine.backfill(seeded_range(), false).await.is_err());
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_mid_month_refresh_replaces_event_snapshot_on_the_first() {
    init_test_env();
    let test_db = TestDatabase::seeded().await.expect("Failed to create test database");
    let db_client = test_db.db_client().await.expect("Failed to connect");

    let mut engine = RankingEngine::new(db_client, EngineConfig::default());
    engine.backfill(seeded_range(), false).await.expect("Backfill failed");

    // Dated 2025-03-01 like event 1, but computed as of the 15th
    let summary = engine.refresh(ymd(2025, 3, 15)).await.expect("Refresh failed");
    assert_eq!(summary.snapshot_date, ymd(2025, 3, 1));

    let rider_2 = engine.db().get_rider_history(2, Discipline::Enduro).await.unwrap();
    let dates: Vec<_> = rider_2.iter().map(|s| s.snapshot_date).collect();
    assert_eq!(dates, vec![ymd(2024, 3, 1), ymd(2025, 3, 1)]);

    // Event 2 is now older than 12 months, which the backfilled row did not see
    assert!(rider_2[1].points_months_13_24 > 0.0);
    assert!(rider_2[1].points_last_12_months < 65.5);

    // The DH event snapshot later in the month is still the latest one
    assert_eq!(
        engine.db().get_latest_snapshot_date(Discipline::Dh).await.unwrap(),
        Some(ymd(2025, 5, 10))
    );
}
