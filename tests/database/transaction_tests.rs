use ranking_engine::{
    database::db_structs::RankingSnapshot,
    model::structures::discipline::Discipline
};
use serial_test::serial;

use super::test_helpers::{ymd, TestDatabase};
use crate::common::init_test_env;

fn snapshot_row(rider_id: i32, position: i32, total: f64) -> RankingSnapshot {
    RankingSnapshot {
        rider_id,
        discipline: Discipline::Enduro,
        snapshot_date: ymd(2025, 3, 1),
        total_ranking_points: total,
        points_last_12_months: total,
        points_months_13_24: 0.0,
        events_count: 1,
        ranking_position: position,
        previous_position: None,
        position_change: None
    }
}

async fn count_rows(test_db: &TestDatabase, discipline: &str) -> i64 {
    let client = test_db.get_client().await.expect("Failed to get client");
    client
        .query_one(
            "SELECT COUNT(*) FROM ranking_snapshots WHERE discipline = $1 AND snapshot_date = '2025-03-01'",
            &[&discipline]
        )
        .await
        .expect("Failed to query")
        .get(0)
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_replace_overwrites_instead_of_appending() {
    init_test_env();
    let test_db = TestDatabase::seeded().await.expect("Failed to create test database");
    let mut client = test_db.db_client().await.expect("Failed to connect");

    let date = ymd(2025, 3, 1);
    let first = vec![snapshot_row(1, 1, 30.0), snapshot_row(2, 2, 20.0), snapshot_row(3, 3, 10.0)];
    let second = vec![snapshot_row(2, 1, 25.0), snapshot_row(3, 2, 15.0)];

    client
        .replace_snapshot(Discipline::Enduro, date, &first, &[])
        .await
        .expect("First replace failed");
    assert_eq!(count_rows(&test_db, "ENDURO").await, 3);

    client
        .replace_snapshot(Discipline::Enduro, date, &second, &[])
        .await
        .expect("Second replace failed");
    assert_eq!(count_rows(&test_db, "ENDURO").await, 2);

    let page = client.get_standings(Discipline::Enduro, 1, 50).await.unwrap();
    assert_eq!(page.items, second);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_failed_replace_keeps_previous_rows() {
    init_test_env();
    let test_db = TestDatabase::seeded().await.expect("Failed to create test database");
    let mut client = test_db.db_client().await.expect("Failed to connect");

    let date = ymd(2025, 3, 1);
    let committed = vec![snapshot_row(1, 1, 30.0), snapshot_row(2, 2, 20.0)];
    client
        .replace_snapshot(Discipline::Enduro, date, &committed, &[])
        .await
        .expect("Replace failed");

    // The duplicate rider violates the unique constraint after the delete has run
    let broken = vec![snapshot_row(4, 1, 50.0), snapshot_row(4, 2, 40.0)];
    let result = client.replace_snapshot(Discipline::Enduro, date, &broken, &[]).await;
    assert!(result.is_err());

    assert_eq!(count_rows(&test_db, "ENDURO").await, 2);
    let page = client.get_standings(Discipline::Enduro, 1, 50).await.unwrap();
    assert_eq!(page.items, committed);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_replace_leaves_other_disciplines_and_dates_alone() {
    init_test_env();
    let test_db = TestDatabase::seeded().await.expect("Failed to create test database");
    let mut client = test_db.db_client().await.expect("Failed to connect");

    let date = ymd(2025, 3, 1);
    let mut dh_row = snapshot_row(3, 1, 12.0);
    dh_row.discipline = Discipline::Dh;
    let mut older_row = snapshot_row(1, 1, 8.0);
    older_row.snapshot_date = ymd(2025, 2, 1);

    client
        .replace_snapshot(Discipline::Dh, date, &[dh_row], &[])
        .await
        .unwrap();
    client
        .replace_snapshot(Discipline::Enduro, ymd(2025, 2, 1), &[older_row], &[])
        .await
        .unwrap();
    client
        .replace_snapshot(Discipline::Enduro, date, &[snapshot_row(2, 1, 20.0)], &[])
        .await
        .unwrap();

    // Emptying one snapshot deletes only its own rows
    client
        .replace_snapshot(Discipline::Enduro, date, &[], &[])
        .await
        .unwrap();

    assert_eq!(count_rows(&test_db, "ENDURO").await, 0);
    assert_eq!(count_rows(&test_db, "DH").await, 1);
    assert_eq!(client.get_rider_history(1, Discipline::Enduro).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_previous_positions_use_latest_earlier_snapshot() {
    init_test_env();
    let test_db = TestDatabase::seeded().await.expect("Failed to create test database");
    let mut client = test_db.db_client().await.expect("Failed to connect");

    let mut january = snapshot_row(1, 5, 1.0);
    january.snapshot_date = ymd(2025, 1, 1);
    let mut february = snapshot_row(1, 3, 2.0);
    february.snapshot_date = ymd(2025, 2, 1);

    client
        .replace_snapshot(Discipline::Enduro, ymd(2025, 1, 1), &[january], &[])
        .await
        .unwrap();
    client
        .replace_snapshot(Discipline::Enduro, ymd(2025, 2, 1), &[february], &[])
        .await
        .unwrap();

    let before_march = client
        .get_previous_positions(Discipline::Enduro, ymd(2025, 3, 1))
        .await
        .unwrap();
    let before_february = client
        .get_previous_positions(Discipline::Enduro, ymd(2025, 2, 1))
        .await
        .unwrap();
    let other_discipline = client
        .get_previous_positions(Discipline::Dh, ymd(2025, 3, 1))
        .await
        .unwrap();

    assert_eq!(before_march.get(&1), Some(&3));
    assert_eq!(before_february.get(&1), Some(&5));
    assert!(other_discipline.is_empty());
}
