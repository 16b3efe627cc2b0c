//! Integration tests for the embedded migrations and schema constraints.
//!
//! Each test creates a unique temporary database via `fitrkr-test-utils`,
//! runs migrations, and drops it on completion.

use sqlx::Row;

use fitrkr_db::pool;
use fitrkr_test_utils::{create_test_db, drop_test_db};

#[tokio::test]
async fn migrations_create_all_tables() {
    let (pool, db_name) = create_test_db().await;

    let rows = sqlx::query(
        "SELECT table_name::text AS table_name FROM information_schema.tables \
         WHERE table_schema = 'public' AND table_name <> '_sqlx_migrations' \
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .expect("should list tables");
    let tables: Vec<String> = rows.iter().map(|r| r.get("table_name")).collect();

    assert_eq!(
        tables,
        vec![
            "exercise_blocks",
            "exercise_configs",
            "exercises",
            "playlist_exercises",
            "playlist_tags",
            "playlists",
            "tags",
        ]
    );

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let (pool, db_name) = create_test_db().await;

    pool::run_migrations(&pool)
        .await
        .expect("second run should be a no-op");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn table_counts_start_at_zero() {
    let (pool, db_name) = create_test_db().await;

    let counts = pool::table_counts(&pool).await.expect("should count");
    assert_eq!(counts.len(), 7);
    assert!(counts.iter().all(|(_, n)| *n == 0));
    assert_eq!(counts[0].0, "exercises");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn order_constraints_are_deferred() {
    let (pool, db_name) = create_test_db().await;

    let rows = sqlx::query(
        "SELECT conname, condeferrable, condeferred FROM pg_constraint \
         WHERE conname IN ('exercise_blocks_playlist_order_key', \
                           'playlist_exercises_block_order_key') \
         ORDER BY conname",
    )
    .fetch_all(&pool)
    .await
    .expect("should read constraints");

    assert_eq!(rows.len(), 2);
    for row in rows {
        assert!(row.get::<bool, _>("condeferrable"));
        assert!(row.get::<bool, _>("condeferred"));
    }

    pool.close().await;
    drop_test_db(&db_name).await;
}
