//! Database query functions for the `playlist_exercises` table.
//!
//! Entry rows are always returned joined with the catalog name of the
//! exercise.

use anyhow::{Context, Result};
use sqlx::PgConnection;

use crate::models::PlaylistExercise;

const SELECT_ENTRY: &str = "SELECT pe.id, pe.playlist_id, pe.exercise_id, e.name AS exercise_name, \
         pe.block_id, pe.config_id, pe.exercise_order, pe.created_at, pe.updated_at \
     FROM playlist_exercises pe \
     JOIN exercises e ON e.id = pe.exercise_id";

/// Parameters for inserting a new entry.
#[derive(Debug, Clone, Copy)]
pub struct NewEntry {
    pub playlist_id: i64,
    pub exercise_id: i64,
    pub block_id: i64,
    pub config_id: i64,
    pub exercise_order: i32,
}

/// Insert a new entry. An unknown exercise violates
/// `playlist_exercises_exercise_id_fkey`.
pub async fn insert_entry(conn: &mut PgConnection, new: &NewEntry) -> Result<PlaylistExercise> {
    let entry = sqlx::query_as::<_, PlaylistExercise>(
        "WITH inserted AS ( \
             INSERT INTO playlist_exercises \
                 (playlist_id, exercise_id, block_id, config_id, exercise_order) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING * \
         ) \
         SELECT i.id, i.playlist_id, i.exercise_id, e.name AS exercise_name, \
                i.block_id, i.config_id, i.exercise_order, i.created_at, i.updated_at \
         FROM inserted i \
         JOIN exercises e ON e.id = i.exercise_id",
    )
    .bind(new.playlist_id)
    .bind(new.exercise_id)
    .bind(new.block_id)
    .bind(new.config_id)
    .bind(new.exercise_order)
    .fetch_one(&mut *conn)
    .await
    .context("failed to insert playlist exercise")?;

    Ok(entry)
}

/// Fetch an entry by its ID.
pub async fn get_entry(conn: &mut PgConnection, id: i64) -> Result<Option<PlaylistExercise>> {
    let query = format!("{SELECT_ENTRY} WHERE pe.id = $1");
    let entry = sqlx::query_as::<_, PlaylistExercise>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("failed to fetch playlist exercise")?;

    Ok(entry)
}

/// List the entries of a block in execution order.
pub async fn list_entries(conn: &mut PgConnection, block_id: i64) -> Result<Vec<PlaylistExercise>> {
    let query = format!("{SELECT_ENTRY} WHERE pe.block_id = $1 ORDER BY pe.exercise_order");
    let entries = sqlx::query_as::<_, PlaylistExercise>(&query)
        .bind(block_id)
        .fetch_all(&mut *conn)
        .await
        .context("failed to list playlist exercises")?;

    Ok(entries)
}

/// Count the entries of a block.
pub async fn count_entries(conn: &mut PgConnection, block_id: i64) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM playlist_exercises WHERE block_id = $1")
            .bind(block_id)
            .fetch_one(&mut *conn)
            .await
            .context("failed to count playlist exercises")?;

    Ok(count)
}

/// Place an entry at `exercise_order` within `block_id`.
pub async fn set_entry_position(
    conn: &mut PgConnection,
    id: i64,
    block_id: i64,
    exercise_order: i32,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE playlist_exercises \
         SET block_id = $2, exercise_order = $3, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(block_id)
    .bind(exercise_order)
    .execute(&mut *conn)
    .await
    .context("failed to set playlist exercise position")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("playlist exercise {id} not found");
    }

    Ok(())
}

/// Shift every entry of a block at or after `from_order` by `delta`.
pub async fn shift_entries(
    conn: &mut PgConnection,
    block_id: i64,
    from_order: i32,
    delta: i32,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE playlist_exercises SET exercise_order = exercise_order + $3 \
         WHERE block_id = $1 AND exercise_order >= $2",
    )
    .bind(block_id)
    .bind(from_order)
    .bind(delta)
    .execute(&mut *conn)
    .await
    .context("failed to shift playlist exercises")?;

    Ok(result.rows_affected())
}

/// Delete an entry. Its config is not touched.
pub async fn delete_entry(conn: &mut PgConnection, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM playlist_exercises WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .context("failed to delete playlist exercise")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("playlist exercise {id} not found");
    }

    Ok(())
}
