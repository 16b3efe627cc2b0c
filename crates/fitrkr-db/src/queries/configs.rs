//! Database query functions for the `exercise_configs` table.

use anyhow::{Context, Result};
use sqlx::PgConnection;

use crate::models::{ConfigParams, ExerciseConfig};

/// Insert a config from caller-supplied parameters.
pub async fn insert_config(conn: &mut PgConnection, params: &ConfigParams) -> Result<ExerciseConfig> {
    let config = sqlx::query_as::<_, ExerciseConfig>(
        "INSERT INTO exercise_configs \
             (sets, reps_min, reps_max, weight, rest_seconds, tempo, duration_seconds, \
              distance, target_pace, target_heart_rate, incline, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING *",
    )
    .bind(params.sets)
    .bind(params.reps_min)
    .bind(params.reps_max)
    .bind(params.weight)
    .bind(params.rest_seconds_or_default())
    .bind(&params.tempo)
    .bind(params.duration_seconds)
    .bind(params.distance)
    .bind(params.target_pace)
    .bind(params.target_heart_rate)
    .bind(params.incline)
    .bind(params.notes.as_deref())
    .fetch_one(&mut *conn)
    .await
    .context("failed to insert exercise config")?;

    Ok(config)
}

/// Fetch a config by its ID.
pub async fn get_config(conn: &mut PgConnection, id: i64) -> Result<Option<ExerciseConfig>> {
    let config = sqlx::query_as::<_, ExerciseConfig>("SELECT * FROM exercise_configs WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("failed to fetch exercise config")?;

    Ok(config)
}

/// Fetch many configs in one round trip. Missing IDs are simply absent from
/// the result; order is unspecified.
pub async fn get_configs(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<ExerciseConfig>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let configs =
        sqlx::query_as::<_, ExerciseConfig>("SELECT * FROM exercise_configs WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
            .context("failed to batch fetch exercise configs")?;

    Ok(configs)
}

/// Overwrite every parameter of a config. The ID is preserved.
///
/// Returns `None` when no config has this ID.
pub async fn update_config(
    conn: &mut PgConnection,
    id: i64,
    params: &ConfigParams,
) -> Result<Option<ExerciseConfig>> {
    let config = sqlx::query_as::<_, ExerciseConfig>(
        "UPDATE exercise_configs \
         SET sets = $2, reps_min = $3, reps_max = $4, weight = $5, rest_seconds = $6, \
             tempo = $7, duration_seconds = $8, distance = $9, target_pace = $10, \
             target_heart_rate = $11, incline = $12, notes = $13, updated_at = now() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(params.sets)
    .bind(params.reps_min)
    .bind(params.reps_max)
    .bind(params.weight)
    .bind(params.rest_seconds_or_default())
    .bind(&params.tempo)
    .bind(params.duration_seconds)
    .bind(params.distance)
    .bind(params.target_pace)
    .bind(params.target_heart_rate)
    .bind(params.incline)
    .bind(params.notes.as_deref())
    .fetch_optional(&mut *conn)
    .await
    .context("failed to update exercise config")?;

    Ok(config)
}

/// Delete a config. The entry that owns it cascades.
pub async fn delete_config(conn: &mut PgConnection, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM exercise_configs WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .context("failed to delete exercise config")?;

    Ok(result.rows_affected())
}

/// Delete the configs of every entry in a block.
pub async fn delete_configs_for_block(conn: &mut PgConnection, block_id: i64) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM exercise_configs \
         WHERE id IN (SELECT config_id FROM playlist_exercises WHERE block_id = $1)",
    )
    .bind(block_id)
    .execute(&mut *conn)
    .await
    .context("failed to delete block configs")?;

    Ok(result.rows_affected())
}

/// Delete the configs of every entry in a playlist.
pub async fn delete_configs_for_playlist(conn: &mut PgConnection, playlist_id: i64) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM exercise_configs \
         WHERE id IN (SELECT config_id FROM playlist_exercises WHERE playlist_id = $1)",
    )
    .bind(playlist_id)
    .execute(&mut *conn)
    .await
    .context("failed to delete playlist configs")?;

    Ok(result.rows_affected())
}

/// Delete configs that no entry references.
pub async fn delete_orphaned_configs(conn: &mut PgConnection) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM exercise_configs c \
         WHERE NOT EXISTS (SELECT 1 FROM playlist_exercises pe WHERE pe.config_id = c.id)",
    )
    .execute(&mut *conn)
    .await
    .context("failed to sweep orphaned configs")?;

    Ok(result.rows_affected())
}
