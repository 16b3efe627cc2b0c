//! Database query functions for the `exercise_blocks` table.

use anyhow::{Context, Result};
use sqlx::PgConnection;

use crate::models::{Block, BlockType};

/// Parameters for inserting a new block.
#[derive(Debug, Clone)]
pub struct NewBlock<'a> {
    pub playlist_id: i64,
    pub name: &'a str,
    pub block_type: BlockType,
    pub block_order: i32,
    pub rest_after_block_seconds: i32,
}

/// Insert a new block.
pub async fn insert_block(conn: &mut PgConnection, new: &NewBlock<'_>) -> Result<Block> {
    let block = sqlx::query_as::<_, Block>(
        "INSERT INTO exercise_blocks \
             (playlist_id, name, block_type, block_order, rest_after_block_seconds) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.playlist_id)
    .bind(new.name)
    .bind(new.block_type)
    .bind(new.block_order)
    .bind(new.rest_after_block_seconds)
    .fetch_one(&mut *conn)
    .await
    .context("failed to insert block")?;

    Ok(block)
}

/// Fetch a block by its ID.
pub async fn get_block(conn: &mut PgConnection, id: i64) -> Result<Option<Block>> {
    let block = sqlx::query_as::<_, Block>("SELECT * FROM exercise_blocks WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("failed to fetch block")?;

    Ok(block)
}

/// List the blocks of a playlist in execution order.
pub async fn list_blocks(conn: &mut PgConnection, playlist_id: i64) -> Result<Vec<Block>> {
    let blocks = sqlx::query_as::<_, Block>(
        "SELECT * FROM exercise_blocks WHERE playlist_id = $1 ORDER BY block_order",
    )
    .bind(playlist_id)
    .fetch_all(&mut *conn)
    .await
    .context("failed to list blocks")?;

    Ok(blocks)
}

/// Count the blocks of a playlist.
pub async fn count_blocks(conn: &mut PgConnection, playlist_id: i64) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM exercise_blocks WHERE playlist_id = $1")
            .bind(playlist_id)
            .fetch_one(&mut *conn)
            .await
            .context("failed to count blocks")?;

    Ok(count)
}

/// Overwrite a block's name, type and rest period.
pub async fn update_block(
    conn: &mut PgConnection,
    id: i64,
    name: &str,
    block_type: BlockType,
    rest_after_block_seconds: i32,
) -> Result<Option<Block>> {
    let block = sqlx::query_as::<_, Block>(
        "UPDATE exercise_blocks \
         SET name = $2, block_type = $3, rest_after_block_seconds = $4 \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(block_type)
    .bind(rest_after_block_seconds)
    .fetch_optional(&mut *conn)
    .await
    .context("failed to update block")?;

    Ok(block)
}

/// Set one block's order index, scoped to its playlist.
pub async fn set_block_order(
    conn: &mut PgConnection,
    playlist_id: i64,
    id: i64,
    block_order: i32,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE exercise_blocks SET block_order = $3 WHERE id = $2 AND playlist_id = $1",
    )
    .bind(playlist_id)
    .bind(id)
    .bind(block_order)
    .execute(&mut *conn)
    .await
    .context("failed to set block order")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("block {id} not found in playlist {playlist_id}");
    }

    Ok(())
}

/// Shift every block at or after `from_order` by `delta`.
pub async fn shift_blocks(
    conn: &mut PgConnection,
    playlist_id: i64,
    from_order: i32,
    delta: i32,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE exercise_blocks SET block_order = block_order + $3 \
         WHERE playlist_id = $1 AND block_order >= $2",
    )
    .bind(playlist_id)
    .bind(from_order)
    .bind(delta)
    .execute(&mut *conn)
    .await
    .context("failed to shift blocks")?;

    Ok(result.rows_affected())
}

/// Delete a block. Its entries cascade; their configs do not.
pub async fn delete_block(conn: &mut PgConnection, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM exercise_blocks WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .context("failed to delete block")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("block {id} not found");
    }

    Ok(())
}
