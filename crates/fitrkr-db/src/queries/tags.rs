//! Database query functions for the `tags` and `playlist_tags` tables.

use anyhow::{Context, Result};
use sqlx::PgConnection;

use crate::models::Tag;

/// Insert a new tag. Names are unique (`tags_name_key`).
pub async fn insert_tag(conn: &mut PgConnection, name: &str) -> Result<Tag> {
    let tag = sqlx::query_as::<_, Tag>("INSERT INTO tags (name) VALUES ($1) RETURNING *")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .context("failed to insert tag")?;

    Ok(tag)
}

/// List all tags by name.
pub async fn list_tags(conn: &mut PgConnection) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
        .fetch_all(&mut *conn)
        .await
        .context("failed to list tags")?;

    Ok(tags)
}

/// Tags attached to a playlist, by name.
pub async fn tags_for_playlist(conn: &mut PgConnection, playlist_id: i64) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        "SELECT t.* FROM tags t \
         JOIN playlist_tags pt ON pt.tag_id = t.id \
         WHERE pt.playlist_id = $1 \
         ORDER BY t.name",
    )
    .bind(playlist_id)
    .fetch_all(&mut *conn)
    .await
    .context("failed to fetch playlist tags")?;

    Ok(tags)
}

/// Link tags to a playlist. Already-linked tags are skipped.
///
/// Returns the number of new links.
pub async fn attach_tags(
    conn: &mut PgConnection,
    playlist_id: i64,
    tag_ids: &[i64],
) -> Result<u64> {
    if tag_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        "INSERT INTO playlist_tags (playlist_id, tag_id) \
         SELECT $1, unnest($2::bigint[]) \
         ON CONFLICT DO NOTHING",
    )
    .bind(playlist_id)
    .bind(tag_ids)
    .execute(&mut *conn)
    .await
    .context("failed to attach tags")?;

    Ok(result.rows_affected())
}

/// Remove every tag link from a playlist.
pub async fn clear_tags(conn: &mut PgConnection, playlist_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM playlist_tags WHERE playlist_id = $1")
        .bind(playlist_id)
        .execute(&mut *conn)
        .await
        .context("failed to clear playlist tags")?;

    Ok(result.rows_affected())
}
