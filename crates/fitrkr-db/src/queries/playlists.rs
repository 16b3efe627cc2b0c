//! Database query functions for the `playlists` table.

use anyhow::{Context, Result};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{Playlist, Visibility};

/// Parameters for inserting a new playlist.
#[derive(Debug, Clone)]
pub struct NewPlaylist<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub visibility: Visibility,
}

/// Fields of a partial playlist update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct PlaylistChanges<'a> {
    pub title: Option<&'a str>,
    /// `Some("")` clears the description.
    pub description: Option<&'a str>,
    pub visibility: Option<Visibility>,
}

/// Insert a new playlist row.
pub async fn insert_playlist(conn: &mut PgConnection, new: &NewPlaylist<'_>) -> Result<Playlist> {
    let playlist = sqlx::query_as::<_, Playlist>(
        "INSERT INTO playlists (user_id, title, description, visibility) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(new.user_id)
    .bind(new.title)
    .bind(new.description)
    .bind(new.visibility)
    .fetch_one(&mut *conn)
    .await
    .context("failed to insert playlist")?;

    Ok(playlist)
}

/// Fetch a playlist by its ID.
pub async fn get_playlist(conn: &mut PgConnection, id: i64) -> Result<Option<Playlist>> {
    let playlist = sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("failed to fetch playlist")?;

    Ok(playlist)
}

/// List a user's playlists, most recently updated first.
pub async fn list_playlists_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<Playlist>> {
    let playlists = sqlx::query_as::<_, Playlist>(
        "SELECT * FROM playlists WHERE user_id = $1 ORDER BY updated_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .context("failed to list playlists")?;

    Ok(playlists)
}

/// Apply a partial update and bump `updated_at`.
///
/// Returns `None` when no playlist has this ID.
pub async fn update_playlist(
    conn: &mut PgConnection,
    id: i64,
    changes: &PlaylistChanges<'_>,
) -> Result<Option<Playlist>> {
    let playlist = sqlx::query_as::<_, Playlist>(
        "UPDATE playlists \
         SET title = COALESCE($2, title), \
             description = CASE WHEN $3::text IS NULL THEN description \
                                ELSE NULLIF($3, '') END, \
             visibility = COALESCE($4, visibility), \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.visibility)
    .fetch_optional(&mut *conn)
    .await
    .context("failed to update playlist")?;

    Ok(playlist)
}

/// Bump `updated_at` after a change to the playlist's contents.
pub async fn touch_playlist(conn: &mut PgConnection, id: i64) -> Result<()> {
    sqlx::query("UPDATE playlists SET updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .context("failed to touch playlist")?;

    Ok(())
}

/// Delete a playlist. Blocks, entries and tag links cascade.
pub async fn delete_playlist(conn: &mut PgConnection, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .context("failed to delete playlist")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("playlist {id} not found");
    }

    Ok(())
}

/// Number of blocks and exercise entries in a playlist.
pub async fn count_contents(conn: &mut PgConnection, id: i64) -> Result<(i64, i64)> {
    let counts: (i64, i64) = sqlx::query_as(
        "SELECT \
             (SELECT COUNT(*) FROM exercise_blocks WHERE playlist_id = $1), \
             (SELECT COUNT(*) FROM playlist_exercises WHERE playlist_id = $1)",
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await
    .context("failed to count playlist contents")?;

    Ok(counts)
}
