//! Ownership checks. Every call re-reads the chain from the store.

use uuid::Uuid;

use fitrkr_db::models::{Block, Playlist, PlaylistExercise};

use super::error::{PlaylistError, PlaylistResult};
use super::store::{BlockStore, EntryStore, PlaylistStore};

pub fn is_owner(playlist: &Playlist, caller: Uuid) -> bool {
    playlist.user_id == caller
}

/// Owners read everything; others read public and unlisted playlists.
pub fn can_read(playlist: &Playlist, caller: Uuid) -> bool {
    is_owner(playlist, caller) || playlist.visibility.is_shared()
}

/// Load a playlist the caller owns.
pub(crate) async fn owned_playlist<S>(
    store: &mut S,
    playlist_id: i64,
    caller: Uuid,
) -> PlaylistResult<Playlist>
where
    S: PlaylistStore,
{
    let playlist = store
        .get_playlist(playlist_id)
        .await?
        .ok_or(PlaylistError::PlaylistNotFound(playlist_id))?;

    if !is_owner(&playlist, caller) {
        return Err(PlaylistError::Unauthorized(playlist_id));
    }
    Ok(playlist)
}

/// Load a playlist the caller may read.
pub(crate) async fn readable_playlist<S>(
    store: &mut S,
    playlist_id: i64,
    caller: Uuid,
) -> PlaylistResult<Playlist>
where
    S: PlaylistStore,
{
    let playlist = store
        .get_playlist(playlist_id)
        .await?
        .ok_or(PlaylistError::PlaylistNotFound(playlist_id))?;

    if !can_read(&playlist, caller) {
        return Err(PlaylistError::Unauthorized(playlist_id));
    }
    Ok(playlist)
}

/// Load a block and the playlist it belongs to, which the caller must own.
pub(crate) async fn owned_block<S>(
    store: &mut S,
    block_id: i64,
    caller: Uuid,
) -> PlaylistResult<(Playlist, Block)>
where
    S: PlaylistStore + BlockStore,
{
    let block = store
        .get_block(block_id)
        .await?
        .ok_or(PlaylistError::BlockNotFound(block_id))?;
    let playlist = owned_playlist(store, block.playlist_id, caller).await?;
    Ok((playlist, block))
}

/// Load an entry and the playlist it belongs to, which the caller must own.
pub(crate) async fn owned_entry<S>(
    store: &mut S,
    entry_id: i64,
    caller: Uuid,
) -> PlaylistResult<(Playlist, PlaylistExercise)>
where
    S: PlaylistStore + EntryStore,
{
    let entry = store
        .get_entry(entry_id)
        .await?
        .ok_or(PlaylistError::EntryNotFound(entry_id))?;
    let playlist = owned_playlist(store, entry.playlist_id, caller).await?;
    Ok((playlist, entry))
}

/// Load a block that must belong to `playlist_id`.
pub(crate) async fn block_in_playlist<S>(
    store: &mut S,
    playlist_id: i64,
    block_id: i64,
) -> PlaylistResult<Block>
where
    S: BlockStore,
{
    store
        .get_block(block_id)
        .await?
        .filter(|b| b.playlist_id == playlist_id)
        .ok_or(PlaylistError::BlockNotFound(block_id))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fitrkr_db::models::Visibility;

    use super::*;

    fn playlist(owner: Uuid, visibility: Visibility) -> Playlist {
        Playlist {
            id: 1,
            user_id: owner,
            title: "Push Day".into(),
            description: None,
            is_active: false,
            last_worked: false,
            visibility,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn private_readable_only_by_owner() {
        let owner = Uuid::new_v4();
        let p = playlist(owner, Visibility::Private);
        assert!(can_read(&p, owner));
        assert!(!can_read(&p, Uuid::new_v4()));
    }

    #[test]
    fn shared_readable_but_not_owned() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        for vis in [Visibility::Public, Visibility::Unlisted] {
            let p = playlist(owner, vis);
            assert!(can_read(&p, stranger));
            assert!(!is_owner(&p, stranger));
        }
    }
}
