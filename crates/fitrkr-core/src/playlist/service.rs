//! Playlist composition service.
//!
//! Owns the transaction boundary: each public operation begins one
//! transaction, authorizes against freshly loaded rows, runs its store calls
//! and commits. Tag links are non-essential and are written afterwards in
//! their own transaction; a failure there is logged and does not fail the
//! operation.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use fitrkr_db::models::{Block, BlockType, Playlist, Tag};

use super::access;
use super::error::{PlaylistError, PlaylistResult};
use super::requests::{
    CreatePlaylistRequest, UpdatePlaylistRequest, validate_tag_name, validate_title,
};
use super::store::{
    Backend, BlockStore, ConfigStore, NewBlock, NewPlaylist, PlaylistChanges, PlaylistStore,
    StoreResult, StoreTransaction,
};

/// Name of the block every playlist starts with.
pub const DEFAULT_BLOCK_NAME: &str = "Playlist";
/// Name of a block created by adding an exercise without a target block.
pub const IMPLICIT_BLOCK_NAME: &str = "New Block";
pub const DEFAULT_REST_AFTER_BLOCK_SECONDS: i32 = 60;

/// A playlist with its tags and blocks in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistView {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub tags: Vec<Tag>,
    pub blocks: Vec<Block>,
}

/// One row of a user's playlist listing.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistSummary {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub tags: Vec<Tag>,
    pub total_blocks: i64,
    pub total_exercises: i64,
}

pub struct PlaylistService<B> {
    backend: B,
}

impl<B: Backend> PlaylistService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) async fn begin(&self) -> PlaylistResult<B::Tx> {
        Ok(self.backend.begin().await?)
    }

    // -----------------------------------------------------------------------
    // Playlist lifecycle
    // -----------------------------------------------------------------------

    /// Create a playlist with its default block.
    ///
    /// A duplicate title for the same owner fails with
    /// [`PlaylistError::AlreadyExists`]. Requested tags are attached on a
    /// best-effort basis after the playlist commits.
    pub async fn create_playlist(
        &self,
        owner: Uuid,
        req: &CreatePlaylistRequest,
    ) -> PlaylistResult<PlaylistView> {
        let title = validate_title(&req.title)?;

        let mut tx = self.begin().await?;
        let playlist = tx
            .insert_playlist(&NewPlaylist {
                user_id: owner,
                title: &title,
                description: req.description.as_deref(),
                visibility: req.visibility.unwrap_or_default(),
            })
            .await?;
        let block = tx
            .insert_block(&NewBlock {
                playlist_id: playlist.id,
                name: DEFAULT_BLOCK_NAME,
                block_type: BlockType::Playlist,
                block_order: 1,
                rest_after_block_seconds: DEFAULT_REST_AFTER_BLOCK_SECONDS,
            })
            .await?;
        tx.commit().await?;

        info!(playlist_id = playlist.id, user_id = %owner, "playlist created");

        let tags = if req.tag_ids.is_empty() {
            Vec::new()
        } else {
            self.apply_tags(playlist.id, &req.tag_ids, false).await
        };

        Ok(PlaylistView {
            playlist,
            tags,
            blocks: vec![block],
        })
    }

    /// Fetch a playlist the caller may read, with its tags and blocks.
    pub async fn get_playlist(&self, playlist_id: i64, caller: Uuid) -> PlaylistResult<PlaylistView> {
        // Read-only: the transaction is dropped, not committed.
        let mut tx = self.begin().await?;
        let playlist = access::readable_playlist(&mut tx, playlist_id, caller).await?;
        let blocks = tx.list_blocks(playlist_id).await?;
        let tags = tags_or_empty(&mut tx, playlist_id).await;

        Ok(PlaylistView {
            playlist,
            tags,
            blocks,
        })
    }

    /// The caller's playlists, most recently updated first.
    pub async fn list_user_playlists(&self, caller: Uuid) -> PlaylistResult<Vec<PlaylistSummary>> {
        let mut tx = self.begin().await?;
        let playlists = tx.list_playlists_for_user(caller).await?;

        let mut counted = Vec::with_capacity(playlists.len());
        for playlist in playlists {
            let (total_blocks, total_exercises) = tx.count_contents(playlist.id).await?;
            counted.push((playlist, total_blocks, total_exercises));
        }

        let mut summaries = Vec::with_capacity(counted.len());
        for (playlist, total_blocks, total_exercises) in counted {
            let tags = tags_or_empty(&mut tx, playlist.id).await;
            summaries.push(PlaylistSummary {
                playlist,
                tags,
                total_blocks,
                total_exercises,
            });
        }
        Ok(summaries)
    }

    /// Apply the fields present in `req`. Only the owner may update.
    pub async fn update_playlist(
        &self,
        playlist_id: i64,
        caller: Uuid,
        req: &UpdatePlaylistRequest,
    ) -> PlaylistResult<PlaylistView> {
        let title = req.title.as_deref().map(validate_title).transpose()?;

        let mut tx = self.begin().await?;
        access::owned_playlist(&mut tx, playlist_id, caller).await?;
        let playlist = tx
            .update_playlist(
                playlist_id,
                &PlaylistChanges {
                    title: title.as_deref(),
                    description: req.description.as_deref(),
                    visibility: req.visibility,
                },
            )
            .await?
            .ok_or(PlaylistError::PlaylistNotFound(playlist_id))?;
        let blocks = tx.list_blocks(playlist_id).await?;
        tx.commit().await?;

        info!(playlist_id, "playlist updated");

        let tags = match &req.tag_ids {
            Some(tag_ids) => self.apply_tags(playlist_id, tag_ids, true).await,
            None => self.load_tags(playlist_id).await,
        };

        Ok(PlaylistView {
            playlist,
            tags,
            blocks,
        })
    }

    /// Delete a playlist with its blocks, entries, configs and tag links.
    pub async fn delete_playlist(&self, playlist_id: i64, caller: Uuid) -> PlaylistResult<()> {
        let mut tx = self.begin().await?;
        access::owned_playlist(&mut tx, playlist_id, caller).await?;
        let configs = tx.delete_configs_for_playlist(playlist_id).await?;
        tx.delete_playlist(playlist_id).await?;
        tx.commit().await?;

        info!(playlist_id, configs, "playlist deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    pub async fn list_tags(&self) -> PlaylistResult<Vec<Tag>> {
        let mut tx = self.begin().await?;
        Ok(tx.list_tags().await?)
    }

    /// Create a tag. Names are unique.
    pub async fn create_tag(&self, name: &str) -> PlaylistResult<Tag> {
        let name = validate_tag_name(name)?;

        let mut tx = self.begin().await?;
        let tag = tx.insert_tag(&name).await?;
        tx.commit().await?;

        info!(tag_id = tag.id, name = %tag.name, "tag created");
        Ok(tag)
    }

    /// Attach (or with `replace`, swap in) tags in a transaction of their
    /// own. Returns the playlist's tags afterwards, or whatever can still be
    /// read if the write failed.
    async fn apply_tags(&self, playlist_id: i64, tag_ids: &[i64], replace: bool) -> Vec<Tag> {
        match self.try_apply_tags(playlist_id, tag_ids, replace).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!(playlist_id, error = %e, "failed to apply playlist tags");
                self.load_tags(playlist_id).await
            }
        }
    }

    async fn try_apply_tags(
        &self,
        playlist_id: i64,
        tag_ids: &[i64],
        replace: bool,
    ) -> StoreResult<Vec<Tag>> {
        let mut tx = self.backend.begin().await?;
        if replace {
            tx.clear_tags(playlist_id).await?;
        }
        tx.attach_tags(playlist_id, tag_ids).await?;
        let tags = tx.tags_for_playlist(playlist_id).await?;
        tx.commit().await?;
        Ok(tags)
    }

    /// Best-effort read of a playlist's tags in a fresh transaction.
    async fn load_tags(&self, playlist_id: i64) -> Vec<Tag> {
        match self.backend.begin().await {
            Ok(mut tx) => tags_or_empty(&mut tx, playlist_id).await,
            Err(e) => {
                warn!(playlist_id, error = %e, "failed to load playlist tags");
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    /// Delete configs no entry references. Not scoped to a caller.
    pub async fn sweep_orphaned_configs(&self) -> PlaylistResult<u64> {
        let mut tx = self.begin().await?;
        let removed = tx.delete_orphaned_configs().await?;
        tx.commit().await?;

        if removed > 0 {
            warn!(removed, "swept orphaned exercise configs");
        } else {
            info!("no orphaned exercise configs");
        }
        Ok(removed)
    }
}

/// Tag enrichment for reads. Run after the essential reads: a failure is
/// logged and swallowed but may leave the transaction unusable.
pub(crate) async fn tags_or_empty<S: PlaylistStore>(store: &mut S, playlist_id: i64) -> Vec<Tag> {
    match store.tags_for_playlist(playlist_id).await {
        Ok(tags) => tags,
        Err(e) => {
            warn!(playlist_id, error = %e, "failed to load playlist tags");
            Vec::new()
        }
    }
}
