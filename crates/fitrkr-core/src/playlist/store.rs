//! Persistence seams for the composition service.
//!
//! Each operation opens one transaction through [`Backend::begin`], drives
//! the four stores through it, and commits. Dropping a transaction without
//! committing rolls it back.

use async_trait::async_trait;
use uuid::Uuid;

pub use fitrkr_db::error::{StoreError, StoreResult};
use fitrkr_db::models::{
    Block, BlockType, ConfigParams, ExerciseConfig, Playlist, PlaylistExercise, Tag,
};
pub use fitrkr_db::queries::blocks::NewBlock;
pub use fitrkr_db::queries::playlist_exercises::NewEntry;
pub use fitrkr_db::queries::playlists::{NewPlaylist, PlaylistChanges};

/// Playlist root records and their tag links.
#[async_trait]
pub trait PlaylistStore: Send {
    async fn insert_playlist(&mut self, new: &NewPlaylist<'_>) -> StoreResult<Playlist>;
    async fn get_playlist(&mut self, id: i64) -> StoreResult<Option<Playlist>>;
    async fn list_playlists_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Playlist>>;
    async fn update_playlist(
        &mut self,
        id: i64,
        changes: &PlaylistChanges<'_>,
    ) -> StoreResult<Option<Playlist>>;
    async fn touch_playlist(&mut self, id: i64) -> StoreResult<()>;
    async fn delete_playlist(&mut self, id: i64) -> StoreResult<()>;
    /// `(blocks, entries)` in the playlist.
    async fn count_contents(&mut self, id: i64) -> StoreResult<(i64, i64)>;

    async fn insert_tag(&mut self, name: &str) -> StoreResult<Tag>;
    async fn list_tags(&mut self) -> StoreResult<Vec<Tag>>;
    async fn tags_for_playlist(&mut self, playlist_id: i64) -> StoreResult<Vec<Tag>>;
    async fn attach_tags(&mut self, playlist_id: i64, tag_ids: &[i64]) -> StoreResult<u64>;
    async fn clear_tags(&mut self, playlist_id: i64) -> StoreResult<u64>;
}

/// Ordered blocks within a playlist.
#[async_trait]
pub trait BlockStore: Send {
    async fn insert_block(&mut self, new: &NewBlock<'_>) -> StoreResult<Block>;
    async fn get_block(&mut self, id: i64) -> StoreResult<Option<Block>>;
    async fn list_blocks(&mut self, playlist_id: i64) -> StoreResult<Vec<Block>>;
    async fn count_blocks(&mut self, playlist_id: i64) -> StoreResult<i64>;
    async fn update_block(
        &mut self,
        id: i64,
        name: &str,
        block_type: BlockType,
        rest_after_block_seconds: i32,
    ) -> StoreResult<Option<Block>>;
    async fn set_block_order(&mut self, playlist_id: i64, id: i64, order: i32) -> StoreResult<()>;
    /// Shift blocks at or after `from_order` by `delta`.
    async fn shift_blocks(&mut self, playlist_id: i64, from_order: i32, delta: i32)
    -> StoreResult<u64>;
    /// Entries of the block go with it.
    async fn delete_block(&mut self, id: i64) -> StoreResult<()>;
}

/// Exercise entries, ordered within their block.
#[async_trait]
pub trait EntryStore: Send {
    async fn insert_entry(&mut self, new: &NewEntry) -> StoreResult<PlaylistExercise>;
    async fn get_entry(&mut self, id: i64) -> StoreResult<Option<PlaylistExercise>>;
    async fn list_entries(&mut self, block_id: i64) -> StoreResult<Vec<PlaylistExercise>>;
    async fn count_entries(&mut self, block_id: i64) -> StoreResult<i64>;
    async fn set_entry_position(&mut self, id: i64, block_id: i64, order: i32) -> StoreResult<()>;
    /// Shift entries at or after `from_order` by `delta`.
    async fn shift_entries(&mut self, block_id: i64, from_order: i32, delta: i32)
    -> StoreResult<u64>;
    async fn delete_entry(&mut self, id: i64) -> StoreResult<()>;
}

/// Exercise parameter records. Deleting a config releases its entry.
#[async_trait]
pub trait ConfigStore: Send {
    async fn insert_config(&mut self, params: &ConfigParams) -> StoreResult<ExerciseConfig>;
    async fn get_config(&mut self, id: i64) -> StoreResult<Option<ExerciseConfig>>;
    /// One round trip for many IDs. Unknown IDs are skipped.
    async fn get_configs(&mut self, ids: &[i64]) -> StoreResult<Vec<ExerciseConfig>>;
    async fn update_config(
        &mut self,
        id: i64,
        params: &ConfigParams,
    ) -> StoreResult<Option<ExerciseConfig>>;
    async fn delete_config(&mut self, id: i64) -> StoreResult<u64>;
    async fn delete_configs_for_block(&mut self, block_id: i64) -> StoreResult<u64>;
    async fn delete_configs_for_playlist(&mut self, playlist_id: i64) -> StoreResult<u64>;
    async fn delete_orphaned_configs(&mut self) -> StoreResult<u64>;
}

/// All four stores behind one handle.
pub trait Stores: PlaylistStore + BlockStore + EntryStore + ConfigStore {}

impl<T> Stores for T where T: PlaylistStore + BlockStore + EntryStore + ConfigStore {}

/// A unit of work that can be made durable.
#[async_trait]
pub trait StoreTransaction: Send + Sized {
    async fn commit(self) -> StoreResult<()>;
}

/// Source of transactions.
#[async_trait]
pub trait Backend: Send + Sync {
    type Tx: Stores + StoreTransaction;

    async fn begin(&self) -> StoreResult<Self::Tx>;
}
