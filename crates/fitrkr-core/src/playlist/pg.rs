//! PostgreSQL implementation of the store traits.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use fitrkr_db::models::{
    Block, BlockType, ConfigParams, ExerciseConfig, Playlist, PlaylistExercise, Tag,
};
use fitrkr_db::queries::{blocks, configs, playlist_exercises, playlists, tags};

use super::store::{
    Backend, BlockStore, ConfigStore, EntryStore, NewBlock, NewEntry, NewPlaylist,
    PlaylistChanges, PlaylistStore, StoreError, StoreResult, StoreTransaction,
};

/// Hands out transactions on a connection pool.
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// An open PostgreSQL transaction. Rolled back on drop unless committed.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Backend for PgBackend {
    type Tx = PgTx;

    async fn begin(&self) -> StoreResult<PgTx> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }
}

#[async_trait]
impl StoreTransaction for PgTx {
    async fn commit(self) -> StoreResult<()> {
        // Deferred order constraints are checked here.
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl PlaylistStore for PgTx {
    async fn insert_playlist(&mut self, new: &NewPlaylist<'_>) -> StoreResult<Playlist> {
        playlists::insert_playlist(&mut self.tx, new)
            .await
            .map_err(StoreError::classify)
    }

    async fn get_playlist(&mut self, id: i64) -> StoreResult<Option<Playlist>> {
        playlists::get_playlist(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }

    async fn list_playlists_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Playlist>> {
        playlists::list_playlists_for_user(&mut self.tx, user_id)
            .await
            .map_err(StoreError::classify)
    }

    async fn update_playlist(
        &mut self,
        id: i64,
        changes: &PlaylistChanges<'_>,
    ) -> StoreResult<Option<Playlist>> {
        playlists::update_playlist(&mut self.tx, id, changes)
            .await
            .map_err(StoreError::classify)
    }

    async fn touch_playlist(&mut self, id: i64) -> StoreResult<()> {
        playlists::touch_playlist(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }

    async fn delete_playlist(&mut self, id: i64) -> StoreResult<()> {
        playlists::delete_playlist(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }

    async fn count_contents(&mut self, id: i64) -> StoreResult<(i64, i64)> {
        playlists::count_contents(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }

    async fn insert_tag(&mut self, name: &str) -> StoreResult<Tag> {
        tags::insert_tag(&mut self.tx, name)
            .await
            .map_err(StoreError::classify)
    }

    async fn list_tags(&mut self) -> StoreResult<Vec<Tag>> {
        tags::list_tags(&mut self.tx)
            .await
            .map_err(StoreError::classify)
    }

    async fn tags_for_playlist(&mut self, playlist_id: i64) -> StoreResult<Vec<Tag>> {
        tags::tags_for_playlist(&mut self.tx, playlist_id)
            .await
            .map_err(StoreError::classify)
    }

    async fn attach_tags(&mut self, playlist_id: i64, tag_ids: &[i64]) -> StoreResult<u64> {
        tags::attach_tags(&mut self.tx, playlist_id, tag_ids)
            .await
            .map_err(StoreError::classify)
    }

    async fn clear_tags(&mut self, playlist_id: i64) -> StoreResult<u64> {
        tags::clear_tags(&mut self.tx, playlist_id)
            .await
            .map_err(StoreError::classify)
    }
}

#[async_trait]
impl BlockStore for PgTx {
    async fn insert_block(&mut self, new: &NewBlock<'_>) -> StoreResult<Block> {
        blocks::insert_block(&mut self.tx, new)
            .await
            .map_err(StoreError::classify)
    }

    async fn get_block(&mut self, id: i64) -> StoreResult<Option<Block>> {
        blocks::get_block(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }

    async fn list_blocks(&mut self, playlist_id: i64) -> StoreResult<Vec<Block>> {
        blocks::list_blocks(&mut self.tx, playlist_id)
            .await
            .map_err(StoreError::classify)
    }

    async fn count_blocks(&mut self, playlist_id: i64) -> StoreResult<i64> {
        blocks::count_blocks(&mut self.tx, playlist_id)
            .await
            .map_err(StoreError::classify)
    }

    async fn update_block(
        &mut self,
        id: i64,
        name: &str,
        block_type: BlockType,
        rest_after_block_seconds: i32,
    ) -> StoreResult<Option<Block>> {
        blocks::update_block(&mut self.tx, id, name, block_type, rest_after_block_seconds)
            .await
            .map_err(StoreError::classify)
    }

    async fn set_block_order(&mut self, playlist_id: i64, id: i64, order: i32) -> StoreResult<()> {
        blocks::set_block_order(&mut self.tx, playlist_id, id, order)
            .await
            .map_err(StoreError::classify)
    }

    async fn shift_blocks(
        &mut self,
        playlist_id: i64,
        from_order: i32,
        delta: i32,
    ) -> StoreResult<u64> {
        blocks::shift_blocks(&mut self.tx, playlist_id, from_order, delta)
            .await
            .map_err(StoreError::classify)
    }

    async fn delete_block(&mut self, id: i64) -> StoreResult<()> {
        blocks::delete_block(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }
}

#[async_trait]
impl EntryStore for PgTx {
    async fn insert_entry(&mut self, new: &NewEntry) -> StoreResult<PlaylistExercise> {
        playlist_exercises::insert_entry(&mut self.tx, new)
            .await
            .map_err(StoreError::classify)
    }

    async fn get_entry(&mut self, id: i64) -> StoreResult<Option<PlaylistExercise>> {
        playlist_exercises::get_entry(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }

    async fn list_entries(&mut self, block_id: i64) -> StoreResult<Vec<PlaylistExercise>> {
        playlist_exercises::list_entries(&mut self.tx, block_id)
            .await
            .map_err(StoreError::classify)
    }

    async fn count_entries(&mut self, block_id: i64) -> StoreResult<i64> {
        playlist_exercises::count_entries(&mut self.tx, block_id)
            .await
            .map_err(StoreError::classify)
    }

    async fn set_entry_position(&mut self, id: i64, block_id: i64, order: i32) -> StoreResult<()> {
        playlist_exercises::set_entry_position(&mut self.tx, id, block_id, order)
            .await
            .map_err(StoreError::classify)
    }

    async fn shift_entries(
        &mut self,
        block_id: i64,
        from_order: i32,
        delta: i32,
    ) -> StoreResult<u64> {
        playlist_exercises::shift_entries(&mut self.tx, block_id, from_order, delta)
            .await
            .map_err(StoreError::classify)
    }

    async fn delete_entry(&mut self, id: i64) -> StoreResult<()> {
        playlist_exercises::delete_entry(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }
}

#[async_trait]
impl ConfigStore for PgTx {
    async fn insert_config(&mut self, params: &ConfigParams) -> StoreResult<ExerciseConfig> {
        configs::insert_config(&mut self.tx, params)
            .await
            .map_err(StoreError::classify)
    }

    async fn get_config(&mut self, id: i64) -> StoreResult<Option<ExerciseConfig>> {
        configs::get_config(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }

    async fn get_configs(&mut self, ids: &[i64]) -> StoreResult<Vec<ExerciseConfig>> {
        configs::get_configs(&mut self.tx, ids)
            .await
            .map_err(StoreError::classify)
    }

    async fn update_config(
        &mut self,
        id: i64,
        params: &ConfigParams,
    ) -> StoreResult<Option<ExerciseConfig>> {
        configs::update_config(&mut self.tx, id, params)
            .await
            .map_err(StoreError::classify)
    }

    async fn delete_config(&mut self, id: i64) -> StoreResult<u64> {
        configs::delete_config(&mut self.tx, id)
            .await
            .map_err(StoreError::classify)
    }

    async fn delete_configs_for_block(&mut self, block_id: i64) -> StoreResult<u64> {
        configs::delete_configs_for_block(&mut self.tx, block_id)
            .await
            .map_err(StoreError::classify)
    }

    async fn delete_configs_for_playlist(&mut self, playlist_id: i64) -> StoreResult<u64> {
        configs::delete_configs_for_playlist(&mut self.tx, playlist_id)
            .await
            .map_err(StoreError::classify)
    }

    async fn delete_orphaned_configs(&mut self) -> StoreResult<u64> {
        configs::delete_orphaned_configs(&mut self.tx)
            .await
            .map_err(StoreError::classify)
    }
}
