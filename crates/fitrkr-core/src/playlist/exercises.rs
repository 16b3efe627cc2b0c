//! Exercise entries: add, remove, configure, reorder and move.

use tracing::info;
use uuid::Uuid;

use fitrkr_db::models::{BlockType, ConfigParams, ExerciseConfig, PlaylistExercise};

use super::access;
use super::error::{PlaylistError, PlaylistResult};
use super::ordering::{insertion_position, next_order, reposition, validate_permutation};
use super::requests::{AddExerciseRequest, ExerciseOrder, non_blank, validate_config};
use super::service::{DEFAULT_REST_AFTER_BLOCK_SECONDS, IMPLICIT_BLOCK_NAME, PlaylistService};
use super::store::{
    Backend, BlockStore, ConfigStore, EntryStore, NewBlock, NewEntry, PlaylistStore,
    StoreTransaction,
};

impl<B: Backend> PlaylistService<B> {
    /// Place a catalog exercise in a playlist the caller owns.
    ///
    /// Without `block_id` a new block is appended to hold it. The block,
    /// config and entry are created in one transaction, so a failure leaves
    /// nothing behind.
    pub async fn add_exercise(
        &self,
        playlist_id: i64,
        caller: Uuid,
        req: &AddExerciseRequest,
    ) -> PlaylistResult<PlaylistExercise> {
        validate_config(&req.config)?;

        let mut tx = self.begin().await?;
        access::owned_playlist(&mut tx, playlist_id, caller).await?;

        let block = match req.block_id {
            Some(block_id) => access::block_in_playlist(&mut tx, playlist_id, block_id).await?,
            None => {
                let name = non_blank(req.block_name.as_deref())
                    .unwrap_or_else(|| IMPLICIT_BLOCK_NAME.to_owned());
                let block_order = next_order(tx.count_blocks(playlist_id).await?);
                tx.insert_block(&NewBlock {
                    playlist_id,
                    name: &name,
                    block_type: BlockType::Playlist,
                    block_order,
                    rest_after_block_seconds: DEFAULT_REST_AFTER_BLOCK_SECONDS,
                })
                .await?
            }
        };

        let config = tx.insert_config(&req.config).await?;
        let exercise_order = next_order(tx.count_entries(block.id).await?);
        let entry = tx
            .insert_entry(&NewEntry {
                playlist_id,
                exercise_id: req.exercise_id,
                block_id: block.id,
                config_id: config.id,
                exercise_order,
            })
            .await
            .map_err(|e| PlaylistError::from_entry_insert(e, req.exercise_id))?;
        tx.touch_playlist(playlist_id).await?;
        tx.commit().await?;

        info!(
            playlist_id,
            block_id = block.id,
            entry_id = entry.id,
            exercise_id = req.exercise_id,
            exercise_order,
            "exercise added"
        );
        Ok(entry)
    }

    /// Remove an entry and its config, closing the gap in its block.
    pub async fn remove_exercise(&self, entry_id: i64, caller: Uuid) -> PlaylistResult<()> {
        let mut tx = self.begin().await?;
        let (playlist, entry) = access::owned_entry(&mut tx, entry_id, caller).await?;
        tx.delete_entry(entry_id).await?;
        tx.delete_config(entry.config_id).await?;
        tx.shift_entries(entry.block_id, entry.exercise_order + 1, -1)
            .await?;
        tx.touch_playlist(playlist.id).await?;
        tx.commit().await?;

        info!(playlist_id = playlist.id, entry_id, "exercise removed");
        Ok(())
    }

    /// Overwrite every parameter of an entry's config.
    pub async fn update_config(
        &self,
        entry_id: i64,
        caller: Uuid,
        params: &ConfigParams,
    ) -> PlaylistResult<ExerciseConfig> {
        validate_config(params)?;

        let mut tx = self.begin().await?;
        let (playlist, entry) = access::owned_entry(&mut tx, entry_id, caller).await?;
        let config = tx
            .update_config(entry.config_id, params)
            .await?
            .ok_or(PlaylistError::ConfigNotFound(entry.config_id))?;
        tx.touch_playlist(playlist.id).await?;
        tx.commit().await?;

        info!(playlist_id = playlist.id, entry_id, config_id = config.id, "config updated");
        Ok(config)
    }

    /// Reorder every entry of a block.
    ///
    /// `orders` must assign each entry of the block exactly one position in
    /// `1..=N`; otherwise nothing changes.
    pub async fn reorder_exercises(
        &self,
        block_id: i64,
        caller: Uuid,
        orders: &[ExerciseOrder],
    ) -> PlaylistResult<()> {
        let mut tx = self.begin().await?;
        let (playlist, _) = access::owned_block(&mut tx, block_id, caller).await?;
        let entries = tx.list_entries(block_id).await?;

        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        let pairs: Vec<(i64, i32)> = orders.iter().map(|o| (o.entry_id, o.order)).collect();
        validate_permutation(&ids, &pairs)?;

        let mut moved = 0;
        for entry in &entries {
            let Some(target) = orders.iter().find(|o| o.entry_id == entry.id) else {
                continue;
            };
            if target.order != entry.exercise_order {
                tx.set_entry_position(entry.id, block_id, target.order).await?;
                moved += 1;
            }
        }
        if moved > 0 {
            tx.touch_playlist(playlist.id).await?;
        }
        tx.commit().await?;

        info!(playlist_id = playlist.id, block_id, moved, "exercises reordered");
        Ok(())
    }

    /// Move an entry to `position` (1-based, default append) in another
    /// block of the same playlist. Both blocks stay densely ordered. Moving
    /// within the same block repositions the entry.
    pub async fn move_exercise(
        &self,
        entry_id: i64,
        caller: Uuid,
        target_block_id: i64,
        position: Option<i32>,
    ) -> PlaylistResult<PlaylistExercise> {
        let mut tx = self.begin().await?;
        let (playlist, entry) = access::owned_entry(&mut tx, entry_id, caller).await?;
        let target = access::block_in_playlist(&mut tx, playlist.id, target_block_id).await?;

        if target.id == entry.block_id {
            let entries = tx.list_entries(target.id).await?;
            let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
            let position = position.unwrap_or_else(|| next_order(ids.len() as i64) - 1);
            let reordered = reposition(&ids, entry_id, position)?;
            for (idx, id) in reordered.iter().enumerate() {
                let order = next_order(idx as i64);
                let unchanged = entries
                    .iter()
                    .any(|e| e.id == *id && e.exercise_order == order);
                if !unchanged {
                    tx.set_entry_position(*id, target.id, order).await?;
                }
            }
        } else {
            let len = usize::try_from(tx.count_entries(target.id).await?).unwrap_or(0);
            let position = insertion_position(position, len)?;
            tx.shift_entries(entry.block_id, entry.exercise_order + 1, -1)
                .await?;
            tx.shift_entries(target.id, position, 1).await?;
            tx.set_entry_position(entry_id, target.id, position).await?;
        }

        let moved = tx
            .get_entry(entry_id)
            .await?
            .ok_or(PlaylistError::EntryNotFound(entry_id))?;
        tx.touch_playlist(playlist.id).await?;
        tx.commit().await?;

        info!(
            playlist_id = playlist.id,
            entry_id,
            from_block = entry.block_id,
            to_block = target.id,
            position = moved.exercise_order,
            "exercise moved"
        );
        Ok(moved)
    }
}
