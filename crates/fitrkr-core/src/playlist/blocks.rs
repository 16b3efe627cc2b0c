//! Block lifecycle: create, update, reorder, delete, and layout suggestions.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use fitrkr_db::models::{Block, BlockType};

use super::access;
use super::error::{PlaylistError, PlaylistResult};
use super::heuristics::{suggest_block_name, suggest_block_type};
use super::ordering::{next_order, validate_permutation};
use super::requests::{BlockOrder, CreateBlockRequest, UpdateBlockRequest, non_blank, validate_rest};
use super::service::{DEFAULT_REST_AFTER_BLOCK_SECONDS, PlaylistService};
use super::store::{
    Backend, BlockStore, ConfigStore, EntryStore, NewBlock, PlaylistStore, StoreTransaction,
};

/// A block's current name and type next to what the heuristics suggest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSuggestion {
    pub block_id: i64,
    pub block_order: i32,
    pub exercise_count: usize,
    pub current_name: String,
    pub current_type: BlockType,
    pub suggested_name: String,
    pub suggested_type: BlockType,
}

impl<B: Backend> PlaylistService<B> {
    /// Append a block to a playlist the caller owns.
    pub async fn create_block(
        &self,
        playlist_id: i64,
        caller: Uuid,
        req: &CreateBlockRequest,
    ) -> PlaylistResult<Block> {
        let block_type: BlockType = req.block_type.parse()?;
        let rest = validate_rest(
            req.rest_after_block_seconds
                .unwrap_or(DEFAULT_REST_AFTER_BLOCK_SECONDS),
        )?;

        let mut tx = self.begin().await?;
        access::owned_playlist(&mut tx, playlist_id, caller).await?;
        let block_order = next_order(tx.count_blocks(playlist_id).await?);
        let name = non_blank(req.name.as_deref())
            .unwrap_or_else(|| suggest_block_name(block_type, block_order, false));
        let block = tx
            .insert_block(&NewBlock {
                playlist_id,
                name: &name,
                block_type,
                block_order,
                rest_after_block_seconds: rest,
            })
            .await?;
        tx.touch_playlist(playlist_id).await?;
        tx.commit().await?;

        info!(playlist_id, block_id = block.id, block_order, %block_type, "block created");
        Ok(block)
    }

    /// Rename, retype or change the rest period of a block.
    pub async fn update_block(
        &self,
        block_id: i64,
        caller: Uuid,
        req: &UpdateBlockRequest,
    ) -> PlaylistResult<Block> {
        let block_type = req
            .block_type
            .as_deref()
            .map(str::parse::<BlockType>)
            .transpose()?;
        let rest = req.rest_after_block_seconds.map(validate_rest).transpose()?;
        if req.name.is_some() && non_blank(req.name.as_deref()).is_none() {
            return Err(PlaylistError::Validation("block name must not be empty".into()));
        }

        let mut tx = self.begin().await?;
        let (playlist, current) = access::owned_block(&mut tx, block_id, caller).await?;
        let name = non_blank(req.name.as_deref()).unwrap_or(current.name);
        let block = tx
            .update_block(
                block_id,
                &name,
                block_type.unwrap_or(current.block_type),
                rest.unwrap_or(current.rest_after_block_seconds),
            )
            .await?
            .ok_or(PlaylistError::BlockNotFound(block_id))?;
        tx.touch_playlist(playlist.id).await?;
        tx.commit().await?;

        info!(playlist_id = playlist.id, block_id, "block updated");
        Ok(block)
    }

    /// Reorder every block of a playlist.
    ///
    /// `orders` must assign each of the playlist's blocks exactly one
    /// position in `1..=N`; otherwise nothing changes.
    pub async fn update_block_order(
        &self,
        playlist_id: i64,
        caller: Uuid,
        orders: &[BlockOrder],
    ) -> PlaylistResult<()> {
        let mut tx = self.begin().await?;
        access::owned_playlist(&mut tx, playlist_id, caller).await?;
        let blocks = tx.list_blocks(playlist_id).await?;

        let ids: Vec<i64> = blocks.iter().map(|b| b.id).collect();
        let pairs: Vec<(i64, i32)> = orders.iter().map(|o| (o.block_id, o.order)).collect();
        validate_permutation(&ids, &pairs)?;

        let mut moved = 0;
        for block in &blocks {
            let Some(target) = orders.iter().find(|o| o.block_id == block.id) else {
                continue;
            };
            if target.order != block.block_order {
                tx.set_block_order(playlist_id, block.id, target.order).await?;
                moved += 1;
            }
        }
        if moved > 0 {
            tx.touch_playlist(playlist_id).await?;
        }
        tx.commit().await?;

        info!(playlist_id, moved, "blocks reordered");
        Ok(())
    }

    /// Delete a block with its entries and their configs, closing the gap in
    /// the playlist's block order.
    pub async fn delete_block(&self, block_id: i64, caller: Uuid) -> PlaylistResult<()> {
        let mut tx = self.begin().await?;
        let (playlist, block) = access::owned_block(&mut tx, block_id, caller).await?;
        let configs = tx.delete_configs_for_block(block_id).await?;
        tx.delete_block(block_id).await?;
        tx.shift_blocks(playlist.id, block.block_order + 1, -1).await?;
        tx.touch_playlist(playlist.id).await?;
        tx.commit().await?;

        info!(playlist_id = playlist.id, block_id, configs, "block deleted");
        Ok(())
    }

    /// Suggested name and type for each block of a readable playlist.
    pub async fn suggest_block_layout(
        &self,
        playlist_id: i64,
        caller: Uuid,
    ) -> PlaylistResult<Vec<BlockSuggestion>> {
        let mut tx = self.begin().await?;
        let playlist = access::readable_playlist(&mut tx, playlist_id, caller).await?;
        let blocks = tx.list_blocks(playlist_id).await?;

        let mut suggestions = Vec::with_capacity(blocks.len());
        for (idx, block) in blocks.into_iter().enumerate() {
            let exercise_count = usize::try_from(tx.count_entries(block.id).await?).unwrap_or(0);
            let suggested_type = suggest_block_type(exercise_count, idx == 0, &playlist.title);
            let suggested_name =
                suggest_block_name(suggested_type, block.block_order, exercise_count > 0);
            suggestions.push(BlockSuggestion {
                block_id: block.id,
                block_order: block.block_order,
                exercise_count,
                current_name: block.name,
                current_type: block.block_type,
                suggested_name,
                suggested_type,
            });
        }
        Ok(suggestions)
    }
}
