//! Denormalized playlist view for starting a workout session.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use fitrkr_db::models::{Block, ExerciseConfig, Playlist, PlaylistExercise, Tag};

use super::access;
use super::error::PlaylistResult;
use super::service::{PlaylistService, tags_or_empty};
use super::store::{Backend, BlockStore, ConfigStore, EntryStore};

#[derive(Debug, Clone, Serialize)]
pub struct SessionPlaylist {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub tags: Vec<Tag>,
    pub blocks: Vec<SessionBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionBlock {
    #[serde(flatten)]
    pub block: Block,
    pub exercises: Vec<SessionExercise>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionExercise {
    #[serde(flatten)]
    pub entry: PlaylistExercise,
    /// `None` only if the referenced config row is missing.
    pub config: Option<ExerciseConfig>,
}

impl<B: Backend> PlaylistService<B> {
    /// Playlist, blocks, entries and configs in execution order.
    ///
    /// Configs are fetched in one batch per block, so a playlist with B
    /// blocks costs at most B entry fetches and B config fetches.
    pub async fn get_playlist_for_session(
        &self,
        playlist_id: i64,
        caller: Uuid,
    ) -> PlaylistResult<SessionPlaylist> {
        let mut tx = self.begin().await?;
        let playlist = access::readable_playlist(&mut tx, playlist_id, caller).await?;
        let blocks = tx.list_blocks(playlist_id).await?;

        let mut session_blocks = Vec::with_capacity(blocks.len());
        for block in blocks {
            let entries = tx.list_entries(block.id).await?;
            let exercises = if entries.is_empty() {
                Vec::new()
            } else {
                let config_ids: Vec<i64> = entries.iter().map(|e| e.config_id).collect();
                let mut by_id: HashMap<i64, ExerciseConfig> = tx
                    .get_configs(&config_ids)
                    .await?
                    .into_iter()
                    .map(|c| (c.id, c))
                    .collect();
                attach_configs(entries, &mut by_id)
            };
            session_blocks.push(SessionBlock { block, exercises });
        }

        let tags = tags_or_empty(&mut tx, playlist_id).await;

        Ok(SessionPlaylist {
            playlist,
            tags,
            blocks: session_blocks,
        })
    }
}

fn attach_configs(
    entries: Vec<PlaylistExercise>,
    by_id: &mut HashMap<i64, ExerciseConfig>,
) -> Vec<SessionExercise> {
    entries
        .into_iter()
        .map(|entry| {
            let config = by_id.remove(&entry.config_id);
            if config.is_none() {
                warn!(
                    entry_id = entry.id,
                    config_id = entry.config_id,
                    "config missing for playlist exercise"
                );
            }
            SessionExercise { entry, config }
        })
        .collect()
}
