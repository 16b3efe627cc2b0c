//! In-memory implementation of the playlist store traits.
//!
//! Transactions take an exclusive lock on the whole state and restore a
//! snapshot when dropped without committing. Order-index uniqueness is
//! checked at commit, like the deferred constraints in PostgreSQL; the other
//! constraints the service relies on (owner/title and tag-name uniqueness,
//! the catalog foreign key, cascades) are checked eagerly.
//!
//! Every store call is counted per method, and any method can be made to
//! fail, so tests can assert on access patterns and best-effort paths.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use fitrkr_core::playlist::store::{
    Backend, BlockStore, ConfigStore, EntryStore, NewBlock, NewEntry, NewPlaylist,
    PlaylistChanges, PlaylistStore, StoreError, StoreResult, StoreTransaction,
};
use fitrkr_db::models::{
    Block, BlockType, ConfigParams, ExerciseConfig, Playlist, PlaylistExercise, Tag,
};

/// Everything the backend holds. Public so tests can inspect it through
/// [`MemoryBackend::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub exercises: BTreeMap<i64, String>,
    pub playlists: BTreeMap<i64, Playlist>,
    pub tags: BTreeMap<i64, Tag>,
    /// `(playlist_id, tag_id)`
    pub playlist_tags: BTreeSet<(i64, i64)>,
    pub blocks: BTreeMap<i64, Block>,
    pub configs: BTreeMap<i64, ExerciseConfig>,
    pub entries: BTreeMap<i64, PlaylistExercise>,
    last_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn remove_entries_where(&mut self, pred: impl Fn(&PlaylistExercise) -> bool) {
        self.entries.retain(|_, e| !pred(e));
    }

    /// Stand-in for the deferred order constraints.
    fn check_orders(&self) -> StoreResult<()> {
        let mut block_slots = HashSet::new();
        for b in self.blocks.values() {
            if !block_slots.insert((b.playlist_id, b.block_order)) {
                return Err(unique("exercise_blocks_playlist_order_key"));
            }
        }
        let mut entry_slots = HashSet::new();
        for e in self.entries.values() {
            if !entry_slots.insert((e.block_id, e.exercise_order)) {
                return Err(unique("playlist_exercises_block_order_key"));
            }
        }
        Ok(())
    }

    fn config_from(id: i64, params: &ConfigParams) -> ExerciseConfig {
        let now = Utc::now();
        ExerciseConfig {
            id,
            sets: params.sets,
            reps_min: params.reps_min,
            reps_max: params.reps_max,
            weight: params.weight,
            rest_seconds: params.rest_seconds_or_default(),
            tempo: params.tempo.clone(),
            duration_seconds: params.duration_seconds,
            distance: params.distance,
            target_pace: params.target_pace,
            target_heart_rate: params.target_heart_rate,
            incline: params.incline,
            notes: params.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn unique(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: constraint.to_owned(),
    }
}

fn foreign_key(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation {
        constraint: constraint.to_owned(),
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct Probes {
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl Probes {
    fn record(&self, op: &'static str) -> StoreResult<()> {
        *lock(&self.calls).entry(op).or_default() += 1;
        if lock(&self.failing).contains(op) {
            return Err(StoreError::Other(anyhow::anyhow!("injected failure in {op}")));
        }
        Ok(())
    }
}

/// Shared in-memory backend. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<AsyncMutex<MemoryState>>,
    probes: Arc<Probes>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a catalog exercise and return its ID.
    pub async fn add_exercise(&self, name: &str) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.exercises.insert(id, name.to_owned());
        id
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    /// How many times store method `op` has been called.
    pub fn calls(&self, op: &str) -> usize {
        lock(&self.probes.calls).get(op).copied().unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        lock(&self.probes.calls).clear();
    }

    /// Make every later call to store method `op` fail.
    pub fn fail_on(&self, op: &'static str) {
        lock(&self.probes.failing).insert(op);
    }

    pub fn clear_failures(&self) {
        lock(&self.probes.failing).clear();
    }
}

/// Exclusive handle on the state. Restores the snapshot on drop unless
/// committed.
pub struct MemoryTx {
    state: OwnedMutexGuard<MemoryState>,
    snapshot: Option<MemoryState>,
    probes: Arc<Probes>,
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.state = snapshot;
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        let state = Arc::clone(&self.state).lock_owned().await;
        let snapshot = Some(state.clone());
        Ok(MemoryTx {
            state,
            snapshot,
            probes: Arc::clone(&self.probes),
        })
    }
}

#[async_trait]
impl StoreTransaction for MemoryTx {
    async fn commit(mut self) -> StoreResult<()> {
        self.probes.record("commit")?;
        self.state.check_orders()?;
        self.snapshot = None;
        Ok(())
    }
}

#[async_trait]
impl PlaylistStore for MemoryTx {
    async fn insert_playlist(&mut self, new: &NewPlaylist<'_>) -> StoreResult<Playlist> {
        self.probes.record("insert_playlist")?;
        let taken = self
            .state
            .playlists
            .values()
            .any(|p| p.user_id == new.user_id && p.title == new.title);
        if taken {
            return Err(unique("playlists_user_title_key"));
        }

        let now = Utc::now();
        let id = self.state.next_id();
        let playlist = Playlist {
            id,
            user_id: new.user_id,
            title: new.title.to_owned(),
            description: new.description.map(str::to_owned),
            is_active: false,
            last_worked: false,
            visibility: new.visibility,
            created_at: now,
            updated_at: now,
        };
        self.state.playlists.insert(id, playlist.clone());
        Ok(playlist)
    }

    async fn get_playlist(&mut self, id: i64) -> StoreResult<Option<Playlist>> {
        self.probes.record("get_playlist")?;
        Ok(self.state.playlists.get(&id).cloned())
    }

    async fn list_playlists_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Playlist>> {
        self.probes.record("list_playlists_for_user")?;
        let mut out: Vec<Playlist> = self
            .state
            .playlists
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn update_playlist(
        &mut self,
        id: i64,
        changes: &PlaylistChanges<'_>,
    ) -> StoreResult<Option<Playlist>> {
        self.probes.record("update_playlist")?;
        let Some(current) = self.state.playlists.get(&id).cloned() else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            let taken = self
                .state
                .playlists
                .values()
                .any(|p| p.id != id && p.user_id == current.user_id && p.title == title);
            if taken {
                return Err(unique("playlists_user_title_key"));
            }
        }

        let Some(playlist) = self.state.playlists.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            playlist.title = title.to_owned();
        }
        if let Some(description) = changes.description {
            playlist.description = (!description.is_empty()).then(|| description.to_owned());
        }
        if let Some(visibility) = changes.visibility {
            playlist.visibility = visibility;
        }
        playlist.updated_at = Utc::now();
        Ok(Some(playlist.clone()))
    }

    async fn touch_playlist(&mut self, id: i64) -> StoreResult<()> {
        self.probes.record("touch_playlist")?;
        if let Some(p) = self.state.playlists.get_mut(&id) {
            p.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_playlist(&mut self, id: i64) -> StoreResult<()> {
        self.probes.record("delete_playlist")?;
        if self.state.playlists.remove(&id).is_none() {
            return Err(StoreError::Other(anyhow::anyhow!("playlist {id} not found")));
        }
        self.state.blocks.retain(|_, b| b.playlist_id != id);
        self.state.remove_entries_where(|e| e.playlist_id == id);
        self.state.playlist_tags.retain(|(p, _)| *p != id);
        Ok(())
    }

    async fn count_contents(&mut self, id: i64) -> StoreResult<(i64, i64)> {
        self.probes.record("count_contents")?;
        let blocks = self.state.blocks.values().filter(|b| b.playlist_id == id).count();
        let entries = self.state.entries.values().filter(|e| e.playlist_id == id).count();
        Ok((blocks as i64, entries as i64))
    }

    async fn insert_tag(&mut self, name: &str) -> StoreResult<Tag> {
        self.probes.record("insert_tag")?;
        if self.state.tags.values().any(|t| t.name == name) {
            return Err(unique("tags_name_key"));
        }
        let id = self.state.next_id();
        let tag = Tag {
            id,
            name: name.to_owned(),
        };
        self.state.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn list_tags(&mut self) -> StoreResult<Vec<Tag>> {
        self.probes.record("list_tags")?;
        let mut tags: Vec<Tag> = self.state.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn tags_for_playlist(&mut self, playlist_id: i64) -> StoreResult<Vec<Tag>> {
        self.probes.record("tags_for_playlist")?;
        let mut tags: Vec<Tag> = self
            .state
            .playlist_tags
            .iter()
            .filter(|(p, _)| *p == playlist_id)
            .filter_map(|(_, t)| self.state.tags.get(t).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn attach_tags(&mut self, playlist_id: i64, tag_ids: &[i64]) -> StoreResult<u64> {
        self.probes.record("attach_tags")?;
        if !self.state.playlists.contains_key(&playlist_id) {
            return Err(foreign_key("playlist_tags_playlist_id_fkey"));
        }
        if tag_ids.iter().any(|t| !self.state.tags.contains_key(t)) {
            return Err(foreign_key("playlist_tags_tag_id_fkey"));
        }
        let added = tag_ids
            .iter()
            .filter(|t| self.state.playlist_tags.insert((playlist_id, **t)))
            .count();
        Ok(added as u64)
    }

    async fn clear_tags(&mut self, playlist_id: i64) -> StoreResult<u64> {
        self.probes.record("clear_tags")?;
        let before = self.state.playlist_tags.len();
        self.state.playlist_tags.retain(|(p, _)| *p != playlist_id);
        Ok((before - self.state.playlist_tags.len()) as u64)
    }
}

#[async_trait]
impl BlockStore for MemoryTx {
    async fn insert_block(&mut self, new: &NewBlock<'_>) -> StoreResult<Block> {
        self.probes.record("insert_block")?;
        if !self.state.playlists.contains_key(&new.playlist_id) {
            return Err(foreign_key("exercise_blocks_playlist_id_fkey"));
        }
        let id = self.state.next_id();
        let block = Block {
            id,
            playlist_id: new.playlist_id,
            name: new.name.to_owned(),
            block_type: new.block_type,
            block_order: new.block_order,
            rest_after_block_seconds: new.rest_after_block_seconds,
        };
        self.state.blocks.insert(id, block.clone());
        Ok(block)
    }

    async fn get_block(&mut self, id: i64) -> StoreResult<Option<Block>> {
        self.probes.record("get_block")?;
        Ok(self.state.blocks.get(&id).cloned())
    }

    async fn list_blocks(&mut self, playlist_id: i64) -> StoreResult<Vec<Block>> {
        self.probes.record("list_blocks")?;
        let mut blocks: Vec<Block> = self
            .state
            .blocks
            .values()
            .filter(|b| b.playlist_id == playlist_id)
            .cloned()
            .collect();
        blocks.sort_by_key(|b| b.block_order);
        Ok(blocks)
    }

    async fn count_blocks(&mut self, playlist_id: i64) -> StoreResult<i64> {
        self.probes.record("count_blocks")?;
        Ok(self
            .state
            .blocks
            .values()
            .filter(|b| b.playlist_id == playlist_id)
            .count() as i64)
    }

    async fn update_block(
        &mut self,
        id: i64,
        name: &str,
        block_type: BlockType,
        rest_after_block_seconds: i32,
    ) -> StoreResult<Option<Block>> {
        self.probes.record("update_block")?;
        let Some(block) = self.state.blocks.get_mut(&id) else {
            return Ok(None);
        };
        block.name = name.to_owned();
        block.block_type = block_type;
        block.rest_after_block_seconds = rest_after_block_seconds;
        Ok(Some(block.clone()))
    }

    async fn set_block_order(&mut self, playlist_id: i64, id: i64, order: i32) -> StoreResult<()> {
        self.probes.record("set_block_order")?;
        match self.state.blocks.get_mut(&id) {
            Some(block) if block.playlist_id == playlist_id => {
                block.block_order = order;
                Ok(())
            }
            _ => Err(StoreError::Other(anyhow::anyhow!(
                "block {id} not found in playlist {playlist_id}"
            ))),
        }
    }

    async fn shift_blocks(
        &mut self,
        playlist_id: i64,
        from_order: i32,
        delta: i32,
    ) -> StoreResult<u64> {
        self.probes.record("shift_blocks")?;
        let mut shifted = 0;
        for block in self.state.blocks.values_mut() {
            if block.playlist_id == playlist_id && block.block_order >= from_order {
                block.block_order += delta;
                shifted += 1;
            }
        }
        Ok(shifted)
    }

    async fn delete_block(&mut self, id: i64) -> StoreResult<()> {
        self.probes.record("delete_block")?;
        if self.state.blocks.remove(&id).is_none() {
            return Err(StoreError::Other(anyhow::anyhow!("block {id} not found")));
        }
        self.state.remove_entries_where(|e| e.block_id == id);
        Ok(())
    }
}

#[async_trait]
impl EntryStore for MemoryTx {
    async fn insert_entry(&mut self, new: &NewEntry) -> StoreResult<PlaylistExercise> {
        self.probes.record("insert_entry")?;
        let Some(exercise_name) = self.state.exercises.get(&new.exercise_id).cloned() else {
            return Err(foreign_key("playlist_exercises_exercise_id_fkey"));
        };
        if !self.state.configs.contains_key(&new.config_id) {
            return Err(foreign_key("playlist_exercises_config_id_fkey"));
        }
        if self.state.entries.values().any(|e| e.config_id == new.config_id) {
            return Err(unique("playlist_exercises_config_id_key"));
        }

        let now = Utc::now();
        let id = self.state.next_id();
        let entry = PlaylistExercise {
            id,
            playlist_id: new.playlist_id,
            exercise_id: new.exercise_id,
            exercise_name,
            block_id: new.block_id,
            config_id: new.config_id,
            exercise_order: new.exercise_order,
            created_at: now,
            updated_at: now,
        };
        self.state.entries.insert(id, entry.clone());
        Ok(entry)
    }

    async fn get_entry(&mut self, id: i64) -> StoreResult<Option<PlaylistExercise>> {
        self.probes.record("get_entry")?;
        Ok(self.state.entries.get(&id).cloned())
    }

    async fn list_entries(&mut self, block_id: i64) -> StoreResult<Vec<PlaylistExercise>> {
        self.probes.record("list_entries")?;
        let mut entries: Vec<PlaylistExercise> = self
            .state
            .entries
            .values()
            .filter(|e| e.block_id == block_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.exercise_order);
        Ok(entries)
    }

    async fn count_entries(&mut self, block_id: i64) -> StoreResult<i64> {
        self.probes.record("count_entries")?;
        Ok(self
            .state
            .entries
            .values()
            .filter(|e| e.block_id == block_id)
            .count() as i64)
    }

    async fn set_entry_position(&mut self, id: i64, block_id: i64, order: i32) -> StoreResult<()> {
        self.probes.record("set_entry_position")?;
        let Some(entry) = self.state.entries.get_mut(&id) else {
            return Err(StoreError::Other(anyhow::anyhow!(
                "playlist exercise {id} not found"
            )));
        };
        entry.block_id = block_id;
        entry.exercise_order = order;
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn shift_entries(&mut self, block_id: i64, from_order: i32, delta: i32) -> StoreResult<u64> {
        self.probes.record("shift_entries")?;
        let mut shifted = 0;
        for entry in self.state.entries.values_mut() {
            if entry.block_id == block_id && entry.exercise_order >= from_order {
                entry.exercise_order += delta;
                shifted += 1;
            }
        }
        Ok(shifted)
    }

    async fn delete_entry(&mut self, id: i64) -> StoreResult<()> {
        self.probes.record("delete_entry")?;
        if self.state.entries.remove(&id).is_none() {
            return Err(StoreError::Other(anyhow::anyhow!(
                "playlist exercise {id} not found"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MemoryTx {
    async fn insert_config(&mut self, params: &ConfigParams) -> StoreResult<ExerciseConfig> {
        self.probes.record("insert_config")?;
        let id = self.state.next_id();
        let config = MemoryState::config_from(id, params);
        self.state.configs.insert(id, config.clone());
        Ok(config)
    }

    async fn get_config(&mut self, id: i64) -> StoreResult<Option<ExerciseConfig>> {
        self.probes.record("get_config")?;
        Ok(self.state.configs.get(&id).cloned())
    }

    async fn get_configs(&mut self, ids: &[i64]) -> StoreResult<Vec<ExerciseConfig>> {
        self.probes.record("get_configs")?;
        Ok(ids
            .iter()
            .filter_map(|id| self.state.configs.get(id).cloned())
            .collect())
    }

    async fn update_config(
        &mut self,
        id: i64,
        params: &ConfigParams,
    ) -> StoreResult<Option<ExerciseConfig>> {
        self.probes.record("update_config")?;
        let Some(existing) = self.state.configs.get(&id) else {
            return Ok(None);
        };
        let mut config = MemoryState::config_from(id, params);
        config.created_at = existing.created_at;
        self.state.configs.insert(id, config.clone());
        Ok(Some(config))
    }

    async fn delete_config(&mut self, id: i64) -> StoreResult<u64> {
        self.probes.record("delete_config")?;
        let removed = self.state.configs.remove(&id).is_some();
        self.state.remove_entries_where(|e| e.config_id == id);
        Ok(u64::from(removed))
    }

    async fn delete_configs_for_block(&mut self, block_id: i64) -> StoreResult<u64> {
        self.probes.record("delete_configs_for_block")?;
        let ids: Vec<i64> = self
            .state
            .entries
            .values()
            .filter(|e| e.block_id == block_id)
            .map(|e| e.config_id)
            .collect();
        Ok(self.delete_config_ids(&ids))
    }

    async fn delete_configs_for_playlist(&mut self, playlist_id: i64) -> StoreResult<u64> {
        self.probes.record("delete_configs_for_playlist")?;
        let ids: Vec<i64> = self
            .state
            .entries
            .values()
            .filter(|e| e.playlist_id == playlist_id)
            .map(|e| e.config_id)
            .collect();
        Ok(self.delete_config_ids(&ids))
    }

    async fn delete_orphaned_configs(&mut self) -> StoreResult<u64> {
        self.probes.record("delete_orphaned_configs")?;
        let referenced: HashSet<i64> = self.state.entries.values().map(|e| e.config_id).collect();
        let before = self.state.configs.len();
        self.state.configs.retain(|id, _| referenced.contains(id));
        Ok((before - self.state.configs.len()) as u64)
    }
}

impl MemoryTx {
    /// Delete configs and, by cascade, the entries that own them.
    fn delete_config_ids(&mut self, ids: &[i64]) -> u64 {
        let mut removed = 0;
        for id in ids {
            if self.state.configs.remove(id).is_some() {
                removed += 1;
            }
        }
        self.state.remove_entries_where(|e| ids.contains(&e.config_id));
        removed
    }
}
