//! Request payloads accepted by the service, and their validation.

use serde::{Deserialize, Serialize};

use fitrkr_db::models::{ConfigParams, Visibility};

use super::error::{PlaylistError, PlaylistResult};

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_TAG_CHARS: usize = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Private when absent.
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Partial update: only present fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlaylistRequest {
    #[serde(default)]
    pub title: Option<String>,
    /// An empty string clears the description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    /// When present, replaces every tag link. An empty list clears them.
    #[serde(default)]
    pub tag_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBlockRequest {
    /// Suggested from the type and position when blank.
    #[serde(default)]
    pub name: Option<String>,
    pub block_type: String,
    #[serde(default)]
    pub rest_after_block_seconds: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBlockRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub rest_after_block_seconds: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddExerciseRequest {
    /// Catalog exercise to place.
    pub exercise_id: i64,
    /// Existing block of the same playlist. A new block is appended when
    /// absent.
    #[serde(default)]
    pub block_id: Option<i64>,
    /// Name for the appended block.
    #[serde(default)]
    pub block_name: Option<String>,
    #[serde(default)]
    pub config: ConfigParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOrder {
    pub block_id: i64,
    pub order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseOrder {
    pub entry_id: i64,
    pub order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveExerciseRequest {
    pub target_block_id: i64,
    /// 1-based. Appends when absent.
    #[serde(default)]
    pub position: Option<i32>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Trim a playlist title and check its length.
pub fn validate_title(title: &str) -> PlaylistResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(PlaylistError::Validation("title must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(PlaylistError::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Trim a tag name and check its length.
pub fn validate_tag_name(name: &str) -> PlaylistResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PlaylistError::Validation("tag name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TAG_CHARS {
        return Err(PlaylistError::Validation(format!(
            "tag name must be at most {MAX_TAG_CHARS} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Trimmed name, or `None` when blank.
pub(crate) fn non_blank(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
}

pub fn validate_rest(seconds: i32) -> PlaylistResult<i32> {
    if seconds < 0 {
        return Err(PlaylistError::Validation(
            "rest_after_block_seconds must not be negative".into(),
        ));
    }
    Ok(seconds)
}

/// Check config parameters against the storage constraints so violations
/// surface as validation errors.
pub fn validate_config(params: &ConfigParams) -> PlaylistResult<()> {
    if !matches!(params.tempo.len(), 0 | 4) {
        return Err(PlaylistError::Validation(format!(
            "tempo must have 0 or 4 elements, got {}",
            params.tempo.len()
        )));
    }
    if params.tempo.iter().any(|t| *t < 0) {
        return Err(PlaylistError::Validation("tempo values must not be negative".into()));
    }
    if params.sets.is_some_and(|s| s <= 0) {
        return Err(PlaylistError::Validation("sets must be positive".into()));
    }
    if params.reps_min.is_some_and(|r| r < 0) || params.reps_max.is_some_and(|r| r < 0) {
        return Err(PlaylistError::Validation("reps must not be negative".into()));
    }
    if let (Some(min), Some(max)) = (params.reps_min, params.reps_max) {
        if min > max {
            return Err(PlaylistError::Validation(format!(
                "reps_min ({min}) must not exceed reps_max ({max})"
            )));
        }
    }
    if params.rest_seconds.is_some_and(|r| r < 0) {
        return Err(PlaylistError::Validation("rest_seconds must not be negative".into()));
    }
    Ok(())
}
