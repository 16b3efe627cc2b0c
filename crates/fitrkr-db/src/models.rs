use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Who may read a playlist. Only the owner may ever write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Unlisted,
}

impl Visibility {
    /// Whether a caller other than the owner may read the playlist.
    pub fn is_shared(self) -> bool {
        !matches!(self, Self::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Private => "private",
            Self::Public => "public",
            Self::Unlisted => "unlisted",
        };
        f.write_str(s)
    }
}

impl FromStr for Visibility {
    type Err = VisibilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            "unlisted" => Ok(Self::Unlisted),
            other => Err(VisibilityParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Visibility`] string.
#[derive(Debug, Clone)]
pub struct VisibilityParseError(pub String);

impl fmt::Display for VisibilityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid visibility: {:?}", self.0)
    }
}

impl std::error::Error for VisibilityParseError {}

// ---------------------------------------------------------------------------

/// Execution style of an exercise block.
///
/// `Playlist` is the generic container type used for the block every new
/// playlist starts with and for blocks created implicitly by adding an
/// exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Playlist,
    Standard,
    Superset,
    Triset,
    Circuit,
    Dropset,
    Cardio,
    Warmup,
    Cooldown,
}

impl BlockType {
    pub const ALL: [BlockType; 9] = [
        Self::Playlist,
        Self::Standard,
        Self::Superset,
        Self::Triset,
        Self::Circuit,
        Self::Dropset,
        Self::Cardio,
        Self::Warmup,
        Self::Cooldown,
    ];
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Playlist => "playlist",
            Self::Standard => "standard",
            Self::Superset => "superset",
            Self::Triset => "triset",
            Self::Circuit => "circuit",
            Self::Dropset => "dropset",
            Self::Cardio => "cardio",
            Self::Warmup => "warmup",
            Self::Cooldown => "cooldown",
        };
        f.write_str(s)
    }
}

impl FromStr for BlockType {
    type Err = BlockTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "playlist" => Ok(Self::Playlist),
            "standard" => Ok(Self::Standard),
            "superset" => Ok(Self::Superset),
            "triset" => Ok(Self::Triset),
            "circuit" => Ok(Self::Circuit),
            "dropset" => Ok(Self::Dropset),
            "cardio" => Ok(Self::Cardio),
            "warmup" => Ok(Self::Warmup),
            "cooldown" => Ok(Self::Cooldown),
            other => Err(BlockTypeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`BlockType`] string.
#[derive(Debug, Clone)]
pub struct BlockTypeParseError(pub String);

impl fmt::Display for BlockTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid block type: {:?}", self.0)
    }
}

impl std::error::Error for BlockTypeParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A row from the `playlists` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub last_worked: bool,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `tags` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A row from the `exercise_blocks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Block {
    pub id: i64,
    pub playlist_id: i64,
    pub name: String,
    pub block_type: BlockType,
    pub block_order: i32,
    pub rest_after_block_seconds: i32,
}

/// A row from the `exercise_configs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ExerciseConfig {
    pub id: i64,
    pub sets: Option<i32>,
    pub reps_min: Option<i32>,
    pub reps_max: Option<i32>,
    pub weight: Option<f64>,
    pub rest_seconds: i32,
    /// Eccentric, pause, concentric, pause. Empty when unset.
    pub tempo: Vec<i64>,
    pub duration_seconds: Option<i32>,
    pub distance: Option<f64>,
    pub target_pace: Option<f64>,
    pub target_heart_rate: Option<i32>,
    pub incline: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from `playlist_exercises`, joined with the catalog name of the
/// exercise it places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PlaylistExercise {
    pub id: i64,
    pub playlist_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub block_id: i64,
    pub config_id: i64,
    pub exercise_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `exercises` catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Caller-supplied parameters for an exercise config, used both on create
/// and as a full overwrite on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigParams {
    pub sets: Option<i32>,
    pub reps_min: Option<i32>,
    pub reps_max: Option<i32>,
    pub weight: Option<f64>,
    /// Defaults to [`ConfigParams::DEFAULT_REST_SECONDS`] when absent.
    pub rest_seconds: Option<i32>,
    pub tempo: Vec<i64>,
    pub duration_seconds: Option<i32>,
    pub distance: Option<f64>,
    pub target_pace: Option<f64>,
    pub target_heart_rate: Option<i32>,
    pub incline: Option<f64>,
    pub notes: Option<String>,
}

impl ConfigParams {
    pub const DEFAULT_REST_SECONDS: i32 = 60;

    pub fn rest_seconds_or_default(&self) -> i32 {
        self.rest_seconds.unwrap_or(Self::DEFAULT_REST_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_type_round_trips_through_str() {
        for bt in BlockType::ALL {
            let parsed: BlockType = bt.to_string().parse().unwrap();
            assert_eq!(parsed, bt);
        }
    }

    #[test]
    fn block_type_rejects_unknown() {
        let err = "pyramid".parse::<BlockType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid block type: \"pyramid\"");
    }

    #[test]
    fn block_type_serializes_snake_case() {
        let json = serde_json::to_string(&BlockType::Warmup).unwrap();
        assert_eq!(json, "\"warmup\"");
    }

    #[test]
    fn visibility_defaults_to_private() {
        assert_eq!(Visibility::default(), Visibility::Private);
        assert!(!Visibility::Private.is_shared());
        assert!(Visibility::Unlisted.is_shared());
        assert!(Visibility::Public.is_shared());
    }

    #[test]
    fn visibility_parse_error_names_input() {
        let err = "friends".parse::<Visibility>().unwrap_err();
        assert_eq!(err.0, "friends");
    }

    #[test]
    fn config_params_deserialize_with_defaults() {
        let params: ConfigParams =
            serde_json::from_str(r#"{"sets":3,"reps_min":8,"reps_max":12,"weight":50.0}"#)
                .unwrap();
        assert_eq!(params.sets, Some(3));
        assert!(params.tempo.is_empty());
        assert_eq!(params.rest_seconds_or_default(), 60);
    }
}
