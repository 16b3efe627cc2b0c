use fitrkr_db::error::StoreError;
use fitrkr_db::models::BlockTypeParseError;
use thiserror::Error;

use super::ordering::OrderError;

/// Unique constraint on `(user_id, title)` in `playlists`.
pub const PLAYLIST_TITLE_CONSTRAINT: &str = "playlists_user_title_key";
/// Unique constraint on `tags.name`.
pub const TAG_NAME_CONSTRAINT: &str = "tags_name_key";
/// Foreign key from an entry into the exercise catalog.
pub const EXERCISE_FK_CONSTRAINT: &str = "playlist_exercises_exercise_id_fkey";

/// Errors surfaced by playlist composition operations.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist {0} not found")]
    PlaylistNotFound(i64),

    #[error("block {0} not found")]
    BlockNotFound(i64),

    #[error("playlist exercise {0} not found")]
    EntryNotFound(i64),

    #[error("exercise {0} not found")]
    ExerciseNotFound(i64),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("not authorized to access playlist {0}")]
    Unauthorized(i64),

    #[error("invalid block type: {0:?}")]
    InvalidBlockType(String),

    #[error("exercise config {0} not found")]
    ConfigNotFound(i64),

    #[error("invalid order: {0}")]
    InvalidOrder(#[from] OrderError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("store error: {0:#}")]
    Store(anyhow::Error),
}

pub type PlaylistResult<T> = Result<T, PlaylistError>;

impl PlaylistError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PlaylistNotFound(_)
            | Self::BlockNotFound(_)
            | Self::EntryNotFound(_)
            | Self::ExerciseNotFound(_) => 404,
            Self::AlreadyExists(_) => 409,
            Self::Unauthorized(_) => 403,
            Self::InvalidBlockType(_) | Self::InvalidOrder(_) | Self::Validation(_) => 400,
            Self::ConfigNotFound(_) | Self::Store(_) => 500,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PlaylistNotFound(_) => "playlist_not_found",
            Self::BlockNotFound(_) => "block_not_found",
            Self::EntryNotFound(_) => "entry_not_found",
            Self::ExerciseNotFound(_) => "exercise_not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidBlockType(_) => "invalid_block_type",
            Self::ConfigNotFound(_) => "config_not_found",
            Self::InvalidOrder(_) => "invalid_order",
            Self::Validation(_) => "validation",
            Self::Store(_) => "internal",
        }
    }

    /// Map a failed entry insert, turning the catalog foreign key into
    /// [`PlaylistError::ExerciseNotFound`].
    pub(crate) fn from_entry_insert(err: StoreError, exercise_id: i64) -> Self {
        match err {
            StoreError::ForeignKeyViolation { constraint } if constraint == EXERCISE_FK_CONSTRAINT => {
                Self::ExerciseNotFound(exercise_id)
            }
            other => other.into(),
        }
    }
}

impl From<StoreError> for PlaylistError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } if constraint == PLAYLIST_TITLE_CONSTRAINT => {
                Self::AlreadyExists("playlist with this title".to_owned())
            }
            StoreError::UniqueViolation { constraint } if constraint == TAG_NAME_CONSTRAINT => {
                Self::AlreadyExists("tag with this name".to_owned())
            }
            StoreError::Other(e) => Self::Store(e),
            violation => Self::Store(anyhow::Error::new(violation)),
        }
    }
}

impl From<BlockTypeParseError> for PlaylistError {
    fn from(err: BlockTypeParseError) -> Self {
        Self::InvalidBlockType(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_violation_maps_to_already_exists() {
        let err: PlaylistError = StoreError::UniqueViolation {
            constraint: PLAYLIST_TITLE_CONSTRAINT.into(),
        }
        .into();
        assert!(matches!(err, PlaylistError::AlreadyExists(_)));
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.code(), "already_exists");
    }

    #[test]
    fn tag_violation_maps_to_already_exists() {
        let err: PlaylistError = StoreError::UniqueViolation {
            constraint: TAG_NAME_CONSTRAINT.into(),
        }
        .into();
        assert!(matches!(err, PlaylistError::AlreadyExists(_)));
    }

    #[test]
    fn order_violation_is_internal() {
        let err: PlaylistError = StoreError::UniqueViolation {
            constraint: "exercise_blocks_playlist_order_key".into(),
        }
        .into();
        assert!(matches!(err, PlaylistError::Store(_)));
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("exercise_blocks_playlist_order_key"));
    }

    #[test]
    fn catalog_fk_maps_to_exercise_not_found() {
        let err = PlaylistError::from_entry_insert(
            StoreError::ForeignKeyViolation {
                constraint: EXERCISE_FK_CONSTRAINT.into(),
            },
            42,
        );
        assert!(matches!(err, PlaylistError::ExerciseNotFound(42)));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn other_fk_is_internal() {
        let err = PlaylistError::from_entry_insert(
            StoreError::ForeignKeyViolation {
                constraint: "playlist_exercises_block_id_fkey".into(),
            },
            42,
        );
        assert!(matches!(err, PlaylistError::Store(_)));
    }

    #[test]
    fn block_type_parse_error_converts() {
        let parse_err = "pyramid".parse::<fitrkr_db::models::BlockType>().unwrap_err();
        let err: PlaylistError = parse_err.into();
        assert_eq!(err.code(), "invalid_block_type");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn status_codes_cover_families() {
        assert_eq!(PlaylistError::PlaylistNotFound(1).status_code(), 404);
        assert_eq!(PlaylistError::Unauthorized(1).status_code(), 403);
        assert_eq!(PlaylistError::Validation("x".into()).status_code(), 400);
        assert_eq!(PlaylistError::InvalidOrder(OrderError::MissingId(3)).status_code(), 400);
        assert_eq!(PlaylistError::ConfigNotFound(9).status_code(), 500);
    }
}
