//! Classification of database failures into the cases callers act on.

use thiserror::Error;

/// A store failure, with the constraint violations the service maps to
/// domain errors pulled out of the opaque case.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Inspect the error chain for a `sqlx` database error and classify it.
    pub fn classify(err: anyhow::Error) -> Self {
        let Some(db_err) = err
            .chain()
            .find_map(|e| e.downcast_ref::<sqlx::Error>())
            .and_then(|e| e.as_database_error())
        else {
            return Self::Other(err);
        };

        let constraint = db_err.constraint().unwrap_or_default().to_owned();
        if db_err.is_unique_violation() {
            Self::UniqueViolation { constraint }
        } else if db_err.is_foreign_key_violation() {
            Self::ForeignKeyViolation { constraint }
        } else {
            Self::Other(err)
        }
    }

    /// The violated constraint name, if this is a constraint violation.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Self::UniqueViolation { constraint } | Self::ForeignKeyViolation { constraint } => {
                Some(constraint)
            }
            Self::Other(_) => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::classify(anyhow::Error::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_opaque() {
        let err = StoreError::classify(anyhow::anyhow!("connection reset"));
        assert!(matches!(err, StoreError::Other(_)));
        assert_eq!(err.constraint(), None);
    }

    #[test]
    fn sqlx_non_database_error_is_other() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Other(_)));
    }

    #[test]
    fn constraint_exposed_for_violations() {
        let err = StoreError::UniqueViolation {
            constraint: "tags_name_key".into(),
        };
        assert_eq!(err.constraint(), Some("tags_name_key"));
        assert_eq!(err.to_string(), "unique constraint violated: tags_name_key");
    }
}
