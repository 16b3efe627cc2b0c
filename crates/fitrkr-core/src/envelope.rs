//! JSON response envelope: `{"data": ..., "error": null}` on success,
//! `{"data": null, "error": {"code", "message"}}` on failure.

use serde::{Deserialize, Serialize};

use crate::playlist::{PlaylistError, PlaylistResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(err: &PlaylistError) -> Self {
        Self {
            data: None,
            error: Some(ErrorBody {
                code: err.code().to_owned(),
                message: err.to_string(),
            }),
        }
    }

    /// Envelope plus the HTTP status a transport should answer with.
    pub fn from_result(result: PlaylistResult<T>) -> (u16, Self) {
        match result {
            Ok(data) => (200, Self::ok(data)),
            Err(e) => (e.status_code(), Self::err(&e)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
