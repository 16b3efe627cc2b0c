//! Playlist composition engine.
//!
//! A playlist is an ordered list of blocks; each block is an ordered list of
//! exercise entries; each entry owns exactly one config. [`PlaylistService`]
//! keeps ordering, ownership and config ownership consistent across the
//! stores defined in [`store`].

mod access;
pub mod blocks;
pub mod error;
pub mod exercises;
pub mod heuristics;
pub mod ordering;
pub mod pg;
pub mod requests;
pub mod service;
pub mod session;
pub mod store;

pub use access::{can_read, is_owner};
pub use blocks::BlockSuggestion;
pub use error::{PlaylistError, PlaylistResult};
pub use pg::PgBackend;
pub use service::{PlaylistService, PlaylistSummary, PlaylistView};
pub use session::{SessionBlock, SessionExercise, SessionPlaylist};
