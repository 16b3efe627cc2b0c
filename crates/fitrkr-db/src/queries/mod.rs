//! Query functions, one module per table family.
//!
//! Every function takes `&mut PgConnection` so callers can run several of
//! them inside one transaction (`&mut *tx`) or on a pooled connection.

pub mod blocks;
pub mod configs;
pub mod exercises;
pub mod playlist_exercises;
pub mod playlists;
pub mod tags;
