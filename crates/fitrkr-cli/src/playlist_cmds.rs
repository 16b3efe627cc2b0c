//! CLI handlers for `fitrkr playlist` and `fitrkr tag` subcommands.
//!
//! Every handler prints a JSON envelope via [`crate::output::emit`].

use std::process::ExitCode;

use anyhow::Result;
use uuid::Uuid;

use fitrkr_core::playlist::requests::{CreatePlaylistRequest, UpdatePlaylistRequest};
use fitrkr_core::playlist::{PgBackend, PlaylistService};

use crate::args::parse_visibility;
use crate::output::emit;
use crate::{PlaylistCommands, TagCommands};

type Service = PlaylistService<PgBackend>;

/// Dispatch a `PlaylistCommands` variant to the appropriate service call.
pub async fn run_playlist_command(
    command: PlaylistCommands,
    service: &Service,
    caller: Uuid,
) -> Result<ExitCode> {
    match command {
        PlaylistCommands::Create {
            title,
            description,
            visibility,
            tags,
        } => {
            let visibility = match parse_visibility(visibility.as_deref()) {
                Ok(v) => v,
                Err(e) => return emit::<()>(Err(e)),
            };
            let req = CreatePlaylistRequest {
                title,
                description,
                visibility,
                tag_ids: tags,
            };
            emit(service.create_playlist(caller, &req).await)
        }
        PlaylistCommands::List => emit(service.list_user_playlists(caller).await),
        PlaylistCommands::Show { playlist_id } => {
            emit(service.get_playlist(playlist_id, caller).await)
        }
        PlaylistCommands::Session { playlist_id } => {
            emit(service.get_playlist_for_session(playlist_id, caller).await)
        }
        PlaylistCommands::Update {
            playlist_id,
            title,
            description,
            visibility,
            tags,
            clear_tags,
        } => {
            let visibility = match parse_visibility(visibility.as_deref()) {
                Ok(v) => v,
                Err(e) => return emit::<()>(Err(e)),
            };
            let req = UpdatePlaylistRequest {
                title,
                description,
                visibility,
                tag_ids: tag_replacement(tags, clear_tags),
            };
            emit(service.update_playlist(playlist_id, caller, &req).await)
        }
        PlaylistCommands::Delete { playlist_id } => {
            emit(service.delete_playlist(playlist_id, caller).await)
        }
    }
}

pub async fn run_tag_command(command: TagCommands, service: &Service) -> Result<ExitCode> {
    match command {
        TagCommands::List => emit(service.list_tags().await),
        TagCommands::Create { name } => emit(service.create_tag(&name).await),
    }
}

/// `--clear-tags` replaces with nothing; no `--tag` flags leaves links alone.
fn tag_replacement(tags: Vec<i64>, clear: bool) -> Option<Vec<i64>> {
    if clear {
        Some(Vec::new())
    } else if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_flags_map_to_replacement() {
        assert_eq!(tag_replacement(Vec::new(), false), None);
        assert_eq!(tag_replacement(Vec::new(), true), Some(Vec::new()));
        assert_eq!(tag_replacement(vec![1, 2], false), Some(vec![1, 2]));
    }
}
