//! CLI handlers for `fitrkr exercise` subcommands: placing catalog
//! exercises in playlists and editing their parameters.

use std::process::ExitCode;

use anyhow::Result;
use uuid::Uuid;

use fitrkr_core::playlist::requests::{AddExerciseRequest, ExerciseOrder};
use fitrkr_core::playlist::{PgBackend, PlaylistService};

use crate::ExerciseCommands;
use crate::output::emit;

pub async fn run_exercise_command(
    command: ExerciseCommands,
    service: &PlaylistService<PgBackend>,
    caller: Uuid,
) -> Result<ExitCode> {
    match command {
        ExerciseCommands::Add {
            playlist_id,
            exercise_id,
            block,
            block_name,
            config,
        } => {
            let req = AddExerciseRequest {
                exercise_id,
                block_id: block,
                block_name,
                config: config.into(),
            };
            emit(service.add_exercise(playlist_id, caller, &req).await)
        }
        ExerciseCommands::Remove { entry_id } => {
            emit(service.remove_exercise(entry_id, caller).await)
        }
        ExerciseCommands::Config { entry_id, config } => {
            emit(service.update_config(entry_id, caller, &config.into()).await)
        }
        ExerciseCommands::Reorder { block_id, orders } => {
            let orders: Vec<ExerciseOrder> = orders
                .into_iter()
                .map(|(entry_id, order)| ExerciseOrder { entry_id, order })
                .collect();
            emit(service.reorder_exercises(block_id, caller, &orders).await)
        }
        ExerciseCommands::Move {
            entry_id,
            to_block,
            position,
        } => emit(service.move_exercise(entry_id, caller, to_block, position).await),
    }
}
