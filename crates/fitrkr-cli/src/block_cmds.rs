//! CLI handlers for `fitrkr block` subcommands.

use std::process::ExitCode;

use anyhow::Result;
use uuid::Uuid;

use fitrkr_core::playlist::requests::{BlockOrder, CreateBlockRequest, UpdateBlockRequest};
use fitrkr_core::playlist::{PgBackend, PlaylistService};

use crate::BlockCommands;
use crate::output::emit;

pub async fn run_block_command(
    command: BlockCommands,
    service: &PlaylistService<PgBackend>,
    caller: Uuid,
) -> Result<ExitCode> {
    match command {
        BlockCommands::Create {
            playlist_id,
            block_type,
            name,
            rest,
        } => {
            let req = CreateBlockRequest {
                name,
                block_type,
                rest_after_block_seconds: rest,
            };
            emit(service.create_block(playlist_id, caller, &req).await)
        }
        BlockCommands::Update {
            block_id,
            name,
            block_type,
            rest,
        } => {
            let req = UpdateBlockRequest {
                name,
                block_type,
                rest_after_block_seconds: rest,
            };
            emit(service.update_block(block_id, caller, &req).await)
        }
        BlockCommands::Reorder {
            playlist_id,
            orders,
        } => {
            let orders: Vec<BlockOrder> = orders
                .into_iter()
                .map(|(block_id, order)| BlockOrder { block_id, order })
                .collect();
            emit(service.update_block_order(playlist_id, caller, &orders).await)
        }
        BlockCommands::Delete { block_id } => emit(service.delete_block(block_id, caller).await),
        BlockCommands::Suggest { playlist_id } => {
            emit(service.suggest_block_layout(playlist_id, caller).await)
        }
    }
}
