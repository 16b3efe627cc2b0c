//! `fitrkr catalog` subcommands: seed and list the exercise catalog that
//! playlist entries reference.

use std::process::ExitCode;

use anyhow::{Context, Result};
use sqlx::PgPool;

use fitrkr_db::queries::exercises;

use crate::CatalogCommands;

pub async fn run_catalog_command(command: CatalogCommands, pool: &PgPool) -> Result<ExitCode> {
    let mut conn = pool.acquire().await.context("failed to acquire connection")?;

    match command {
        CatalogCommands::Add { name } => {
            let exercise = exercises::insert_exercise(&mut conn, name.trim()).await?;
            println!("Exercise {} added: {}", exercise.id, exercise.name);
        }
        CatalogCommands::List => {
            let all = exercises::list_exercises(&mut conn).await?;
            if all.is_empty() {
                println!("No exercises. Use `fitrkr catalog add <name>` to add one.");
                return Ok(ExitCode::SUCCESS);
            }
            let id_w = all
                .iter()
                .map(|e| e.id.to_string().len())
                .max()
                .unwrap_or(2)
                .max(2);
            println!("{:<id_w$}  NAME", "ID");
            for exercise in &all {
                println!("{:<id_w$}  {}", exercise.id, exercise.name);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
