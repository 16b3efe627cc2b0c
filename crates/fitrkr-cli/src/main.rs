mod args;
mod block_cmds;
mod catalog_cmds;
mod config;
mod exercise_cmds;
mod output;
mod playlist_cmds;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use fitrkr_core::playlist::{PgBackend, PlaylistService};
use fitrkr_db::pool;

use args::{ConfigArgs, parse_order_pair};
use config::FitrkrConfig;

#[derive(Parser)]
#[command(name = "fitrkr", about = "Workout playlist composition for fitrkr")]
struct Cli {
    /// Database URL (overrides FITRKR_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Acting user id (overrides FITRKR_USER_ID env var)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a fitrkr config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/fitrkr")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the fitrkr database if needed and run migrations
    DbInit,
    /// Playlist management
    Playlist {
        #[command(subcommand)]
        command: PlaylistCommands,
    },
    /// Block management
    Block {
        #[command(subcommand)]
        command: BlockCommands,
    },
    /// Exercise entries within playlists
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Tag management
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Seed the exercise catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Delete exercise configs no entry references
    SweepConfigs,
}

#[derive(Subcommand)]
pub enum PlaylistCommands {
    /// Create a playlist with its default block
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// private, public or unlisted
        #[arg(long)]
        visibility: Option<String>,
        /// Tag id to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<i64>,
    },
    /// List your playlists, most recently updated first
    List,
    /// Show a playlist with its tags and blocks
    Show { playlist_id: i64 },
    /// Show a playlist with every block, exercise and config, ready to run
    Session { playlist_id: i64 },
    /// Update a playlist's fields
    Update {
        playlist_id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        visibility: Option<String>,
        /// Replace tag links with these ids (repeatable)
        #[arg(long = "tag")]
        tags: Vec<i64>,
        /// Remove every tag link
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Delete a playlist and everything in it
    Delete { playlist_id: i64 },
}

#[derive(Subcommand)]
pub enum BlockCommands {
    /// Append a block to a playlist
    Create {
        playlist_id: i64,
        /// Block type, e.g. standard, superset, circuit
        #[arg(long = "type")]
        block_type: String,
        /// Suggested from the type and position when omitted
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        rest: Option<i32>,
    },
    /// Rename, retype or change the rest period of a block
    Update {
        block_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        block_type: Option<String>,
        #[arg(long)]
        rest: Option<i32>,
    },
    /// Reorder every block of a playlist: BLOCK_ID=ORDER ...
    Reorder {
        playlist_id: i64,
        #[arg(required = true, value_parser = parse_order_pair)]
        orders: Vec<(i64, i32)>,
    },
    /// Delete a block with its exercises
    Delete { block_id: i64 },
    /// Suggest names and types for a playlist's blocks
    Suggest { playlist_id: i64 },
}

#[derive(Subcommand)]
pub enum ExerciseCommands {
    /// Add a catalog exercise to a playlist
    Add {
        playlist_id: i64,
        exercise_id: i64,
        /// Target block; a new block is appended when omitted
        #[arg(long)]
        block: Option<i64>,
        /// Name for the appended block
        #[arg(long)]
        block_name: Option<String>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Remove an entry and its config
    Remove { entry_id: i64 },
    /// Replace an entry's parameters
    Config {
        entry_id: i64,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Reorder every entry of a block: ENTRY_ID=ORDER ...
    Reorder {
        block_id: i64,
        #[arg(required = true, value_parser = parse_order_pair)]
        orders: Vec<(i64, i32)>,
    },
    /// Move an entry to another block (or another position in its block)
    Move {
        entry_id: i64,
        #[arg(long = "to-block")]
        to_block: i64,
        /// 1-based position; appended when omitted
        #[arg(long)]
        position: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum TagCommands {
    List,
    Create { name: String },
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Add an exercise to the catalog
    Add { name: String },
    List,
}

/// Execute the `fitrkr init` command: write config file.
///
/// The global `--user` becomes the configured identity; a fresh id is
/// generated when it is omitted.
fn cmd_init(db_url: &str, user: Option<&str>, force: bool) -> Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let user_id = match user {
        Some(raw) => Uuid::parse_str(raw.trim())
            .with_context(|| format!("invalid user id from --user: {raw:?}"))?,
        None => Uuid::new_v4(),
    };
    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_owned(),
        },
        identity: Some(config::IdentitySection { user_id }),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  identity.user_id = {user_id}");
    println!();
    println!("Next: run `fitrkr db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `fitrkr db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &FitrkrConfig) -> Result<()> {
    println!("Initializing fitrkr database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("fitrkr db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Init { db_url, force } = &cli.command {
        cmd_init(db_url, cli.user.as_deref(), *force)?;
        return Ok(ExitCode::SUCCESS);
    }

    let resolved = FitrkrConfig::resolve(cli.database_url.as_deref(), cli.user.as_deref())?;

    if let Commands::DbInit = cli.command {
        cmd_db_init(&resolved).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let service = PlaylistService::new(PgBackend::new(db_pool.clone()));

    let result = match cli.command {
        Commands::Playlist { command } => match resolved.require_user() {
            Ok(caller) => playlist_cmds::run_playlist_command(command, &service, caller).await,
            Err(e) => Err(e),
        },
        Commands::Block { command } => match resolved.require_user() {
            Ok(caller) => block_cmds::run_block_command(command, &service, caller).await,
            Err(e) => Err(e),
        },
        Commands::Exercise { command } => match resolved.require_user() {
            Ok(caller) => exercise_cmds::run_exercise_command(command, &service, caller).await,
            Err(e) => Err(e),
        },
        Commands::Tag { command } => playlist_cmds::run_tag_command(command, &service).await,
        Commands::Catalog { command } => catalog_cmds::run_catalog_command(command, &db_pool).await,
        Commands::SweepConfigs => output::emit(
            service
                .sweep_orphaned_configs()
                .await
                .map(|removed| serde_json::json!({ "removed": removed })),
        ),
        Commands::Init { .. } | Commands::DbInit => Ok(ExitCode::SUCCESS),
    };

    db_pool.close().await;
    result
}


#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn reorder_parses_pairs() {
        let cli = Cli::try_parse_from(["fitrkr", "block", "reorder", "3", "10=2", "11=1"]).unwrap();
        match cli.command {
            Commands::Block {
                command: BlockCommands::Reorder {
                    playlist_id,
                    orders,
                },
            } => {
                assert_eq!(playlist_id, 3);
                assert_eq!(orders, vec![(10, 2), (11, 1)]);
            }
            _ => panic!("expected block reorder"),
        }
    }

    #[test]
    fn exercise_add_collects_config_flags() {
        let cli = Cli::try_parse_from([
            "fitrkr",
            "--user",
            "00000000-0000-0000-0000-000000000001",
            "exercise",
            "add",
            "5",
            "4",
            "--sets",
            "3",
            "--reps-min",
            "8",
            "--reps-max",
            "12",
            "--weight",
            "50",
            "--tempo",
            "3,1,1,0",
        ])
        .unwrap();
        assert!(cli.user.is_some());
        match cli.command {
            Commands::Exercise {
                command:
                    ExerciseCommands::Add {
                        playlist_id,
                        exercise_id,
                        block,
                        config,
                        ..
                    },
            } => {
                assert_eq!((playlist_id, exercise_id, block), (5, 4, None));
                assert_eq!(config.sets, Some(3));
                assert_eq!(config.weight, Some(50.0));
                assert_eq!(config.tempo, vec![3, 1, 1, 0]);
            }
            _ => panic!("expected exercise add"),
        }
    }

    #[test]
    fn clear_tags_conflicts_with_tags() {
        let parsed = Cli::try_parse_from([
            "fitrkr", "playlist", "update", "1", "--tag", "2", "--clear-tags",
        ]);
        assert!(parsed.is_err());
    }
}
