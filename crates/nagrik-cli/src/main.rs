//! Nagrik CLI - file civic issue reports from the terminal
//!
//! Reports are delivered straight away when the reporting endpoint is
//! reachable and queued in a local draft store otherwise.

mod cli;
mod commands;
mod config;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands, ConfigCommands, QueueCommands, SettingCommands};
use crate::commands::common::{resolve_db_path, AppContext};
use crate::commands::completions::run_completions;
use crate::commands::config_cmd::{run_config_set, run_config_show, ConfigUpdate};
use crate::commands::queue::{run_queue_list, run_queue_remove, run_queue_show};
use crate::commands::report::{run_report, ReportArgs};
use crate::commands::setting::{run_setting_get, run_setting_list, run_setting_set};
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::commands::watch::run_watch;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nagrik=info".parse().map_err(|error| {
                    CliError::Config(format!("invalid log directive: {error}"))
                })?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = config::default_config_path();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }
    if let Commands::Config {
        command:
            ConfigCommands::Set {
                api_url,
                api_token,
                delivery_timeout_secs,
                probe_interval_secs,
            },
    } = cli.command
    {
        let update = ConfigUpdate {
            api_url,
            api_token,
            delivery_timeout_secs,
            probe_interval_secs,
        };
        return run_config_set(update, &config_path).map(|_| ());
    }

    let context = AppContext {
        db_path: resolve_db_path(cli.db_path),
        config: config::resolve(&config_path).map_err(CliError::Config)?,
        config_path,
        force_offline: cli.offline,
    };
    let db_path = context.db_path.as_path();

    match cli.command {
        Commands::Report {
            category,
            title,
            location,
            address,
            photos,
            voice_note,
            description,
        } => {
            let args = ReportArgs {
                category,
                title,
                location,
                address,
                photos,
                voice_note,
                description,
            };
            run_report(&context, args).await?;
        }
        Commands::Queue { command } => match command {
            QueueCommands::List { json } => run_queue_list(json, db_path).await?,
            QueueCommands::Show { id, json } => run_queue_show(&id, json, db_path).await?,
            QueueCommands::Remove { id } => run_queue_remove(&id, db_path).await?,
        },
        Commands::Sync => {
            run_sync(&context).await?;
        }
        Commands::Status { json } => run_status(&context, json).await?,
        Commands::Watch => run_watch(&context).await?,
        Commands::Setting { command } => match command {
            SettingCommands::Get { key } => run_setting_get(&key, db_path).await?,
            SettingCommands::Set { key, value } => {
                run_setting_set(&key, &value, db_path).await?;
            }
            SettingCommands::List => run_setting_list(db_path).await?,
        },
        Commands::Config { .. } => run_config_show(&context),
        Commands::Completions { .. } => {}
    }

    Ok(())
}
