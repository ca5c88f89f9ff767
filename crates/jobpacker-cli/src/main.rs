mod export;
mod render;
mod search;
mod settings;


use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use jobpacker_core::SessionStore;
use tracing_subscriber::EnvFilter;

use crate::search::SearchArgs;
use crate::settings::SettingsCommands;

#[derive(Debug, Parser)]
#[command(name = "jobpacker")]
#[command(about = "Harvest job postings from several boards and export them to Cleansheet")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the enabled boards and show the merged results
    Search(SearchArgs),
    /// Export the last search as a Cleansheet JSON file
    Export {
        /// Output file (defaults to `<keywords>_<timestamp><offset>.json`)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show or change the saved search defaults
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// List the supported boards and whether each has an endpoint configured
    Boards,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = jobpacker_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let store = SessionStore::new(config.state_dir.clone());

    match cli.command {
        Some(Commands::Search(args)) => search::run_search(&config, &store, &args).await,
        Some(Commands::Export { output }) => export::run_export(&store, output.as_deref()),
        Some(Commands::Settings { command }) => settings::run_settings(&store, command),
        Some(Commands::Boards) => {
            render::print_boards(&config);
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
