mod cli;
mod commands;
mod config;
mod utils;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Commands;
use crate::commands::Session;
use crate::config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::get_config_path);

    match cli.command {
        // Works without a reachable backend.
        Commands::Config { command } => {
            commands::handle_config_command(command, &config_path).await
        }
        command => {
            let config = Config::load(&config_path).await?;
            let session = Session::connect(config, config_path)?;
            run(command, &session).await
        }
    }
}

async fn run(command: Commands, session: &Session) -> eyre::Result<()> {
    match command {
        Commands::Library { status } => commands::handle_library_command(status, session).await,
        Commands::Search { query, limit } => {
            commands::handle_search_command(query, limit, session).await
        }
        Commands::Add {
            title,
            author,
            isbn,
            status,
        } => commands::handle_add_command(title, author, isbn, status, session).await,
        Commands::Status { reading_id, status } => {
            commands::handle_status_command(reading_id, status, session).await
        }
        Commands::Remove { reading_id } => {
            commands::handle_remove_command(reading_id, session).await
        }
        Commands::Recommendations { command } => {
            commands::handle_recommendations_command(command, session).await
        }
        Commands::Feed { pages, expand } => {
            commands::handle_feed_command(pages, expand, session).await
        }
        Commands::Follow { user_id } => commands::handle_follow_command(user_id, session).await,
        Commands::Unfollow { user_id } => {
            commands::handle_unfollow_command(user_id, session).await
        }
        Commands::Config { command } => {
            commands::handle_config_command(command, &session.config_path).await
        }
    }
}
