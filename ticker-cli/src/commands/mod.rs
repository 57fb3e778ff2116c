//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;

pub use job::JobCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start polling a URL
    Start {
        /// URL to poll
        #[arg(long, default_value = "https://api.chucknorris.io/jokes/random")]
        endpoint: String,

        /// Polls per hour
        #[arg(long, default_value_t = 1.0)]
        frequency: f64,

        /// Hours to keep polling
        #[arg(long, default_value_t = 1.0)]
        duration: f64,
    },
    /// Job management
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Check that the server is up
    Health,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Start {
            endpoint,
            frequency,
            duration,
        } => job::start_job(config, endpoint, frequency, duration).await,
        Commands::Jobs { command } => job::handle_job_command(command, config).await,
        Commands::Health => check_health(config).await,
    }
}

async fn check_health(config: &Config) -> Result<()> {
    config.client().health().await?;
    println!("{} {} is up", "✓".green(), config.server_url.bold());
    Ok(())
}
