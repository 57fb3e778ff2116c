//! Ticker CLI
//!
//! Command-line interface for starting and inspecting polling jobs.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "ticker")]
#[command(about = "Ticker URL polling CLI", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "TICKER_SERVER_URL", default_value = "http://localhost:5002")]
    server_url: String,

    /// API token for job routes
    #[arg(long, env = "TICKER_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
        token: cli.token.filter(|t| !t.is_empty()),
    };

    handle_command(cli.command, &config).await
}
