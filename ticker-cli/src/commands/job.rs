//! Job command handlers
//!
//! Starting, listing, inspecting and stopping polling jobs.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use ticker_client::TickerClient;
use ticker_core::domain::job::{JobSpec, JobStatus, ScheduledJob};
use ticker_core::dto::job::StartJob;
use uuid::Uuid;

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List all jobs
    List,
    /// Get job details
    Get {
        /// Job ID
        id: Uuid,
    },
    /// Stop a running job
    Stop {
        /// Job ID
        id: Uuid,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        JobCommands::List => list_jobs(&client).await,
        JobCommands::Get { id } => get_job(&client, id).await,
        JobCommands::Stop { id } => stop_job(&client, id).await,
    }
}

/// Start a polling job
///
/// The job is validated locally first so obvious mistakes never reach the server.
pub async fn start_job(
    config: &Config,
    endpoint: String,
    frequency: f64,
    duration: f64,
) -> Result<()> {
    let spec = JobSpec::new(endpoint, frequency, duration);
    spec.validate().context("Invalid job")?;

    let ack = config
        .client()
        .start_job(&StartJob {
            endpoint: spec.endpoint.clone(),
            frequency: spec.frequency,
            duration: spec.duration,
        })
        .await
        .context("Failed to start job")?;

    println!("{} {}", "✓".green(), ack.message.bold());
    println!("  Job ID:    {}", ack.job_id.to_string().cyan());
    println!("  Endpoint:  {}", spec.endpoint);
    println!(
        "  Schedule:  {} per hour for {} hour(s)",
        spec.frequency, spec.duration
    );

    Ok(())
}

/// List all jobs
async fn list_jobs(client: &TickerClient) -> Result<()> {
    let jobs = client.list_jobs().await?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}

/// Get and display a single job
async fn get_job(client: &TickerClient, id: Uuid) -> Result<()> {
    let job = client.get_job(id).await?;
    print_job_details(&job);
    Ok(())
}

/// Stop a job
async fn stop_job(client: &TickerClient, id: Uuid) -> Result<()> {
    match client.stop_job(id).await {
        Ok(()) => {
            println!("{} Job {} stopped", "✓".green(), id.to_string().bold());
            Ok(())
        }
        Err(e) if e.is_conflict() => {
            println!("{} Job {} has already finished", "⚠".yellow(), id);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_job_summary(job: &ScheduledJob) {
    println!(
        "  {} Job {} [{}]",
        "▸".cyan(),
        job.id.to_string().bold(),
        colorize_status(job.status)
    );
    println!("    Endpoint:  {}", job.endpoint);
    println!("    Cycles:    {}", job.cycles);
    println!();
}

fn print_job_details(job: &ScheduledJob) {
    println!("{}", format!("Job {}", job.id).bold());
    println!("{}", "─".repeat(60).dimmed());
    println!("  Status:     {}", colorize_status(job.status));
    println!("  Endpoint:   {}", job.endpoint);
    println!(
        "  Schedule:   {} per hour, every {}",
        job.frequency,
        format_interval(job.interval_secs)
    );
    println!(
        "  Created:    {}",
        job.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );
    match job.expires_at {
        Some(at) => println!(
            "  Expires:    {}",
            at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        ),
        None => println!("  Expires:    {}", "never".dimmed()),
    }
    if let Some(at) = job.finished_at {
        println!(
            "  Finished:   {}",
            at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    println!("  Cycles:     {}", job.cycles);
    println!("{}", "─".repeat(60).dimmed());
}

fn colorize_status(status: JobStatus) -> ColoredString {
    match status {
        JobStatus::Active => "Active".green(),
        JobStatus::Expired => "Expired".dimmed(),
        JobStatus::Cancelled => "Cancelled".yellow(),
    }
}

fn format_interval(secs: f64) -> String {
    if secs >= 3600.0 {
        format!("{:.1}h", secs / 3600.0)
    } else if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}
