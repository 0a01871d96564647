//! Newsletter CLI - one digest cycle per invocation.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsletter::{ConfigArgs, NewsletterConfig, RunOutcome, Workflow};

/// Newsletter CLI - mail a digest of new feed entries.
#[derive(Parser)]
#[command(name = "newsletter")]
#[command(about = "Daily RSS digest summarized by Gemini and sent through Gmail")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("newsletter=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("newsletter=info,warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = NewsletterConfig::try_from(cli.config).context("Invalid configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let workflow = Workflow::from_config(config).context("Failed to set up workflow")?;
    let outcome = workflow.run().await.context("Newsletter run failed")?;

    match outcome {
        RunOutcome::NotStarted { start_date } => {
            tracing::info!(%start_date, "Not started yet, nothing sent");
        }
        RunOutcome::NothingNew => {
            tracing::info!("No new entries, nothing sent");
        }
        RunOutcome::Sent { count, recipient } => {
            tracing::info!(count, %recipient, "Digest sent");
        }
    }

    Ok(())
}
