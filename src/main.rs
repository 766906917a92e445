//! price-predictor: terminal client for the price-analysis service.
//!
//! Submits an item description, narrates progress while the service works,
//! and renders the valuation, market statistics, and cited sources.

mod config;
mod interactive;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tracing::{error, info};

use orchestrator::view::{render_state, RenderOptions};
use orchestrator::{IgnoreReason, OrchestratorState, RequestOrchestrator, Submission};
use price_client::PriceClient;

/// AI price prediction and market analysis client
#[derive(Parser)]
#[command(name = "price-predictor", about = "AI price prediction and market analysis client")]
struct Cli {
    /// Item description, e.g. "Used MacBook Pro 14-inch M1 Pro, 16GB RAM".
    description: Option<String>,

    /// Read the description from a file ("-" for stdin).
    #[arg(long, value_name = "PATH", conflicts_with = "description")]
    file: Option<PathBuf>,

    /// Prompt for descriptions line by line.
    #[arg(long, conflicts_with_all = ["description", "file"])]
    interactive: bool,

    /// Expand the price sources panel.
    #[arg(long)]
    show_sources: bool,

    /// Probe the service health endpoint and exit.
    #[arg(long)]
    check_health: bool,

    /// Config file (defaults to ./config.toml when present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

type Orchestrator = RequestOrchestrator<PriceClient>;

const EXIT_FAILED: i32 = 1;
const EXIT_USAGE: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; rendered results own stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "price_predictor=info,orchestrator=info,price_client=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(EXIT_USAGE);
        }
    };
    info!(
        "Analysis service: {} (deadline {}ms, progress every {}ms)",
        cfg.compare_url(),
        cfg.request_timeout_ms,
        cfg.progress_interval_ms
    );

    let client = PriceClient::new(&cfg)?;

    if cli.check_health {
        return check_health(&client).await;
    }

    let orchestrator = Arc::new(RequestOrchestrator::new(client, &cfg));
    let presenter = tokio::spawn(present_progress(orchestrator.subscribe()));

    let interactive = cli.interactive
        || (cli.description.is_none() && cli.file.is_none() && std::io::stdin().is_terminal());

    let exit_code = if interactive {
        interactive::run(orchestrator, cli.show_sources).await?;
        0
    } else {
        let text = read_description(&cli).await?;
        run_once(&orchestrator, &text, cli.show_sources).await
    };

    presenter.abort();
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

async fn check_health(client: &PriceClient) -> Result<()> {
    let status = client.health().await?;
    if !status.is_healthy() {
        bail!("Service reported status '{}'", status.status);
    }
    println!("Service is healthy");
    Ok(())
}

async fn read_description(cli: &Cli) -> Result<String> {
    if let Some(text) = &cli.description {
        return Ok(text.clone());
    }

    match cli.file.as_deref() {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read description from stdin")?;
            Ok(buf)
        }
    }
}

/// Print each progress label as it changes. Terminal states are printed by
/// whoever awaited the submission.
async fn present_progress(mut rx: watch::Receiver<OrchestratorState>) {
    while rx.changed().await.is_ok() {
        let line = {
            let state = rx.borrow_and_update();
            state
                .is_in_flight()
                .then(|| render_state(&state, RenderOptions::default()))
        };
        if let Some(line) = line {
            eprintln!("{}", line);
        }
    }
}

async fn run_once(orchestrator: &Orchestrator, text: &str, show_sources: bool) -> i32 {
    match orchestrator.submit(text).await {
        Submission::Ignored(IgnoreReason::EmptyInput) => {
            eprintln!("Nothing to analyze: the description is empty.");
            EXIT_USAGE
        }
        Submission::Ignored(IgnoreReason::AlreadyInFlight) => EXIT_FAILED,
        Submission::Settled(state) => {
            println!("{}", render_state(&state, RenderOptions { show_sources }));
            if state.result().is_some() {
                0
            } else {
                EXIT_FAILED
            }
        }
    }
}
