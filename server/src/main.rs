//! CLI for the GitHub Issue Assistant.
//!
//! Serves the analysis API over HTTP, or analyzes a single issue and
//! prints the result.

use clap::{Args, Parser, Subcommand};
use issue_assistant::{IssueAnalysis, Pipeline, PipelineConfig, PromptLimits, SetupError};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// GitHub Issue Assistant - Structured LLM triage for GitHub issues.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Settings shared by every command.
#[derive(Args, Debug)]
struct Settings {
    /// GitHub Personal Access Token (optional; raises the API rate limit).
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    github_token: Option<String>,

    /// Path to the LLM config file.
    #[arg(long, default_value = "config.toml", global = true)]
    llm_config_path: PathBuf,

    /// Character budget for the issue body.
    #[arg(long, default_value_t = PromptLimits::DEFAULT_BODY_BUDGET, global = true)]
    body_budget: usize,

    /// Character budget for all comments combined.
    #[arg(long, default_value_t = PromptLimits::DEFAULT_COMMENTS_BUDGET, global = true)]
    comments_budget: usize,

    /// Timeout for fetching an issue, in seconds.
    #[arg(long, default_value_t = 30, global = true)]
    fetch_timeout_secs: u64,

    /// Timeout for each LLM call, in seconds.
    #[arg(long, default_value_t = 60, global = true)]
    generation_timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// Address to listen on.
        #[arg(long, env = "ISSUE_ASSISTANT_BIND", default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
    },

    /// Analyze one issue and print the result.
    Analyze {
        /// Repository URL, e.g. https://github.com/facebook/react.
        #[arg(long)]
        repo_url: String,

        /// Issue number.
        #[arg(long, allow_hyphen_values = true)]
        issue_number: i64,

        /// Print raw JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

/// Failures that end the process.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// The pipeline could not be built.
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// The HTTP server failed.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    let cli = Cli::parse();
    let config = pipeline_config(&cli.settings);
    let command = cli.command.unwrap_or(Command::Serve {
        bind: default_bind(),
    });

    match run(command, &config).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Bind address when no subcommand is given; honours `ISSUE_ASSISTANT_BIND`.
fn default_bind() -> SocketAddr {
    std::env::var("ISSUE_ASSISTANT_BIND")
        .ok()
        .and_then(|addr| addr.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8000)))
}

fn pipeline_config(settings: &Settings) -> PipelineConfig {
    PipelineConfig::new(settings.llm_config_path.clone())
        .with_github_token(settings.github_token.clone())
        .with_limits(PromptLimits::new(
            settings.body_budget,
            settings.comments_budget,
        ))
        .with_fetch_timeout(Duration::from_secs(settings.fetch_timeout_secs))
        .with_generation_timeout(Duration::from_secs(settings.generation_timeout_secs))
}

/// Main execution logic.
async fn run(command: Command, config: &PipelineConfig) -> Result<ExitCode, CliError> {
    let pipeline = Pipeline::connect(config)?;

    match command {
        Command::Serve { bind } => {
            issue_assistant::serve(bind, Arc::new(pipeline)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Analyze {
            repo_url,
            issue_number,
            json,
        } => {
            let number = serde_json::Value::from(issue_number);
            match pipeline.analyze(&repo_url, &number).await {
                Ok(analysis) => {
                    if json {
                        print_json(&analysis);
                    } else {
                        print_analysis(&analysis);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!(kind = ?e.kind(), stage = %e.stage(), error = %e, "Analysis failed");
                    Ok(ExitCode::from(1))
                }
            }
        }
    }
}

fn print_json(analysis: &IssueAnalysis) {
    match serde_json::to_string_pretty(analysis) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "Failed to serialize analysis"),
    }
}

/// Prints a human-readable analysis.
fn print_analysis(analysis: &IssueAnalysis) {
    println!("\nAnalysis:");
    println!("  Summary: {}", analysis.summary);
    println!(
        "  Type: {} ({})",
        analysis.issue_type.title(),
        analysis.issue_type
    );
    println!("  Priority: {}/5", analysis.priority_score.score());
    if !analysis.priority_score.justification().is_empty() {
        println!("    {}", analysis.priority_score.justification());
    }
    if analysis.suggested_labels.is_empty() {
        println!("  Suggested labels: none");
    } else {
        println!(
            "  Suggested labels: {}",
            analysis.suggested_labels.join(", ")
        );
    }
    println!("  Potential impact: {}", analysis.potential_impact);
}
