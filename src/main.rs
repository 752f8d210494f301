//! operate-agent - CLI entry point.
//!
//! Exit codes: `0` when the planner finished the task, `2` when the turn
//! limit was reached without a finish signal, `1` on fatal errors
//! (configuration, planner transport).

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use operate_agent::agent::{Agent, RunOutcome, RunReport};
use operate_agent::bridge::{McpHttpBridge, SafetyPolicy};
use operate_agent::config::{validate_server_url, Config};
use operate_agent::planner::GeminiPlanner;

/// Exit code for a run the planner finished with a stop signal.
const EXIT_FINISHED: u8 = 0;
/// Exit code for fatal errors (configuration, planner transport).
const EXIT_FATAL: u8 = 1;
/// Exit code for a run that hit the turn limit without finishing.
const EXIT_EXHAUSTED: u8 = 2;

/// Map a run's terminal state to the process exit status.
fn exit_status(result: &anyhow::Result<RunReport>) -> u8 {
    match result {
        Ok(report) => match report.outcome {
            RunOutcome::Finished { .. } => EXIT_FINISHED,
            RunOutcome::Exhausted => EXIT_EXHAUSTED,
        },
        Err(_) => EXIT_FATAL,
    }
}

/// Run an autonomous desktop task against a Windows-MCP tool server.
#[derive(Parser, Debug)]
#[command(name = "operate-agent", version, about)]
struct Cli {
    /// Objective for the agent to accomplish
    #[arg(short, long)]
    task: String,

    /// Planner model override (defaults to GEMINI_MODEL or gemini-2.0-flash-exp)
    #[arg(short, long)]
    model: Option<String>,

    /// Tool server base URL override (defaults to MCP_SCHEME/HOST/PORT envs)
    #[arg(short = 'u', long)]
    server_url: Option<String>,

    /// Request screenshots with each state query
    #[arg(long)]
    vision: bool,

    /// Maximum planning/acting turns before stopping
    #[arg(long)]
    max_turns: Option<usize>,

    /// Per-call timeout for tool server requests, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log filter (tracing env-filter syntax)
    #[arg(long, default_value = "operate_agent=info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = run(cli).await;
    match &result {
        Ok(report) => match &report.outcome {
            RunOutcome::Finished { summary } => {
                println!("\n=== Task Summary ===");
                if summary.is_empty() {
                    println!("No summary returned.");
                } else {
                    println!("{summary}");
                }
            }
            RunOutcome::Exhausted => {
                println!(
                    "\nTurn limit reached after {} turns without a finish signal.",
                    report.history.len()
                );
            }
        },
        Err(err) => {
            eprintln!("Aborted: {err:#}");
        }
    }
    ExitCode::from(exit_status(&result))
}

async fn run(cli: Cli) -> anyhow::Result<RunReport> {
    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(url) = cli.server_url {
        config.server_url = validate_server_url(&url)?;
    }
    if let Some(max_turns) = cli.max_turns {
        config.max_turns = max_turns;
    }
    if let Some(secs) = cli.timeout_secs {
        config.tool_timeout = Duration::from_secs(secs);
    }

    info!(
        model = %config.model,
        server = %config.server_url,
        max_turns = config.max_turns,
        "configuration loaded"
    );

    let policy = SafetyPolicy::new(config.allowed_apps.clone());
    let bridge = McpHttpBridge::connect(&config.server_url, config.tool_timeout, policy)
        .await
        .map_err(|e| anyhow::anyhow!("could not initialize tool bridge: {e}"))?;
    let planner = GeminiPlanner::new(config.api_key.clone(), config.model.clone());

    let agent = Agent::new(
        Box::new(planner),
        Box::new(bridge),
        config.max_turns,
        cli.vision,
    );

    Ok(agent.run(&cli.task).await?)
}
