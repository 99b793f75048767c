//! SkillMaster CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags and environment (after `.env` is loaded)
//!    are validated into provider and executor settings before any run starts.
//! 2. **Wire observability**: install the `tracing-subscriber` stack and, when
//!    configured, the OpenTelemetry OTLP exporter. All spans and structured
//!    events emitted by every crate in the workspace flow through it.
//! 3. **Construct infrastructure**: create the [`llm::OpenAiProvider`] and
//!    inject it into a [`nodes::PipelineExecutor`].
//! 4. **Select the surface**: `analyze` runs one analysis in the terminal;
//!    `serve` exposes the HTTP API from the `listener` crate.

mod analyze;
mod args;
mod telemetry;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use llm::OpenAiProvider;
use nodes::{ExecutorConfig, PipelineExecutor, RunOutcome};
use pipeline::{CompletionClient, PipelineContext};
use tracing::info;

use crate::args::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let telemetry = telemetry::init(cli.settings.log_format)?;
    let result = run(cli).await;
    telemetry.shutdown();
    result
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let (provider_config, executor_config) = cli.settings.resolve()?;
    info!(
        model = %provider_config.model,
        base_url = %provider_config.base_url,
        node_timeout_secs = executor_config.node_timeout.as_secs(),
        parse_retry = executor_config.parse_retry,
        "configuration loaded"
    );
    let client: Arc<dyn CompletionClient> = Arc::new(
        OpenAiProvider::new(provider_config).context("failed to create completion client")?,
    );

    match cli.command {
        Command::Analyze {
            skill,
            level,
            output,
            json,
        } => cmd_analyze(client, &executor_config, skill, level, output, json).await,
        Command::Serve { addr } => {
            let state = listener::AppState::new(client, &executor_config);
            tokio::select! {
                served = listener::serve(addr, state) => {
                    served.with_context(|| format!("failed to serve on {addr}"))?;
                }
                _ = tokio::signal::ctrl_c() => info!("shutting down"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommand: analyze
// ---------------------------------------------------------------------------

async fn cmd_analyze(
    client: Arc<dyn CompletionClient>,
    config: &ExecutorConfig,
    skill: Option<String>,
    level: Option<String>,
    output: Option<Option<std::path::PathBuf>>,
    json: bool,
) -> Result<ExitCode> {
    let request = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        analyze::collect_request(skill, level, &mut input, &mut io::stderr())?
    };
    let (skill_name, level) = request.validate()?;

    eprintln!("\nAnalyzing {skill_name} ({level})...");
    let executor = PipelineExecutor::skill_analysis(client, config);
    let run = executor
        .run(PipelineContext::new(skill_name.clone(), level))
        .await?;

    let mut stdout = io::stdout().lock();
    match run.outcome {
        RunOutcome::AllCompleted => {
            let report = run.context.to_report();
            if json {
                writeln!(stdout, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                analyze::display_report(&report, &mut stdout)?;
            }
            if let Some(path) = output {
                let path = path.unwrap_or_else(|| analyze::default_report_path(skill_name.as_str()));
                analyze::save_report(&report, &path)?;
                eprintln!("Report saved to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Halted(failure) => {
            if json {
                writeln!(stdout, "{}", serde_json::to_string_pretty(&failure)?)?;
            } else {
                analyze::display_failure(&failure, &mut io::stderr())?;
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
