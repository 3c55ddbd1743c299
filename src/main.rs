use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use weatherwear::{
    CycleHandle, CycleScheduler, FetchOrchestrator, OutfitSuggestion, PipelineError,
    WeatherMode, WeatherWearConfig, logging,
};

/// Daily outfit and umbrella suggestions from current weather conditions
#[derive(Debug, Parser)]
#[command(name = "weatherwear", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use the canonical mock weather instead of the provider
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one fetch cycle and print the suggestion
    Suggest,
    /// Read triggers from stdin; each line starts a cycle, `q` quits
    Interactive,
}

type CycleResult = Result<OutfitSuggestion, PipelineError>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = WeatherWearConfig::load_from_path(cli.config)?;
    if cli.mock {
        config.weather.mode = WeatherMode::Mock;
    }

    logging::init(&config.logging, cli.verbose)?;
    warn_missing_keys(&config);

    let orchestrator = Arc::new(
        FetchOrchestrator::from_config(&config).context("Failed to set up the fetch pipeline")?,
    );
    let scheduler = CycleScheduler::new();

    match cli.command.unwrap_or(Command::Suggest) {
        Command::Suggest => {
            let handle = trigger(&scheduler, &orchestrator)
                .context("Scheduler refused the initial trigger")?;
            let result = handle.join().await?;
            Ok(render(&result))
        }
        Command::Interactive => interactive(&scheduler, &orchestrator).await,
    }
}

fn warn_missing_keys(config: &WeatherWearConfig) {
    if config.weather.mode == WeatherMode::Live && config.weather.api_key.is_none() {
        warn!(
            "No weather API key set; set WEATHERWEAR_WEATHER__API_KEY or OPENWEATHER_API_KEY"
        );
    }
    if config.ai.api_key.is_none() {
        info!("No Gemini API key set; using rule-based suggestions");
    }
}

fn trigger(
    scheduler: &CycleScheduler,
    orchestrator: &Arc<FetchOrchestrator>,
) -> Option<CycleHandle<CycleResult>> {
    let orchestrator = Arc::clone(orchestrator);
    scheduler.submit(move || async move { orchestrator.run().await })
}

fn render(result: &CycleResult) -> ExitCode {
    match result {
        Ok(suggestion) => {
            println!("{suggestion}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("エラーが発生しました");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn interactive(
    scheduler: &CycleScheduler,
    orchestrator: &Arc<FetchOrchestrator>,
) -> Result<ExitCode> {
    println!("Enter で今日の提案を取得、q で終了");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut renderer: Option<tokio::task::JoinHandle<()>> = None;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim() == "q" {
            break;
        }

        let Some(handle) = trigger(scheduler, orchestrator) else {
            println!("[取得中です。完了までお待ちください]");
            continue;
        };

        println!("[読み込み中...]");
        renderer = Some(tokio::spawn(async move {
            match handle.join().await {
                Ok(result) => {
                    render(&result);
                }
                Err(e) => eprintln!("Error: {e:#}"),
            }
        }));
    }

    if let Some(pending) = renderer {
        pending.await.context("Renderer task failed")?;
    }
    Ok(ExitCode::SUCCESS)
}
