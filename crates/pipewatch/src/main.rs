//! pw: live health dashboard for the motion/temperature event pipeline.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing::info;

use pipewatch_core::config::LogFormat;
use pipewatch_core::error::format_error_with_remediation;
use pipewatch_core::logging::{LogConfig, init_logging};
use pipewatch_core::orchestrator::{FetchOutcome, TriggerOutcome};
use pipewatch_core::poller::PollOutcome;
use pipewatch_core::render::{render_check_json, render_check_text, render_json, render_text};
use pipewatch_core::{Config, Dashboard, HttpFetcher};

/// Exit code when every ambient source failed in a one-shot snapshot
const EXIT_ALL_SOURCES_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "pw", author, version, about, long_about = None)]
struct Cli {
    /// Path to pipewatch.toml
    #[arg(long, global = true, env = "PIPEWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Gateway base URL (overrides endpoints.base_url)
    #[arg(long, global = true, env = "PIPEWATCH_BASE_URL")]
    base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "PIPEWATCH_LOG")]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Output format for reports
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll continuously and show the dashboard (default)
    Watch {
        /// Print a text report per cycle instead of the terminal UI
        #[arg(long)]
        no_tui: bool,
    },
    /// Run one refresh cycle and print the dashboard
    Snapshot,
    /// Consistency check operations
    Check {
        #[command(subcommand)]
        action: CheckAction,
    },
    /// Configuration operations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CheckAction {
    /// Trigger a recompute and print the new result
    Run,
    /// Print the latest stored result
    Show,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(pipewatch_core::Error::from)?;

    if let Some(base_url) = &cli.base_url {
        config.endpoints.base_url.clone_from(base_url);
    }
    if let Some(level) = &cli.log_level {
        config.general.log_level.clone_from(level);
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    config.validate().map_err(pipewatch_core::Error::from)?;
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn print_report(text: &str) {
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let command = cli.command.unwrap_or(Commands::Watch { no_tui: false });

    if let Commands::Config {
        action: ConfigAction::Show,
    } = command
    {
        let rendered = match cli.format {
            OutputFormat::Text => config
                .to_toml_string()
                .map_err(pipewatch_core::Error::from)?,
            OutputFormat::Json => serde_json::to_string_pretty(&config)?,
        };
        print_report(&rendered);
        return Ok(ExitCode::SUCCESS);
    }

    // The terminal UI owns the screen, so console logs are off while it runs.
    let tui_active = cfg!(feature = "tui") && matches!(command, Commands::Watch { no_tui: false });
    let mut log_config = LogConfig::from_general(&config.general);
    log_config.console = !tui_active;
    init_logging(&log_config).map_err(pipewatch_core::Error::from)?;

    let dashboard = Dashboard::from_config(&config)?;
    let rt = runtime()?;

    match command {
        Commands::Snapshot => rt.block_on(snapshot(&dashboard, cli.format)),
        Commands::Check {
            action: CheckAction::Run,
        } => rt.block_on(check_run(&dashboard, cli.format)),
        Commands::Check {
            action: CheckAction::Show,
        } => rt.block_on(check_show(&dashboard, cli.format)),
        Commands::Watch { no_tui } => watch_dashboard(&rt, dashboard, &config, cli.format, no_tui),
        Commands::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

async fn snapshot(dashboard: &Dashboard<HttpFetcher>, format: OutputFormat) -> Result<ExitCode> {
    let outcome = dashboard.poller().poll_once().await;
    let state = dashboard.state().snapshot();
    match format {
        OutputFormat::Text => print_report(&render_text(&state)),
        OutputFormat::Json => print_report(&render_json(&state)?),
    }
    match outcome {
        PollOutcome::Completed(report) if report.failed_sources.len() == 4 => {
            Ok(ExitCode::from(EXIT_ALL_SOURCES_FAILED))
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

async fn check_run(dashboard: &Dashboard<HttpFetcher>, format: OutputFormat) -> Result<ExitCode> {
    let outcome = dashboard.orchestrator().trigger().await;
    print_check(dashboard, format)?;
    Ok(match outcome {
        TriggerOutcome::Completed { .. } | TriggerOutcome::AlreadyRunning => ExitCode::SUCCESS,
        TriggerOutcome::Failed(_) => ExitCode::FAILURE,
    })
}

async fn check_show(dashboard: &Dashboard<HttpFetcher>, format: OutputFormat) -> Result<ExitCode> {
    let outcome = dashboard.orchestrator().fetch_result().await;
    print_check(dashboard, format)?;
    Ok(match outcome {
        FetchOutcome::Loaded(_) | FetchOutcome::NotYetAvailable | FetchOutcome::Superseded => {
            ExitCode::SUCCESS
        }
        FetchOutcome::Failed(_) => ExitCode::FAILURE,
    })
}

fn print_check(dashboard: &Dashboard<HttpFetcher>, format: OutputFormat) -> Result<()> {
    let check = dashboard.state().snapshot().check;
    match format {
        OutputFormat::Text => print_report(&render_check_text(&check)),
        OutputFormat::Json => print_report(&render_check_json(&check)?),
    }
    Ok(())
}

fn watch_dashboard(
    rt: &tokio::runtime::Runtime,
    dashboard: Dashboard<HttpFetcher>,
    config: &Config,
    format: OutputFormat,
    no_tui: bool,
) -> Result<ExitCode> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poll_task = rt.spawn(Arc::clone(dashboard.poller()).run(shutdown_rx));

    #[cfg(feature = "tui")]
    if !no_tui {
        let result = pipewatch_core::tui::run_tui(
            dashboard,
            rt.handle().clone(),
            pipewatch_core::tui::AppConfig::default(),
        );
        let _ = shutdown_tx.send(true);
        rt.block_on(poll_task)?;
        result.context("terminal UI failed")?;
        return Ok(ExitCode::SUCCESS);
    }
    #[cfg(not(feature = "tui"))]
    let _ = no_tui;

    let interval = config.polling.interval();
    rt.block_on(async move {
        print_cycles(&dashboard, format, interval).await;
        info!("Interrupted, stopping poller");
        let _ = shutdown_tx.send(true);
        poll_task.await
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Print a report whenever a new cycle lands, until Ctrl-C
async fn print_cycles(dashboard: &Dashboard<HttpFetcher>, format: OutputFormat, interval: Duration) {
    let mut printed = 0;
    let mut check = tokio::time::interval((interval / 4).max(Duration::from_millis(50)));
    loop {
        tokio::select! {
            _ = check.tick() => {
                let state = dashboard.state().snapshot();
                if state.cycles_completed == printed {
                    continue;
                }
                printed = state.cycles_completed;
                match format {
                    OutputFormat::Text => print_report(&render_text(&state)),
                    OutputFormat::Json => match render_json(&state) {
                        Ok(json) => print_report(&json),
                        Err(e) => tracing::warn!(error = %e, "Failed to render JSON report"),
                    },
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
}

fn report_error(err: &anyhow::Error) {
    if let Some(core) = err.downcast_ref::<pipewatch_core::Error>() {
        eprintln!("{}", format_error_with_remediation(core));
    } else {
        eprintln!("Error: {err:#}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}
