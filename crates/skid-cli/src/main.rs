use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use skid_core::{AgentSettings, Team};
use std::{path::PathBuf, str::FromStr};
use tokio::sync::broadcast;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

mod modes;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum TeamArg {
    Blue,
    Orange,
}

impl From<TeamArg> for Team {
    fn from(team: TeamArg) -> Self {
        match team {
            TeamArg::Blue => Team::Blue,
            TeamArg::Orange => Team::Orange,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "skid")]
pub(crate) struct Args {
    #[clap(long, short, default_value = "sim")]
    mode: modes::Mode,

    /// Agent settings file, created with defaults if missing
    #[clap(long, default_value = "skid-settings.json")]
    settings: PathBuf,

    #[clap(long, default_value = "info")]
    log_level: String,

    #[clap(long, default_value = "auto")]
    log_file: String,

    /// Team of the car whose commands are reported
    #[clap(long, default_value = "blue")]
    team: TeamArg,

    /// Simulated seconds to run in sim mode
    #[clap(long, default_value = "60")]
    duration: f64,

    /// Pace the simulation to wall-clock time
    #[clap(long, default_value = "false")]
    realtime: bool,

    #[clap(long, default_value = "0")]
    seed: u64,

    /// Replay input (JSON lines), stdin if not given
    #[clap(long)]
    input: Option<PathBuf>,

    /// Output file (JSON lines); replay writes to stdout if not given
    #[clap(long)]
    output: Option<PathBuf>,

    /// Include the debug map in sim output
    #[clap(long, default_value = "false")]
    debug_draw: bool,
}

fn setup_logging(args: &Args) -> Result<(PathBuf, WorkerGuard)> {
    // Set up log file
    let log_file_path = if args.log_file != "auto" {
        let path = PathBuf::from(&args.log_file);
        if path.exists() {
            anyhow::bail!("Log file already exists: {}", path.display());
        }
        path
    } else {
        let time = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let filename = format!("skid-{time}.log");
        dirs::data_local_dir()
            .map(|p| p.join("skid").join(&filename))
            .unwrap_or_else(|| PathBuf::from(&filename))
    };
    let dir = log_file_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let file_name = log_file_path
        .file_name()
        .context("Log file path has no file name")?;

    // Create log file appender
    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

    // Set up tracing
    let log_level = tracing::Level::from_str(&args.log_level)
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", args.log_level))?;
    let level_filter = LevelFilter::from_level(log_level);
    let stdout_layer = fmt::Layer::default()
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(level_filter);
    let logfile_layer = fmt::Layer::default()
        .json()
        .with_ansi(false)
        .with_writer(non_blocking_appender)
        .with_filter(level_filter);
    // Also installs the bridge for `log` records from the library crates
    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(logfile_layer)
        .try_init()
        .context("Unable to set global tracing subscriber")?;

    Ok((log_file_path, guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (log_file_path, _guard) = setup_logging(&args)?;
    tracing::info!("Saving logs to {}", log_file_path.display());

    let settings = AgentSettings::load_or_insert(&args.settings)?;

    let mode = args.mode;
    match mode {
        modes::Mode::Replay => modes::replay::run(&args, &settings),
        modes::Mode::Sim => {
            let (stop_tx, stop_rx) = broadcast::channel(1);
            let mut main_task =
                tokio::spawn(async move { modes::sim::run(args, settings, stop_rx).await });

            let result = tokio::select! {
                result = &mut main_task => result,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down");
                    // The task may already have finished
                    let _ = stop_tx.send(());
                    main_task.await
                }
            };
            result.context("Simulation task failed")?
        }
    }
}
