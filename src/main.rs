use std::path::{Path, PathBuf};

use clap::Parser;
use taskhero::cli::commands::Cli;
use taskhero::io::config_io::load_config;
use taskhero::model::config::BoardConfig;
use taskhero::tui::{self, RunOptions};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log to a daily file; the terminal belongs to the board.
fn init_logging(
    cli_dir: Option<&Path>,
    config: &BoardConfig,
) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let log_dir = cli_dir
        .map(Path::to_path_buf)
        .or_else(|| config.log.dir.clone())
        .unwrap_or_else(|| std::env::temp_dir().join("taskhero"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "taskhero.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let level = config.log.level.as_deref().unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(format!("taskhero={}", level)),
    };
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    Ok(guard)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let config = load_config(cli.config.as_deref(), &cwd)?;
    let _guard = init_logging(cli.log_dir.as_deref(), &config)?;

    let tasks_file: PathBuf = config.resolve_tasks_file(cli.file);
    tracing::info!(file = %tasks_file.display(), "starting taskhero");
    tui::run(RunOptions { tasks_file, config })
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
