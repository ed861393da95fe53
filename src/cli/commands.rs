use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "taskhero",
    about = concat!(
        "taskhero v",
        env!("CARGO_PKG_VERSION"),
        " - a Kanban board for your tasks file"
    ),
    version
)]
pub struct Cli {
    /// Tasks file to open (default: tasks/tasks.json)
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Config file (default: ./taskhero.toml when present)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory for the rolling log file
    #[arg(long = "log-dir")]
    pub log_dir: Option<PathBuf>,
}
