use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::coordinator::WorkerLimit;

#[derive(Parser, Debug)]
#[command(
    name = "edgeblock",
    about = "Collect video-CDN edge hostnames from Pi-hole logs and blocklist them",
    version,
    long_about = None
)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Override the log directory from the config
    #[arg(short = 'd', long)]
    pub logs_dir: Option<PathBuf>,

    /// Override the output file from the config
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the edge hostname pattern
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Files scanned at once: 'per-file', 'cpus' or a number
    #[arg(short, long)]
    pub workers: Option<WorkerLimit>,

    /// Send the domains to the blocklist without asking
    #[arg(short, long, conflicts_with = "dry_run")]
    pub yes: bool,

    /// Only scan and write the output file
    #[arg(long)]
    pub dry_run: bool,

    /// Number of most frequent domains to display
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Redact domain names when displaying them
    #[arg(long)]
    pub redact: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a config file with default settings and exit
    #[arg(long)]
    pub init: bool,
}
