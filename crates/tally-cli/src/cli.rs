use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "tally: concurrent line-match counting over an object-store corpus",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the query server
    Serve(ServeArgs),
    /// Run the HTTP frontend that forwards queries to a server
    Frontend(FrontendArgs),
    /// Drive load against a frontend or server
    Loadgen(LoadgenArgs),
    /// Count matching lines in a local directory corpus
    Count(CountArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[arg(long)]
    pub bucket: Option<String>,
    #[arg(long)]
    pub prefix: Option<String>,
    /// Serve from a local directory instead of Cloud Storage
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Per-document fetch timeout in milliseconds
    #[arg(long)]
    pub fetch_timeout_ms: Option<u64>,
}

#[derive(Args)]
pub struct FrontendArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Base URL of the query server
    #[arg(long)]
    pub backend: Option<String>,
}

#[derive(Args)]
pub struct LoadgenArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Base URL to send queries to
    #[arg(long)]
    pub target: Option<String>,
    #[arg(short, long)]
    pub workers: Option<usize>,
    #[arg(short, long)]
    pub concurrency: Option<usize>,
    /// Number of rounds (0 runs until interrupted)
    #[arg(short, long)]
    pub rounds: Option<u64>,
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

#[derive(Args)]
pub struct CountArgs {
    /// Pattern to match, case-insensitively, against every line
    pub pattern: String,
    /// Directory holding the corpus
    #[arg(long)]
    pub dir: PathBuf,
    /// Only count documents whose relative path starts with this
    #[arg(long, default_value = "")]
    pub prefix: String,
}
