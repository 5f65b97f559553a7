pub use clap::Parser;

use std::path::PathBuf;

use tracing::Level;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "pinshare")]
#[command(about = "Share pinned documents with time-limited access grants")]
pub struct Args {
    /// Path to the pinshare config directory (defaults to ~/.pinshare)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Pinning gateway API base URL (overrides config)
    #[arg(long, global = true)]
    pub gateway_url: Option<Url>,

    /// Gateway API key (overrides config)
    #[arg(long, global = true, env = "PINATA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gateway API secret (overrides config)
    #[arg(long, global = true, env = "PINATA_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: Level,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
