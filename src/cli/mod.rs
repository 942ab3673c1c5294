use clap::{Parser, Subcommand};

use crate::infra::AgentMode;

#[derive(Parser)]
#[command(
    name = "mylobster-setup",
    version,
    about = "Initialize the MyLobster config and agent workspace"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write gateway defaults and create the workspace and sessions dirs.
    Setup(SetupOpts),
    Config(ConfigOpts),
    Usage(UsageOpts),
    Version,
}

#[derive(clap::Args)]
pub struct SetupOpts {
    #[arg(short, long, env = "MYLOBSTER_CONFIG_PATH")]
    pub config: Option<String>,
    /// Agent workspace directory (default: ~/.mylobster/workspace).
    #[arg(short, long, env = "MYLOBSTER_WORKSPACE")]
    pub workspace: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigOpts {
    #[arg(short, long, env = "MYLOBSTER_CONFIG_PATH")]
    pub config: Option<String>,
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the resolved config file path.
    Path,
    /// Print the config file as JSON.
    Show,
}

#[derive(clap::Args)]
pub struct UsageOpts {
    #[command(subcommand)]
    pub action: UsageAction,
}

#[derive(Subcommand)]
pub enum UsageAction {
    /// Append one run's usage to a session's usage-by-mode sidecar.
    Record(UsageRecordOpts),
}

#[derive(clap::Args)]
pub struct UsageRecordOpts {
    /// Session transcript file (`*.jsonl`).
    #[arg(short, long)]
    pub session_file: String,
    #[arg(short, long, value_parser = parse_agent_mode)]
    pub mode: Option<AgentMode>,
    #[arg(long, default_value_t = 0)]
    pub input: u64,
    #[arg(long, default_value_t = 0)]
    pub output: u64,
    #[arg(long, default_value_t = 0)]
    pub cache_read: u64,
    #[arg(long, default_value_t = 0)]
    pub cache_write: u64,
    #[arg(long)]
    pub total: Option<u64>,
    #[arg(long)]
    pub cost: Option<f64>,
}

fn parse_agent_mode(s: &str) -> Result<AgentMode, String> {
    s.parse()
}
