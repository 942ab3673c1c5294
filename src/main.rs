use clap::Parser;
use mylobster_setup::cli::{Cli, Commands, ConfigAction, UsageAction};
use mylobster_setup::commands::{run_setup, SetupOptions};
use mylobster_setup::config::{read_config_file_raw, SetupPaths};
use mylobster_setup::infra::{append_usage_by_mode, AppendUsageParams, NormalizedUsage};
use mylobster_setup::logging;
use std::path::Path;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Setup(opts) => {
            let setup = SetupOptions {
                workspace: opts.workspace,
            };
            let report = run_setup(&setup, opts.config.as_deref()).await?;
            info!(
                "Setup complete (config written: {})",
                report.config_written
            );
        }
        Commands::Config(opts) => {
            let paths = SetupPaths::from_env().with_config_path(opts.config.as_deref());
            match opts.action {
                ConfigAction::Path => {
                    println!("{}", paths.config_path.display());
                }
                ConfigAction::Show => {
                    let raw = read_config_file_raw(&paths.config_path).await;
                    println!("{}", serde_json::to_string_pretty(&raw.parsed)?);
                }
            }
        }
        Commands::Usage(opts) => match opts.action {
            UsageAction::Record(rec) => {
                append_usage_by_mode(AppendUsageParams {
                    session_file: Path::new(&rec.session_file),
                    agent_mode: rec.mode,
                    usage: NormalizedUsage {
                        input: Some(rec.input),
                        output: Some(rec.output),
                        cache_read: Some(rec.cache_read),
                        cache_write: Some(rec.cache_write),
                        total: rec.total,
                    },
                    total_cost: rec.cost,
                    timestamp: None,
                })
                .ignore_failure();
            }
        },
        Commands::Version => {
            println!("mylobster-setup {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
