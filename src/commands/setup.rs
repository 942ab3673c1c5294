//! `setup` command.
//!
//! Reconciles the config file, then makes sure the agent workspace and the
//! session transcripts directory exist. Safe to run repeatedly: a second
//! run reports `Config OK` and touches nothing but missing directories.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::agents::workspace::{ensure_agent_workspace, EnsureWorkspaceOptions};
use crate::config::{
    gateway_shape_warnings, read_config_file_raw, reconcile_setup_config, resolve_user_path,
    shorten_home_path, write_config_file, ConfigChange, SetupPaths,
};
use crate::runtime::{DefaultRuntime, RuntimeEnv};
use crate::sessions::ensure_directory;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal setup failures. Each names the path it was working on.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to write config file '{}'", .path.display())]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("failed to prepare agent workspace '{}'", .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("failed to create sessions directory '{}'", .path.display())]
    SessionsDir {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    /// Workspace override; blank is ignored.
    pub workspace: Option<String>,
}

/// What a setup run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub config_path: PathBuf,
    pub config_written: bool,
    pub config_created: bool,
    pub changes: Vec<ConfigChange>,
    pub workspace_dir: PathBuf,
    pub sessions_dir: PathBuf,
}

/// Run setup against explicit paths, logging progress to `runtime`.
///
/// Steps run in order and the first failure aborts the rest. Nothing is
/// rolled back: a config written before a directory failure stays written.
pub async fn setup_command(
    opts: &SetupOptions,
    paths: &SetupPaths,
    runtime: &dyn RuntimeEnv,
) -> Result<SetupReport, SetupError> {
    let config_path = &paths.config_path;
    let existing = read_config_file_raw(config_path).await;
    let plan = reconcile_setup_config(
        &existing,
        opts.workspace.as_deref(),
        &paths.default_workspace,
    );
    for warning in gateway_shape_warnings(&plan.next) {
        warn!("{}: {}", config_path.display(), warning);
    }

    if plan.write_required {
        write_config_file(config_path, &plan.next)
            .await
            .map_err(|e| SetupError::WriteConfig {
                path: config_path.clone(),
                source: e.into(),
            })?;

        if plan.created {
            runtime.log(&format!(
                "Wrote {} (gateway.mode=local, workspace, sessions)",
                shorten_home_path(config_path)
            ));
        } else {
            log_config_updated(runtime, config_path, &plan.changes);
        }
    } else {
        runtime.log(&format!("Config OK: {}", shorten_home_path(config_path)));
    }

    let ws = ensure_agent_workspace(
        &plan.workspace,
        EnsureWorkspaceOptions {
            ensure_bootstrap_files: !plan.skip_bootstrap(),
        },
    )
    .await
    .map_err(|e| SetupError::Workspace {
        path: resolve_user_path(&plan.workspace, dirs::home_dir().as_deref()),
        source: e.into(),
    })?;
    runtime.log(&format!("Workspace OK: {}", shorten_home_path(&ws.dir)));

    ensure_directory(&paths.sessions_dir)
        .await
        .map_err(|e| SetupError::SessionsDir {
            path: paths.sessions_dir.clone(),
            source: e.into(),
        })?;
    runtime.log(&format!(
        "Sessions OK: {}",
        shorten_home_path(&paths.sessions_dir)
    ));

    Ok(SetupReport {
        config_path: config_path.clone(),
        config_written: plan.write_required,
        config_created: plan.created,
        changes: plan.changes,
        workspace_dir: ws.dir,
        sessions_dir: paths.sessions_dir.clone(),
    })
}

/// Run setup against the environment's paths, printing to stdout.
pub async fn run_setup(opts: &SetupOptions, config: Option<&str>) -> anyhow::Result<SetupReport> {
    let paths = SetupPaths::from_env().with_config_path(config);
    info!("Running setup with config {}", paths.config_path.display());
    Ok(setup_command(opts, &paths, &DefaultRuntime).await?)
}

fn log_config_updated(runtime: &dyn RuntimeEnv, path: &std::path::Path, changes: &[ConfigChange]) {
    let mut line = format!("Updated {}", shorten_home_path(path));
    if !changes.is_empty() {
        let parts: Vec<&str> = changes.iter().map(|c| c.as_str()).collect();
        line.push_str(&format!(" ({})", parts.join(", ")));
    }
    runtime.log(&line);
}
