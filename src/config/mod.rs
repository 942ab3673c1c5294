mod defaults;
mod io;
mod reconcile;
mod types;

pub use defaults::*;
pub use io::*;
pub use reconcile::*;
pub use types::*;

use std::path::{Path, PathBuf};

/// Filesystem locations setup works against.
///
/// Resolved once from the environment by [`SetupPaths::from_env`] and then
/// passed explicitly, so nothing below the CLI reads process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPaths {
    /// State directory for persistent data.
    pub state_dir: PathBuf,
    /// Canonical config file path.
    pub config_path: PathBuf,
    /// Workspace used when neither the caller nor the config names one.
    pub default_workspace: String,
    /// Directory holding session transcripts.
    pub sessions_dir: PathBuf,
}

impl SetupPaths {
    /// Resolve paths from `MYLOBSTER_*` environment variables and the home
    /// directory.
    pub fn from_env() -> Self {
        let home = dirs::home_dir();
        let state_dir = resolve_state_dir(
            std::env::var("MYLOBSTER_STATE_DIR").ok().as_deref(),
            home.as_deref(),
        );
        let config_path = resolve_config_path(
            std::env::var("MYLOBSTER_CONFIG_PATH").ok().as_deref(),
            &state_dir,
        );
        let default_workspace = resolve_default_agent_workspace_dir(
            std::env::var("MYLOBSTER_PROFILE").ok().as_deref(),
            home.as_deref(),
        );
        let sessions_dir =
            crate::sessions::resolve_session_transcripts_dir(&state_dir, DEFAULT_AGENT_ID);

        Self {
            state_dir,
            config_path,
            default_workspace,
            sessions_dir,
        }
    }

    /// Replace the config path with an explicit one, if given.
    pub fn with_config_path(mut self, path: Option<&str>) -> Self {
        if let Some(path) = non_empty(path) {
            self.config_path = resolve_user_path(path, dirs::home_dir().as_deref());
        }
        self
    }

    /// Lay out every path under a single state directory.
    pub fn under_state_dir(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            config_path: state_dir.join(CONFIG_FILE_NAME),
            default_workspace: state_dir
                .join(WORKSPACE_DIR_NAME)
                .to_string_lossy()
                .into_owned(),
            sessions_dir: crate::sessions::resolve_session_transcripts_dir(
                &state_dir,
                DEFAULT_AGENT_ID,
            ),
            state_dir,
        }
    }
}

/// Resolve the state directory for persistent data.
pub fn resolve_state_dir(override_dir: Option<&str>, home: Option<&Path>) -> PathBuf {
    if let Some(dir) = non_empty(override_dir) {
        return resolve_user_path(dir, home);
    }

    home.map(|h| h.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR_NAME))
}

/// Resolve the config file path, honoring an explicit override.
pub fn resolve_config_path(override_path: Option<&str>, state_dir: &Path) -> PathBuf {
    match non_empty(override_path) {
        Some(path) => resolve_user_path(path, dirs::home_dir().as_deref()),
        None => state_dir.join(CONFIG_FILE_NAME),
    }
}

/// Default agent workspace, one per profile.
///
/// The `default` profile (or none) maps to `~/.mylobster/workspace`; any
/// other profile gets `~/.mylobster/workspace-<profile>`.
pub fn resolve_default_agent_workspace_dir(profile: Option<&str>, home: Option<&Path>) -> String {
    let base = home
        .map(|h| h.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR_NAME));
    let dir = match non_empty(profile) {
        Some(p) if !p.eq_ignore_ascii_case("default") => {
            base.join(format!("{WORKSPACE_DIR_NAME}-{p}"))
        }
        _ => base.join(WORKSPACE_DIR_NAME),
    };
    dir.to_string_lossy().into_owned()
}

/// Expand a leading `~` against the home directory.
pub fn resolve_user_path(input: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(input);
    };
    if input == "~" {
        return home.to_path_buf();
    }
    match input.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(input),
    }
}

/// Render a path for humans, replacing the home directory with `~`.
pub fn shorten_home_path(path: &Path) -> String {
    shorten_path_with_home(path, dirs::home_dir().as_deref())
}

pub(crate) fn shorten_path_with_home(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home {
        if let Ok(rest) = path.strip_prefix(home) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
