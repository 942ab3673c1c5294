use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_AGENT_ID;

// ============================================================================
// Session Paths
// ============================================================================

/// Normalize an agent id for use as a directory name.
///
/// Lowercases, keeps `[a-z0-9_-]`, maps everything else to `-`, and falls
/// back to the default agent when nothing usable is left.
pub fn normalize_agent_id(agent_id: &str) -> String {
    let normalized: String = agent_id
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let normalized = normalized.trim_matches('-');
    if normalized.is_empty() {
        DEFAULT_AGENT_ID.to_string()
    } else {
        normalized.to_string()
    }
}

/// Directory holding session transcripts for an agent.
pub fn resolve_session_transcripts_dir(state_dir: &Path, agent_id: &str) -> PathBuf {
    state_dir
        .join("agents")
        .join(normalize_agent_id(agent_id))
        .join("sessions")
}

// ============================================================================
// Directory Provisioning
// ============================================================================

/// Create a directory and its parents, succeeding if it already exists.
pub async fn ensure_directory(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory '{}'", path.display()))
}
