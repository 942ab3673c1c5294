//! Agent workspace provisioning.
//!
//! Creates the workspace directory and seeds the markdown files an agent
//! reads on startup. Seeding never overwrites a file the user already has.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::resolve_user_path;

pub const AGENTS_FILENAME: &str = "AGENTS.md";
pub const SOUL_FILENAME: &str = "SOUL.md";
pub const TOOLS_FILENAME: &str = "TOOLS.md";
pub const IDENTITY_FILENAME: &str = "IDENTITY.md";
pub const USER_FILENAME: &str = "USER.md";
pub const HEARTBEAT_FILENAME: &str = "HEARTBEAT.md";
pub const BOOTSTRAP_FILENAME: &str = "BOOTSTRAP.md";

const AGENTS_TEMPLATE: &str = r#"# AGENTS.md

This folder is home. Treat it that way.

## Every Session

1. Read `SOUL.md` for who you are.
2. Read `USER.md` for who you are helping.
3. Check `HEARTBEAT.md` for anything scheduled.

## Safety

- Don't exfiltrate private data.
- Ask before running anything destructive.
"#;

const SOUL_TEMPLATE: &str = r"# SOUL.md

Be genuinely helpful. Have opinions. Be resourceful before asking.
Earn trust through competence.
";

const TOOLS_TEMPLATE: &str = r"# TOOLS.md

Notes about local tools and how they are set up on this machine.
";

const IDENTITY_TEMPLATE: &str = r"# IDENTITY.md

- **Name:**
- **Vibe:**
- **Emoji:**
";

const USER_TEMPLATE: &str = r"# USER.md

- **Name:**
- **What to call them:**
- **Timezone:**
";

const HEARTBEAT_TEMPLATE: &str = r"# HEARTBEAT.md

# Keep this file empty to skip heartbeat work.
";

const BOOTSTRAP_TEMPLATE: &str = r"# BOOTSTRAP.md

You just woke up in a fresh workspace. Introduce yourself, learn who your
user is, fill in `IDENTITY.md` and `USER.md`, then delete this file.
";

/// Files seeded into every workspace, in creation order.
const WORKSPACE_TEMPLATES: &[(&str, &str)] = &[
    (AGENTS_FILENAME, AGENTS_TEMPLATE),
    (SOUL_FILENAME, SOUL_TEMPLATE),
    (TOOLS_FILENAME, TOOLS_TEMPLATE),
    (IDENTITY_FILENAME, IDENTITY_TEMPLATE),
    (USER_FILENAME, USER_TEMPLATE),
    (HEARTBEAT_FILENAME, HEARTBEAT_TEMPLATE),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct EnsureWorkspaceOptions {
    /// Seed bootstrap files into the workspace.
    pub ensure_bootstrap_files: bool,
}

/// A provisioned agent workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentWorkspace {
    pub dir: PathBuf,
    /// Files created by this call.
    pub created_files: Vec<String>,
}

/// Ensure the agent workspace exists, optionally seeding bootstrap files.
///
/// `BOOTSTRAP.md` is only written into a brand-new workspace, i.e. one
/// where none of the other templates existed yet.
pub async fn ensure_agent_workspace(
    dir: &str,
    opts: EnsureWorkspaceOptions,
) -> Result<AgentWorkspace> {
    let dir = resolve_user_path(dir, dirs::home_dir().as_deref());
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create workspace '{}'", dir.display()))?;

    let mut created_files = Vec::new();
    if !opts.ensure_bootstrap_files {
        return Ok(AgentWorkspace { dir, created_files });
    }

    let mut brand_new = true;
    for (name, content) in WORKSPACE_TEMPLATES {
        if write_file_if_missing(&dir.join(name), content).await? {
            created_files.push((*name).to_string());
        } else {
            brand_new = false;
        }
    }

    if brand_new && write_file_if_missing(&dir.join(BOOTSTRAP_FILENAME), BOOTSTRAP_TEMPLATE).await? {
        created_files.push(BOOTSTRAP_FILENAME.to_string());
    }

    if !created_files.is_empty() {
        info!(
            "Seeded workspace '{}' with {}",
            dir.display(),
            created_files.join(", ")
        );
    }

    Ok(AgentWorkspace { dir, created_files })
}

/// Create `path` with `content` unless it already exists.
///
/// Returns `true` when the file was created.
async fn write_file_if_missing(path: &Path, content: &str) -> Result<bool> {
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await;

    let mut file = match file {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!("Keeping existing '{}'", path.display());
            return Ok(false);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create '{}'", path.display()));
        }
    };

    file.write_all(content.as_bytes())
        .await
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    file.flush().await?;
    Ok(true)
}
