use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::MAX_CONFIG_FILE_BYTES;

/// Outcome of reading the config file for setup.
///
/// `exists` is only true when the file was read and parsed; every failure
/// degrades to an empty, non-existing config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFileRaw {
    pub exists: bool,
    pub parsed: Map<String, Value>,
}

impl ConfigFileRaw {
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Parse a JSON5 configuration string.
pub fn parse_config_json5(content: &str) -> Result<Value> {
    let value: Value = json5::from_str(content)?;
    Ok(value)
}

/// Read and parse a config file, never failing.
///
/// Missing, oversized, unreadable and unparsable files all come back as
/// [`ConfigFileRaw::missing`]. A document that parses to something other
/// than an object counts as existing but empty.
pub async fn read_config_file_raw(path: &Path) -> ConfigFileRaw {
    match load_config_object(path).await {
        Ok(parsed) => ConfigFileRaw {
            exists: true,
            parsed,
        },
        Err(e) => {
            let not_found = e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound);
            if not_found {
                debug!("No config file at '{}'", path.display());
            } else {
                warn!("Ignoring unusable config file '{}': {:#}", path.display(), e);
            }
            ConfigFileRaw::missing()
        }
    }
}

async fn load_config_object(path: &Path) -> Result<Map<String, Value>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot stat config file '{}'", path.display()))?;

    if metadata.len() > MAX_CONFIG_FILE_BYTES {
        bail!(
            "Config file '{}' is {} bytes, exceeds limit of {} bytes",
            path.display(),
            metadata.len(),
            MAX_CONFIG_FILE_BYTES,
        );
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

    match parse_config_json5(&content)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Path of the backup kept next to the config file.
pub fn config_backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Write configuration to a JSON file.
///
/// The previous file, if any, is copied to `<path>.bak` first. The new
/// content goes to a temp file in the same directory which is then renamed
/// over the destination, so readers see either the old or the new file.
pub async fn write_config_file(path: &Path, config: &Value) -> Result<()> {
    let mut content = serde_json::to_string_pretty(config)?;
    content.push('\n');

    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_config_file_sync(&path, &content))
        .await
        .context("Config writer task failed")?
}

fn write_config_file_sync(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create config directory '{}'", parent.display()))?;

    if path.is_file() {
        let backup = config_backup_path(path);
        if let Err(e) = std::fs::copy(path, &backup) {
            warn!("Failed to back up config to '{}': {}", backup.display(), e);
        }
    }

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in '{}'", parent.display()))?;
    tmp.write_all(content.as_bytes())
        .context("Failed to write config temp file")?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    tmp.persist(path)
        .with_context(|| format!("Failed to atomically rename to '{}'", path.display()))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
