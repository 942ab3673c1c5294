//! Per-session usage-by-mode sidecar.
//!
//! After each agent run the driver appends one JSON line to
//! `<session>.usage-mode.jsonl` next to the session transcript, tagging the
//! token usage with the agent mode that was active when it was consumed.
//! The file is append-only and never read back here.
//!
//! Appending is best effort. [`append_usage_by_mode`] reports what happened
//! as a [`SidecarAppendOutcome`]; callers that must not fail on telemetry
//! call [`SidecarAppendOutcome::ignore_failure`].

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const SESSION_FILE_EXTENSION: &str = "jsonl";
const SIDECAR_SUFFIX: &str = ".usage-mode.jsonl";

// ============================================================================
// Types
// ============================================================================

/// Agent prompt mode active during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    Full,
    Minimal,
    None,
    /// No explicit mode; the run used whatever its parent configured.
    #[default]
    Inherit,
}

impl AgentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Minimal => "minimal",
            Self::None => "none",
            Self::Inherit => "inherit",
        }
    }
}

impl std::str::FromStr for AgentMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "minimal" => Ok(Self::Minimal),
            "none" => Ok(Self::None),
            "inherit" => Ok(Self::Inherit),
            _ => Err(format!("invalid agent mode: {s}")),
        }
    }
}

/// Token usage normalized across providers. Missing counters count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedUsage {
    pub input: Option<u64>,
    pub output: Option<u64>,
    pub cache_read: Option<u64>,
    pub cache_write: Option<u64>,
    /// Provider-reported total; summed from the counters when absent.
    pub total: Option<u64>,
}

/// One line of the sidecar file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageByModeSidecarLine {
    pub agent_mode: AgentMode,
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Arguments for [`append_usage_by_mode`].
#[derive(Debug, Clone)]
pub struct AppendUsageParams<'a> {
    pub session_file: &'a Path,
    pub agent_mode: Option<AgentMode>,
    pub usage: NormalizedUsage,
    pub total_cost: Option<f64>,
    pub timestamp: Option<i64>,
}

impl UsageByModeSidecarLine {
    /// Build the line for a run, or `None` when the run used no tokens.
    pub fn from_params(params: &AppendUsageParams<'_>) -> Option<Self> {
        let usage = params.usage;
        let input = usage.input.unwrap_or(0);
        let output = usage.output.unwrap_or(0);
        let cache_read = usage.cache_read.unwrap_or(0);
        let cache_write = usage.cache_write.unwrap_or(0);
        let total_tokens = usage.total.unwrap_or_else(|| {
            input
                .saturating_add(output)
                .saturating_add(cache_read)
                .saturating_add(cache_write)
        });

        if total_tokens == 0 && input == 0 && output == 0 {
            return None;
        }

        let total_cost = params
            .total_cost
            .filter(|c| c.is_finite() && *c >= 0.0)
            .unwrap_or(0.0);

        Some(Self {
            agent_mode: params.agent_mode.unwrap_or_default(),
            input,
            output,
            cache_read,
            cache_write,
            total_tokens,
            total_cost,
            timestamp: params
                .timestamp
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
        })
    }
}

/// What happened to a sidecar append.
#[derive(Debug)]
pub enum SidecarAppendOutcome {
    /// A line was appended to the sidecar at this path.
    Appended(PathBuf),
    /// The run reported no usage; nothing was written.
    Skipped,
    /// Writing failed.
    Failed { path: PathBuf, error: std::io::Error },
}

impl SidecarAppendOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, Self::Appended(_))
    }

    /// Drop a failure on the floor. Usage logging must never fail a run.
    pub fn ignore_failure(self) {
        if let Self::Failed { path, error } = self {
            debug!(
                "Usage sidecar append to '{}' failed: {}",
                path.display(),
                error
            );
        }
    }
}

// ============================================================================
// Sidecar I/O
// ============================================================================

/// Sidecar path for a session transcript.
///
/// `/data/sessions/abc123.jsonl` maps to
/// `/data/sessions/abc123.usage-mode.jsonl`. Only a trailing `.jsonl` is
/// stripped from the file name.
pub fn sidecar_path(session_file: &Path) -> PathBuf {
    let name = session_file.file_name().unwrap_or_default();
    let base = match (session_file.file_stem(), session_file.extension()) {
        (Some(stem), Some(ext)) if ext == SESSION_FILE_EXTENSION => stem,
        _ => name,
    };
    let mut file_name = base.to_os_string();
    file_name.push(SIDECAR_SUFFIX);
    match session_file.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Append one run's usage to the session's usage-by-mode sidecar.
///
/// The line goes out in a single append-mode write, so concurrent writers
/// may interleave lines but never split one.
pub fn append_usage_by_mode(params: AppendUsageParams<'_>) -> SidecarAppendOutcome {
    let Some(line) = UsageByModeSidecarLine::from_params(&params) else {
        return SidecarAppendOutcome::Skipped;
    };

    let path = sidecar_path(params.session_file);
    match write_line(&path, &line) {
        Ok(()) => SidecarAppendOutcome::Appended(path),
        Err(error) => SidecarAppendOutcome::Failed { path, error },
    }
}

fn write_line(path: &Path, line: &UsageByModeSidecarLine) -> std::io::Result<()> {
    let mut encoded = serde_json::to_string(line).map_err(std::io::Error::other)?;
    encoded.push('\n');

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(encoded.as_bytes())
}

// ============================================================================
// Tests
// ============================================================================
