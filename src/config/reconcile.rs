//! Setup-time config reconciliation.
//!
//! Layers the caller's workspace override, the existing config and the
//! built-in defaults into the config setup wants on disk, and decides
//! whether it needs to be written. Pure: no I/O, no environment access.

use serde_json::{Map, Value};

use super::{
    default_gateway_reload, ConfigFileRaw, GatewayBindMode, GatewayMode, GatewayReloadConfig,
    DEFAULT_BIND_MODE, DEFAULT_GATEWAY_MODE,
};

/// A config section setup changed, reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Workspace,
    Gateway,
}

impl ConfigChange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "agents.defaults.workspace",
            Self::Gateway => "gateway",
        }
    }
}

impl std::fmt::Display for ConfigChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`reconcile_setup_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct SetupReconciliation {
    /// The config setup wants on disk.
    pub next: Value,
    /// Resolved agent workspace, as written into `agents.defaults.workspace`.
    pub workspace: String,
    /// True when there was no usable config file before.
    pub created: bool,
    /// True when `next` has to be persisted.
    pub write_required: bool,
    /// Sections that changed in an existing file. Empty for a fresh file.
    pub changes: Vec<ConfigChange>,
}

impl SetupReconciliation {
    /// Whether `agents.defaults.skipBootstrap` is set in the reconciled config.
    pub fn skip_bootstrap(&self) -> bool {
        self.next
            .pointer("/agents/defaults/skipBootstrap")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Trim a caller-supplied workspace; blank means "not supplied".
pub fn normalize_workspace_override(workspace: Option<&str>) -> Option<&str> {
    workspace.map(str::trim).filter(|w| !w.is_empty())
}

/// Compute the config setup should leave on disk.
///
/// `gateway.mode`, `gateway.bind` and `gateway.reload` are filled in only
/// when absent (`reload` as a whole object). `agents.defaults.workspace` is
/// the override, else the existing value, else `default_workspace`. All
/// other keys pass through untouched.
pub fn reconcile_setup_config(
    existing: &ConfigFileRaw,
    workspace_override: Option<&str>,
    default_workspace: &str,
) -> SetupReconciliation {
    let cfg = &existing.parsed;
    let gateway = object_at(cfg, "gateway");
    let agents = object_at(cfg, "agents");
    let defaults = agents.and_then(|a| object_at(a, "defaults"));

    let prior_workspace = defaults.and_then(|d| present(d, "workspace"));
    let existing_workspace = prior_workspace
        .and_then(Value::as_str)
        .filter(|w| !w.trim().is_empty());
    let workspace = normalize_workspace_override(workspace_override)
        .or(existing_workspace)
        .unwrap_or(default_workspace)
        .to_string();

    let prior_mode = gateway.and_then(|g| present(g, "mode"));
    let prior_bind = gateway.and_then(|g| present(g, "bind"));

    let mut next_gateway = gateway.cloned().unwrap_or_default();
    let next_mode = prior_mode
        .cloned()
        .unwrap_or_else(|| Value::from(DEFAULT_GATEWAY_MODE.as_str()));
    let next_bind = prior_bind
        .cloned()
        .unwrap_or_else(|| Value::from(DEFAULT_BIND_MODE.as_str()));
    let next_reload = gateway
        .and_then(|g| present(g, "reload"))
        .cloned()
        .unwrap_or_else(default_gateway_reload);
    next_gateway.insert("mode".into(), next_mode.clone());
    next_gateway.insert("bind".into(), next_bind.clone());
    next_gateway.insert("reload".into(), next_reload);

    let mut next_defaults = defaults.cloned().unwrap_or_default();
    next_defaults.insert("workspace".into(), Value::from(workspace.clone()));
    let mut next_agents = agents.cloned().unwrap_or_default();
    next_agents.insert("defaults".into(), Value::Object(next_defaults));

    let mut next = cfg.clone();
    next.insert("gateway".into(), Value::Object(next_gateway));
    next.insert("agents".into(), Value::Object(next_agents));

    let created = !existing.exists;
    let workspace_changed = prior_workspace != Some(&Value::from(workspace.as_str()));
    let gateway_changed =
        created || prior_mode != Some(&next_mode) || prior_bind != Some(&next_bind);

    let mut changes = Vec::new();
    if !created {
        if workspace_changed {
            changes.push(ConfigChange::Workspace);
        }
        if gateway_changed {
            changes.push(ConfigChange::Gateway);
        }
    }

    SetupReconciliation {
        next: Value::Object(next),
        workspace,
        created,
        write_required: created || workspace_changed || gateway_changed,
        changes,
    }
}

/// Describe gateway values in `next` the gateway would not accept.
///
/// Setup keeps existing values as they are; these are only surfaced so the
/// operator can fix them by hand.
pub fn gateway_shape_warnings(next: &Value) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some(gateway) = next.get("gateway").and_then(Value::as_object) else {
        return warnings;
    };

    if let Some(mode) = present(gateway, "mode") {
        if let Err(e) = parse_str::<GatewayMode>(mode) {
            warnings.push(format!("gateway.mode: {e}"));
        }
    }
    if let Some(bind) = present(gateway, "bind") {
        if let Err(e) = parse_str::<GatewayBindMode>(bind) {
            warnings.push(format!("gateway.bind: {e}"));
        }
    }
    if let Some(reload) = present(gateway, "reload") {
        if let Err(e) = serde_json::from_value::<GatewayReloadConfig>(reload.clone()) {
            warnings.push(format!("gateway.reload: {e}"));
        }
    }
    warnings
}

fn parse_str<T>(value: &Value) -> Result<T, String>
where
    T: std::str::FromStr<Err = String>,
{
    match value.as_str() {
        Some(s) => s.parse(),
        None => Err(format!("expected a string, got {value}")),
    }
}

/// Nested object under `key`; non-objects read as absent.
fn object_at<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

/// Value under `key`, treating `null` like a missing key.
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}
