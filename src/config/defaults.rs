//! Default configuration constants used by setup.

use super::types::{GatewayBindMode, GatewayMode, GatewayReloadConfig};

/// Default gateway mode.
pub const DEFAULT_GATEWAY_MODE: GatewayMode = GatewayMode::Local;

/// Default bind mode.
pub const DEFAULT_BIND_MODE: GatewayBindMode = GatewayBindMode::Loopback;

/// Default config reload debounce.
pub const DEFAULT_RELOAD_DEBOUNCE_MS: u64 = 300;

/// Default agent id for session transcripts.
pub const DEFAULT_AGENT_ID: &str = "main";

/// Name of the state directory under the home directory.
pub const STATE_DIR_NAME: &str = ".mylobster";

/// Config file name inside the state directory.
pub const CONFIG_FILE_NAME: &str = "mylobster.json";

/// Workspace directory name inside the state directory.
pub const WORKSPACE_DIR_NAME: &str = "workspace";

/// Maximum size for a config file (10 MB).
pub const MAX_CONFIG_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// The `gateway.reload` value written when none is configured.
pub fn default_gateway_reload() -> serde_json::Value {
    serde_json::to_value(GatewayReloadConfig::default())
        .unwrap_or_else(|_| serde_json::json!({"mode": "hybrid", "debounceMs": 300}))
}
