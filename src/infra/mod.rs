pub mod usage_by_mode;

pub use usage_by_mode::{
    append_usage_by_mode, sidecar_path, AgentMode, AppendUsageParams, NormalizedUsage,
    SidecarAppendOutcome, UsageByModeSidecarLine,
};
