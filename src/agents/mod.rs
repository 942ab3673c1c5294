pub mod workspace;

pub use workspace::{ensure_agent_workspace, AgentWorkspace, EnsureWorkspaceOptions};
