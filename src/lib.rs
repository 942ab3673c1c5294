//! MyLobster setup utilities.
//!
//! The `setup` command reconciles the gateway config file and provisions
//! the agent workspace and session directories. The usage-by-mode sidecar
//! writer records per-run token usage next to session transcripts.

pub mod agents;
pub mod cli;
pub mod commands;
pub mod config;
pub mod infra;
pub mod logging;
pub mod runtime;
pub mod sessions;
