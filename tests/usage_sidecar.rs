//! Integration tests for the usage-by-mode sidecar writer.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use mylobster_setup::infra::{
    append_usage_by_mode, sidecar_path, AgentMode, AppendUsageParams, NormalizedUsage,
    SidecarAppendOutcome, UsageByModeSidecarLine,
};

fn run(session: &Path, mode: Option<AgentMode>, usage: NormalizedUsage) -> SidecarAppendOutcome {
    append_usage_by_mode(AppendUsageParams {
        session_file: session,
        agent_mode: mode,
        usage,
        total_cost: Some(0.01),
        timestamp: Some(1_700_000_000_000),
    })
}

#[test]
fn sidecar_sits_next_to_session_file() {
    assert_eq!(
        sidecar_path(Path::new("/data/sessions/abc123.jsonl")),
        PathBuf::from("/data/sessions/abc123.usage-mode.jsonl")
    );
}

#[test]
fn empty_run_leaves_no_file() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("abc123.jsonl");

    run(&session, Some(AgentMode::Full), NormalizedUsage::default()).ignore_failure();

    assert!(!sidecar_path(&session).exists());
}

#[test]
fn lines_parse_back_into_records() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("abc123.jsonl");
    std::fs::write(&session, "{\"role\":\"user\"}\n").unwrap();

    let usage = NormalizedUsage {
        input: Some(1200),
        output: Some(300),
        cache_read: Some(50),
        cache_write: Some(10),
        total: None,
    };
    assert!(run(&session, Some(AgentMode::Minimal), usage).is_appended());
    assert!(run(&session, None, usage).is_appended());

    let raw = std::fs::read_to_string(sidecar_path(&session)).unwrap();
    let lines: Vec<UsageByModeSidecarLine> = raw
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].agent_mode, AgentMode::Minimal);
    assert_eq!(lines[0].total_tokens, 1560);
    assert_eq!(lines[1].agent_mode, AgentMode::Inherit);
    assert!(raw.contains(r#""agentMode":"inherit""#));
    // The transcript itself is never touched.
    assert_eq!(
        std::fs::read_to_string(&session).unwrap(),
        "{\"role\":\"user\"}\n"
    );
}

#[test]
fn concurrent_appends_keep_lines_whole() {
    let tmp = TempDir::new().unwrap();
    let session = Arc::new(tmp.path().join("shared.jsonl"));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    let usage = NormalizedUsage {
                        input: Some(i + 1),
                        output: Some(1),
                        ..Default::default()
                    };
                    run(&session, Some(AgentMode::Full), usage).ignore_failure();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let raw = std::fs::read_to_string(sidecar_path(&session)).unwrap();
    let count = raw
        .lines()
        .map(|l| serde_json::from_str::<UsageByModeSidecarLine>(l).unwrap())
        .count();
    assert_eq!(count, 200);
}
