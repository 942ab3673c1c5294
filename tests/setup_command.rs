//! Integration tests for the `setup` command.
//!
//! Each test lays out a private state directory under a temp dir and runs
//! the full read → reconcile → write → provision sequence against it.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use mylobster_setup::commands::{setup_command, SetupError, SetupOptions};
use mylobster_setup::config::{config_backup_path, shorten_home_path, ConfigChange, SetupPaths};
use mylobster_setup::runtime::CapturingRuntime;

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn opts(workspace: Option<&str>) -> SetupOptions {
    SetupOptions {
        workspace: workspace.map(String::from),
    }
}

#[tokio::test]
async fn fresh_setup_writes_config_and_directories() {
    let tmp = TempDir::new().unwrap();
    let paths = SetupPaths::under_state_dir(tmp.path());
    let runtime = CapturingRuntime::new();

    let report = setup_command(&opts(None), &paths, &runtime).await.unwrap();

    assert!(report.config_written);
    assert!(report.config_created);
    assert_eq!(
        runtime.lines(),
        vec![
            format!(
                "Wrote {} (gateway.mode=local, workspace, sessions)",
                shorten_home_path(&paths.config_path)
            ),
            format!(
                "Workspace OK: {}",
                shorten_home_path(Path::new(&paths.default_workspace))
            ),
            format!("Sessions OK: {}", shorten_home_path(&paths.sessions_dir)),
        ]
    );

    assert_eq!(
        read_json(&paths.config_path),
        json!({
            "gateway": {
                "mode": "local",
                "bind": "loopback",
                "reload": {"mode": "hybrid", "debounceMs": 300}
            },
            "agents": {"defaults": {"workspace": paths.default_workspace}}
        })
    );
    assert!(Path::new(&paths.default_workspace).join("AGENTS.md").is_file());
    assert!(Path::new(&paths.default_workspace).join("BOOTSTRAP.md").is_file());
    assert!(paths.sessions_dir.is_dir());
}

#[tokio::test]
async fn second_run_reports_config_ok_and_leaves_file_alone() {
    let tmp = TempDir::new().unwrap();
    let paths = SetupPaths::under_state_dir(tmp.path());

    setup_command(&opts(None), &paths, &CapturingRuntime::new())
        .await
        .unwrap();
    let first = fs::read_to_string(&paths.config_path).unwrap();

    let runtime = CapturingRuntime::new();
    let report = setup_command(&opts(None), &paths, &runtime).await.unwrap();

    assert!(!report.config_written);
    assert!(report.changes.is_empty());
    assert_eq!(
        runtime.lines()[0],
        format!("Config OK: {}", shorten_home_path(&paths.config_path))
    );
    assert_eq!(fs::read_to_string(&paths.config_path).unwrap(), first);
    assert!(!config_backup_path(&paths.config_path).exists());
}

#[tokio::test]
async fn corrupt_config_is_rewritten_from_defaults() {
    let tmp = TempDir::new().unwrap();
    let paths = SetupPaths::under_state_dir(tmp.path());
    fs::create_dir_all(tmp.path()).unwrap();
    fs::write(&paths.config_path, "{ gateway: { mode: ").unwrap();

    let runtime = CapturingRuntime::new();
    let report = setup_command(&opts(None), &paths, &runtime).await.unwrap();

    assert!(report.config_created);
    assert!(runtime.lines()[0].starts_with("Wrote "));
    assert_eq!(read_json(&paths.config_path)["gateway"]["mode"], "local");
    assert_eq!(
        fs::read_to_string(config_backup_path(&paths.config_path)).unwrap(),
        "{ gateway: { mode: "
    );
}

#[tokio::test]
async fn workspace_override_updates_existing_config() {
    let tmp = TempDir::new().unwrap();
    let paths = SetupPaths::under_state_dir(tmp.path());
    let old_ws = tmp.path().join("old-ws");
    fs::write(
        &paths.config_path,
        json!({
            "gateway": {"mode": "local", "bind": "lan", "port": 18789},
            "agents": {"defaults": {"workspace": old_ws}},
            "channels": {"discord": {"enabled": false}}
        })
        .to_string(),
    )
    .unwrap();

    let new_ws = tmp.path().join("new-ws");
    let padded = format!("  {}  ", new_ws.display());
    let runtime = CapturingRuntime::new();
    let report = setup_command(&opts(Some(&padded)), &paths, &runtime)
        .await
        .unwrap();

    assert_eq!(report.changes, vec![ConfigChange::Workspace]);
    assert_eq!(report.workspace_dir, new_ws);
    assert_eq!(
        runtime.lines()[0],
        format!(
            "Updated {} (agents.defaults.workspace)",
            shorten_home_path(&paths.config_path)
        )
    );

    let written = read_json(&paths.config_path);
    assert_eq!(
        written["agents"]["defaults"]["workspace"],
        new_ws.display().to_string()
    );
    assert_eq!(written["gateway"]["bind"], "lan");
    assert_eq!(written["gateway"]["port"], 18789);
    assert_eq!(written["channels"], json!({"discord": {"enabled": false}}));
    assert!(new_ws.join("SOUL.md").is_file());
    assert!(!old_ws.exists());
}

#[tokio::test]
async fn missing_gateway_section_is_reported() {
    let tmp = TempDir::new().unwrap();
    let paths = SetupPaths::under_state_dir(tmp.path());
    fs::write(
        &paths.config_path,
        format!(
            "// hand-written\n{{ agents: {{ defaults: {{ workspace: {:?}, }} }}, }}\n",
            paths.default_workspace
        ),
    )
    .unwrap();

    let runtime = CapturingRuntime::new();
    let report = setup_command(&opts(None), &paths, &runtime).await.unwrap();

    assert_eq!(report.changes, vec![ConfigChange::Gateway]);
    assert_eq!(
        runtime.lines()[0],
        format!("Updated {} (gateway)", shorten_home_path(&paths.config_path))
    );
}

#[tokio::test]
async fn skip_bootstrap_creates_bare_workspace() {
    let tmp = TempDir::new().unwrap();
    let paths = SetupPaths::under_state_dir(tmp.path());
    fs::write(
        &paths.config_path,
        json!({"agents": {"defaults": {"skipBootstrap": true}}}).to_string(),
    )
    .unwrap();

    setup_command(&opts(None), &paths, &CapturingRuntime::new())
        .await
        .unwrap();

    let ws = Path::new(&paths.default_workspace);
    assert!(ws.is_dir());
    assert_eq!(fs::read_dir(ws).unwrap().count(), 0);
    assert_eq!(
        read_json(&paths.config_path)["agents"]["defaults"]["skipBootstrap"],
        true
    );
}

#[tokio::test]
async fn config_write_failure_aborts_before_provisioning() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let mut paths = SetupPaths::under_state_dir(tmp.path().join("state"));
    paths.config_path = blocker.join("mylobster.json");
    let runtime = CapturingRuntime::new();

    let err = setup_command(&opts(None), &paths, &runtime)
        .await
        .unwrap_err();

    match &err {
        SetupError::WriteConfig { path, .. } => assert_eq!(path, &paths.config_path),
        other => panic!("expected WriteConfig, got {other:?}"),
    }
    assert!(err.to_string().contains("mylobster.json"));
    assert!(runtime.lines().is_empty());
    assert!(!Path::new(&paths.default_workspace).exists());
    assert!(!paths.sessions_dir.exists());
}

#[tokio::test]
async fn sessions_failure_keeps_earlier_steps() {
    let tmp = TempDir::new().unwrap();
    let mut paths = SetupPaths::under_state_dir(tmp.path());
    let blocker = tmp.path().join("agents");
    fs::write(&blocker, "not a directory").unwrap();
    paths.sessions_dir = blocker.join("main").join("sessions");

    let runtime = CapturingRuntime::new();
    let err = setup_command(&opts(None), &paths, &runtime)
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::SessionsDir { .. }));
    assert!(paths.config_path.is_file());
    assert!(Path::new(&paths.default_workspace).is_dir());
    assert_eq!(runtime.lines().len(), 2);
}
