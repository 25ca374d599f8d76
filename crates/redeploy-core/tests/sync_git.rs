//! Sync against real git repositories.

#![cfg(unix)]

mod support;

use redeploy_core::commands::{RebuildCommand, SyncCommand};
use redeploy_core::config::RedeployConfig;
use redeploy_core::error::PipelineError;
use redeploy_core::runner::SystemRunner;
use redeploy_core::verify::verify_sync;

use support::git::{RemoteFixture, commit_file, git_output};
use support::runner::FakeRunner;

fn write_executable(path: &std::path::Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn config_for(fixture: &RemoteFixture) -> RedeployConfig {
    let mut config = RedeployConfig::default();
    config.git.workdir = fixture.work.clone();
    config.pipeline.step_delay_ms = 0;
    config
}

#[test]
fn sync_discards_local_commits_and_untracked_files() {
    let fixture = RemoteFixture::new();
    let remote_head = fixture.push_remote_commit("src/app.txt", "v2\n");

    commit_file(&fixture.work, "local.txt", "local only\n", "local work");
    std::fs::write(fixture.work.join("README.md"), "edited\n").unwrap();
    std::fs::create_dir_all(fixture.work.join("scratch/nested")).unwrap();
    std::fs::write(fixture.work.join("scratch/nested/tmp.txt"), "tmp").unwrap();
    std::fs::write(fixture.work.join("untracked.txt"), "junk").unwrap();

    let report = SyncCommand::new(&config_for(&fixture))
        .execute(&SystemRunner::new())
        .unwrap();

    assert_eq!(fixture.work_head(), remote_head);
    assert!(!fixture.work.join("local.txt").exists());
    assert!(!fixture.work.join("scratch").exists());
    assert!(!fixture.work.join("untracked.txt").exists());
    assert_eq!(
        std::fs::read_to_string(fixture.work.join("README.md")).unwrap(),
        "# app\n"
    );
    assert_eq!(
        std::fs::read_to_string(fixture.work.join("src/app.txt")).unwrap(),
        "v2\n"
    );

    let verification = report.verification.expect("verification enabled by default");
    assert!(verification.is_exact());
    assert_eq!(verification.head_commit, remote_head);
    assert_eq!(git_output(&fixture.work, &["status", "--porcelain"]), "");
}

#[test]
fn sync_keeps_ignored_files() {
    let fixture = RemoteFixture::new();
    std::fs::write(fixture.work.join("prod.env"), "SECRET=1").unwrap();

    let report = SyncCommand::new(&config_for(&fixture))
        .execute(&SystemRunner::new())
        .unwrap();

    assert!(fixture.work.join("prod.env").exists());
    assert!(report.verification.unwrap().is_exact());
}

#[test]
fn sync_switches_back_to_configured_branch() {
    let fixture = RemoteFixture::new();
    support::git::run_git(&fixture.work, &["checkout", "-b", "feature"]);
    commit_file(&fixture.work, "feature.txt", "wip\n", "feature work");

    SyncCommand::new(&config_for(&fixture))
        .execute(&SystemRunner::new())
        .unwrap();

    assert_eq!(
        git_output(&fixture.work, &["rev-parse", "--abbrev-ref", "HEAD"]),
        "main"
    );
    assert!(!fixture.work.join("feature.txt").exists());
}

#[test]
fn unknown_remote_stops_before_reset() {
    let fixture = RemoteFixture::new();
    commit_file(&fixture.work, "local.txt", "keep\n", "local work");
    let local_head = fixture.work_head();

    let mut config = config_for(&fixture);
    config.git.remote = "nowhere".to_string();
    let err = SyncCommand::new(&config)
        .execute(&SystemRunner::new())
        .unwrap_err();

    match &err {
        PipelineError::StepFailed { step, .. } => assert_eq!(step, "fetch"),
        other => panic!("unexpected error: {other}"),
    }
    assert_ne!(err.exit_code(), 0);
    assert_eq!(fixture.work_head(), local_head);
    assert!(fixture.work.join("local.txt").exists());
}

#[test]
fn verify_reports_local_divergence() {
    let fixture = RemoteFixture::new();
    commit_file(&fixture.work, "local.txt", "ahead\n", "local work");
    std::fs::write(fixture.work.join("untracked.txt"), "junk").unwrap();

    let verification = verify_sync(&fixture.work, "origin", "main").unwrap();
    assert!(!verification.is_exact());
    assert!(verification.on_branch());
    assert_ne!(verification.head_commit, verification.tracking_commit);
    assert_eq!(verification.dirty_paths, vec!["untracked.txt".to_string()]);
}

#[test]
fn verify_fails_for_missing_tracking_ref() {
    let fixture = RemoteFixture::new();
    let err = verify_sync(&fixture.work, "origin", "release").unwrap_err();
    assert!(err.to_string().contains("origin/release"));
}

#[test]
fn rebuild_end_to_end_with_stand_in_runtime() {
    let fixture = RemoteFixture::new();
    let remote_head = fixture.push_remote_commit("VERSION", "2\n");

    let mut config = config_for(&fixture);
    config.container.runtime = "true".to_string();
    config.container.compose = vec!["true".to_string()];

    let report = RebuildCommand::new(&config)
        .execute(&SystemRunner::new())
        .unwrap();

    assert_eq!(report.containers.steps.len(), 3);
    assert_eq!(fixture.work_head(), remote_head);
    assert!(report.sync.verification.unwrap().is_exact());
}

#[test]
fn rebuild_runs_external_sync_script() {
    let fixture = RemoteFixture::new();
    let script = fixture.work.join("..").join("sync.sh");
    write_executable(&script, "#!/bin/sh\ntouch synced.marker\n");

    let mut config = config_for(&fixture);
    config.container.runtime = "true".to_string();
    config.container.compose = vec!["true".to_string()];
    config.pipeline.sync_script = Some(script);

    let report = RebuildCommand::new(&config)
        .execute(&SystemRunner::new())
        .unwrap();

    assert!(fixture.work.join("synced.marker").exists());
    assert!(report.sync.verification.is_none());
}

#[test]
fn sync_reports_divergence_when_steps_leave_tree_behind() {
    let fixture = RemoteFixture::new();
    commit_file(&fixture.work, "local.txt", "ahead\n", "local work");

    // Steps "succeed" without touching the tree, so the check must catch it.
    let runner = FakeRunner::new();
    let err = SyncCommand::new(&config_for(&fixture))
        .execute(&runner)
        .unwrap_err();

    assert_eq!(runner.commands().len(), 4);
    match &err {
        PipelineError::Diverged { tracking, reason } => {
            assert_eq!(tracking, "origin/main");
            assert!(reason.contains("but origin/main is at"), "unexpected reason: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn sync_script_shebang_is_honoured() {
    let fixture = RemoteFixture::new();
    let script = fixture.work.join("..").join("sync.sh");
    // `[[ ]]` is not POSIX sh; this only passes when bash runs the script.
    write_executable(
        &script,
        "#!/usr/bin/env bash\nif [[ -d .git ]]; then touch bash.marker; fi\n",
    );

    let mut config = config_for(&fixture);
    config.container.runtime = "true".to_string();
    config.container.compose = vec!["true".to_string()];
    config.pipeline.sync_script = Some(script);

    RebuildCommand::new(&config)
        .execute(&SystemRunner::new())
        .unwrap();

    assert!(fixture.work.join("bash.marker").exists());
}
