//! Git steps that force the working tree onto the remote branch.

use crate::config::GitConfig;
use crate::step::{Invocation, Step};

/// Variables that would redirect git away from the configured workdir.
const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

/// checkout, fetch, hard reset, clean; all fail-fast.
pub fn sync_steps(config: &GitConfig) -> Vec<Step> {
    let tracking = config.tracking_ref();
    vec![
        Step::fail_fast("checkout", git(config, ["checkout", config.branch.as_str()])),
        Step::fail_fast("fetch", git(config, ["fetch", config.remote.as_str()])),
        Step::fail_fast("reset", git(config, ["reset", "--hard", tracking.as_str()])),
        Step::fail_fast("clean", git(config, ["clean", "-fd"])),
    ]
}

fn git<const N: usize>(config: &GitConfig, args: [&str; N]) -> Invocation {
    Invocation::new("git")
        .args(args)
        .current_dir(&config.workdir)
        .env_remove(GIT_ENV_OVERRIDES)
}
