//! Errors that end a run, and the exit status each one maps to.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code used when a program cannot be found or spawned.
pub const EXIT_SPAWN_FAILED: i32 = 127;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A fail-fast step ran and exited nonzero
    #[error("step '{step}' failed ({command}): {}", describe_failure(*code, stderr))]
    StepFailed {
        step: String,
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A fail-fast step could not be started
    #[error("step '{step}' could not start '{program}': {source}")]
    Spawn {
        step: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sync script not found: {}", path.display())]
    SyncScriptMissing { path: PathBuf },

    /// The working tree does not match the remote tracking branch after sync
    #[error("working tree does not match {tracking}: {reason}")]
    Diverged { tracking: String, reason: String },

    #[error("failed to verify working tree: {0:#}")]
    Verify(anyhow::Error),
}

impl PipelineError {
    /// Process exit status for this failure.
    ///
    /// A failing tool's own status is passed through unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StepFailed { code, .. } => match code {
                Some(code) if *code != 0 => *code,
                _ => 1,
            },
            Self::Spawn { .. } => EXIT_SPAWN_FAILED,
            Self::SyncScriptMissing { .. } | Self::Diverged { .. } | Self::Verify(_) => 1,
        }
    }
}

fn describe_failure(code: Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    };
    let stderr = stderr.trim();
    if stderr.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr)
    }
}
