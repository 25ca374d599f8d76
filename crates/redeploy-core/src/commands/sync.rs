//! Sync command: force the working tree onto the remote tracking branch.

use serde::Serialize;

use crate::config::{GitConfig, RedeployConfig};
use crate::error::PipelineError;
use crate::pipeline::{Pipeline, PipelineReport};
use crate::runner::CommandRunner;
use crate::sync::sync_steps;
use crate::verify::{SyncVerification, verify_sync};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    #[serde(flatten)]
    pub pipeline: PipelineReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<SyncVerification>,
}

#[derive(Debug, Clone)]
pub struct SyncCommand {
    git: GitConfig,
    pipeline: Pipeline,
}

impl SyncCommand {
    pub fn new(config: &RedeployConfig) -> Self {
        Self {
            git: config.git.clone(),
            pipeline: Pipeline::new(sync_steps(&config.git))
                .with_delay(config.pipeline.step_delay()),
        }
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.git.verify = verify;
        self
    }

    pub fn plan(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn execute<R: CommandRunner>(&self, runner: &R) -> Result<SyncReport, PipelineError> {
        let mut report = SyncReport::default();
        self.execute_into(runner, &mut report)?;
        Ok(report)
    }

    /// Run into a caller-owned report that keeps completed steps on failure.
    pub fn execute_into<R: CommandRunner>(
        &self,
        runner: &R,
        report: &mut SyncReport,
    ) -> Result<(), PipelineError> {
        tracing::info!(
            workdir = %self.git.workdir.display(),
            tracking = %self.git.tracking_ref(),
            "Syncing working tree"
        );
        self.pipeline.execute_into(runner, &mut report.pipeline)?;

        report.verification = if self.git.verify {
            let verification =
                verify_sync(&self.git.workdir, &self.git.remote, &self.git.branch)
                    .map_err(PipelineError::Verify)?;
            if let Some(reason) = verification.mismatch() {
                return Err(PipelineError::Diverged {
                    tracking: self.git.tracking_ref(),
                    reason,
                });
            }
            tracing::info!(commit = %verification.head_commit, "Working tree matches remote");
            Some(verification)
        } else {
            None
        };

        Ok(())
    }
}
