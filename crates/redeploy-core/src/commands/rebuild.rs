//! Rebuild command: take the containers down, then sync.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use super::sync::{SyncCommand, SyncReport};
use crate::config::RedeployConfig;
use crate::container::container_steps;
use crate::error::PipelineError;
use crate::pipeline::{Pipeline, PipelineReport};
use crate::runner::CommandRunner;
use crate::step::{Invocation, Step};

pub const SYNC_SCRIPT_STEP: &str = "sync-script";

/// What rebuild hands over to once the containers are down.
#[derive(Debug, Clone)]
pub enum SyncTarget {
    Builtin(SyncCommand),
    /// External executable, run directly inside `workdir` so its shebang applies
    Script { path: PathBuf, workdir: PathBuf },
}

impl SyncTarget {
    fn script_step(path: &Path, workdir: &Path) -> Step {
        Step::fail_fast(
            SYNC_SCRIPT_STEP,
            Invocation::new(path.to_string_lossy()).current_dir(workdir),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RebuildReport {
    pub containers: PipelineReport,
    pub sync: SyncReport,
}

#[derive(Debug, Clone)]
pub struct RebuildCommand {
    containers: Pipeline,
    sync: SyncTarget,
    delay: Duration,
}

impl RebuildCommand {
    pub fn new(config: &RedeployConfig) -> Self {
        let delay = config.pipeline.step_delay();
        let sync = match &config.pipeline.sync_script {
            Some(path) => SyncTarget::Script {
                path: path.clone(),
                workdir: config.git.workdir.clone(),
            },
            None => SyncTarget::Builtin(SyncCommand::new(config)),
        };
        Self {
            containers: Pipeline::new(container_steps(&config.container)).with_delay(delay),
            sync,
            delay,
        }
    }

    pub fn sync_target(&self) -> &SyncTarget {
        &self.sync
    }

    /// Every step in run order, without running anything.
    pub fn plan(&self) -> Vec<Step> {
        let mut steps = self.containers.steps().to_vec();
        match &self.sync {
            SyncTarget::Builtin(sync) => steps.extend(sync.plan().steps().iter().cloned()),
            SyncTarget::Script { path, workdir } => {
                steps.push(SyncTarget::script_step(path, workdir))
            }
        }
        steps
    }

    pub fn execute<R: CommandRunner>(&self, runner: &R) -> Result<RebuildReport, PipelineError> {
        let mut report = RebuildReport::default();
        self.execute_into(runner, &mut report)?;
        Ok(report)
    }

    /// Run into a caller-owned report that keeps completed steps on failure.
    pub fn execute_into<R: CommandRunner>(
        &self,
        runner: &R,
        report: &mut RebuildReport,
    ) -> Result<(), PipelineError> {
        self.containers.execute_into(runner, &mut report.containers)?;

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        match &self.sync {
            SyncTarget::Builtin(sync) => sync.execute_into(runner, &mut report.sync),
            SyncTarget::Script { path, workdir } => {
                if !path.is_file() {
                    return Err(PipelineError::SyncScriptMissing { path: path.clone() });
                }
                Pipeline::new(vec![SyncTarget::script_step(path, workdir)])
                    .execute_into(runner, &mut report.sync.pipeline)
            }
        }
    }
}
