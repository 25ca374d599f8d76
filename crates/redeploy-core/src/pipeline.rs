//! Sequential, fail-fast execution of steps.

use std::time::Duration;

use serde::Serialize;

use crate::error::PipelineError;
use crate::runner::CommandRunner;
use crate::step::{FailurePolicy, Step};

/// How a step that did not abort the run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum StepOutcome {
    Succeeded,
    /// Failed under `FailurePolicy::Tolerate`
    Tolerated { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub command: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub steps: Vec<StepRecord>,
}

impl PipelineReport {
    pub fn tolerated(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps
            .iter()
            .filter(|record| matches!(record.outcome, StepOutcome::Tolerated { .. }))
    }
}

/// An ordered list of steps with a fixed pause between them.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Step>,
    delay: Duration,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step in order, stopping at the first fail-fast failure.
    pub fn execute<R: CommandRunner>(&self, runner: &R) -> Result<PipelineReport, PipelineError> {
        let mut report = PipelineReport::default();
        self.execute_into(runner, &mut report)?;
        Ok(report)
    }

    /// Like [`Pipeline::execute`], but records each step into `report` as it
    /// finishes, so completed steps are still there when a later one fails.
    pub fn execute_into<R: CommandRunner>(
        &self,
        runner: &R,
        report: &mut PipelineReport,
    ) -> Result<(), PipelineError> {
        for (index, step) in self.steps.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            let outcome = run_step(step, runner)?;
            report.steps.push(StepRecord {
                name: step.name.clone(),
                command: step.invocation.to_string(),
                outcome,
            });
        }

        Ok(())
    }
}

fn run_step<R: CommandRunner>(step: &Step, runner: &R) -> Result<StepOutcome, PipelineError> {
    let command = step.invocation.to_string();
    tracing::info!(step = %step.name, %command, "Running step");

    let output = match runner.run(&step.invocation) {
        Ok(output) => output,
        Err(source) => {
            return match step.policy {
                FailurePolicy::FailFast => Err(PipelineError::Spawn {
                    step: step.name.clone(),
                    program: step.invocation.program.clone(),
                    source,
                }),
                FailurePolicy::Tolerate => {
                    tracing::warn!(step = %step.name, error = %source, "Step could not start, continuing");
                    Ok(StepOutcome::Tolerated {
                        reason: source.to_string(),
                    })
                }
            };
        }
    };

    if !output.stdout.trim().is_empty() {
        tracing::debug!(step = %step.name, stdout = %output.stdout.trim(), "Step output");
    }

    if output.is_success() {
        tracing::info!(step = %step.name, "Step succeeded");
        return Ok(StepOutcome::Succeeded);
    }

    match step.policy {
        FailurePolicy::FailFast => Err(PipelineError::StepFailed {
            step: step.name.clone(),
            command,
            code: output.code,
            stderr: output.stderr,
        }),
        FailurePolicy::Tolerate => {
            let reason = match output.stderr.trim() {
                "" => match output.code {
                    Some(code) => format!("exit status {}", code),
                    None => "terminated by signal".to_string(),
                },
                stderr => stderr.to_string(),
            };
            tracing::warn!(step = %step.name, %reason, "Step failed, continuing");
            Ok(StepOutcome::Tolerated { reason })
        }
    }
}
