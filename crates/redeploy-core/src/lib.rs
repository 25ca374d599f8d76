//! Redeploy Core Library
//!
//! Rebuilds an application's containers and force-synchronizes its
//! working tree to a remote branch by driving the container and git CLIs
//! in a fixed, fail-fast sequence.

pub mod commands;
pub mod config;
pub mod container;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod step;
pub mod sync;
pub mod verify;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigStore, ContainerConfig, GitConfig, PipelineConfig, RedeployConfig,
    };

    // Commands
    pub use crate::commands::{
        RebuildCommand, RebuildReport, SyncCommand, SyncReport, SyncTarget,
    };

    // Execution
    pub use crate::error::PipelineError;
    pub use crate::pipeline::{Pipeline, PipelineReport, StepOutcome, StepRecord};
    pub use crate::runner::{CommandOutput, CommandRunner, SystemRunner};
    pub use crate::step::{FailurePolicy, Invocation, Step};

    // Verification
    pub use crate::verify::SyncVerification;
}
