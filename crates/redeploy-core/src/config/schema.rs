//! redeploy.toml schema.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedeployConfig {
    pub container: ContainerConfig,
    pub git: GitConfig,
    pub pipeline: PipelineConfig,
}

/// Container runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
    /// Container engine CLI
    pub runtime: String,
    /// Orchestration CLI, as program followed by leading arguments
    pub compose: Vec<String>,
    /// Container force-removed after the managed ones are stopped
    pub container_name: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            compose: vec!["docker".to_string(), "compose".to_string()],
            container_name: "app".to_string(),
        }
    }
}

/// Working tree synchronization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    pub workdir: PathBuf,
    pub remote: String,
    pub branch: String,
    /// Check the tree against the tracking branch after syncing
    pub verify: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            verify: true,
        }
    }
}

impl GitConfig {
    /// Remote tracking ref the branch is reset to, e.g. `origin/main`.
    pub fn tracking_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Pause between consecutive steps, in milliseconds
    pub step_delay_ms: u64,
    /// External sync script run instead of the built-in sync
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_script: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 2000,
            sync_script: None,
        }
    }
}

impl PipelineConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl RedeployConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor relative paths at `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.git.workdir.is_relative() {
            self.git.workdir = normalize_join(base, &self.git.workdir);
        }
        if let Some(script) = self.pipeline.sync_script.take() {
            self.pipeline.sync_script = Some(if script.is_relative() {
                normalize_join(base, &script)
            } else {
                script
            });
        }
        self
    }
}

fn normalize_join(base: &Path, relative: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in relative.components() {
        match component {
            std::path::Component::CurDir => {}
            other => joined.push(other),
        }
    }
    joined
}
