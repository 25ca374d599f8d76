//! Config store for locating and loading redeploy.toml.

use std::path::{Path, PathBuf};

use super::{RedeployConfig, parser, paths};

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path passed on the command line
    Explicit(PathBuf),
    /// redeploy.toml in the project root
    Project(PathBuf),
    /// redeploy.toml in the user config directory
    Global(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Project(path) | Self::Global(path) => Some(path),
            Self::Defaults => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    project_root: PathBuf,
    global_path: Option<PathBuf>,
    explicit_path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn with_defaults() -> anyhow::Result<Self> {
        let project_root = std::env::current_dir()?;
        Ok(Self::from_paths(project_root, paths::global_config_path()))
    }

    pub fn from_paths(project_root: PathBuf, global_path: Option<PathBuf>) -> Self {
        Self {
            project_root,
            global_path,
            explicit_path: None,
        }
    }

    /// Use this file and nothing else; it must exist.
    pub fn with_explicit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Find the config file that `load` would read.
    pub fn locate(&self) -> anyhow::Result<ConfigSource> {
        if let Some(path) = &self.explicit_path {
            let path = if path.is_relative() {
                self.project_root.join(path)
            } else {
                path.clone()
            };
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(ConfigSource::Explicit(path));
        }

        let project = paths::project_config_path(&self.project_root);
        if project.is_file() {
            return Ok(ConfigSource::Project(project));
        }

        if let Some(global) = &self.global_path
            && global.is_file()
        {
            return Ok(ConfigSource::Global(global.clone()));
        }

        Ok(ConfigSource::Defaults)
    }

    /// Load the effective config.
    ///
    /// Relative paths in an explicit or project file are anchored at that
    /// file's directory. A global file is shared by every project, so its
    /// relative paths (and the default workdir) are anchored at the project
    /// root instead of the user config directory.
    pub fn load(&self) -> anyhow::Result<(RedeployConfig, ConfigSource)> {
        let source = self.locate()?;
        let config = match &source {
            ConfigSource::Explicit(path) | ConfigSource::Project(path) => {
                let base = path.parent().unwrap_or(&self.project_root);
                parser::parse_redeploy_toml(path)?.resolve_paths(base)
            }
            ConfigSource::Global(path) => {
                parser::parse_redeploy_toml(path)?.resolve_paths(&self.project_root)
            }
            ConfigSource::Defaults => RedeployConfig::new().resolve_paths(&self.project_root),
        };
        tracing::debug!(?source, "Loaded configuration");
        Ok((config, source))
    }
}
