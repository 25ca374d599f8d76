//! Configuration loading for redeploy.toml.

mod parser;
mod paths;
mod schema;
mod store;

pub use parser::{parse_redeploy_toml, parse_redeploy_toml_str, to_toml};
pub use paths::{CONFIG_FILE_NAME, global_config_path};
pub use schema::{ContainerConfig, GitConfig, PipelineConfig, RedeployConfig};
pub use store::{ConfigSource, ConfigStore};
