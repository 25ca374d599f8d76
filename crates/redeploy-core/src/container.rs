//! Container runtime steps: stop, remove, prune.

use crate::config::ContainerConfig;
use crate::step::{Invocation, Step};

pub const STOP_CONTAINERS: &str = "stop-containers";
pub const REMOVE_CONTAINER: &str = "remove-container";
pub const PRUNE_IMAGES: &str = "prune-images";

/// Steps that take the running application down and clear stale images.
///
/// Removing the named container is tolerated so an already absent
/// container never aborts the rebuild.
pub fn container_steps(config: &ContainerConfig) -> Vec<Step> {
    vec![
        Step::fail_fast(STOP_CONTAINERS, compose_invocation(config).arg("down")),
        Step::tolerant(
            REMOVE_CONTAINER,
            Invocation::new(&config.runtime).args(["rm", "-f", config.container_name.as_str()]),
        ),
        Step::fail_fast(
            PRUNE_IMAGES,
            Invocation::new(&config.runtime).args(["image", "prune", "-f"]),
        ),
    ]
}

fn compose_invocation(config: &ContainerConfig) -> Invocation {
    let mut parts = config.compose.iter();
    let program = parts.next().map(String::as_str).unwrap_or("docker");
    Invocation::new(program).args(parts.cloned())
}
