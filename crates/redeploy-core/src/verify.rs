//! Post-sync check that the working tree is exactly the remote branch.

use std::path::Path;

use anyhow::Context;
use git2::{Repository, StatusOptions};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncVerification {
    /// `refs/heads/<branch>` when HEAD is attached to it
    pub head_ref: Option<String>,
    pub head_commit: String,
    pub tracking_ref: String,
    pub tracking_commit: String,
    /// Paths with staged, unstaged or untracked changes; ignored files excluded
    pub dirty_paths: Vec<String>,
    #[serde(skip)]
    expected_head_ref: String,
}

impl SyncVerification {
    pub fn on_branch(&self) -> bool {
        self.head_ref.as_deref() == Some(self.expected_head_ref.as_str())
    }

    pub fn is_exact(&self) -> bool {
        self.on_branch() && self.head_commit == self.tracking_commit && self.dirty_paths.is_empty()
    }

    /// Why the check is not exact, or `None` when it is.
    pub fn mismatch(&self) -> Option<String> {
        if !self.on_branch() {
            let current = self.head_ref.as_deref().unwrap_or("detached HEAD");
            return Some(format!(
                "HEAD is on {} instead of {}",
                current, self.expected_head_ref
            ));
        }
        if self.head_commit != self.tracking_commit {
            return Some(format!(
                "HEAD is at {} but {} is at {}",
                short(&self.head_commit),
                self.tracking_ref,
                short(&self.tracking_commit)
            ));
        }
        if !self.dirty_paths.is_empty() {
            return Some(format!(
                "{} path(s) differ: {}",
                self.dirty_paths.len(),
                self.dirty_paths.join(", ")
            ));
        }
        None
    }
}

/// Compare HEAD and the working tree at `workdir` against `remote/branch`.
pub fn verify_sync(workdir: &Path, remote: &str, branch: &str) -> anyhow::Result<SyncVerification> {
    let repo = Repository::open(workdir)
        .with_context(|| format!("Failed to open repository: {}", workdir.display()))?;

    let head = repo.head().context("Failed to resolve HEAD")?;
    let head_ref = if repo.head_detached()? {
        None
    } else {
        head.name().map(str::to_string)
    };
    let head_commit = head
        .peel_to_commit()
        .context("HEAD does not point to a commit")?
        .id()
        .to_string();

    let tracking_ref = format!("{}/{}", remote, branch);
    let tracking_commit = repo
        .find_reference(&format!("refs/remotes/{}", tracking_ref))
        .with_context(|| format!("Remote tracking ref not found: {}", tracking_ref))?
        .peel_to_commit()?
        .id()
        .to_string();

    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);
    let statuses = repo
        .statuses(Some(&mut options))
        .context("Failed to read working tree status")?;
    let dirty_paths = statuses
        .iter()
        .filter(|entry| !entry.status().is_empty())
        .filter_map(|entry| entry.path().map(str::to_string))
        .collect();

    Ok(SyncVerification {
        head_ref,
        head_commit,
        tracking_ref,
        tracking_commit,
        dirty_paths,
        expected_head_ref: format!("refs/heads/{}", branch),
    })
}

fn short(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}
