use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

pub fn git_command() -> Command {
    let mut cmd = Command::new("git");
    for key in GIT_ENV_OVERRIDES {
        cmd.env_remove(key);
    }
    cmd
}

pub fn run_git(dir: &Path, args: &[&str]) {
    let status = git_command()
        .args(args)
        .current_dir(dir)
        .status()
        .expect("Failed to invoke git");
    assert!(status.success(), "git command failed: {:?}", args);
}

pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = git_command()
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to invoke git");
    assert!(output.status.success(), "git command failed: {:?}", args);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(repo: &Path) {
    run_git(repo, &["config", "user.email", "test@example.com"]);
    run_git(repo, &["config", "user.name", "Test"]);
    run_git(repo, &["config", "commit.gpgsign", "false"]);
}

pub fn commit_file(repo: &Path, file: &str, content: &str, message: &str) {
    let path = repo.join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
    run_git(repo, &["add", "."]);
    run_git(repo, &["commit", "-m", message]);
}

/// A bare remote on `main`, a seed clone that pushes to it, and a
/// working clone to be synced.
pub struct RemoteFixture {
    _temp: TempDir,
    pub remote: PathBuf,
    pub seed: PathBuf,
    pub work: PathBuf,
}

impl RemoteFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let remote = temp.path().join("remote.git");
        let seed = temp.path().join("seed");
        let work = temp.path().join("work");
        std::fs::create_dir_all(&remote).unwrap();
        std::fs::create_dir_all(&seed).unwrap();

        run_git(&remote, &["init", "--bare"]);
        run_git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        run_git(&seed, &["init"]);
        configure_identity(&seed);
        run_git(&seed, &["checkout", "-b", "main"]);
        commit_file(&seed, "README.md", "# app\n", "initial");
        commit_file(&seed, ".gitignore", "*.env\n", "ignore env files");
        run_git(&seed, &["remote", "add", "origin", remote.to_str().unwrap()]);
        run_git(&seed, &["push", "origin", "main"]);

        run_git(
            temp.path(),
            &["clone", remote.to_str().unwrap(), work.to_str().unwrap()],
        );
        configure_identity(&work);

        Self {
            _temp: temp,
            remote,
            seed,
            work,
        }
    }

    /// Commit on the seed clone and push it to the remote.
    pub fn push_remote_commit(&self, file: &str, content: &str) -> String {
        commit_file(&self.seed, file, content, &format!("update {}", file));
        run_git(&self.seed, &["push", "origin", "main"]);
        git_output(&self.seed, &["rev-parse", "HEAD"])
    }

    pub fn work_head(&self) -> String {
        git_output(&self.work, &["rev-parse", "HEAD"])
    }
}
