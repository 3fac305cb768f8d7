//! Best-effort git probes for built-in variables and project context.
//!
//! Built-in variables like `GIT_BRANCH` and `GIT_COMMIT` come from short git
//! invocations. A directory that is not a git repository (or a machine
//! without git) yields `None`, never an error: the corresponding built-ins
//! are simply omitted.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Run a git command and return its trimmed stdout on success.
///
/// Any failure (git missing, non-zero exit, not a repository) returns `None`.
fn probe<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .current_dir(cwd.as_ref())
        .args(args)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() { None } else { Some(stdout) }
}

/// The repository toplevel containing `cwd`, if any.
pub fn toplevel<P: AsRef<Path>>(cwd: P) -> Option<PathBuf> {
    probe(cwd, &["rev-parse", "--show-toplevel"]).map(PathBuf::from)
}

/// The currently checked-out branch name.
pub fn branch<P: AsRef<Path>>(cwd: P) -> Option<String> {
    probe(cwd, &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// The short commit hash of HEAD.
pub fn short_commit<P: AsRef<Path>>(cwd: P) -> Option<String> {
    probe(cwd, &["rev-parse", "--short", "HEAD"])
}

/// The URL of the `origin` remote.
pub fn remote_url<P: AsRef<Path>>(cwd: P) -> Option<String> {
    probe(cwd, &["remote", "get-url", "origin"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn git_in(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(dir)
            .args(args)
            .status()
            .expect("git must be available for tests");
        assert!(status.success(), "git {:?} failed", args);
    }

    fn init_repo(dir: &Path) {
        git_in(dir, &["init", "-q"]);
        git_in(dir, &["config", "user.email", "test@example.com"]);
        git_in(dir, &["config", "user.name", "Test"]);
        fs::write(dir.join("README"), "hello").unwrap();
        git_in(dir, &["add", "."]);
        git_in(dir, &["commit", "-q", "-m", "initial"]);
    }

    #[test]
    fn probes_return_none_outside_a_repository() {
        let temp = TempDir::new().unwrap();
        assert_eq!(branch(temp.path()), None);
        assert_eq!(short_commit(temp.path()), None);
        assert_eq!(remote_url(temp.path()), None);
        assert_eq!(toplevel(temp.path()), None);
    }

    #[test]
    fn probes_report_repository_state() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());

        let top = toplevel(temp.path()).unwrap();
        assert_eq!(
            top.canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );

        let b = branch(temp.path()).unwrap();
        assert!(!b.is_empty());

        let commit = short_commit(temp.path()).unwrap();
        assert!(commit.len() >= 7);
    }

    #[test]
    fn remote_url_reflects_configured_origin() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        git_in(
            temp.path(),
            &["remote", "add", "origin", "https://example.com/team/widget.git"],
        );
        assert_eq!(
            remote_url(temp.path()).as_deref(),
            Some("https://example.com/team/widget.git")
        );
    }
}
