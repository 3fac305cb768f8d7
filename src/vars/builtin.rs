//! Built-in variables: clock, project, and git-derived values.
//!
//! Built-ins are always available and require no configuration. All
//! date/time fields come from a single captured timestamp so they are
//! consistent within one invocation. Git-derived keys are best-effort:
//! outside a repository they are omitted, never errors.

use crate::git;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::path::Path;

/// Compute the built-in variable layer for a project root.
///
/// Keys produced:
///
/// - `CURRENT_DATE`, `CURRENT_TIME`, `CURRENT_DATETIME`, `CURRENT_YEAR`,
///   `CURRENT_MONTH`, `CURRENT_DAY` - from one captured local timestamp
/// - `PROJECT_NAME` - remote URL basename if the project has an `origin`,
///   else the root directory name
/// - `PROJECT_ROOT` - the absolute project root path
/// - `GIT_BRANCH`, `GIT_COMMIT` - present only inside a git repository
pub fn builtin_variables(root: &Path) -> BTreeMap<String, String> {
    builtin_variables_at(Local::now(), root)
}

/// Like [`builtin_variables`] with an explicit timestamp, for tests.
pub fn builtin_variables_at(now: DateTime<Local>, root: &Path) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();

    vars.insert("CURRENT_DATE".to_string(), now.format("%Y-%m-%d").to_string());
    vars.insert("CURRENT_TIME".to_string(), now.format("%H:%M:%S").to_string());
    vars.insert("CURRENT_DATETIME".to_string(), now.to_rfc3339());
    vars.insert("CURRENT_YEAR".to_string(), now.format("%Y").to_string());
    vars.insert("CURRENT_MONTH".to_string(), now.format("%m").to_string());
    vars.insert("CURRENT_DAY".to_string(), now.format("%d").to_string());

    vars.insert("PROJECT_NAME".to_string(), project_name(root));
    vars.insert("PROJECT_ROOT".to_string(), root.display().to_string());

    if let Some(branch) = git::branch(root) {
        vars.insert("GIT_BRANCH".to_string(), branch);
    }
    if let Some(commit) = git::short_commit(root) {
        vars.insert("GIT_COMMIT".to_string(), commit);
    }

    vars
}

/// Derive the project name from the origin remote, else the directory name.
fn project_name(root: &Path) -> String {
    if let Some(url) = git::remote_url(root)
        && let Some(name) = name_from_remote_url(&url)
    {
        return name;
    }

    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// Extract the repository name from a remote URL.
///
/// Handles both `https://host/team/repo.git` and `git@host:team/repo.git`.
fn name_from_remote_url(url: &str) -> Option<String> {
    let tail = url.rsplit(['/', ':']).next()?;
    let name = tail.trim_end_matches(".git").trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 14, 30, 5).unwrap()
    }

    #[test]
    fn clock_fields_come_from_one_timestamp() {
        let temp = TempDir::new().unwrap();
        let vars = builtin_variables_at(fixed_now(), temp.path());

        assert_eq!(vars["CURRENT_DATE"], "2024-03-07");
        assert_eq!(vars["CURRENT_TIME"], "14:30:05");
        assert_eq!(vars["CURRENT_YEAR"], "2024");
        assert_eq!(vars["CURRENT_MONTH"], "03");
        assert_eq!(vars["CURRENT_DAY"], "07");
        assert!(vars["CURRENT_DATETIME"].starts_with("2024-03-07T14:30:05"));
    }

    #[test]
    fn project_fields_fall_back_to_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("widget");
        std::fs::create_dir(&root).unwrap();

        let vars = builtin_variables_at(fixed_now(), &root);
        assert_eq!(vars["PROJECT_NAME"], "widget");
        assert_eq!(vars["PROJECT_ROOT"], root.display().to_string());
    }

    #[test]
    fn git_keys_are_omitted_outside_a_repository() {
        let temp = TempDir::new().unwrap();
        let vars = builtin_variables_at(fixed_now(), temp.path());
        assert!(!vars.contains_key("GIT_BRANCH"));
        assert!(!vars.contains_key("GIT_COMMIT"));
    }

    #[test]
    fn remote_url_name_extraction() {
        assert_eq!(
            name_from_remote_url("https://example.com/team/widget.git").as_deref(),
            Some("widget")
        );
        assert_eq!(
            name_from_remote_url("git@example.com:team/widget.git").as_deref(),
            Some("widget")
        );
        assert_eq!(
            name_from_remote_url("https://example.com/team/widget").as_deref(),
            Some("widget")
        );
        assert_eq!(name_from_remote_url(""), None);
    }
}
