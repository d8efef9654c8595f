//! Git repository operations.
//!
//! This module provides utilities for interacting with Git repositories:
//! finding the repository root and hooks directory, reading the text added
//! by the staged diff, and reading metadata of the commit just made.

use crate::core::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Name of the per-repository state directory inside the git dir.
pub const STATE_DIR_NAME: &str = "ai-attribution";

/// Represents a Git repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Root directory of the repository (where .git is).
    root: PathBuf,
    /// Path to the .git directory (or file for worktrees).
    git_dir: PathBuf,
}

/// Text added to one file by the staged diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedChange {
    /// Repository-relative path.
    pub path: PathBuf,
    /// Added lines joined with `\n`.
    pub added: String,
}

/// Metadata of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full commit hash.
    pub hash: String,
    /// Author name.
    pub author_name: String,
    /// Author email.
    pub author_email: String,
    /// Author date.
    pub timestamp: DateTime<Utc>,
    /// Full commit message.
    pub message: String,
}

/// Line counts of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStat {
    /// Lines inserted.
    pub insertions: u64,
    /// Lines deleted.
    pub deletions: u64,
}

impl DiffStat {
    /// Net change in lines.
    #[must_use]
    pub fn delta(&self) -> i64 {
        let insertions = i64::try_from(self.insertions).unwrap_or(i64::MAX);
        let deletions = i64::try_from(self.deletions).unwrap_or(i64::MAX);
        insertions.saturating_sub(deletions)
    }
}

impl GitRepo {
    /// Discovers the Git repository from the current directory.
    pub fn discover() -> Result<Self> {
        Self::discover_from(&std::env::current_dir().map_err(|e| Error::io("get current dir", e))?)
    }

    /// Discovers the Git repository from a specific path.
    pub fn discover_from(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel", "--git-dir"])
            .current_dir(path)
            .output()
            .map_err(|e| Error::io("run git rev-parse", e))?;

        if !output.status.success() {
            return Err(Error::NotGitRepo);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines();

        let root = lines.next().map(PathBuf::from).ok_or(Error::NotGitRepo)?;

        let git_dir = lines
            .next()
            .map(|s| {
                let p = PathBuf::from(s);
                if p.is_absolute() {
                    p
                } else {
                    path.join(p)
                }
            })
            .ok_or(Error::NotGitRepo)?;

        Ok(Self { root, git_dir })
    }

    /// Returns the root directory of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .git directory path.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Returns the directory holding the activity log, flag and session files.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.git_dir.join(STATE_DIR_NAME)
    }

    /// Returns the hooks directory path.
    #[must_use]
    pub fn hooks_dir(&self) -> PathBuf {
        // Check for custom hooks path first
        if let Ok(output) = Command::new("git")
            .args(["config", "--get", "core.hooksPath"])
            .current_dir(&self.root)
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    let hooks_path = PathBuf::from(&path);
                    if hooks_path.is_absolute() {
                        return hooks_path;
                    }
                    return self.root.join(hooks_path);
                }
            }
        }

        self.git_dir.join("hooks")
    }

    /// Returns the path to a specific hook.
    #[must_use]
    pub fn hook_path(&self, hook_name: &str) -> PathBuf {
        self.hooks_dir().join(hook_name)
    }

    /// Returns the text added by the staged diff, per file.
    pub fn staged_changes(&self) -> Result<Vec<StagedChange>> {
        let output = self.git(
            "diff --cached",
            &[
                "diff",
                "--cached",
                "--unified=0",
                "--no-color",
                "--no-ext-diff",
                "--src-prefix=a/",
                "--dst-prefix=b/",
                "--diff-filter=ACMR",
            ],
        )?;
        Ok(parse_staged_diff(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Returns metadata of `HEAD`.
    pub fn last_commit(&self) -> Result<CommitInfo> {
        let output = self.git(
            "log -1",
            &["log", "-1", "--format=%H%x00%an%x00%ae%x00%aI%x00%B"],
        )?;
        parse_commit_info(&String::from_utf8_lossy(&output.stdout))
    }

    /// Returns inserted and deleted line counts of a commit.
    pub fn diff_stat(&self, rev: &str) -> Result<DiffStat> {
        let output = self.git("show --numstat", &["show", "--numstat", "--format=", rev])?;
        Ok(parse_numstat(&String::from_utf8_lossy(&output.stdout)))
    }

    fn git(&self, operation: &str, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::io(format!("run git {operation}"), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git(operation, stderr.trim().to_string()));
        }

        Ok(output)
    }
}

/// Collects added lines per file from `git diff --unified=0` output.
///
/// File headers are only recognized between a `diff --git` line and the
/// first hunk, so added lines that happen to start with `++` are kept.
/// Files with no added text are omitted.
#[must_use]
pub fn parse_staged_diff(diff: &str) -> Vec<StagedChange> {
    let mut changes: Vec<StagedChange> = Vec::new();
    let mut current: Option<(PathBuf, Vec<&str>)> = None;
    let mut in_header = false;

    let mut finish = |current: &mut Option<(PathBuf, Vec<&str>)>| {
        if let Some((path, lines)) = current.take() {
            let added = lines.join("\n");
            if !added.is_empty() {
                changes.push(StagedChange { path, added });
            }
        }
    };

    for line in diff.lines() {
        if line.starts_with("diff --git ") {
            finish(&mut current);
            in_header = true;
            continue;
        }

        if in_header {
            if let Some(target) = line.strip_prefix("+++ ") {
                current = diff_path(target).map(|path| (path, Vec::new()));
            } else if line.starts_with("@@") {
                in_header = false;
            }
            continue;
        }

        if line.starts_with("@@") {
            continue;
        }
        if let (Some(added), Some((_, lines))) = (line.strip_prefix('+'), current.as_mut()) {
            lines.push(added);
        }
    }
    finish(&mut current);

    changes
}

fn diff_path(target: &str) -> Option<PathBuf> {
    let target = target.trim_end();
    if target == "/dev/null" {
        return None;
    }
    let target = target
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(target);
    Some(PathBuf::from(target.strip_prefix("b/").unwrap_or(target)))
}

/// Parses `git log -1 --format=%H%x00%an%x00%ae%x00%aI%x00%B` output.
pub fn parse_commit_info(output: &str) -> Result<CommitInfo> {
    let mut fields = output.splitn(5, '\0');
    let mut next = |name: &str| {
        fields
            .next()
            .ok_or_else(|| Error::git("log -1", format!("missing {name} in commit metadata")))
    };

    let hash = next("hash")?.trim().to_string();
    let author_name = next("author name")?.to_string();
    let author_email = next("author email")?.to_string();
    let date = next("author date")?;
    let message = next("message")?.trim_end().to_string();

    if hash.is_empty() {
        return Err(Error::git("log -1", "empty commit hash"));
    }

    let timestamp = DateTime::parse_from_rfc3339(date.trim())
        .map_err(|e| Error::git("log -1", format!("invalid author date '{date}': {e}")))?
        .with_timezone(&Utc);

    Ok(CommitInfo {
        hash,
        author_name,
        author_email,
        timestamp,
        message,
    })
}

/// Sums `git show --numstat` output. Binary files (`-`) count as zero.
#[must_use]
pub fn parse_numstat(output: &str) -> DiffStat {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let insertions = parts.next()?;
            let deletions = parts.next()?;
            parts.next()?;
            Some((
                insertions.parse::<u64>().unwrap_or(0),
                deletions.parse::<u64>().unwrap_or(0),
            ))
        })
        .fold(DiffStat::default(), |acc, (ins, del)| DiffStat {
            insertions: acc.insertions + ins,
            deletions: acc.deletions + del,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn git(path: &Path, args: &[&str]) {
        Command::new("git")
            .args(args)
            .current_dir(path)
            .output()
            .expect("run git");
    }

    fn create_test_repo() -> (TempDir, GitRepo) {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path();

        git(path, &["init"]);
        git(path, &["config", "user.email", "test@test.com"]);
        git(path, &["config", "user.name", "Test"]);
        git(path, &["config", "commit.gpgsign", "false"]);

        let repo = GitRepo::discover_from(path).expect("discover repo");
        (temp, repo)
    }

    // =========================================================================
    // Discovery tests
    // =========================================================================

    #[test]
    fn test_discover_repo() {
        let (_temp, repo) = create_test_repo();
        assert!(repo.root().exists());
        assert!(repo.git_dir().exists());
        assert!(repo.state_dir().ends_with(STATE_DIR_NAME));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let (temp, _) = create_test_repo();

        let subdir = temp.path().join("src/lib");
        std::fs::create_dir_all(&subdir).expect("create subdir");

        let repo = GitRepo::discover_from(&subdir).expect("discover from subdir");
        // Canonicalize both paths to handle macOS /var -> /private/var symlinks
        let expected = temp.path().canonicalize().expect("canonicalize temp");
        let actual = repo.root().canonicalize().expect("canonicalize root");
        assert_eq!(actual, expected);
        assert!(repo.git_dir().exists());
    }

    #[test]
    fn test_not_git_repo() {
        let temp = TempDir::new().expect("create temp dir");
        let result = GitRepo::discover_from(temp.path());
        assert!(matches!(result, Err(Error::NotGitRepo)));
    }

    // =========================================================================
    // Hooks tests
    // =========================================================================

    #[test]
    fn test_hook_path() {
        let (_temp, repo) = create_test_repo();
        for hook_name in ["pre-commit", "post-commit"] {
            let hook_path = repo.hook_path(hook_name);
            assert!(hook_path.ends_with(hook_name));
            assert!(hook_path.to_string_lossy().contains("hooks"));
        }
    }

    #[test]
    fn test_custom_hooks_path() {
        let (temp, repo) = create_test_repo();
        git(temp.path(), &["config", "core.hooksPath", ".githooks"]);
        assert!(repo.hooks_dir().ends_with(".githooks"));
    }

    // =========================================================================
    // Diff parsing tests
    // =========================================================================

    #[test]
    fn test_parse_new_and_modified_files() {
        let diff = "\
diff --git a/src/add.js b/src/add.js
new file mode 100644
index 0000000..1111111
--- /dev/null
+++ b/src/add.js
@@ -0,0 +1,2 @@
+function add(a,b){return a+b;}
+export default add;
diff --git a/README.md b/README.md
index 2222222..3333333 100644
--- a/README.md
+++ b/README.md
@@ -1 +1 @@
-old title
+new title
@@ -5,0 +6 @@
+footer
";
        let changes = parse_staged_diff(diff);
        assert_eq!(
            changes,
            vec![
                StagedChange {
                    path: PathBuf::from("src/add.js"),
                    added: "function add(a,b){return a+b;}\nexport default add;".to_string(),
                },
                StagedChange {
                    path: PathBuf::from("README.md"),
                    added: "new title\nfooter".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_keeps_added_lines_that_look_like_headers() {
        let diff = "\
diff --git a/notes.md b/notes.md
--- a/notes.md
+++ b/notes.md
@@ -1 +1 @@
--- removed
+++ added
";
        let changes = parse_staged_diff(diff);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].added, "++ added");
    }

    #[test]
    fn test_parse_skips_pure_deletions() {
        let diff = "\
diff --git a/a.js b/a.js
--- a/a.js
+++ b/a.js
@@ -1 +0,0 @@
-gone
";
        assert!(parse_staged_diff(diff).is_empty());
    }

    #[test]
    fn test_parse_quoted_path() {
        let diff = "diff --git \"a/my file.js\" \"b/my file.js\"\n--- /dev/null\n+++ \"b/my file.js\"\n@@ -0,0 +1 @@\n+x\n";
        assert_eq!(parse_staged_diff(diff)[0].path, PathBuf::from("my file.js"));
    }

    #[test]
    fn test_parse_numstat() {
        let output = "3\t1\tsrc/a.rs\n-\t-\tlogo.png\n10\t0\tsrc/b.rs\n";
        let stat = parse_numstat(output);
        assert_eq!(
            stat,
            DiffStat {
                insertions: 13,
                deletions: 1
            }
        );
        assert_eq!(stat.delta(), 12);
    }

    #[test]
    fn test_delta_can_be_negative() {
        let stat = DiffStat {
            insertions: 2,
            deletions: 9,
        };
        assert_eq!(stat.delta(), -7);
    }

    #[test]
    fn test_parse_commit_info() {
        let output = "abc123\0Dev\0dev@example.com\02026-03-01T12:00:00+01:00\0Add feature\n\nBody\n";
        let info = parse_commit_info(output).expect("parse");
        assert_eq!(info.hash, "abc123");
        assert_eq!(info.author_email, "dev@example.com");
        assert_eq!(info.message, "Add feature\n\nBody");
        assert_eq!(info.timestamp.to_rfc3339(), "2026-03-01T11:00:00+00:00");
    }

    #[test]
    fn test_parse_commit_info_truncated() {
        assert!(matches!(
            parse_commit_info("abc123\0Dev"),
            Err(Error::GitOperation { .. })
        ));
    }

    // =========================================================================
    // Repository round-trip tests
    // =========================================================================

    #[test]
    fn test_staged_changes_empty() {
        let (_temp, repo) = create_test_repo();
        assert!(repo.staged_changes().expect("staged changes").is_empty());
    }

    #[test]
    fn test_staged_changes_with_file() {
        let (temp, repo) = create_test_repo();
        std::fs::write(temp.path().join("app.py"), "def run():\n    pass\n").expect("write file");
        git(temp.path(), &["add", "app.py"]);

        let changes = repo.staged_changes().expect("staged changes");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, PathBuf::from("app.py"));
        assert_eq!(changes[0].added, "def run():\n    pass");
    }

    #[test]
    fn test_last_commit_and_stat() {
        let (temp, repo) = create_test_repo();
        std::fs::write(temp.path().join("a.txt"), "one\ntwo\nthree\n").expect("write file");
        git(temp.path(), &["add", "."]);
        git(temp.path(), &["commit", "-m", "initial"]);

        let info = repo.last_commit().expect("last commit");
        assert_eq!(info.message, "initial");
        assert_eq!(info.author_name, "Test");
        assert_eq!(info.hash.len(), 40);

        let stat = repo.diff_stat(&info.hash).expect("diff stat");
        assert_eq!(stat.insertions, 3);
        assert_eq!(stat.deletions, 0);
    }

    #[test]
    fn test_last_commit_without_commits_fails() {
        let (_temp, repo) = create_test_repo();
        assert!(matches!(
            repo.last_commit(),
            Err(Error::GitOperation { .. })
        ));
    }
}
