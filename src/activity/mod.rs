//! The activity log: an append-only record of recent assistant edits.
//!
//! The editor-side watcher appends one JSON object per line to
//! `<git-dir>/ai-attribution/activity.jsonl`; both hook processes read it.
//! There is no lock. Appends are a single `write` in append mode and never
//! read first, so concurrent writers interleave whole lines. Trimming writes a
//! fresh file and renames it into place; losing a trim to a racing append is
//! acceptable, corrupting the log is not.

pub mod watcher;

pub use watcher::{ActivitySink, ActivityWatcher, ChangeEvent, ChannelSink, WatcherSettings};

use crate::core::atomic::write_atomic;
use crate::core::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// File name of the activity log inside the state directory.
pub const FILE_NAME: &str = "activity.jsonl";

/// How far in the future an entry may be stamped and still be trusted.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(5);

/// "The assistant was recently active on this file."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// File the activity touched, absolute or repository-relative.
    pub file: PathBuf,
    /// When the activity was observed.
    pub timestamp: DateTime<Utc>,
    /// What produced the entry (`velocity-burst`, `bulk-insert`, ...).
    pub command: String,
}

impl ActivityEntry {
    /// Creates an entry stamped with the current time.
    pub fn now(file: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            timestamp: Utc::now(),
            command: command.into(),
        }
    }
}

/// Outcome of a purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeStats {
    /// Valid entries before the purge.
    pub before: usize,
    /// Entries kept.
    pub after: usize,
}

impl PurgeStats {
    /// Number of entries dropped.
    #[must_use]
    pub const fn removed(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

/// Handle on an activity log file.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    /// Creates a handle for the log at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry as a single line.
    pub fn append(&self, entry: &ActivityEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| Error::serialization("encode activity entry", e))?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("create {}", parent.display()), e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(format!("open {}", self.path.display()), e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| Error::io(format!("append to {}", self.path.display()), e))
    }

    /// Reads every valid entry in file order.
    ///
    /// A missing log is empty. Lines that do not parse are skipped.
    pub fn read_all(&self) -> Result<Vec<ActivityEntry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::ActivityUnavailable {
                    message: format!("{}: {e}", self.path.display()),
                })
            },
        };

        let mut entries = Vec::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ActivityEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::debug!("Skipping malformed activity line {}: {}", number + 1, e);
                    continue;
                },
            }
        }
        Ok(entries)
    }

    /// Drops entries older than `retention` or stamped further ahead than
    /// [`MAX_CLOCK_SKEW`], and keeps at most the newest `max_entries`. The
    /// file is only rewritten when something changed.
    pub fn purge(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
        max_entries: usize,
    ) -> Result<PurgeStats> {
        let entries = self.read_all()?;
        let before = entries.len();

        let cutoff = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|d| now.checked_sub_signed(d));
        let mut kept: Vec<ActivityEntry> = entries
            .into_iter()
            .filter(|e| cutoff.map_or(true, |cutoff| e.timestamp >= cutoff))
            .filter(|e| !is_too_far_ahead(e, now))
            .collect();
        if kept.len() > max_entries {
            kept.drain(..kept.len() - max_entries);
        }

        let stats = PurgeStats {
            before,
            after: kept.len(),
        };
        if stats.removed() == 0 {
            return Ok(stats);
        }

        let mut data = String::new();
        for entry in &kept {
            let line = serde_json::to_string(entry)
                .map_err(|e| Error::serialization("encode activity entry", e))?;
            data.push_str(&line);
            data.push('\n');
        }
        write_atomic(&self.path, data.as_bytes())?;

        tracing::debug!(
            "Purged {} activity entries ({} kept)",
            stats.removed(),
            stats.after
        );
        Ok(stats)
    }
}

/// Returns true when two paths name the same file.
///
/// Paths match when equal, or when one is a component-wise suffix of the
/// other, so an absolute editor path matches the repository-relative path git
/// reports.
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a.as_os_str().is_empty() || b.as_os_str().is_empty() {
        return false;
    }
    a == b || a.ends_with(&b) || b.ends_with(&a)
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Returns true if the entry is stamped more than [`MAX_CLOCK_SKEW`] after `now`.
#[must_use]
pub fn is_too_far_ahead(entry: &ActivityEntry, now: DateTime<Utc>) -> bool {
    chrono::Duration::from_std(MAX_CLOCK_SKEW)
        .ok()
        .and_then(|skew| now.checked_add_signed(skew))
        .is_some_and(|limit| entry.timestamp > limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0)
            .single()
            .expect("valid time")
    }

    fn entry(file: &str, secs: i64) -> ActivityEntry {
        ActivityEntry {
            file: PathBuf::from(file),
            timestamp: at(secs),
            command: "bulk-insert".to_string(),
        }
    }

    fn log_in(temp: &TempDir) -> ActivityLog {
        ActivityLog::new(temp.path().join("state").join(FILE_NAME))
    }

    // =========================================================================
    // Append / read tests
    // =========================================================================

    #[test]
    fn test_missing_log_reads_empty() {
        let temp = TempDir::new().expect("create temp dir");
        assert!(log_in(&temp).read_all().expect("read").is_empty());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let temp = TempDir::new().expect("create temp dir");
        let log = log_in(&temp);
        let written: Vec<_> = (0..5).map(|i| entry(&format!("f{i}.js"), i)).collect();
        for e in &written {
            log.append(e).expect("append");
        }
        assert_eq!(log.read_all().expect("read"), written);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let temp = TempDir::new().expect("create temp dir");
        let log = log_in(&temp);
        log.append(&entry("a.js", 0)).expect("append");
        std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .and_then(|mut f| f.write_all(b"{not json\n\n{\"file\":\"x\"}\n"))
            .expect("corrupt");
        log.append(&entry("b.js", 1)).expect("append");

        let read = log.read_all().expect("read");
        assert_eq!(read, vec![entry("a.js", 0), entry("b.js", 1)]);
    }

    #[test]
    fn test_append_writes_one_line_per_entry() {
        let temp = TempDir::new().expect("create temp dir");
        let log = log_in(&temp);
        log.append(&entry("a.js", 0)).expect("append");
        log.append(&entry("b.js", 0)).expect("append");
        let content = std::fs::read_to_string(log.path()).expect("read");
        assert_eq!(content.lines().count(), 2);
        assert!(content.ends_with('\n'));
    }

    // =========================================================================
    // Purge tests
    // =========================================================================

    #[test]
    fn test_purge_drops_expired() {
        let temp = TempDir::new().expect("create temp dir");
        let log = log_in(&temp);
        log.append(&entry("old.js", 0)).expect("append");
        log.append(&entry("new.js", 90_000)).expect("append");

        let stats = log
            .purge(at(90_000), Duration::from_secs(24 * 3600), 100)
            .expect("purge");
        assert_eq!(stats, PurgeStats { before: 2, after: 1 });
        assert_eq!(log.read_all().expect("read"), vec![entry("new.js", 90_000)]);
    }

    #[test]
    fn test_purge_drops_far_future_entries() {
        let temp = TempDir::new().expect("create temp dir");
        let log = log_in(&temp);
        log.append(&entry("skewed.js", 3)).expect("append");
        log.append(&entry("bogus.js", 3 * 3600)).expect("append");

        let stats = log.purge(at(0), Duration::from_secs(3600), 100).expect("purge");
        assert_eq!(stats, PurgeStats { before: 2, after: 1 });
        assert_eq!(log.read_all().expect("read"), vec![entry("skewed.js", 3)]);
    }

    #[test]
    fn test_purge_caps_to_newest() {
        let temp = TempDir::new().expect("create temp dir");
        let log = log_in(&temp);
        for i in 0..10 {
            log.append(&entry(&format!("f{i}.js"), i)).expect("append");
        }

        let stats = log.purge(at(10), Duration::from_secs(3600), 3).expect("purge");
        assert_eq!(stats.removed(), 7);
        let files: Vec<_> = log
            .read_all()
            .expect("read")
            .into_iter()
            .map(|e| e.file)
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("f7.js"),
                PathBuf::from("f8.js"),
                PathBuf::from("f9.js")
            ]
        );
    }

    #[test]
    fn test_purge_without_changes_leaves_file_alone() {
        let temp = TempDir::new().expect("create temp dir");
        let log = log_in(&temp);
        log.append(&entry("a.js", 0)).expect("append");
        std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .and_then(|mut f| f.write_all(b"garbage\n"))
            .expect("corrupt");

        let stats = log.purge(at(1), Duration::from_secs(3600), 100).expect("purge");
        assert_eq!(stats.removed(), 0);
        let content = std::fs::read_to_string(log.path()).expect("read");
        assert!(content.contains("garbage"));
    }

    #[test]
    fn test_purge_missing_log_is_noop() {
        let temp = TempDir::new().expect("create temp dir");
        let log = log_in(&temp);
        let stats = log.purge(at(0), Duration::from_secs(1), 1).expect("purge");
        assert_eq!(stats, PurgeStats::default());
        assert!(!log.path().exists());
    }

    // =========================================================================
    // Path matching tests
    // =========================================================================

    #[rstest]
    #[case("src/add.js", "src/add.js", true)]
    #[case("./src/add.js", "src/add.js", true)]
    #[case("/home/dev/repo/src/add.js", "src/add.js", true)]
    #[case("src/add.js", "/home/dev/repo/src/add.js", true)]
    #[case("/home/dev/repo/src/add.js", "lib/add.js", false)]
    #[case("src/badd.js", "add.js", false)]
    #[case("", "add.js", false)]
    fn test_same_file(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
        assert_eq!(same_file(Path::new(a), Path::new(b)), expected);
    }
}
