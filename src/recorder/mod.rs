//! Where attributed commits end up.
//!
//! The hooks hand every commit to a [`CommitRecorder`]. The shipped
//! implementation, [`JsonlCommitStore`], appends one JSON line per commit to
//! `<git-dir>/ai-attribution/commits.jsonl`.

use crate::core::error::{Error, Result};
use crate::core::git::{CommitInfo, DiffStat};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File name of the commit store inside the state directory.
pub const FILE_NAME: &str = "commits.jsonl";

/// One recorded commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    /// Full commit hash.
    pub hash: String,
    /// Whether the commit is attributed to the assistant.
    pub is_ai_generated: bool,
    /// Insertions minus deletions.
    pub code_volume_delta: i64,
    /// Author name.
    pub author: String,
    /// Author email.
    pub email: String,
    /// Author date.
    pub timestamp: DateTime<Utc>,
    /// Lines inserted.
    pub insertions: u64,
    /// Lines deleted.
    pub deletions: u64,
    /// Commit message as stored (may carry the co-authorship trailer).
    pub message: String,
}

impl CommitRecord {
    /// Builds a record from git metadata.
    pub fn new(commit: &CommitInfo, stat: DiffStat, is_ai_generated: bool) -> Self {
        Self {
            hash: commit.hash.clone(),
            is_ai_generated,
            code_volume_delta: stat.delta(),
            author: commit.author_name.clone(),
            email: commit.author_email.clone(),
            timestamp: commit.timestamp,
            insertions: stat.insertions,
            deletions: stat.deletions,
            message: commit.message.clone(),
        }
    }

    /// Appends `trailer` to the stored message.
    #[must_use]
    pub fn with_trailer(mut self, trailer: &str) -> Self {
        self.message = with_trailer(&self.message, trailer);
        self
    }
}

/// Appends a trailer line to a commit message unless it is already there.
pub fn with_trailer(message: &str, trailer: &str) -> String {
    let body = message.trim_end();
    if body.lines().any(|line| line.trim() == trailer) {
        return body.to_string();
    }
    if body.is_empty() {
        return trailer.to_string();
    }
    format!("{body}\n\n{trailer}")
}

/// Result of handing a commit to a recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The commit was stored.
    Inserted,
    /// A record with the same hash already existed; nothing changed.
    Duplicate,
}

/// Accepts commits. Recording the same hash twice is not an error.
#[cfg_attr(test, mockall::automock)]
pub trait CommitRecorder {
    /// Stores a commit.
    fn record(&self, record: &CommitRecord) -> Result<RecordOutcome>;
}

/// Commit store backed by a JSON-lines file.
#[derive(Debug, Clone)]
pub struct JsonlCommitStore {
    path: PathBuf,
}

impl JsonlCommitStore {
    /// Creates a store for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the store path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record, skipping malformed lines.
    pub fn list(&self) -> Result<Vec<CommitRecord>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(format!("read {}", self.path.display()), e)),
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!("Skipping malformed commit record: {e}");
                    None
                },
            })
            .collect())
    }

    /// Looks up a record by hash.
    pub fn find(&self, hash: &str) -> Result<Option<CommitRecord>> {
        Ok(self.list()?.into_iter().find(|r| r.hash == hash))
    }
}

impl CommitRecorder for JsonlCommitStore {
    fn record(&self, record: &CommitRecord) -> Result<RecordOutcome> {
        if self.find(&record.hash)?.is_some() {
            tracing::debug!("Commit {} already recorded", record.hash);
            return Ok(RecordOutcome::Duplicate);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io("create state dir", e))?;
        }
        let mut line = serde_json::to_string(record)
            .map_err(|e| Error::serialization("encode commit record", e))?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(format!("open {}", self.path.display()), e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| Error::io("append commit record", e))?;
        Ok(RecordOutcome::Inserted)
    }
}
