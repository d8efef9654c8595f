//! Editor-side triggers that turn document changes into activity entries.
//!
//! Two triggers are evaluated independently for every change:
//!
//! - **velocity**: a run of `velocity_burst` consecutive changes, each less
//!   than `velocity_interval` after the previous one, records a
//!   `velocity-burst` entry and restarts the run;
//! - **volume**: a single change of more than `volume_lines` lines records a
//!   `bulk-insert` entry.
//!
//! The watcher never writes to disk itself. Entries go to an [`ActivitySink`],
//! which for `aia watch` is a channel drained by a background writer.

use super::{ActivityEntry, ActivityLog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Command recorded by the velocity trigger.
pub const VELOCITY_COMMAND: &str = "velocity-burst";

/// Command recorded by the volume trigger.
pub const VOLUME_COMMAND: &str = "bulk-insert";

/// A document change reported by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// File that changed.
    pub file: PathBuf,
    /// Inserted text.
    #[serde(default)]
    pub text: String,
    /// When the change happened. Defaults to the time it was read.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Number of lines in the inserted text.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 1
    }
}

/// Trigger thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherSettings {
    /// Maximum gap between changes that still counts as rapid.
    pub velocity_interval: Duration,
    /// Rapid changes in a row needed to fire.
    pub velocity_burst: usize,
    /// A change with more lines than this fires on its own.
    pub volume_lines: usize,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            velocity_interval: Duration::from_millis(150),
            velocity_burst: 3,
            volume_lines: 10,
        }
    }
}

/// Where triggered entries go.
pub trait ActivitySink {
    /// Accepts an entry without blocking on I/O failures.
    fn submit(&self, entry: ActivityEntry);
}

impl ActivitySink for ActivityLog {
    fn submit(&self, entry: ActivityEntry) {
        if let Err(e) = self.append(&entry) {
            tracing::warn!("Failed to record activity for {}: {}", entry.file.display(), e);
        }
    }
}

/// Sink that hands entries to a background writer task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ActivityEntry>,
}

impl ChannelSink {
    /// Spawns a writer that appends every submitted entry to `log`.
    ///
    /// Must be called inside a tokio runtime. The writer finishes once every
    /// clone of the returned sink is dropped, yielding the number of entries
    /// written.
    pub fn spawn(log: ActivityLog) -> (Self, JoinHandle<usize>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ActivityEntry>();

        let handle = tokio::task::spawn_blocking(move || {
            let mut written = 0;
            while let Some(entry) = rx.blocking_recv() {
                match log.append(&entry) {
                    Ok(()) => written += 1,
                    Err(e) => tracing::warn!("Failed to record activity: {}", e),
                }
            }
            written
        });

        (Self { tx }, handle)
    }
}

impl ActivitySink for ChannelSink {
    fn submit(&self, entry: ActivityEntry) {
        if self.tx.send(entry).is_err() {
            tracing::debug!("Activity writer has stopped; entry dropped");
        }
    }
}

/// Velocity and volume state over a stream of changes.
#[derive(Debug, Clone, Default)]
pub struct ActivityWatcher {
    settings: WatcherSettings,
    last_change: Option<DateTime<Utc>>,
    streak: usize,
}

impl ActivityWatcher {
    /// Creates a watcher with the given thresholds.
    #[must_use]
    pub const fn new(settings: WatcherSettings) -> Self {
        Self {
            settings,
            last_change: None,
            streak: 0,
        }
    }

    /// Returns the thresholds.
    #[must_use]
    pub const fn settings(&self) -> &WatcherSettings {
        &self.settings
    }

    /// Forgets the current run of rapid changes.
    pub fn reset(&mut self) {
        self.last_change = None;
        self.streak = 0;
    }

    /// Feeds one change and returns the entries it triggered.
    pub fn observe(&mut self, event: &ChangeEvent) -> Vec<ActivityEntry> {
        let mut entries = Vec::new();

        let rapid = self.last_change.is_some_and(|last| {
            (event.timestamp - last)
                .to_std()
                .is_ok_and(|gap| gap < self.settings.velocity_interval)
        });
        self.streak = if rapid { self.streak + 1 } else { 1 };
        self.last_change = Some(event.timestamp);

        if self.streak >= self.settings.velocity_burst {
            self.streak = 0;
            entries.push(self.entry(event, VELOCITY_COMMAND));
        }

        if event.line_count() > self.settings.volume_lines {
            entries.push(self.entry(event, VOLUME_COMMAND));
        }

        entries
    }

    /// Feeds one change and submits whatever it triggered.
    pub fn observe_into(&mut self, event: &ChangeEvent, sink: &dyn ActivitySink) -> usize {
        let entries = self.observe(event);
        let count = entries.len();
        for entry in entries {
            tracing::debug!("{} on {}", entry.command, entry.file.display());
            sink.submit(entry);
        }
        count
    }

    fn entry(&self, event: &ChangeEvent, command: &str) -> ActivityEntry {
        ActivityEntry {
            file: event.file.clone(),
            timestamp: event.timestamp,
            command: command.to_string(),
        }
    }
}
