//! Time-proximity signal: recent assistant activity on the same file.
//!
//! The log is scanned newest-first. Among entries for the file, the one with
//! the greatest timestamp wins; ties go to the entry appended last. Entries
//! stamped slightly in the future are treated as age zero; entries further
//! ahead than the tolerated clock skew are ignored.

use super::{AnalysisInput, Analyzer, Observation, Signal, SignalKind};
use crate::activity::{is_too_far_ahead, same_file, ActivityEntry};
use chrono::{DateTime, Utc};
use crate::core::error::{Error, Result};
use std::time::Duration;

/// How far back an activity entry still counts.
pub const LOOKBACK: Duration = Duration::from_secs(5);

/// Scores the age of the most recent matching activity entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeProximityAnalyzer;

impl TimeProximityAnalyzer {
    /// Points for an entry of the given age in milliseconds.
    #[must_use]
    pub const fn points_for(age_ms: u64) -> u32 {
        if age_ms < 1_000 {
            50
        } else if age_ms < 3_000 {
            40
        } else if age_ms < 5_000 {
            30
        } else {
            0
        }
    }

    /// Finds the newest entry for the file.
    fn newest_for<'e>(
        entries: &'e [ActivityEntry],
        path: &std::path::Path,
        now: DateTime<Utc>,
    ) -> Option<&'e ActivityEntry> {
        entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| same_file(&entry.file, path) && !is_too_far_ahead(entry, now))
            .max_by_key(|(index, entry)| (entry.timestamp, *index))
            .map(|(_, entry)| entry)
    }
}

impl Analyzer for TimeProximityAnalyzer {
    fn kind(&self) -> SignalKind {
        SignalKind::TimeProximity
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Result<Signal> {
        let entries = input.activity.ok_or_else(|| Error::ActivityUnavailable {
            message: "activity log could not be read".to_string(),
        })?;
        let Some(path) = input.path else {
            return Ok(Signal::none(Observation::Proximity(None)));
        };
        let Some(entry) = Self::newest_for(entries, path, input.now) else {
            return Ok(Signal::none(Observation::Proximity(None)));
        };

        let age_ms = u64::try_from((input.now - entry.timestamp).num_milliseconds()).unwrap_or(0);
        let lookback_ms = u64::try_from(LOOKBACK.as_millis()).unwrap_or(u64::MAX);
        if age_ms >= lookback_ms {
            return Ok(Signal::none(Observation::Proximity(None)));
        }

        Ok(Signal::scored(
            Self::points_for(age_ms),
            format!(
                "Recent assistant activity on this file ({}ms ago, {})",
                age_ms, entry.command
            ),
            Observation::Proximity(Some(age_ms)),
        ))
    }
}
