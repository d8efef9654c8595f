//! Carries the attribution decision from pre-commit to post-commit.
//!
//! The two hooks run as separate processes with nothing shared but the git
//! directory. The decision travels as the presence of a flag file:
//!
//! ```text
//! Idle ──(pre-commit: AI content, answer "yes")──▶ AwaitingDecision
//!   ▲                                                   │
//!   └───────(post-commit: flag consumed, recorded)── Recorded
//! ```
//!
//! Git runs the hooks of one working tree one at a time, so at most one flag
//! exists. A flag still present when pre-commit starts belongs to a commit
//! that never reached post-commit and is discarded.
//!
//! Post-commit consumes the decision before the record is written. If the
//! record cannot be written the decision is put back with
//! [`Coordinator::restore`], so `aia status` still shows it until the next
//! pre-commit discards it.

use crate::core::atomic::write_atomic;
use crate::core::error::{Error, Result};
use crate::core::session::SessionStore;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the flag inside the state directory.
pub const FLAG_FILE_NAME: &str = "attribution.flag";

/// One-bit message between the hook processes.
///
/// The file's existence is the message. Its content, an RFC 3339 timestamp,
/// is only there for diagnostics.
#[derive(Debug, Clone)]
pub struct AttributionFlag {
    path: PathBuf,
}

impl AttributionFlag {
    /// Creates a handle for the flag at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the flag path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the flag is currently raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.path.exists()
    }

    /// When the flag was raised, if it is and the timestamp is readable.
    #[must_use]
    pub fn raised_at(&self) -> Option<DateTime<Utc>> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        DateTime::parse_from_rfc3339(content.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Raises the flag. Raising it again only refreshes the timestamp.
    pub fn raise(&self) -> Result<()> {
        write_atomic(&self.path, Utc::now().to_rfc3339().as_bytes()).map_err(|e| match e {
            Error::Io { source, .. } => Error::flag(&self.path, "write", source),
            other => other,
        })
    }

    /// Removes the flag, returning whether it was raised.
    ///
    /// A single `remove_file`: there is no check-then-delete window. Removing
    /// an absent flag is not an error.
    pub fn consume(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::flag(&self.path, "remove", e)),
        }
    }
}

/// Where the coordinator is in the commit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributionState {
    /// No decision pending.
    Idle,
    /// The human confirmed attribution; the flag is raised.
    AwaitingDecision,
    /// Post-commit consumed a positive decision and is recording it.
    Recorded,
}

impl AttributionState {
    /// Returns a human-readable name for the state.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingDecision => "awaiting-decision",
            Self::Recorded => "recorded",
        }
    }
}

impl std::fmt::Display for AttributionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What made post-commit attribute a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributionSource {
    /// The human confirmed at the pre-commit prompt.
    Confirmed,
    /// `aia mark` was set for this commit.
    ManualOverride,
    /// Nothing; the commit is not attributed.
    None,
}

/// The decision post-commit acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribution {
    /// Whether the commit is attributed as AI-generated.
    pub is_ai_generated: bool,
    /// Why.
    pub source: AttributionSource,
}

/// The coordinator state machine over the flag and session files.
#[derive(Debug)]
pub struct Coordinator {
    flag: AttributionFlag,
    sessions: SessionStore,
    state: AttributionState,
}

impl Coordinator {
    /// Opens the coordinator for a state directory, deriving the state from
    /// the flag on disk.
    pub fn open(state_dir: &Path) -> Self {
        let flag = AttributionFlag::new(state_dir.join(FLAG_FILE_NAME));
        let sessions = SessionStore::new(state_dir.join(crate::core::session::FILE_NAME));
        let state = if flag.is_raised() {
            AttributionState::AwaitingDecision
        } else {
            AttributionState::Idle
        };
        Self {
            flag,
            sessions,
            state,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> AttributionState {
        self.state
    }

    /// Returns the flag.
    #[must_use]
    pub const fn flag(&self) -> &AttributionFlag {
        &self.flag
    }

    /// Returns the session store.
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Starts a pre-commit run: discards a stale flag.
    ///
    /// Returns true if a stale flag was found.
    pub fn begin_commit(&mut self) -> Result<bool> {
        let stale = self.flag.consume()?;
        if stale {
            tracing::info!("Discarded stale attribution flag");
        }
        self.state = AttributionState::Idle;
        Ok(stale)
    }

    /// Returns true if `aia mark` is pending for the next commit.
    pub fn override_pending(&self) -> Result<bool> {
        Ok(self.sessions.load()?.manual_override)
    }

    /// Records the human's answer. "Yes" raises the flag; "no" clears it.
    pub fn decide(&mut self, attribute: bool) -> Result<()> {
        if attribute {
            self.flag.raise()?;
            self.state = AttributionState::AwaitingDecision;
        } else {
            self.flag.consume()?;
            self.state = AttributionState::Idle;
        }
        Ok(())
    }

    /// Post-commit: consumes the flag and any pending override.
    pub fn take_attribution(&mut self) -> Result<Attribution> {
        let confirmed = self.flag.consume()?;
        let overridden = match self.sessions.update(|s| Ok(s.take_override())) {
            Ok(overridden) => overridden,
            Err(e) => {
                if confirmed {
                    if let Err(raise) = self.flag.raise() {
                        tracing::warn!("Could not restore attribution flag: {raise}");
                    }
                }
                return Err(e);
            },
        };

        let source = if confirmed {
            AttributionSource::Confirmed
        } else if overridden {
            AttributionSource::ManualOverride
        } else {
            AttributionSource::None
        };
        let is_ai_generated = confirmed || overridden;

        self.state = if is_ai_generated {
            AttributionState::Recorded
        } else {
            AttributionState::Idle
        };
        Ok(Attribution {
            is_ai_generated,
            source,
        })
    }

    /// Puts back a decision taken by [`take_attribution`](Self::take_attribution)
    /// whose commit could not be recorded.
    pub fn restore(&mut self, attribution: &Attribution) -> Result<()> {
        match attribution.source {
            AttributionSource::Confirmed => {
                self.flag.raise()?;
                self.state = AttributionState::AwaitingDecision;
            },
            AttributionSource::ManualOverride => {
                self.sessions.update(|s| {
                    s.manual_override = true;
                    Ok(())
                })?;
                self.state = AttributionState::Idle;
            },
            AttributionSource::None => self.state = AttributionState::Idle,
        }
        Ok(())
    }

    /// Returns to `Idle` once the commit has been handed to the recorder.
    pub fn finish(&mut self) {
        self.state = AttributionState::Idle;
    }
}
