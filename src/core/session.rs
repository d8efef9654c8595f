//! Session switches shared by every `aia` invocation in a repository.
//!
//! Stored as JSON at `<git-dir>/ai-attribution/session.json`. A missing or
//! unreadable file means the defaults: continuous detection on, no manual
//! override pending.

use crate::core::atomic::write_atomic;
use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the session state inside the state directory.
pub const FILE_NAME: &str = "session.json";

/// How commits get attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DetectionMode {
    /// The detection engine runs on every commit.
    #[default]
    Continuous,
    /// Only commits marked with `aia mark` are attributed.
    Manual,
}

impl DetectionMode {
    /// Returns a human-readable name for the mode.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DetectionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continuous" => Ok(Self::Continuous),
            "manual" => Ok(Self::Manual),
            _ => Err(format!(
                "Invalid mode: {s}. Expected: continuous or manual"
            )),
        }
    }
}

/// The persisted switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    /// Attribute the next commit as AI-generated without detection.
    pub manual_override: bool,
    /// Run detection on every commit.
    pub continuous_mode: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            manual_override: false,
            continuous_mode: true,
        }
    }
}

impl SessionState {
    /// Returns the current mode.
    #[must_use]
    pub const fn mode(&self) -> DetectionMode {
        if self.continuous_mode {
            DetectionMode::Continuous
        } else {
            DetectionMode::Manual
        }
    }

    /// Switches mode. Continuous mode clears a pending override.
    pub fn set_mode(&mut self, mode: DetectionMode) {
        match mode {
            DetectionMode::Continuous => {
                self.continuous_mode = true;
                self.manual_override = false;
            },
            DetectionMode::Manual => self.continuous_mode = false,
        }
    }

    /// Marks the next commit as AI-generated.
    pub fn mark_next_commit(&mut self) -> Result<()> {
        if self.continuous_mode {
            return Err(Error::OverrideDisabled);
        }
        self.manual_override = true;
        Ok(())
    }

    /// Returns and clears the pending override.
    pub fn take_override(&mut self) -> bool {
        std::mem::take(&mut self.manual_override)
    }
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state, falling back to defaults.
    pub fn load(&self) -> Result<SessionState> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SessionState::default()),
            Err(e) => return Err(Error::io(format!("read {}", self.path.display()), e)),
        };

        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(SessionState::default())
            },
        }
    }

    /// Persists the state.
    pub fn save(&self, state: &SessionState) -> Result<()> {
        let data = serde_json::to_string_pretty(state)
            .map_err(|e| Error::serialization("encode session state", e))?;
        write_atomic(&self.path, data.as_bytes())
    }

    /// Loads, applies `f`, and saves if `f` succeeded.
    pub fn update<T>(&self, f: impl FnOnce(&mut SessionState) -> Result<T>) -> Result<T> {
        let mut state = self.load()?;
        let before = state;
        let value = f(&mut state)?;
        if state != before {
            self.save(&state)?;
        }
        Ok(value)
    }
}
