//! Core functionality for ai-attribution.
//!
//! This module contains the main components:
//! - [`detector`]: Detection engine combining the analyzer signals
//! - [`coordinator`]: Flag-file handoff between the commit hooks
//! - [`hooks`]: Pre-commit and post-commit flows
//! - [`session`]: Manual override and detection mode
//! - [`git`]: Git repository operations
//! - [`error`]: Error types and result handling

pub mod atomic;
pub mod coordinator;
pub mod detector;
pub mod error;
pub mod git;
pub mod hooks;
pub mod language;
pub mod prompt;
pub mod report;
pub mod session;
