//! # ai-attribution
//!
//! Heuristic AI-authorship attribution for git commits.
//!
//! When code lands in a commit, `ai-attribution` estimates how likely it is
//! that an AI assistant wrote it, asks the committer to confirm, and records
//! the answer next to the commit. Everything is local: the signals are the
//! shape of the added code and a log of recent assistant activity written by
//! the editor.
//!
//! ## Features
//!
//! - **Multi-signal detection**: chunk size, syntax completeness, boilerplate,
//!   comment quality, lexical patterns and time proximity to editor activity
//! - **Hook coordination**: a flag file carries the committer's decision from
//!   the pre-commit hook to the post-commit hook
//! - **Swappable rules**: the regex rule sets can be replaced from TOML
//! - **Manual mode**: `aia mark` attributes the next commit without detection
//!
//! ## Example
//!
//! ```rust,no_run
//! use ai_attribution::{DetectionEngine, Rulebook};
//! use ai_attribution::core::detector::EngineSettings;
//! use std::path::Path;
//!
//! fn main() -> ai_attribution::Result<()> {
//!     let rules = Rulebook::builtin()?;
//!     let engine = DetectionEngine::new(EngineSettings::default(), &rules);
//!
//!     let code = "export function add(a, b) {\n  return a + b;\n}\n";
//!     let result = engine.detect(code, Some(Path::new("src/add.js")), None);
//!
//!     println!("{}% ({})", result.confidence, result.is_ai_generated);
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ai-attribution/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod activity;
pub mod analyzers;
pub mod cli;
pub mod config;
pub mod core;
pub mod recorder;
pub mod rules;

// Re-export main types for convenience
pub use activity::{ActivityEntry, ActivityLog};
pub use config::Config;
pub use core::coordinator::{AttributionFlag, Coordinator};
pub use core::detector::{DetectionEngine, DetectionReport, DetectionResult};
pub use core::error::{Error, Result};
pub use core::session::{DetectionMode, SessionState};
pub use recorder::{CommitRecord, CommitRecorder};
pub use rules::Rulebook;
