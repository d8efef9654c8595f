//! Git hook flows.
//!
//! `aia hook pre-commit` scores the staged diff and asks the human whether to
//! attribute the commit; `aia hook post-commit` records the commit with the
//! decision. Neither ever blocks a commit: every failure becomes a warning
//! and the process exits 0.

use crate::activity::{self, ActivityLog};
use crate::config::Config;
use crate::core::coordinator::{Attribution, Coordinator};
use crate::core::detector::{DetectionEngine, DetectionReport};
use crate::core::error::Result;
use crate::core::git::{CommitInfo, DiffStat, GitRepo, StagedChange};
use crate::core::prompt::{self, Prompter, TerminalPrompter};
use crate::core::report;
use crate::recorder::{self, CommitRecord, CommitRecorder, JsonlCommitStore, RecordOutcome};
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

/// Set to `1` to skip both hooks.
pub const ENV_SKIP: &str = "AIA_SKIP";

/// Returns true if the hooks should do nothing.
pub fn skip_requested() -> bool {
    std::env::var(ENV_SKIP).ok().as_deref() == Some("1")
}

/// Configuration and state directory shared by the hook flows.
#[derive(Debug, Clone)]
pub struct HookContext {
    config: Config,
    state_dir: PathBuf,
}

impl HookContext {
    /// Creates a context over an explicit state directory.
    pub fn new(config: Config, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            state_dir: state_dir.into(),
        }
    }

    /// Loads the configuration (with environment overrides) for a repository.
    pub fn for_repo(repo: &GitRepo) -> Result<Self> {
        let mut config = Config::load_or_default()?;
        config.apply_env()?;
        Ok(Self::new(config, repo.state_dir()))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the state directory.
    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Returns the activity log.
    #[must_use]
    pub fn activity_log(&self) -> ActivityLog {
        ActivityLog::new(self.state_dir.join(activity::FILE_NAME))
    }

    /// Opens the attribution coordinator.
    #[must_use]
    pub fn coordinator(&self) -> Coordinator {
        Coordinator::open(&self.state_dir)
    }

    /// Returns the shipped commit store.
    #[must_use]
    pub fn commit_store(&self) -> JsonlCommitStore {
        JsonlCommitStore::new(self.state_dir.join(recorder::FILE_NAME))
    }
}

/// How a pre-commit run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreCommitOutcome {
    /// `aia mark` is pending; detection was skipped.
    ManualOverride,
    /// Continuous mode is off; detection was skipped.
    ManualMode,
    /// The staged diff could not be read.
    DetectionSkipped {
        /// Why.
        message: String,
    },
    /// Nothing was added.
    NoChanges,
    /// No file reached the threshold.
    Clean(DetectionReport),
    /// AI content was found but nobody can answer the prompt.
    NoTerminal(DetectionReport),
    /// The human confirmed; the flag is raised.
    Attributed(DetectionReport),
    /// The human declined.
    Declined(DetectionReport),
}

/// Runs the pre-commit flow.
///
/// `staged` is only called when detection runs. `prompter` is `None` when no
/// terminal is attached.
pub fn pre_commit(
    ctx: &HookContext,
    staged: impl FnOnce() -> Result<Vec<StagedChange>>,
    prompter: Option<&mut dyn Prompter>,
) -> Result<PreCommitOutcome> {
    let mut coordinator = ctx.coordinator();
    coordinator.begin_commit()?;

    let session = coordinator.sessions().load()?;
    if session.manual_override {
        return Ok(PreCommitOutcome::ManualOverride);
    }
    if !session.continuous_mode {
        return Ok(PreCommitOutcome::ManualMode);
    }

    let changes = match staged() {
        Ok(changes) => changes,
        Err(e) => {
            tracing::debug!("Could not read staged diff: {e}");
            return Ok(PreCommitOutcome::DetectionSkipped {
                message: e.to_string(),
            });
        },
    };
    if changes.is_empty() {
        return Ok(PreCommitOutcome::NoChanges);
    }

    let rules = ctx.config.rulebook()?;
    let engine = DetectionEngine::from_config(&ctx.config.detection, &rules)?;
    let activity = match ctx.activity_log().read_all() {
        Ok(entries) => Some(entries),
        Err(e) => {
            tracing::debug!("Activity log unavailable: {e}");
            None
        },
    };

    let spinner = progress_spinner(changes.len());
    let report = engine.detect_staged(&changes, activity.as_deref());
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if !report.has_ai_content {
        return Ok(PreCommitOutcome::Clean(report));
    }
    let Some(prompter) = prompter else {
        return Ok(PreCommitOutcome::NoTerminal(report));
    };

    report::print_report(&report);
    let attribute = prompt::confirm_attribution(prompter, &report)?;
    coordinator.decide(attribute)?;

    Ok(if attribute {
        PreCommitOutcome::Attributed(report)
    } else {
        PreCommitOutcome::Declined(report)
    })
}

/// What post-commit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCommitOutcome {
    /// The recorded commit.
    pub hash: String,
    /// The decision applied.
    pub attribution: Attribution,
    /// What the recorder did.
    pub recorded: RecordOutcome,
    /// Activity entries removed by the purge.
    pub purged: usize,
}

/// Runs the post-commit flow for an already-read commit.
pub fn post_commit(
    ctx: &HookContext,
    commit: &CommitInfo,
    stat: DiffStat,
    recorder: &dyn CommitRecorder,
) -> Result<PostCommitOutcome> {
    let mut coordinator = ctx.coordinator();
    let attribution = coordinator.take_attribution()?;

    let mut record = CommitRecord::new(commit, stat, attribution.is_ai_generated);
    if attribution.is_ai_generated && ctx.config.attribution.append_trailer {
        record = record.with_trailer(&ctx.config.attribution.trailer());
    }
    let recorded = match recorder.record(&record) {
        Ok(recorded) => recorded,
        Err(e) => {
            if let Err(restore) = coordinator.restore(&attribution) {
                tracing::warn!("Could not restore attribution decision: {restore}");
            }
            return Err(e);
        },
    };
    coordinator.finish();
    tracing::debug!(
        "Recorded {} (ai: {}, delta: {})",
        record.hash,
        record.is_ai_generated,
        record.code_volume_delta
    );

    Ok(PostCommitOutcome {
        hash: record.hash,
        attribution,
        recorded,
        purged: purge_activity(ctx),
    })
}

/// Best-effort activity log trim. Returns the number of entries removed.
fn purge_activity(ctx: &HookContext) -> usize {
    let retention = match ctx.config.activity.retention() {
        Ok(retention) => retention,
        Err(e) => {
            tracing::debug!("Skipping activity purge: {e}");
            return 0;
        },
    };
    match ctx
        .activity_log()
        .purge(Utc::now(), retention, ctx.config.activity.max_entries)
    {
        Ok(stats) => stats.removed(),
        Err(e) => {
            tracing::debug!("Activity purge failed: {e}");
            0
        },
    }
}

/// Spinner shown while the staged diff is scored on a terminal.
fn progress_spinner(files: usize) -> Option<ProgressBar> {
    if !console::Term::stderr().is_term() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .ok()
            .unwrap_or_else(ProgressStyle::default_spinner),
    );
    pb.set_message(format!("Analyzing {files} staged file(s)..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

// =============================================================================
// Entry points
// =============================================================================

/// `aia hook pre-commit`. Always succeeds.
pub fn run_pre_commit() -> ExitCode {
    if skip_requested() {
        eprintln!("{} Skipping AI attribution ({ENV_SKIP}=1)", style("•").cyan());
        return ExitCode::SUCCESS;
    }

    let result = GitRepo::discover().and_then(|repo| {
        let ctx = HookContext::for_repo(&repo)?;
        let mut terminal = TerminalPrompter::new();
        let prompter: Option<&mut dyn Prompter> = if prompt::terminal_available() {
            Some(&mut terminal)
        } else {
            None
        };
        pre_commit(&ctx, || repo.staged_changes(), prompter)
    });

    match result {
        Ok(PreCommitOutcome::ManualOverride) => {
            eprintln!(
                "{} Manual override set: this commit will be attributed to AI",
                style("•").cyan()
            );
        },
        Ok(PreCommitOutcome::DetectionSkipped { message }) => {
            eprintln!(
                "{} AI detection skipped: {message}",
                style("!").yellow()
            );
        },
        Ok(PreCommitOutcome::NoTerminal(report)) => {
            eprintln!(
                "{} AI-generated content likely ({}%), but no terminal to confirm; not attributing",
                style("!").yellow(),
                report.max_confidence()
            );
        },
        Ok(PreCommitOutcome::Attributed(_)) => {
            eprintln!(
                "{} This commit will be attributed to AI",
                style("✓").green()
            );
        },
        Ok(PreCommitOutcome::Declined(_)) => {
            eprintln!("{} Commit not attributed", style("•").cyan());
        },
        Ok(outcome) => tracing::debug!("Pre-commit: {outcome:?}"),
        Err(e) => {
            eprintln!("{} AI attribution skipped: {e}", style("!").yellow());
        },
    }

    ExitCode::SUCCESS
}

/// `aia hook post-commit`. Always succeeds.
pub fn run_post_commit() -> ExitCode {
    if skip_requested() {
        return ExitCode::SUCCESS;
    }

    let result = GitRepo::discover().and_then(|repo| {
        let ctx = HookContext::for_repo(&repo)?;
        let commit = repo.last_commit()?;
        let stat = repo.diff_stat(&commit.hash)?;
        post_commit(&ctx, &commit, stat, &ctx.commit_store())
    });

    match result {
        Ok(outcome) if outcome.attribution.is_ai_generated => {
            let short: String = outcome.hash.chars().take(7).collect();
            eprintln!(
                "{} Recorded {} as AI-generated",
                style("✓").green(),
                style(short).bold()
            );
        },
        Ok(outcome) => tracing::debug!("Post-commit: {outcome:?}"),
        Err(e) => {
            eprintln!(
                "{} Could not record commit attribution: {e}",
                style("!").yellow()
            );
        },
    }

    ExitCode::SUCCESS
}
