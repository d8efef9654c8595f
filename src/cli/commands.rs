//! CLI command implementations.

use super::HookCommand;
use crate::activity::{ActivityEntry, ActivityLog, ActivityWatcher, ChangeEvent, ChannelSink};
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::core::detector::DetectionEngine;
use crate::core::error::{Error, Result};
use crate::core::git::{GitRepo, StagedChange};
use crate::core::hooks::{self, HookContext};
use crate::core::report;
use crate::core::session::DetectionMode;
use console::style;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncBufReadExt;

/// Marker identifying hooks written by `aia install`.
const HOOK_MARKER: &str = "# ai-attribution hook";

/// Pre-commit hook script.
const PRE_COMMIT_SCRIPT: &str = r#"#!/bin/sh
# ai-attribution hook - installed by `aia install`

if [ "$AIA_SKIP" = "1" ]; then
    exit 0
fi

# Nothing to do if aia is not installed
command -v aia >/dev/null 2>&1 || exit 0

# Git hooks run without a terminal on stdin; attach one for the prompt
if [ -t 1 ] && (exec < /dev/tty) 2>/dev/null; then
    exec < /dev/tty
fi

aia hook pre-commit
exit 0
"#;

/// Post-commit hook script.
const POST_COMMIT_SCRIPT: &str = r#"#!/bin/sh
# ai-attribution hook - installed by `aia install`

if [ "$AIA_SKIP" = "1" ]; then
    exit 0
fi

command -v aia >/dev/null 2>&1 || exit 0

aia hook post-commit
exit 0
"#;

/// Hooks managed by `install` and `uninstall`.
const HOOKS: [(&str, &str); 2] = [
    ("pre-commit", PRE_COMMIT_SCRIPT),
    ("post-commit", POST_COMMIT_SCRIPT),
];

/// Initialize configuration.
pub fn init(force: bool) -> Result<ExitCode> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        eprintln!(
            "{} Configuration already exists: {}",
            style("!").yellow(),
            config_path.display()
        );
        eprintln!("  Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    std::fs::write(&config_path, Config::default_toml())
        .map_err(|e| Error::io("write config", e))?;

    eprintln!("{} Created {}", style("✓").green(), config_path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Review and customize {CONFIG_FILE_NAME}");
    eprintln!("  2. Run: aia install");

    Ok(ExitCode::SUCCESS)
}

/// Install both git hooks.
pub fn install(force: bool) -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let hooks_dir = repo.hooks_dir();

    if !hooks_dir.exists() {
        std::fs::create_dir_all(&hooks_dir).map_err(|e| Error::io("create hooks dir", e))?;
    }

    for (name, script) in HOOKS {
        install_hook(&hooks_dir, name, script, force)?;
    }

    if which::which("aia").is_err() {
        eprintln!(
            "{} `aia` is not on PATH; the hooks will do nothing until it is",
            style("!").yellow()
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Writes one hook, backing up a foreign hook when forced.
fn install_hook(hooks_dir: &Path, name: &str, script: &str, force: bool) -> Result<()> {
    let hook_path = hooks_dir.join(name);

    if hook_path.exists() {
        let content =
            std::fs::read_to_string(&hook_path).map_err(|e| Error::io("read existing hook", e))?;

        if content.contains(HOOK_MARKER) {
            eprintln!(
                "{} Hook already installed at {}",
                style("✓").green(),
                hook_path.display()
            );
            return Ok(());
        }

        if !force {
            return Err(Error::HookExists { path: hook_path });
        }

        let backup_path = hooks_dir.join(format!("{name}.bak"));
        std::fs::rename(&hook_path, &backup_path).map_err(|e| Error::io("backup hook", e))?;
        eprintln!(
            "{} Backed up existing hook to {}",
            style("•").cyan(),
            backup_path.display()
        );
    }

    std::fs::write(&hook_path, script).map_err(|e| Error::io("write hook", e))?;

    // Make executable on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&hook_path)
            .map_err(|e| Error::io("get hook metadata", e))?
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&hook_path, perms).map_err(|e| Error::io("set hook perms", e))?;
    }

    eprintln!(
        "{} Installed {name} hook at {}",
        style("✓").green(),
        hook_path.display()
    );
    Ok(())
}

/// Uninstall both git hooks.
pub fn uninstall() -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let mut code = ExitCode::SUCCESS;

    for (name, _) in HOOKS {
        let hook_path = repo.hook_path(name);

        if !hook_path.exists() {
            eprintln!(
                "{} No {name} hook installed at {}",
                style("•").cyan(),
                hook_path.display()
            );
            continue;
        }

        let content = std::fs::read_to_string(&hook_path).map_err(|e| Error::io("read hook", e))?;
        if !content.contains(HOOK_MARKER) {
            eprintln!(
                "{} Hook at {} was not installed by ai-attribution",
                style("!").yellow(),
                hook_path.display()
            );
            eprintln!("  Remove manually if desired.");
            code = ExitCode::FAILURE;
            continue;
        }

        std::fs::remove_file(&hook_path).map_err(|e| Error::io("remove hook", e))?;
        eprintln!(
            "{} Removed {name} hook from {}",
            style("✓").green(),
            hook_path.display()
        );

        let backup_path = repo.hooks_dir().join(format!("{name}.bak"));
        if backup_path.exists() {
            eprintln!(
                "  Backup exists at {} - restore if needed",
                backup_path.display()
            );
        }
    }

    Ok(code)
}

/// Run a hook entry point.
pub fn hook(hook: HookCommand) -> ExitCode {
    match hook {
        HookCommand::PreCommit => hooks::run_pre_commit(),
        HookCommand::PostCommit => hooks::run_post_commit(),
    }
}

/// Score files or stdin.
pub fn analyze(
    paths: &[PathBuf],
    stdin_path: Option<&Path>,
    threshold: Option<u32>,
    json: bool,
) -> Result<ExitCode> {
    let mut config = Config::load_or_default()?;
    config.apply_env()?;
    if let Some(threshold) = threshold {
        config.detection.threshold = threshold;
    }

    let rules = config.rulebook()?;
    let engine = DetectionEngine::from_config(&config.detection, &rules)?;
    let activity = read_activity();

    if paths.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| Error::io("read stdin", e))?;

        let result = engine.detect(&text, stdin_path, activity.as_deref());
        if json {
            print_json(&result)?;
        } else {
            eprint!(
                "{}",
                report::render_result(stdin_path.unwrap_or_else(|| Path::new("<stdin>")), &result)
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let files = collect_files(paths);
    if files.is_empty() {
        eprintln!("{} No readable files found", style("!").yellow());
        return Ok(ExitCode::FAILURE);
    }
    let report = engine.detect_staged(&files, activity.as_deref());

    if json {
        print_json(&report)?;
    } else {
        report::print_report(&report);
    }
    Ok(ExitCode::SUCCESS)
}

/// Reads the repository's activity log, if there is a repository.
///
/// Outside a repository there is no log, which is not the same as an
/// unreadable one.
fn read_activity() -> Option<Vec<ActivityEntry>> {
    let Ok(repo) = GitRepo::discover() else {
        return Some(Vec::new());
    };
    match activity_log(&repo).read_all() {
        Ok(entries) => Some(entries),
        Err(e) => {
            tracing::debug!("Activity log unavailable: {e}");
            None
        },
    }
}

/// Expands paths into file contents, walking directories.
fn collect_files(paths: &[PathBuf]) -> Vec<StagedChange> {
    let mut files = Vec::new();
    for path in paths {
        let walker = walkdir::WalkDir::new(path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable path: {e}");
                    continue;
                },
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match std::fs::read_to_string(entry.path()) {
                Ok(added) => files.push(StagedChange {
                    path: entry.path().to_path_buf(),
                    added,
                }),
                Err(e) => tracing::debug!("Skipping {}: {e}", entry.path().display()),
            }
        }
    }
    files
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::serialization("encode output", e))?;
    writeln!(std::io::stdout(), "{json}").map_err(|e| Error::io("write output", e))
}

fn activity_log(repo: &GitRepo) -> ActivityLog {
    ActivityLog::new(repo.state_dir().join(crate::activity::FILE_NAME))
}

/// Append an activity entry.
pub fn activity_record(file: &Path, command: &str) -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let entry = ActivityEntry::now(file, command);
    activity_log(&repo).append(&entry)?;
    eprintln!(
        "{} Recorded activity on {}",
        style("✓").green(),
        file.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Print the newest activity entries.
pub fn activity_list(limit: usize) -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let entries = activity_log(&repo).read_all()?;

    if entries.is_empty() {
        eprintln!("{} No recorded activity", style("•").cyan());
        return Ok(ExitCode::SUCCESS);
    }

    let mut stdout = std::io::stdout();
    for entry in entries.iter().skip(entries.len().saturating_sub(limit)) {
        writeln!(
            stdout,
            "{}  {:<15} {}",
            entry.timestamp.to_rfc3339(),
            entry.command,
            entry.file.display()
        )
        .map_err(|e| Error::io("write output", e))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Purge the activity log now.
pub fn activity_purge() -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let config = Config::load_or_default()?;
    let stats = activity_log(&repo).purge(
        chrono::Utc::now(),
        config.activity.retention()?,
        config.activity.max_entries,
    )?;

    eprintln!(
        "{} Removed {} of {} entries",
        style("✓").green(),
        stats.removed(),
        stats.before
    );
    Ok(ExitCode::SUCCESS)
}

/// Turn change events on stdin into activity entries.
pub fn watch() -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let ctx = HookContext::for_repo(&repo)?;

    if ctx.coordinator().sessions().load()?.mode() != DetectionMode::Continuous {
        eprintln!(
            "{} Continuous mode is off; not watching. Run: aia mode continuous",
            style("!").yellow()
        );
        return Ok(ExitCode::FAILURE);
    }

    let settings = ctx.config().activity.watcher_settings()?;
    let log = ctx.activity_log();

    let (events, written) = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Internal {
            message: format!("Failed to create runtime: {e}"),
        })?
        .block_on(async move {
            let (sink, writer) = ChannelSink::spawn(log);
            let mut watcher = ActivityWatcher::new(settings);
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            let mut events = 0usize;

            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| Error::io("read change event", e))?
            {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<ChangeEvent>(&line) {
                    Ok(event) => {
                        events += 1;
                        watcher.observe_into(&event, &sink);
                    },
                    Err(e) => tracing::warn!("Ignoring malformed change event: {e}"),
                }
            }

            drop(sink);
            let written = writer.await.map_err(|e| Error::Internal {
                message: format!("Activity writer failed: {e}"),
            })?;
            Ok::<_, Error>((events, written))
        })?;

    eprintln!(
        "{} Processed {events} change(s), recorded {written} activity entr{}",
        style("✓").green(),
        if written == 1 { "y" } else { "ies" }
    );
    Ok(ExitCode::SUCCESS)
}

/// Mark the next commit as AI-generated.
pub fn mark() -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let ctx = HookContext::for_repo(&repo)?;

    match ctx.coordinator().sessions().update(|s| s.mark_next_commit()) {
        Ok(()) => {
            eprintln!(
                "{} The next commit will be attributed to AI",
                style("✓").green()
            );
            Ok(ExitCode::SUCCESS)
        },
        Err(e @ Error::OverrideDisabled) => {
            eprintln!("{} {e}", style("✗").red());
            Ok(ExitCode::FAILURE)
        },
        Err(e) => Err(e),
    }
}

/// Show or set the detection mode.
pub fn mode(mode: Option<DetectionMode>) -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let ctx = HookContext::for_repo(&repo)?;
    let sessions = ctx.coordinator().sessions().clone();

    let Some(mode) = mode else {
        let state = sessions.load()?;
        println!("{}", state.mode());
        return Ok(ExitCode::SUCCESS);
    };

    let cleared = sessions.update(|s| {
        let had_override = s.manual_override;
        s.set_mode(mode);
        Ok(had_override && !s.manual_override)
    })?;

    eprintln!(
        "{} Detection mode: {}",
        style("✓").green(),
        style(mode).bold()
    );
    if cleared {
        eprintln!("  Pending manual override cleared.");
    }
    Ok(ExitCode::SUCCESS)
}

/// Show session, flag and activity state.
pub fn status() -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let ctx = HookContext::for_repo(&repo)?;
    let coordinator = ctx.coordinator();
    let session = coordinator.sessions().load()?;

    eprintln!("Mode: {}", style(session.mode()).bold());
    eprintln!(
        "Manual override: {}",
        if session.manual_override { "pending" } else { "off" }
    );
    eprintln!("Coordinator: {}", coordinator.state());
    if let Some(at) = coordinator.flag().raised_at() {
        eprintln!("  Flag raised at {}", at.to_rfc3339());
    }
    eprintln!("Threshold: {}", ctx.config().detection.threshold);

    match ctx.config().rulebook() {
        Ok(rules) => {
            let sets: Vec<String> = [
                &rules.syntax,
                &rules.boilerplate,
                &rules.lexical,
                &rules.comments,
            ]
            .iter()
            .map(|set| format!("{} v{} ({})", set.name(), set.version(), set.len()))
            .collect();
            eprintln!("Rules: {}", sets.join(", "));
        },
        Err(e) => eprintln!("Rules: {} {e}", style("!").yellow()),
    }

    match ctx.activity_log().read_all() {
        Ok(entries) => {
            eprintln!("Activity entries: {}", entries.len());
            if let Some(last) = entries.iter().max_by_key(|e| e.timestamp) {
                eprintln!(
                    "  Latest: {} ({}, {})",
                    last.file.display(),
                    last.command,
                    last.timestamp.to_rfc3339()
                );
            }
        },
        Err(e) => eprintln!("Activity log: {} {e}", style("!").yellow()),
    }

    match ctx.commit_store().list() {
        Ok(records) => {
            let ai = records.iter().filter(|r| r.is_ai_generated).count();
            eprintln!("Recorded commits: {} ({ai} attributed to AI)", records.len());
        },
        Err(e) => eprintln!("Commit store: {} {e}", style("!").yellow()),
    }

    let installed: Vec<&str> = HOOKS
        .iter()
        .filter(|(name, _)| {
            std::fs::read_to_string(repo.hook_path(name))
                .is_ok_and(|content| content.contains(HOOK_MARKER))
        })
        .map(|(name, _)| *name)
        .collect();
    eprintln!(
        "Hooks: {}",
        if installed.is_empty() {
            "not installed".to_string()
        } else {
            installed.join(", ")
        }
    );

    Ok(ExitCode::SUCCESS)
}

/// Validate configuration.
pub fn validate() -> Result<ExitCode> {
    match Config::load() {
        Ok(config) => match config.validate() {
            Ok(()) => {
                eprintln!("{} Configuration is valid", style("✓").green());
                Ok(ExitCode::SUCCESS)
            },
            Err(e) => {
                eprintln!("{} Configuration validation failed: {e}", style("✗").red());
                Ok(ExitCode::FAILURE)
            },
        },
        Err(Error::ConfigNotFound { path }) => {
            eprintln!(
                "{} Configuration not found: {}",
                style("!").yellow(),
                path.display()
            );
            eprintln!("  Run: aia init");
            Ok(ExitCode::FAILURE)
        },
        Err(e) => {
            eprintln!("{} Failed to load configuration: {e}", style("✗").red());
            Ok(ExitCode::FAILURE)
        },
    }
}

/// Show configuration.
pub fn config(raw: bool) -> Result<ExitCode> {
    match Config::find_config_file() {
        Ok(path) => {
            eprintln!("Configuration file: {}", path.display());

            if raw {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| Error::io("read config", e))?;
                eprintln!();
                std::io::stdout()
                    .write_all(content.as_bytes())
                    .map_err(|e| Error::io("write output", e))?;
            }

            Ok(ExitCode::SUCCESS)
        },
        Err(Error::ConfigNotFound { .. }) => {
            eprintln!("{} No configuration file found", style("!").yellow());
            eprintln!("  Run: aia init");
            Ok(ExitCode::FAILURE)
        },
        Err(e) => Err(e),
    }
}

/// Generate shell completions.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut super::Cli::command(),
        "aia",
        &mut std::io::stdout(),
    );
}
