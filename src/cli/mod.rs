//! Command-line interface for ai-attribution.
//!
//! This module provides the `aia` CLI with subcommands for:
//! - `init`: Create configuration
//! - `install` / `uninstall`: Manage the git hooks
//! - `hook`: Hook entry points called by git
//! - `analyze`: Score files or stdin
//! - `activity` / `watch`: Feed and inspect the activity log
//! - `mark` / `mode` / `status`: Manual override and session state
//! - `validate` / `config`: Inspect configuration

mod commands;

use crate::core::error::Result;
use crate::core::session::DetectionMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Heuristic AI-authorship attribution for git commits.
#[derive(Debug, Parser)]
#[command(
    name = "aia",
    author,
    version,
    about = "Heuristic AI-authorship attribution for git commits",
    long_about = r#"
ai-attribution (aia) estimates whether staged code was written by an AI
assistant, asks you to confirm at commit time, and records the answer.

Quick start:
  aia init      # Create configuration
  aia install   # Install pre-commit and post-commit hooks
  # Done! Commits with likely AI content now ask for attribution.

Environment variables:
  AIA_SKIP=1          Skip both hooks
  AIA_THRESHOLD=N     Override the detection threshold (0-100)
"#,
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an ai-attribution.toml with the defaults.
    #[command(visible_alias = "i")]
    Init {
        /// Overwrite existing configuration.
        #[arg(short, long)]
        force: bool,
    },

    /// Install the pre-commit and post-commit hooks.
    Install {
        /// Overwrite existing hooks (they are backed up).
        #[arg(short, long)]
        force: bool,
    },

    /// Remove the hooks.
    Uninstall,

    /// Hook entry points (called by git).
    Hook {
        /// Which hook is running.
        #[command(subcommand)]
        hook: HookCommand,
    },

    /// Score files, directories or stdin.
    #[command(visible_alias = "a")]
    Analyze {
        /// Files or directories to analyze. Reads stdin when empty.
        paths: Vec<PathBuf>,

        /// File name used for language detection when reading stdin.
        #[arg(long, value_name = "PATH")]
        stdin_path: Option<PathBuf>,

        /// Override the detection threshold.
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=100))]
        threshold: Option<u32>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Inspect or edit the activity log.
    Activity {
        /// Activity action.
        #[command(subcommand)]
        action: ActivityCommand,
    },

    /// Read change events (NDJSON) from stdin and record assistant activity.
    Watch,

    /// Attribute the next commit to AI without detection.
    Mark,

    /// Show or set the detection mode.
    Mode {
        /// `continuous` or `manual`.
        mode: Option<DetectionMode>,
    },

    /// Show session, flag and activity state.
    #[command(visible_alias = "s")]
    Status,

    /// Validate the configuration file.
    #[command(visible_alias = "v")]
    Validate,

    /// Show configuration file location and contents.
    Config {
        /// Output raw TOML.
        #[arg(long)]
        raw: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Hooks installed by `aia install`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum HookCommand {
    /// Score the staged diff and ask for attribution.
    PreCommit,
    /// Record the commit just made.
    PostCommit,
}

/// Activity log actions.
#[derive(Debug, Subcommand)]
pub enum ActivityCommand {
    /// Record assistant activity on a file.
    Record {
        /// File the assistant touched.
        file: PathBuf,

        /// Label stored with the entry.
        #[arg(short, long, default_value = "manual")]
        command: String,
    },

    /// List recent entries.
    List {
        /// Show at most this many of the newest entries.
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Drop expired entries and cap the log size.
    Purge,
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set up logging
    setup_logging(cli.verbose, cli.quiet);

    // Set up color
    setup_color(cli.color);

    match cli.command {
        Commands::Init { force } => commands::init(force),
        Commands::Install { force } => commands::install(force),
        Commands::Uninstall => commands::uninstall(),
        Commands::Hook { hook } => Ok(commands::hook(hook)),
        Commands::Analyze {
            paths,
            stdin_path,
            threshold,
            json,
        } => commands::analyze(&paths, stdin_path.as_deref(), threshold, json),
        Commands::Activity { action } => match action {
            ActivityCommand::Record { file, command } => {
                commands::activity_record(&file, &command)
            },
            ActivityCommand::List { limit } => commands::activity_list(limit),
            ActivityCommand::Purge => commands::activity_purge(),
        },
        Commands::Watch => commands::watch(),
        Commands::Mark => commands::mark(),
        Commands::Mode { mode } => commands::mode(mode),
        Commands::Status => commands::status(),
        Commands::Validate => commands::validate(),
        Commands::Config { raw } => commands::config(raw),
        Commands::Completions { shell } => {
            commands::completions(shell);
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {
            // Let console crate auto-detect
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_help() {
        let cli = Cli::try_parse_from(["aia", "--help"]);
        // --help causes early exit, so this will be an error
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["aia"]).is_err());
    }

    // =========================================================================
    // Subcommand parsing tests
    // =========================================================================

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["aia", "init"]).expect("parse init");
        assert!(matches!(cli.command, Commands::Init { force: false }));
    }

    #[test]
    fn test_parse_init_alias_with_force() {
        let cli = Cli::try_parse_from(["aia", "i", "--force"]).expect("parse");
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }

    #[test]
    fn test_parse_install() {
        let cli = Cli::try_parse_from(["aia", "install", "-f"]).expect("parse");
        assert!(matches!(cli.command, Commands::Install { force: true }));
    }

    #[test]
    fn test_parse_uninstall() {
        let cli = Cli::try_parse_from(["aia", "uninstall"]).expect("parse");
        assert!(matches!(cli.command, Commands::Uninstall));
    }

    #[test]
    fn test_parse_hooks() {
        let cli = Cli::try_parse_from(["aia", "hook", "pre-commit"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Hook {
                hook: HookCommand::PreCommit
            }
        ));

        let cli = Cli::try_parse_from(["aia", "hook", "post-commit"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Hook {
                hook: HookCommand::PostCommit
            }
        ));
    }

    #[test]
    fn test_parse_unknown_hook() {
        assert!(Cli::try_parse_from(["aia", "hook", "pre-push"]).is_err());
    }

    #[test]
    fn test_parse_analyze_stdin() {
        let cli = Cli::try_parse_from(["aia", "analyze", "--stdin-path", "x.ts", "--json"])
            .expect("parse");
        match cli.command {
            Commands::Analyze {
                paths,
                stdin_path,
                threshold,
                json,
            } => {
                assert!(paths.is_empty());
                assert_eq!(stdin_path, Some(PathBuf::from("x.ts")));
                assert_eq!(threshold, None);
                assert!(json);
            },
            other => assert!(matches!(other, Commands::Analyze { .. })),
        }
    }

    #[test]
    fn test_parse_analyze_paths_and_threshold() {
        let cli =
            Cli::try_parse_from(["aia", "a", "src", "lib.rs", "-t", "50"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Analyze {
                threshold: Some(50),
                json: false,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_analyze_threshold_out_of_range() {
        assert!(Cli::try_parse_from(["aia", "analyze", "-t", "101"]).is_err());
    }

    #[test]
    fn test_parse_activity_record() {
        let cli = Cli::try_parse_from(["aia", "activity", "record", "src/app.ts"]).expect("parse");
        match cli.command {
            Commands::Activity {
                action: ActivityCommand::Record { file, command },
            } => {
                assert_eq!(file, PathBuf::from("src/app.ts"));
                assert_eq!(command, "manual");
            },
            other => assert!(matches!(other, Commands::Activity { .. })),
        }
    }

    #[test]
    fn test_parse_activity_list_limit() {
        let cli = Cli::try_parse_from(["aia", "activity", "list", "-n", "5"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Activity {
                action: ActivityCommand::List { limit: 5 }
            }
        ));
    }

    #[test]
    fn test_parse_activity_purge() {
        let cli = Cli::try_parse_from(["aia", "activity", "purge"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Activity {
                action: ActivityCommand::Purge
            }
        ));
    }

    #[test]
    fn test_parse_watch_and_mark() {
        let cli = Cli::try_parse_from(["aia", "watch"]).expect("parse");
        assert!(matches!(cli.command, Commands::Watch));
        let cli = Cli::try_parse_from(["aia", "mark"]).expect("parse");
        assert!(matches!(cli.command, Commands::Mark));
    }

    #[test]
    fn test_parse_mode() {
        let cli = Cli::try_parse_from(["aia", "mode"]).expect("parse");
        assert!(matches!(cli.command, Commands::Mode { mode: None }));

        let cli = Cli::try_parse_from(["aia", "mode", "manual"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Mode {
                mode: Some(DetectionMode::Manual)
            }
        ));
    }

    #[test]
    fn test_parse_invalid_mode() {
        assert!(Cli::try_parse_from(["aia", "mode", "sometimes"]).is_err());
    }

    #[test]
    fn test_parse_status_validate_config() {
        let cli = Cli::try_parse_from(["aia", "s"]).expect("parse");
        assert!(matches!(cli.command, Commands::Status));
        let cli = Cli::try_parse_from(["aia", "v"]).expect("parse");
        assert!(matches!(cli.command, Commands::Validate));
        let cli = Cli::try_parse_from(["aia", "config", "--raw"]).expect("parse");
        assert!(matches!(cli.command, Commands::Config { raw: true }));
    }

    #[test]
    fn test_parse_completions() {
        for shell in ["bash", "zsh", "fish"] {
            let cli = Cli::try_parse_from(["aia", "completions", shell]).expect("parse");
            assert!(matches!(cli.command, Commands::Completions { .. }));
        }
    }

    // =========================================================================
    // Global flags tests
    // =========================================================================

    #[test]
    fn test_parse_verbose_flag() {
        let cli = Cli::try_parse_from(["aia", "--verbose", "status"]).expect("parse");
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_quiet_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["aia", "status", "-q"]).expect("parse");
        assert!(cli.quiet);
    }

    #[test]
    fn test_parse_color() {
        let cli = Cli::try_parse_from(["aia", "--color", "never", "status"]).expect("parse");
        assert_eq!(cli.color, ColorChoice::Never);
        let cli = Cli::try_parse_from(["aia", "status"]).expect("parse");
        assert_eq!(cli.color, ColorChoice::Auto);
    }
}
