//! Main entry point for the `aia` CLI.

use ai_attribution::cli;
use std::error::Error as _;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            if !e.is_user_error() {
                let mut source = e.source();
                while let Some(cause) = source {
                    eprintln!("  Caused by: {cause}");
                    source = cause.source();
                }
            }
            u8::try_from(e.exit_code()).map_or(ExitCode::FAILURE, ExitCode::from)
        },
    }
}
