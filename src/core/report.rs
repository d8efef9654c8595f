//! Console rendering of detection results.

use crate::core::detector::{DetectionReport, DetectionResult};
use console::style;
use std::fmt::Write as _;
use std::path::Path;

/// Renders one file's result as indented lines.
pub fn render_result(path: &Path, result: &DetectionResult) -> String {
    let marker = if result.is_ai_generated {
        style("●").red().to_string()
    } else {
        style("○").dim().to_string()
    };

    let mut out = format!(
        "  {} {} {}\n",
        marker,
        style(path.display()).cyan(),
        style(format!("{}%", result.confidence)).bold()
    );
    for reason in &result.reasons {
        let _ = writeln!(out, "      - {reason}");
    }
    if let Some(age) = result.metadata.time_proximity {
        let _ = writeln!(out, "      activity: {age}ms before analysis");
    }
    out
}

/// Renders a whole report.
pub fn render_report(report: &DetectionReport) -> String {
    let mut out = String::new();
    for file in &report.files {
        out.push_str(&render_result(&file.path, &file.result));
    }
    if !report.excluded.is_empty() {
        let _ = writeln!(
            out,
            "  {} {} file(s) excluded",
            style("•").cyan(),
            report.excluded.len()
        );
    }
    let verdict = if report.has_ai_content {
        style("AI-generated content likely").yellow().to_string()
    } else {
        style("No AI-generated content detected").green().to_string()
    };
    let _ = writeln!(
        out,
        "  {} (threshold {}%, highest {}%)",
        verdict,
        report.threshold,
        report.max_confidence()
    );
    out
}

/// Prints a report to stderr.
pub fn print_report(report: &DetectionReport) {
    eprint!("{}", render_report(report));
}
