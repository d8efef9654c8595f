//! The pre-commit attribution question.

use crate::core::detector::DetectionReport;
use crate::core::error::{Error, Result};
use crate::core::report;
use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use std::io::IsTerminal;

/// Maximum number of times the question is asked before giving up.
pub const MAX_ROUNDS: usize = 5;

/// One answer to the attribution question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Attribute the commit to the assistant.
    Yes,
    /// Do not attribute.
    No,
    /// Show the detection report and ask again.
    ViewDetails,
}

impl Choice {
    /// All choices in menu order.
    pub const ALL: [Self; 3] = [Self::Yes, Self::No, Self::ViewDetails];

    /// Returns the menu label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Yes => "Yes, attribute to AI",
            Self::No => "No, human-written",
            Self::ViewDetails => "View details",
        }
    }
}

/// Asks the human. Implemented over the terminal and by scripted test doubles.
pub trait Prompter {
    /// Asks once. `None` means the prompt was dismissed.
    fn ask(&mut self, report: &DetectionReport) -> Result<Option<Choice>>;

    /// Displays the detection details.
    fn show_details(&mut self, report: &DetectionReport);
}

/// Runs the question loop and returns whether to attribute.
///
/// Dismissing the prompt or running out of rounds counts as "no".
pub fn confirm_attribution(prompter: &mut dyn Prompter, report: &DetectionReport) -> Result<bool> {
    for round in 1..=MAX_ROUNDS {
        match prompter.ask(report)? {
            Some(Choice::Yes) => return Ok(true),
            Some(Choice::No) | None => return Ok(false),
            Some(Choice::ViewDetails) => {
                tracing::debug!("Details requested (round {round})");
                prompter.show_details(report);
            },
        }
    }
    tracing::debug!("No answer after {MAX_ROUNDS} rounds; not attributing");
    Ok(false)
}

/// Returns true if a human can answer a prompt.
pub fn terminal_available() -> bool {
    std::io::stdin().is_terminal() && Term::stderr().is_term()
}

/// Prompts on stderr with a `dialoguer` menu.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    /// Creates a terminal prompter.
    pub const fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, report: &DetectionReport) -> Result<Option<Choice>> {
        let labels: Vec<&str> = Choice::ALL.iter().map(Choice::label).collect();
        let prompt = format!(
            "AI-generated code detected ({}% confidence). Attribute this commit to AI?",
            report.max_confidence()
        );

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact_on_opt(&Term::stderr())
            .map_err(|e| Error::Internal {
                message: format!("Prompt failed: {e}"),
            })?;

        Ok(selection.and_then(|i| Choice::ALL.get(i).copied()))
    }

    fn show_details(&mut self, report: &DetectionReport) {
        eprintln!();
        eprintln!("{}", style("Detection details").bold());
        report::print_report(report);
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned answers and counts detail views.
    struct Scripted {
        answers: VecDeque<Option<Choice>>,
        asked: usize,
        details_shown: usize,
    }

    impl Scripted {
        fn new(answers: impl IntoIterator<Item = Option<Choice>>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                asked: 0,
                details_shown: 0,
            }
        }
    }

    impl Prompter for Scripted {
        fn ask(&mut self, _report: &DetectionReport) -> Result<Option<Choice>> {
            self.asked += 1;
            Ok(self.answers.pop_front().unwrap_or(Some(Choice::ViewDetails)))
        }

        fn show_details(&mut self, _report: &DetectionReport) {
            self.details_shown += 1;
        }
    }

    fn report() -> DetectionReport {
        DetectionReport {
            has_ai_content: true,
            threshold: 70,
            files: Vec::new(),
            excluded: Vec::new(),
        }
    }

    #[test]
    fn test_yes_attributes() {
        let mut prompter = Scripted::new([Some(Choice::Yes)]);
        assert!(confirm_attribution(&mut prompter, &report()).expect("confirm"));
        assert_eq!(prompter.asked, 1);
    }

    #[test]
    fn test_no_declines() {
        let mut prompter = Scripted::new([Some(Choice::No)]);
        assert!(!confirm_attribution(&mut prompter, &report()).expect("confirm"));
    }

    #[test]
    fn test_dismissed_declines() {
        let mut prompter = Scripted::new([None]);
        assert!(!confirm_attribution(&mut prompter, &report()).expect("confirm"));
    }

    #[test]
    fn test_view_details_reasks() {
        let mut prompter = Scripted::new([
            Some(Choice::ViewDetails),
            Some(Choice::ViewDetails),
            Some(Choice::Yes),
        ]);
        assert!(confirm_attribution(&mut prompter, &report()).expect("confirm"));
        assert_eq!(prompter.asked, 3);
        assert_eq!(prompter.details_shown, 2);
    }

    #[test]
    fn test_loop_is_bounded() {
        let mut prompter = Scripted::new([]);
        assert!(!confirm_attribution(&mut prompter, &report()).expect("confirm"));
        assert_eq!(prompter.asked, MAX_ROUNDS);
        assert_eq!(prompter.details_shown, MAX_ROUNDS);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Choice::ALL.len(), 3);
        assert!(Choice::ViewDetails.label().contains("details"));
    }
}
