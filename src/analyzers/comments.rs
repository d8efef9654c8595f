//! Comment-quality signal.
//!
//! Generated code tends to be documented: block doc comments on every item and
//! full-sentence inline comments. Hand-written patches rarely carry either.
//! The two halves are scored independently and added.

use super::{AnalysisInput, Analyzer, Observation, Signal, SignalKind};
use crate::core::error::Result;
use crate::rules::builtin::tags;
use crate::rules::CompiledRuleSet;

/// Points for documentation comments.
pub const DOC_POINTS: u32 = 15;

/// Points for descriptive inline comments.
pub const INLINE_POINTS: u32 = 10;

/// Minimum length of an inline comment body to count as descriptive.
pub const MIN_INLINE_LEN: usize = 10;

/// Scores documentation and descriptive inline comments.
#[derive(Debug, Clone)]
pub struct CommentQualityAnalyzer {
    rules: CompiledRuleSet,
}

impl CommentQualityAnalyzer {
    /// Creates the analyzer over a comment rule set tagged `doc`, `inline`
    /// and `hash-inline`.
    #[must_use]
    pub const fn new(rules: CompiledRuleSet) -> Self {
        Self { rules }
    }

    fn has_doc(&self, input: &AnalysisInput<'_>) -> bool {
        self.rules
            .get(tags::DOC)
            .is_some_and(|rule| rule.matches(input.text, input.language))
    }

    fn has_descriptive_inline(&self, input: &AnalysisInput<'_>) -> bool {
        [tags::INLINE, tags::HASH_INLINE]
            .iter()
            .filter_map(|tag| self.rules.get(tag))
            .filter(|rule| rule.applies_to(input.language))
            .any(|rule| {
                rule.regex()
                    .captures_iter(input.text)
                    .filter_map(|caps| caps.get(1))
                    .any(|body| is_descriptive(body.as_str()))
            })
    }
}

/// Returns true for a comment body that reads like a sentence.
fn is_descriptive(body: &str) -> bool {
    let body = body.trim();
    body.chars().count() >= MIN_INLINE_LEN && body.chars().next().is_some_and(char::is_uppercase)
}

impl Analyzer for CommentQualityAnalyzer {
    fn kind(&self) -> SignalKind {
        SignalKind::CommentQuality
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Result<Signal> {
        let mut signal = Signal::none(Observation::QualityComments(false));

        if self.has_doc(input) {
            signal.points += DOC_POINTS;
            signal.reasons.push("Contains documentation comments".to_string());
        }
        if self.has_descriptive_inline(input) {
            signal.points += INLINE_POINTS;
            signal
                .reasons
                .push("Contains descriptive inline comments".to_string());
        }

        signal.observation = Observation::QualityComments(signal.points > 0);
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin;
    use rstest::rstest;
    use std::path::Path;

    fn points(text: &str, path: &str) -> u32 {
        CommentQualityAnalyzer::new(
            CompiledRuleSet::compile("comments", &builtin::comments()).expect("compile"),
        )
        .analyze(&AnalysisInput::new(text, Some(Path::new(path))))
        .expect("analyze")
        .points
    }

    #[rstest]
    #[case("/** adds two numbers */\nfunction add(a,b){return a+b;}", "add.js", 15)]
    #[case("/// Returns the sum.\nfn add() {}", "lib.rs", 15)]
    #[case("def f():\n    \"\"\"Compute it.\"\"\"\n    pass", "f.py", 15)]
    #[case("// Validate the input before saving\nsave(x);", "save.ts", 10)]
    #[case("x = 1  # Normalize the scale factor", "scale.py", 10)]
    #[case("/** Entry. */\n// Register every handler here\nboot();", "boot.js", 25)]
    fn test_scored(#[case] text: &str, #[case] path: &str, #[case] expected: u32) {
        assert_eq!(points(text, path), expected);
    }

    #[rstest]
    #[case("// fix later\nsave(x);", "save.js")]
    #[case("// Short\nsave(x);", "save.js")]
    #[case("let url = \"http://example.com/Path/Segment\";", "url.rs")]
    #[case("#[derive(Debug)]\nstruct S;", "s.rs")]
    #[case("/* Plain block comment */", "a.js")]
    #[case("# Install the tool first", "README.md")]
    #[case("# Install the tool first", "setup.ts")]
    fn test_unscored(#[case] text: &str, #[case] path: &str) {
        assert_eq!(points(text, path), 0);
    }

    #[rstest]
    #[case("Check bounds", true)]
    #[case("  Check bounds  ", true)]
    #[case("check bounds here", false)]
    #[case("Too short", false)]
    #[case("", false)]
    fn test_is_descriptive(#[case] body: &str, #[case] expected: bool) {
        assert_eq!(is_descriptive(body), expected);
    }

    #[test]
    fn test_reasons_listed_in_order() {
        let signal = CommentQualityAnalyzer::new(
            CompiledRuleSet::compile("comments", &builtin::comments()).expect("compile"),
        )
        .analyze(&AnalysisInput::new(
            "/** Doc. */\n// Explain what happens next\nrun();",
            Some(Path::new("run.js")),
        ))
        .expect("analyze");
        assert_eq!(
            signal.reasons,
            vec![
                "Contains documentation comments",
                "Contains descriptive inline comments"
            ]
        );
        assert_eq!(signal.observation, Observation::QualityComments(true));
    }
}
