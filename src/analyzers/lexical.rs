//! Lexical-pattern signal: how many distinct structural token kinds appear.

use super::{AnalysisInput, Analyzer, Observation, Signal, SignalKind};
use crate::core::error::Result;
use crate::rules::CompiledRuleSet;

/// Counts distinct token kinds; each rule tag is one kind.
#[derive(Debug, Clone)]
pub struct LexicalPatternAnalyzer {
    rules: CompiledRuleSet,
}

impl LexicalPatternAnalyzer {
    /// Creates the analyzer over a lexical rule set.
    #[must_use]
    pub const fn new(rules: CompiledRuleSet) -> Self {
        Self { rules }
    }

    /// Points for a number of distinct kinds.
    #[must_use]
    pub const fn points_for(kinds: usize) -> u32 {
        match kinds {
            0 | 1 => 0,
            2 => 15,
            3 => 20,
            _ => 25,
        }
    }
}

impl Analyzer for LexicalPatternAnalyzer {
    fn kind(&self) -> SignalKind {
        SignalKind::LexicalPattern
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Result<Signal> {
        let mut kinds: Vec<&str> = Vec::new();
        for rule in self.rules.matching(input.text, input.language) {
            if !kinds.contains(&rule.tag()) {
                kinds.push(rule.tag());
            }
        }

        let observation = Observation::PatternKinds(kinds.len());
        Ok(match Self::points_for(kinds.len()) {
            0 => Signal::none(observation),
            points => Signal::scored(
                points,
                format!("Multiple code patterns detected ({})", kinds.join(", ")),
                observation,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin;
    use rstest::rstest;
    use std::path::Path;

    fn signal(text: &str, path: &str) -> Signal {
        LexicalPatternAnalyzer::new(
            CompiledRuleSet::compile("lexical", &builtin::lexical()).expect("compile"),
        )
        .analyze(&AnalysisInput::new(text, Some(Path::new(path))))
        .expect("analyze")
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 15)]
    #[case(3, 20)]
    #[case(4, 25)]
    #[case(7, 25)]
    fn test_points_for(#[case] kinds: usize, #[case] expected: u32) {
        assert_eq!(LexicalPatternAnalyzer::points_for(kinds), expected);
    }

    #[test]
    fn test_doc_function_export() {
        let signal = signal(
            "/** adds two numbers */\nfunction add(a,b){return a+b;}\nexport default add;",
            "add.js",
        );
        assert_eq!(signal.points, 20);
        assert_eq!(signal.observation, Observation::PatternKinds(3));
        assert_eq!(
            signal.reasons,
            vec!["Multiple code patterns detected (function, export, comment)"]
        );
    }

    #[test]
    fn test_four_kinds_caps_at_max() {
        let text = "import fs from 'fs';\nconst LIMIT = 3;\nexport interface Opts { n: number }\nexport function run() {}";
        let signal = signal(text, "run.ts");
        assert_eq!(signal.points, 25);
        assert_eq!(signal.observation, Observation::PatternKinds(5));
    }

    #[test]
    fn test_repeated_kind_counts_once() {
        let signal = signal("const a = 1;\nconst b = 2;\nconst c = 3;", "a.js");
        assert_eq!(signal.points, 0);
        assert_eq!(signal.observation, Observation::PatternKinds(1));
    }

    #[rstest]
    #[case("class Foo {}", "foo.js")]
    #[case("impl Point {}", "point.rs")]
    #[case("x = 1  # Normalize the scale", "scale.py")]
    #[case("def f():\n    \"\"\"Compute it.\"\"\"", "f.py")]
    #[case("save(x); // Persist before exit", "save.js")]
    fn test_constructs_count_as_kinds(#[case] text: &str, #[case] path: &str) {
        assert_ne!(signal(text, path).observation, Observation::PatternKinds(0));
    }

    #[test]
    fn test_plain_statement_scores_zero() {
        let signal = signal("total += item.price * qty;", "cart.js");
        assert_eq!(signal.points, 0);
        assert!(signal.reasons.is_empty());
    }
}
