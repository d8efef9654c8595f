//! Independent scorers, one per heuristic signal.
//!
//! Every analyzer is a pure function of its [`AnalysisInput`]: it returns a
//! bounded number of points plus human-readable reasons. An analyzer that
//! cannot produce a result returns an error; the engine turns that into zero
//! points and no reason.

pub mod boilerplate;
pub mod chunk;
pub mod comments;
pub mod lexical;
pub mod proximity;
pub mod syntax;

pub use boilerplate::BoilerplateAnalyzer;
pub use chunk::ChunkSizeAnalyzer;
pub use comments::CommentQualityAnalyzer;
pub use lexical::LexicalPatternAnalyzer;
pub use proximity::TimeProximityAnalyzer;
pub use syntax::SyntaxAnalyzer;

use crate::activity::ActivityEntry;
use crate::core::error::Result;
use crate::core::language::Language;
use crate::rules::CompiledRuleSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// The signal an analyzer measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    /// Length of the added text.
    ChunkSize,
    /// Complete top-level constructs.
    SyntaxCompleteness,
    /// Known code templates.
    Boilerplate,
    /// Documentation and descriptive comments.
    CommentQuality,
    /// Distinct structural token kinds.
    LexicalPattern,
    /// Recent assistant activity on the same file.
    TimeProximity,
}

impl SignalKind {
    /// Every signal, in evaluation order.
    pub const ALL: [Self; 6] = [
        Self::ChunkSize,
        Self::SyntaxCompleteness,
        Self::Boilerplate,
        Self::CommentQuality,
        Self::LexicalPattern,
        Self::TimeProximity,
    ];

    /// Maximum points the signal can contribute.
    #[must_use]
    pub const fn max_points(&self) -> u32 {
        match self {
            Self::ChunkSize => 30,
            Self::SyntaxCompleteness | Self::CommentQuality | Self::LexicalPattern => 25,
            Self::Boilerplate => 20,
            Self::TimeProximity => 50,
        }
    }

    /// Returns a human-readable name for the signal.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChunkSize => "chunk-size",
            Self::SyntaxCompleteness => "syntax-completeness",
            Self::Boilerplate => "boilerplate",
            Self::CommentQuality => "comment-quality",
            Self::LexicalPattern => "lexical-pattern",
            Self::TimeProximity => "time-proximity",
        }
    }

    /// Returns true for the signals driven by regex rule sets.
    #[must_use]
    pub const fn is_pattern_based(&self) -> bool {
        matches!(
            self,
            Self::SyntaxCompleteness | Self::Boilerplate | Self::LexicalPattern
        )
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What an analyzer saw, folded into the result metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Number of characters in the added text.
    ChunkSize(usize),
    /// Whether a complete construct was found.
    CompleteConstruct(bool),
    /// Whether a known template was found.
    Boilerplate(bool),
    /// Whether quality comments were found.
    QualityComments(bool),
    /// Number of distinct structural token kinds.
    PatternKinds(usize),
    /// Age in milliseconds of the matching activity entry, if any.
    Proximity(Option<u64>),
}

/// Output of a single analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    /// Points awarded.
    pub points: u32,
    /// Human-readable reasons for the points.
    pub reasons: Vec<String>,
    /// Raw observation for the result metadata.
    pub observation: Observation,
}

impl Signal {
    /// A signal that awarded nothing.
    #[must_use]
    pub const fn none(observation: Observation) -> Self {
        Self {
            points: 0,
            reasons: Vec::new(),
            observation,
        }
    }

    /// A signal with points and a single reason.
    #[must_use]
    pub fn scored(points: u32, reason: impl Into<String>, observation: Observation) -> Self {
        Self {
            points,
            reasons: vec![reason.into()],
            observation,
        }
    }
}

/// Everything an analyzer may look at.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInput<'a> {
    /// The added text.
    pub text: &'a str,
    /// Path of the file the text was added to, if known.
    pub path: Option<&'a Path>,
    /// Language derived from the path.
    pub language: Language,
    /// Activity log contents, `None` when the log could not be read.
    pub activity: Option<&'a [ActivityEntry]>,
    /// Reference time for age computations.
    pub now: DateTime<Utc>,
}

impl<'a> AnalysisInput<'a> {
    /// Creates an input for text added to an optional file.
    #[must_use]
    pub fn new(text: &'a str, path: Option<&'a Path>) -> Self {
        Self {
            text,
            path,
            language: path.map(Language::from_path).unwrap_or_default(),
            activity: Some(&[]),
            now: Utc::now(),
        }
    }

    /// Sets the activity entries.
    #[must_use]
    pub const fn activity(mut self, entries: Option<&'a [ActivityEntry]>) -> Self {
        self.activity = entries;
        self
    }

    /// Sets the reference time.
    #[must_use]
    pub const fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Returns true if the input carries at least one structural token kind.
///
/// Construct and template analyzers built with a structure gate only score
/// text that passes this check.
pub(crate) fn has_structure(gate: Option<&CompiledRuleSet>, input: &AnalysisInput<'_>) -> bool {
    gate.map_or(true, |rules| {
        rules.first_match(input.text, input.language).is_some()
    })
}

/// A stateless scorer for one signal.
pub trait Analyzer: std::fmt::Debug + Send + Sync {
    /// The signal this analyzer measures.
    fn kind(&self) -> SignalKind;

    /// Scores the input.
    fn analyze(&self, input: &AnalysisInput<'_>) -> Result<Signal>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_points_table() {
        let total: u32 = SignalKind::ALL.iter().map(SignalKind::max_points).sum();
        assert_eq!(total, 30 + 25 + 20 + 25 + 25 + 50);
    }

    #[test]
    fn test_pattern_based_signals() {
        assert!(SignalKind::SyntaxCompleteness.is_pattern_based());
        assert!(SignalKind::Boilerplate.is_pattern_based());
        assert!(SignalKind::LexicalPattern.is_pattern_based());
        assert!(!SignalKind::CommentQuality.is_pattern_based());
        assert!(!SignalKind::TimeProximity.is_pattern_based());
    }

    #[test]
    fn test_input_language_from_path() {
        let path = Path::new("src/widget.tsx");
        let input = AnalysisInput::new("x", Some(path));
        assert_eq!(input.language, Language::TypeScript);
        assert_eq!(AnalysisInput::new("x", None).language, Language::Unknown);
    }

    #[test]
    fn test_signal_kind_display() {
        assert_eq!(SignalKind::TimeProximity.to_string(), "time-proximity");
    }
}
