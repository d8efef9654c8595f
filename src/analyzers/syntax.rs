//! Syntax-completeness signal: generated code arrives as whole constructs.

use super::{has_structure, AnalysisInput, Analyzer, Observation, Signal, SignalKind};
use crate::core::error::{Error, Result};
use crate::rules::CompiledRuleSet;

/// Awards points when the added text contains a complete top-level construct.
#[derive(Debug, Clone)]
pub struct SyntaxAnalyzer {
    rules: CompiledRuleSet,
    structure: Option<CompiledRuleSet>,
}

impl SyntaxAnalyzer {
    /// Creates the analyzer over a syntax rule set.
    #[must_use]
    pub const fn new(rules: CompiledRuleSet) -> Self {
        Self {
            rules,
            structure: None,
        }
    }

    /// Only scores text in which the lexical rules find a token kind.
    #[must_use]
    pub fn with_structure_gate(mut self, lexical: CompiledRuleSet) -> Self {
        self.structure = Some(lexical);
        self
    }
}

impl Analyzer for SyntaxAnalyzer {
    fn kind(&self) -> SignalKind {
        SignalKind::SyntaxCompleteness
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Result<Signal> {
        if !input.language.is_known() {
            return Err(Error::UnsupportedLanguage {
                path: input.path.map(|p| p.to_path_buf()).unwrap_or_default(),
            });
        }

        if !has_structure(self.structure.as_ref(), input) {
            return Ok(Signal::none(Observation::CompleteConstruct(false)));
        }

        Ok(match self.rules.first_match(input.text, input.language) {
            Some(rule) => Signal::scored(
                self.kind().max_points(),
                format!("{} ({})", rule.description(), input.language),
                Observation::CompleteConstruct(true),
            ),
            None => Signal::none(Observation::CompleteConstruct(false)),
        })
    }
}
