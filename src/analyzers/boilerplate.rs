//! Boilerplate signal: recognizable templates assistants like to emit.

use super::{has_structure, AnalysisInput, Analyzer, Observation, Signal, SignalKind};
use crate::core::error::Result;
use crate::rules::CompiledRuleSet;

/// Awards points when the added text matches a known template.
#[derive(Debug, Clone)]
pub struct BoilerplateAnalyzer {
    rules: CompiledRuleSet,
    structure: Option<CompiledRuleSet>,
}

impl BoilerplateAnalyzer {
    /// Creates the analyzer over a boilerplate rule set.
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

impl Analyzer for BoilerplateAnalyzer {
    fn kind(&self) -> SignalKind {
        SignalKind::Boilerplate
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Result<Signal> {
        if !has_structure(self.structure.as_ref(), input) {
            return Ok(Signal::none(Observation::Boilerplate(false)));
        }

        Ok(match self.rules.first_match(input.text, input.language) {
            Some(rule) => Signal::scored(
                self.kind().max_points(),
                format!("Boilerplate pattern: {}", rule.description()),
                Observation::Boilerplate(true),
            ),
            None => Signal::none(Observation::Boilerplate(false)),
        })
    }
}
