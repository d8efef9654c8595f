//! Chunk-size signal: assistants insert large blocks at once.

use super::{AnalysisInput, Analyzer, Observation, Signal, SignalKind};
use crate::core::error::Result;

/// Scores the length of the added text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkSizeAnalyzer;

impl ChunkSizeAnalyzer {
    /// Points for a chunk of `len` characters.
    #[must_use]
    pub const fn points_for(len: usize) -> u32 {
        if len > 500 {
            30
        } else if len > 200 {
            20
        } else if len > 100 {
            10
        } else {
            0
        }
    }
}

impl Analyzer for ChunkSizeAnalyzer {
    fn kind(&self) -> SignalKind {
        SignalKind::ChunkSize
    }

    fn analyze(&self, input: &AnalysisInput<'_>) -> Result<Signal> {
        let len = input.text.chars().count();
        let observation = Observation::ChunkSize(len);

        Ok(match Self::points_for(len) {
            0 => Signal::none(observation),
            points => Signal::scored(
                points,
                format!("Large code chunk added ({len} characters)"),
                observation,
            ),
        })
    }
}
