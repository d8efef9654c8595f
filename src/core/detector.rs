//! The detection engine: runs the analyzers and classifies added code.
//!
//! Each analyzer contributes at most its own maximum; the sum is clamped to
//! 0..=100 and compared against the threshold. The construct and template
//! analyzers only score text that carries a structural token kind. An analyzer that fails
//! contributes nothing and the pipeline carries on. The engine only reads the
//! activity entries it is handed.

use crate::activity::ActivityEntry;
use crate::analyzers::{
    AnalysisInput, Analyzer, BoilerplateAnalyzer, ChunkSizeAnalyzer, CommentQualityAnalyzer,
    LexicalPatternAnalyzer, Observation, SignalKind, SyntaxAnalyzer, TimeProximityAnalyzer,
};
use crate::config::DetectionConfig;
use crate::core::error::{Error, Result};
use crate::core::git::StagedChange;
use crate::core::language::Language;
use crate::rules::Rulebook;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Highest possible confidence.
pub const MAX_CONFIDENCE: u32 = 100;

/// Default classification threshold.
pub const DEFAULT_THRESHOLD: u32 = 70;

/// Raw observations behind a result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionMetadata {
    /// Characters in the added text.
    pub chunk_size: usize,
    /// Distinct structural token kinds found.
    pub pattern_matches: usize,
    /// A known template was found.
    pub has_boilerplate: bool,
    /// Documentation or descriptive comments were found.
    pub has_quality_comments: bool,
    /// Age in milliseconds of the matching activity entry.
    pub time_proximity: Option<u64>,
    /// Language derived from the file path.
    pub language_type: Language,
}

/// Verdict for one piece of added text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Confidence reached the threshold.
    pub is_ai_generated: bool,
    /// Combined score, 0 to 100.
    pub confidence: u32,
    /// Deduplicated reasons, in analyzer order.
    pub reasons: Vec<String>,
    /// Raw observations.
    pub metadata: DetectionMetadata,
}

/// Result for one staged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetection {
    /// Repository-relative path.
    pub path: PathBuf,
    /// Verdict for the file's added text.
    pub result: DetectionResult,
}

/// Results for a whole staged diff.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    /// Any file classified as AI-generated.
    pub has_ai_content: bool,
    /// Threshold the files were classified against.
    pub threshold: u32,
    /// Analyzed files, in diff order.
    pub files: Vec<FileDetection>,
    /// Files skipped by an exclude pattern.
    pub excluded: Vec<PathBuf>,
}

impl DetectionReport {
    /// Files classified as AI-generated.
    pub fn ai_files(&self) -> impl Iterator<Item = &FileDetection> {
        self.files.iter().filter(|f| f.result.is_ai_generated)
    }

    /// Highest confidence across files.
    #[must_use]
    pub fn max_confidence(&self) -> u32 {
        self.files
            .iter()
            .map(|f| f.result.confidence)
            .max()
            .unwrap_or(0)
    }
}

/// Which analyzers run and where the line is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Confidence at or above which text is AI-generated.
    pub threshold: u32,
    /// Run the time-proximity analyzer.
    pub time_proximity: bool,
    /// Run the syntax, boilerplate and lexical analyzers.
    pub pattern_matching: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            time_proximity: true,
            pattern_matching: true,
        }
    }
}

impl From<&DetectionConfig> for EngineSettings {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            threshold: config.threshold,
            time_proximity: config.time_proximity,
            pattern_matching: config.pattern_matching,
        }
    }
}

/// Runs analyzers over added text.
#[derive(Debug)]
pub struct DetectionEngine {
    analyzers: Vec<Box<dyn Analyzer>>,
    threshold: u32,
    exclude: Vec<glob::Pattern>,
}

impl DetectionEngine {
    /// Builds the standard analyzer pipeline.
    #[must_use]
    pub fn new(settings: EngineSettings, rules: &Rulebook) -> Self {
        let mut analyzers: Vec<Box<dyn Analyzer>> = vec![Box::new(ChunkSizeAnalyzer)];

        if settings.pattern_matching {
            analyzers.push(Box::new(
                SyntaxAnalyzer::new(rules.syntax.clone()).with_structure_gate(rules.lexical.clone()),
            ));
            analyzers.push(Box::new(
                BoilerplateAnalyzer::new(rules.boilerplate.clone())
                    .with_structure_gate(rules.lexical.clone()),
            ));
        }
        analyzers.push(Box::new(CommentQualityAnalyzer::new(rules.comments.clone())));
        if settings.pattern_matching {
            analyzers.push(Box::new(LexicalPatternAnalyzer::new(rules.lexical.clone())));
        }
        if settings.time_proximity {
            analyzers.push(Box::new(TimeProximityAnalyzer));
        }

        Self::with_analyzers(settings.threshold, analyzers)
    }

    /// Builds the engine described by a detection config.
    pub fn from_config(config: &DetectionConfig, rules: &Rulebook) -> Result<Self> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| {
                    Error::config_invalid("detection.exclude", format!("Invalid glob '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(EngineSettings::from(config), rules).with_exclude(exclude))
    }

    /// Builds an engine over an explicit analyzer list.
    #[must_use]
    pub fn with_analyzers(threshold: u32, analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self {
            analyzers,
            threshold: threshold.min(MAX_CONFIDENCE),
            exclude: Vec::new(),
        }
    }

    /// Sets the glob patterns of files that are never analyzed.
    #[must_use]
    pub fn with_exclude(mut self, exclude: Vec<glob::Pattern>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Returns the classification threshold.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Returns the signals this engine evaluates, in order.
    pub fn signals(&self) -> impl Iterator<Item = SignalKind> + '_ {
        self.analyzers.iter().map(|a| a.kind())
    }

    /// Returns true if a confidence classifies as AI-generated.
    #[must_use]
    pub const fn classify(&self, confidence: u32) -> bool {
        confidence >= self.threshold
    }

    /// Returns true if the path matches an exclude pattern.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(path))
    }

    /// Scores text added to an optional file against the activity log.
    ///
    /// `activity` is `None` when the log could not be read.
    #[must_use]
    pub fn detect(
        &self,
        text: &str,
        path: Option<&Path>,
        activity: Option<&[ActivityEntry]>,
    ) -> DetectionResult {
        self.detect_input(&AnalysisInput::new(text, path).activity(activity))
    }

    /// Like [`detect`](Self::detect), with an explicit reference time.
    #[must_use]
    pub fn detect_at(
        &self,
        text: &str,
        path: Option<&Path>,
        activity: Option<&[ActivityEntry]>,
        now: DateTime<Utc>,
    ) -> DetectionResult {
        self.detect_input(&AnalysisInput::new(text, path).activity(activity).at(now))
    }

    /// Scores a prepared input.
    #[must_use]
    pub fn detect_input(&self, input: &AnalysisInput<'_>) -> DetectionResult {
        let mut total: u32 = 0;
        let mut reasons: Vec<String> = Vec::new();
        let mut metadata = DetectionMetadata {
            chunk_size: input.text.chars().count(),
            language_type: input.language,
            ..DetectionMetadata::default()
        };

        for analyzer in &self.analyzers {
            let kind = analyzer.kind();
            let signal = match analyzer.analyze(input) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::debug!("{} analyzer skipped: {}", kind, e);
                    continue;
                },
            };

            total += signal.points.min(kind.max_points());
            for reason in signal.reasons {
                if !reasons.contains(&reason) {
                    reasons.push(reason);
                }
            }
            fold_observation(&mut metadata, signal.observation);
        }

        let confidence = total.min(MAX_CONFIDENCE);
        DetectionResult {
            is_ai_generated: self.classify(confidence),
            confidence,
            reasons,
            metadata,
        }
    }

    /// Scores every staged file that is not excluded.
    #[must_use]
    pub fn detect_staged(
        &self,
        changes: &[StagedChange],
        activity: Option<&[ActivityEntry]>,
    ) -> DetectionReport {
        let now = Utc::now();
        let mut report = DetectionReport {
            threshold: self.threshold,
            ..DetectionReport::default()
        };

        for change in changes {
            if self.is_excluded(&change.path) {
                tracing::debug!("Excluded from detection: {}", change.path.display());
                report.excluded.push(change.path.clone());
                continue;
            }

            let result = self.detect_at(&change.added, Some(&change.path), activity, now);
            tracing::debug!(
                "{}: confidence {} ({})",
                change.path.display(),
                result.confidence,
                if result.is_ai_generated { "ai" } else { "human" }
            );
            report.has_ai_content |= result.is_ai_generated;
            report.files.push(FileDetection {
                path: change.path.clone(),
                result,
            });
        }

        report
    }
}

fn fold_observation(metadata: &mut DetectionMetadata, observation: Observation) {
    match observation {
        Observation::ChunkSize(size) => metadata.chunk_size = size,
        Observation::CompleteConstruct(_) => {},
        Observation::Boilerplate(found) => metadata.has_boilerplate = found,
        Observation::QualityComments(found) => metadata.has_quality_comments = found,
        Observation::PatternKinds(kinds) => metadata.pattern_matches = kinds,
        Observation::Proximity(age) => metadata.time_proximity = age,
    }
}
