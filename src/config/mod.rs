//! Configuration handling for ai-attribution.
//!
//! This module provides configuration loading and validation,
//! supporting both `ai-attribution.toml` files and sensible defaults.

use crate::activity::WatcherSettings;
use crate::core::error::{Error, Result};
use crate::rules::Rulebook;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "ai-attribution.toml";

/// Environment variable overriding `detection.threshold`.
pub const ENV_THRESHOLD: &str = "AIA_THRESHOLD";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detection engine settings.
    pub detection: DetectionConfig,
    /// Commit attribution settings.
    pub attribution: AttributionConfig,
    /// Activity log and watcher settings.
    pub activity: ActivityConfig,
    /// Rule set overrides.
    pub rules: RulesConfig,
    /// Directory of the file this config was loaded from.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from the default location.
    pub fn load() -> Result<Self> {
        let path = Self::find_config_file()?;
        Self::load_from(&path)
    }

    /// Loads configuration or returns defaults if not found.
    pub fn load_or_default() -> Result<Self> {
        match Self::find_config_file() {
            Ok(path) => Self::load_from(&path),
            Err(Error::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read config", e))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        config.validate()?;

        Ok(config)
    }

    /// Finds the configuration file by searching up from the current directory.
    pub fn find_config_file() -> Result<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| Error::io("get current dir", e))?;
        Self::find_config_file_from(&cwd)
    }

    /// Finds the configuration file by searching up from `start`.
    pub fn find_config_file_from(start: &Path) -> Result<PathBuf> {
        let mut current = start;
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::ConfigNotFound {
            path: start.join(CONFIG_FILE_NAME),
        })
    }

    /// Applies overrides from the environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_threshold_override(std::env::var(ENV_THRESHOLD).ok().as_deref())
    }

    /// Replaces the threshold with a textual override, if any.
    pub fn apply_threshold_override(&mut self, value: Option<&str>) -> Result<()> {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };

        let threshold: u32 = value.parse().map_err(|_| {
            Error::config_invalid(ENV_THRESHOLD, format!("Not an integer: {value}"))
        })?;
        self.detection.threshold = threshold;
        self.validate()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.detection.threshold > 100 {
            return Err(Error::config_invalid(
                "detection.threshold",
                format!("Must be between 0 and 100, got {}", self.detection.threshold),
            ));
        }

        for pattern in &self.detection.exclude {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(Error::config_invalid(
                    "detection.exclude",
                    format!("Invalid glob '{pattern}': {e}"),
                ));
            }
        }

        self.activity.retention()?;
        self.activity.watcher_settings()?;

        if self.activity.max_entries == 0 {
            return Err(Error::config_invalid(
                "activity.max_entries",
                "Must be at least 1",
            ));
        }

        if self.rules.path.is_some() {
            self.rulebook()?;
        }

        Ok(())
    }

    /// Compiles the rule sets, reading the configured rules file if any.
    ///
    /// A relative rules path is resolved against the config file's directory.
    pub fn rulebook(&self) -> Result<Rulebook> {
        match &self.rules.path {
            Some(path) => {
                let path = match &self.base_dir {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path.clone(),
                };
                Rulebook::load(&path)
            },
            None => Rulebook::builtin(),
        }
    }

    /// Generates default configuration as a string.
    #[must_use]
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Detection engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Confidence at or above which code is classified as AI-generated.
    pub threshold: u32,
    /// Use recent activity on the file as a signal.
    pub time_proximity: bool,
    /// Use the regex-driven signals (syntax, boilerplate, lexical).
    pub pattern_matching: bool,
    /// Glob patterns of staged files that are never analyzed.
    pub exclude: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 70,
            time_proximity: true,
            pattern_matching: true,
            exclude: vec!["*.lock".to_string(), "*.min.js".to_string()],
        }
    }
}

/// Commit attribution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Name used in the co-authorship trailer.
    pub author_name: String,
    /// Email used in the co-authorship trailer.
    pub author_email: String,
    /// Append the trailer to the recorded commit message.
    pub append_trailer: bool,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            author_name: "AI Assistant".to_string(),
            author_email: "ai-assistant@users.noreply.github.com".to_string(),
            append_trailer: true,
        }
    }
}

impl AttributionConfig {
    /// Returns the co-authorship trailer line.
    #[must_use]
    pub fn trailer(&self) -> String {
        format!("Co-authored-by: {} <{}>", self.author_name, self.author_email)
    }
}

/// Activity log and watcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// How long entries are kept.
    pub retention: String,
    /// Maximum number of entries kept after a purge.
    pub max_entries: usize,
    /// Maximum gap between rapid changes.
    pub velocity_interval: String,
    /// Rapid changes in a row that count as a burst.
    pub velocity_burst: usize,
    /// Line count above which a single change counts as bulk.
    pub volume_lines: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            retention: "24h".to_string(),
            max_entries: 100,
            velocity_interval: "150ms".to_string(),
            velocity_burst: 3,
            volume_lines: 10,
        }
    }
}

impl ActivityConfig {
    /// Parses the retention window.
    pub fn retention(&self) -> Result<Duration> {
        parse_duration("activity.retention", &self.retention)
    }

    /// Builds the watcher thresholds.
    pub fn watcher_settings(&self) -> Result<WatcherSettings> {
        if self.velocity_burst < 2 {
            return Err(Error::config_invalid(
                "activity.velocity_burst",
                "Must be at least 2",
            ));
        }

        Ok(WatcherSettings {
            velocity_interval: parse_duration(
                "activity.velocity_interval",
                &self.velocity_interval,
            )?,
            velocity_burst: self.velocity_burst,
            volume_lines: self.volume_lines,
        })
    }
}

/// Rule set overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// TOML file replacing some or all built-in rule sets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .map_err(|_| Error::config_invalid(field, format!("Invalid duration: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.detection.threshold, 70);
        assert!(config.detection.time_proximity);
        assert!(config.detection.pattern_matching);
        assert_eq!(config.activity.max_entries, 100);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_above_100_rejected() {
        let mut config = Config::default();
        config.detection.threshold = 101;
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigInvalid { ref field, .. }) if field == "detection.threshold"
        ));
    }

    #[test]
    fn test_invalid_retention() {
        let mut config = Config::default();
        config.activity.retention = "forever".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_velocity_burst_minimum() {
        let mut config = Config::default();
        config.activity.velocity_burst = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_entries_rejected() {
        let mut config = Config::default();
        config.activity.max_entries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_exclude_glob() {
        let mut config = Config::default();
        config.detection.exclude = vec!["[".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_watcher_settings() {
        let settings = Config::default()
            .activity
            .watcher_settings()
            .expect("settings");
        assert_eq!(settings, WatcherSettings::default());
    }

    #[test]
    fn test_trailer() {
        assert_eq!(
            AttributionConfig::default().trailer(),
            "Co-authored-by: AI Assistant <ai-assistant@users.noreply.github.com>"
        );
    }

    #[test]
    fn test_threshold_override() {
        let mut config = Config::default();
        config
            .apply_threshold_override(Some(" 55 "))
            .expect("override");
        assert_eq!(config.detection.threshold, 55);

        config.apply_threshold_override(None).expect("no override");
        assert_eq!(config.detection.threshold, 55);

        assert!(config.apply_threshold_override(Some("high")).is_err());
        assert!(config.apply_threshold_override(Some("200")).is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[detection]\nthreshold = 80\n").expect("write config");

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.detection.threshold, 80);
        assert!(config.detection.time_proximity);
        assert_eq!(config.attribution.author_name, "AI Assistant");
    }

    #[test]
    fn test_find_config_walks_up() {
        let temp = TempDir::new().expect("create temp dir");
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).expect("create dirs");
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "").expect("write config");

        let found = Config::find_config_file_from(&nested).expect("find");
        assert_eq!(found, temp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_relative_rules_path_resolved_against_config() {
        let temp = TempDir::new().expect("create temp dir");
        std::fs::write(
            temp.path().join("rules.toml"),
            "[lexical]\nversion = 4\n\n[[lexical.rules]]\ntag = \"function\"\npattern = 'fn '\n",
        )
        .expect("write rules");
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[rules]\npath = \"rules.toml\"\n").expect("write config");

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.rulebook().expect("rulebook").lexical.version(), 4);
    }

    #[test]
    fn test_missing_rules_file_fails_validation() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[rules]\npath = \"missing.toml\"\n").expect("write config");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml = Config::default_toml();
        assert!(toml.contains("[detection]"));
        assert!(toml.contains("[attribution]"));
        assert!(toml.contains("[activity]"));
        let parsed: Config = toml::from_str(&toml).expect("parse generated config");
        assert!(parsed.validate().is_ok());
    }
}
