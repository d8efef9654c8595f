//! Versioned, tagged pattern sets used by the regex-driven analyzers.
//!
//! Each analyzer that matches text owns one [`RuleSet`]. Rule sets are plain
//! data: the built-in sets live in [`builtin`], and any of them can be
//! replaced by a TOML file referenced from the `[rules]` config section.
//!
//! ```toml
//! [boilerplate]
//! version = 2
//!
//! [[boilerplate.rules]]
//! tag = "fastapi-route"
//! languages = ["python"]
//! pattern = '@router\.(get|post)\('
//! description = "FastAPI route handler"
//! ```

pub mod builtin;

use crate::core::error::{Error, Result};
use crate::core::language::Language;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single uncompiled rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Stable identifier of the rule within its set.
    pub tag: String,
    /// Languages the rule applies to. Empty means every language.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<Language>,
    /// Regular expression (Rust `regex` syntax).
    pub pattern: String,
    /// Human-readable description used in detection reasons.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A versioned list of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Version of the rule data, reported by `aia status`.
    pub version: u32,
    /// The rules, evaluated in order.
    pub rules: Vec<RuleSpec>,
}

/// On-disk rules file. Sets that are absent keep their built-in value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesFile {
    /// Replacement for the syntax-completeness rules.
    pub syntax: Option<RuleSet>,
    /// Replacement for the boilerplate rules.
    pub boilerplate: Option<RuleSet>,
    /// Replacement for the lexical-pattern rules.
    pub lexical: Option<RuleSet>,
    /// Replacement for the comment-quality rules.
    pub comments: Option<RuleSet>,
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    tag: String,
    languages: Vec<Language>,
    description: String,
    regex: Regex,
}

impl Rule {
    /// Returns the rule's tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the description, falling back to the tag.
    #[must_use]
    pub fn description(&self) -> &str {
        if self.description.is_empty() {
            &self.tag
        } else {
            &self.description
        }
    }

    /// Returns the compiled expression.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns true if the rule applies to the given language.
    #[must_use]
    pub fn applies_to(&self, language: Language) -> bool {
        self.languages.is_empty() || self.languages.contains(&language)
    }

    /// Returns true if the rule applies to the language and matches the text.
    #[must_use]
    pub fn matches(&self, text: &str, language: Language) -> bool {
        self.applies_to(language) && self.regex.is_match(text)
    }
}

/// A compiled rule set.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    name: String,
    version: u32,
    rules: Vec<Rule>,
}

impl CompiledRuleSet {
    /// Compiles every rule of a set.
    pub fn compile(name: &str, set: &RuleSet) -> Result<Self> {
        let mut rules = Vec::with_capacity(set.rules.len());

        for spec in &set.rules {
            let regex = Regex::new(&spec.pattern).map_err(|e| Error::InvalidRule {
                set: name.to_string(),
                tag: spec.tag.clone(),
                message: e.to_string(),
            })?;

            rules.push(Rule {
                tag: spec.tag.clone(),
                languages: spec.languages.clone(),
                description: spec.description.clone(),
                regex,
            });
        }

        Ok(Self {
            name: name.to_string(),
            version: set.version,
            rules,
        })
    }

    /// Returns the set's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the set's data version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks up a rule by tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.tag == tag)
    }

    /// Returns the first rule matching the text, in set order.
    #[must_use]
    pub fn first_match(&self, text: &str, language: Language) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(text, language))
    }

    /// Returns every rule matching the text, in set order.
    #[must_use]
    pub fn matching(&self, text: &str, language: Language) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.matches(text, language))
            .collect()
    }
}

/// The complete collection of compiled rule sets.
#[derive(Debug, Clone)]
pub struct Rulebook {
    /// Complete top-level constructs, language specific.
    pub syntax: CompiledRuleSet,
    /// Known code templates.
    pub boilerplate: CompiledRuleSet,
    /// Structural token kinds; the tag is the kind.
    pub lexical: CompiledRuleSet,
    /// Comment shapes, tagged `doc`, `inline` and `hash-inline`.
    pub comments: CompiledRuleSet,
}

impl Rulebook {
    /// Compiles the built-in rule sets.
    pub fn builtin() -> Result<Self> {
        Self::from_file(RulesFile::default())
    }

    /// Loads a rules file, keeping built-in sets for sections it omits.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read rules", e))?;

        let file: RulesFile = toml::from_str(&content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse rules file", e))?;

        Self::from_file(file)
    }

    /// Compiles a rules file, falling back to built-ins per set.
    pub fn from_file(file: RulesFile) -> Result<Self> {
        let syntax = file.syntax.unwrap_or_else(builtin::syntax);
        let boilerplate = file.boilerplate.unwrap_or_else(builtin::boilerplate);
        let lexical = file.lexical.unwrap_or_else(builtin::lexical);
        let comments = file.comments.unwrap_or_else(builtin::comments);

        Ok(Self {
            syntax: CompiledRuleSet::compile("syntax", &syntax)?,
            boilerplate: CompiledRuleSet::compile("boilerplate", &boilerplate)?,
            lexical: CompiledRuleSet::compile("lexical", &lexical)?,
            comments: CompiledRuleSet::compile("comments", &comments)?,
        })
    }
}
