//! Built-in rule data.
//!
//! The patterns are deliberately crude: they look for the *shape* of
//! generated code, not for valid syntax.

use super::{RuleSet, RuleSpec};
use crate::core::language::Language;

/// Version of the built-in rule data.
pub const VERSION: u32 = 1;

/// Tags with meaning outside the rule data itself.
pub mod tags {
    /// Block documentation comment.
    pub const DOC: &str = "doc";
    /// In-line comment; capture group 1 is the comment body.
    pub const INLINE: &str = "inline";
    /// `#` in-line comment, for languages where `#` starts a comment.
    pub const HASH_INLINE: &str = "hash-inline";

    /// Function definition token.
    pub const FUNCTION: &str = "function";
    /// Constant definition token.
    pub const CONST: &str = "const";
    /// Import token.
    pub const IMPORT: &str = "import";
    /// Interface token.
    pub const INTERFACE: &str = "interface";
    /// Type definition token.
    pub const TYPE: &str = "type";
    /// Export token.
    pub const EXPORT: &str = "export";
    /// Comment token.
    pub const COMMENT: &str = "comment";
}

type RawRule = (&'static str, &'static [Language], &'static str, &'static str);

const ANY: &[Language] = &[];
const JS_TS: &[Language] = &[Language::JavaScript, Language::TypeScript];
const TS: &[Language] = &[Language::TypeScript];
const PY: &[Language] = &[Language::Python];
const RS: &[Language] = &[Language::Rust];
const GO: &[Language] = &[Language::Go];
const JAVA: &[Language] = &[Language::Java];
const BRACED_TRY: &[Language] = &[Language::JavaScript, Language::TypeScript, Language::Java];

const SYNTAX: &[RawRule] = &[
    (
        "js-function",
        JS_TS,
        r"(?s)(?:^|\n)\s*(?:export\s+(?:default\s+)?)?(?:async\s+)?function\s*\*?\s*\w*\s*\([^)]*\)\s*(?::\s*[^{]+)?\{.*\}",
        "Complete function declaration",
    ),
    (
        "js-arrow",
        JS_TS,
        r"(?s)\b(?:const|let|var)\s+\w+\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|\w+)\s*(?::\s*[^=]+)?=>\s*\{.*\}",
        "Complete arrow function",
    ),
    (
        "js-class",
        JS_TS,
        r"(?s)\bclass\s+\w+[^{]*\{.*\}",
        "Complete class definition",
    ),
    (
        "js-import",
        JS_TS,
        r#"(?m)^\s*import\s+(?:[\w*{}\s,]+\s+from\s+)?['"][^'"]+['"];?\s*$"#,
        "Complete import statement",
    ),
    (
        "ts-interface",
        TS,
        r"(?s)\binterface\s+\w+[^{]*\{.*\}",
        "Complete interface definition",
    ),
    (
        "ts-type",
        TS,
        r"(?m)^\s*(?:export\s+)?type\s+\w+(?:<[^>]*>)?\s*=\s*[^;]+;",
        "Complete type alias",
    ),
    (
        "py-def",
        PY,
        r"(?m)^\s*(?:async\s+)?def\s+\w+\s*\([^)]*\)\s*(?:->\s*[^:]+)?:\s*\n\s+\S",
        "Complete function definition",
    ),
    (
        "py-class",
        PY,
        r"(?m)^\s*class\s+\w+(?:\([^)]*\))?\s*:\s*\n\s+\S",
        "Complete class definition",
    ),
    (
        "py-import",
        PY,
        r"(?m)^(?:from\s+[\w.]+\s+)?import\s+[\w.*, ]+$",
        "Complete import statement",
    ),
    (
        "rs-fn",
        RS,
        r"(?s)\bfn\s+\w+\s*(?:<[^>]*>)?\s*\([^)]*\)[^{;]*\{.*\}",
        "Complete function definition",
    ),
    (
        "rs-item",
        RS,
        r"(?s)\b(?:struct|enum|trait|impl)\b[^{;]*\{.*\}",
        "Complete type definition",
    ),
    (
        "rs-use",
        RS,
        r"(?m)^\s*(?:pub\s+)?use\s+[\w:{}, *]+;",
        "Complete import statement",
    ),
    (
        "go-func",
        GO,
        r"(?s)\bfunc\s+(?:\([^)]*\)\s*)?\w+\s*\([^)]*\)[^{]*\{.*\}",
        "Complete function definition",
    ),
    (
        "go-type",
        GO,
        r"(?s)\btype\s+\w+\s+(?:struct|interface)\s*\{.*\}",
        "Complete type definition",
    ),
    (
        "go-import",
        GO,
        r#"(?m)^import\s+(?:\(|"|\w+\s+")"#,
        "Complete import statement",
    ),
    (
        "java-class",
        JAVA,
        r"(?s)\b(?:(?:public|private|protected|abstract|final|static)\s+)*(?:class|interface|enum|record)\s+\w+[^{]*\{.*\}",
        "Complete class definition",
    ),
    (
        "java-method",
        JAVA,
        r"(?s)\b(?:public|private|protected)\s+(?:static\s+)?(?:final\s+)?[\w<>\[\], ]+\s+\w+\s*\([^)]*\)\s*(?:throws\s+[\w., ]+)?\{.*\}",
        "Complete method definition",
    ),
    (
        "java-import",
        JAVA,
        r"(?m)^import\s+(?:static\s+)?[\w.]+(?:\.\*)?;",
        "Complete import statement",
    ),
];

const BOILERPLATE: &[RawRule] = &[
    (
        "component",
        JS_TS,
        r"(?s)\b(?:function\s+[A-Z]\w*\s*\([^)]*\)|(?:const|let)\s+[A-Z]\w*\s*(?::[^=]+)?=\s*(?:\([^)]*\)|\w+)\s*=>)\s*\{.*\breturn\s*\(?\s*<",
        "Component skeleton",
    ),
    (
        "try-catch",
        BRACED_TRY,
        r"(?s)\btry\s*\{.*\}\s*catch\s*(?:\([^)]*\))?\s*\{",
        "try/catch wrapper",
    ),
    (
        "try-except",
        PY,
        r"(?s)\btry\s*:.*\bexcept\b",
        "try/except wrapper",
    ),
    (
        "route-handler",
        ANY,
        r#"\b(?:app|router|server)\s*\.\s*(?:get|post|put|patch|delete|all)\s*\(\s*['"`]"#,
        "Route handler",
    ),
    (
        "route-decorator",
        ANY,
        r"@(?:(?:app|router|bp|blueprint)\.(?:get|post|put|patch|delete|route)\s*\(|(?:Get|Post|Put|Patch|Delete|Request)Mapping\b)",
        "Route handler",
    ),
    (
        "test-suite",
        ANY,
        r#"\b(?:describe|it|test)\s*\(\s*['"`]"#,
        "Test suite scaffold",
    ),
    (
        "rust-test",
        RS,
        r"#\[(?:cfg\(test\)|test|tokio::test)\]",
        "Test suite scaffold",
    ),
    (
        "python-test",
        PY,
        r"(?m)^\s*(?:class\s+Test\w*|def\s+test_\w+)",
        "Test suite scaffold",
    ),
    ("java-test", JAVA, r"@Test\b", "Test suite scaffold"),
    (
        "constructor-class",
        JS_TS,
        r"(?s)\bclass\s+\w+[^{]*\{.*\bconstructor\s*\(",
        "Class with constructor",
    ),
    (
        "init-class",
        PY,
        r"(?s)\bclass\s+\w+.*\bdef\s+__init__\s*\(",
        "Class with constructor",
    ),
];

const LEXICAL: &[RawRule] = &[
    (
        tags::FUNCTION,
        ANY,
        r"\bfunction\b\s*\*?\s*\w*\s*\(|\bdef\s+\w+\s*\(|\bfn\s+\w+|\bfunc\s+(?:\([^)]*\)\s*)?\w+\s*\(|(?:\)|\w)\s*=>|\b(?:public|private|protected)\s+(?:static\s+)?[\w<>\[\], ]+\s+\w+\s*\(",
        "function definitions",
    ),
    (
        tags::CONST,
        ANY,
        r"\bconst\s+\w+\s*[=:]",
        "constant definitions",
    ),
    (
        tags::IMPORT,
        ANY,
        r#"(?m)^\s*(?:import\s+\S|from\s+[\w.]+\s+import\s|(?:pub\s+)?use\s+[\w:]+|#include\s*[<"])|\brequire\s*\(\s*['"]"#,
        "imports",
    ),
    (
        tags::INTERFACE,
        ANY,
        r"\binterface\s+\w+",
        "interfaces",
    ),
    (
        tags::TYPE,
        ANY,
        r"\btype\s+\w+(?:<[^>]*>)?\s*=|\btype\s+\w+\s+(?:struct|interface)\b|\b(?:struct|enum)\s+[A-Z]\w*|\b(?:class|trait|record)\s+[A-Za-z_]\w*|\bimpl\b[^{;]*\{",
        "type and class definitions",
    ),
    (
        tags::EXPORT,
        ANY,
        r"\bexport\s+(?:default\b|const\b|function\b|class\b|interface\b|type\b|async\b|\{|\*)|\bmodule\.exports\b|\bexports\.\w+\s*=|\bpub\s+(?:fn|struct|enum|trait|mod|const|type)\b",
        "exports",
    ),
    (
        tags::COMMENT,
        ANY,
        r#"/\*\*|"""|(?m:(?:^|[ \t;{}])(?://|#)(?:[ \t/]|$))"#,
        "comments",
    ),
];

const COMMENTS: &[RawRule] = &[
    (
        tags::DOC,
        ANY,
        r#"(?s:/\*\*.*?\*/)|(?m:^\s*///)|(?s:""".*?""")"#,
        "Documentation comments",
    ),
    (
        tags::INLINE,
        ANY,
        r"(?m)(?:^|[ \t;{}])//[ \t]+(\S.*)$",
        "Descriptive inline comments",
    ),
    (
        tags::HASH_INLINE,
        PY,
        r"(?m)(?:^|[ \t;{}])#[ \t]+(\S.*)$",
        "Descriptive inline comments",
    ),
];

fn to_set(raw: &[RawRule]) -> RuleSet {
    RuleSet {
        version: VERSION,
        rules: raw
            .iter()
            .map(|(tag, languages, pattern, description)| RuleSpec {
                tag: (*tag).to_string(),
                languages: languages.to_vec(),
                pattern: (*pattern).to_string(),
                description: (*description).to_string(),
            })
            .collect(),
    }
}

/// Complete top-level constructs.
#[must_use]
pub fn syntax() -> RuleSet {
    to_set(SYNTAX)
}

/// Known code templates.
#[must_use]
pub fn boilerplate() -> RuleSet {
    to_set(BOILERPLATE)
}

/// Structural token kinds.
#[must_use]
pub fn lexical() -> RuleSet {
    to_set(LEXICAL)
}

/// Comment shapes.
#[must_use]
pub fn comments() -> RuleSet {
    to_set(COMMENTS)
}
