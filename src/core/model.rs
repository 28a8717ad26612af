// IdeDoctor - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers.
//
// Every record is built once by a parse session and never mutated after it
// has been pushed onto a result sequence.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Log severity
// =============================================================================

/// Severity keyword found in an application log header.
///
/// Only the four keywords the IDE writes are recognised; anything else is
/// `Unspecified` and renders as an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Severity {
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "DEBUG")]
    Debug,
    #[serde(rename = "WARN")]
    Warn,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Severity {
    /// Keyword exactly as it appears in the log ("" for `Unspecified`).
    pub fn keyword(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
            Severity::Debug => "DEBUG",
            Severity::Warn => "WARN",
            Severity::Unspecified => "",
        }
    }

    /// Map a keyword back to its variant. Case-sensitive.
    pub fn from_keyword(keyword: &str) -> Option<Severity> {
        match keyword {
            "INFO" => Some(Severity::Info),
            "ERROR" => Some(Severity::Error),
            "DEBUG" => Some(Severity::Debug),
            "WARN" => Some(Severity::Warn),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

// =============================================================================
// Log entry
// =============================================================================

/// One timestamped entry of an application log, with any continuation lines
/// folded into `body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// 1-based line number of the header line.
    pub line_number: u64,

    /// Raw timestamp text (`YYYY-MM-DD HH:MM:SS[.,]mmm`).
    pub timestamp: String,

    /// Bracketed elapsed-time token including brackets, e.g. `[  61174]`.
    /// Empty when the header has none.
    pub elapsed: String,

    pub severity: Severity,

    /// Originating class (inner text of the `- ... -` token), may be empty.
    pub class: String,

    /// Single-line text following the class token.
    pub header: String,

    /// Verbatim continuation lines, line terminators included.
    pub body: String,
}

impl LogEntry {
    /// An entry is an exception when it is an ERROR that carries a body
    /// (typically a stack trace).
    pub fn is_exception(&self) -> bool {
        self.severity == Severity::Error && !self.body.is_empty()
    }

    /// Whether the header opens with the blame marker.
    pub fn is_blame(&self) -> bool {
        is_blame_header(&self.header)
    }

    /// Parse `timestamp` into a calendar value. Accepts `.` or `,` before the
    /// milliseconds. Returns `None` for impossible dates such as month 13.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        let normalised = self.timestamp.replace(',', ".");
        NaiveDateTime::parse_from_str(&normalised, "%Y-%m-%d %H:%M:%S%.f").ok()
    }
}

/// Whether a header line (after trimming) opens with the blame marker.
pub fn is_blame_header(header: &str) -> bool {
    header
        .trim()
        .starts_with(crate::util::constants::BLAME_MARKER)
}

// =============================================================================
// Plugins
// =============================================================================

/// Identity of an installed plugin as reported by the plugin-management
/// collaborator. Compared by full value: the same name with a different
/// version is a different identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginIdentity {
    /// Marketplace/plugin id (e.g. `com.example.myplugin`).
    #[serde(default)]
    pub id: String,

    /// Display name, matched exactly against blame headers.
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A plugin named by a blame entry and resolved against the enabled plugins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameRecord {
    pub plugin: PluginIdentity,

    /// Line number of the blame entry's header.
    pub line_number: u64,

    /// The exception this blame explained, removed from the exception list.
    /// `None` when no unexplained exception was pending.
    pub explained: Option<LogEntry>,
}

/// Everything produced by one pass over an application log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogParseResult {
    /// All entries in file order.
    pub entries: Vec<LogEntry>,

    /// Exception entries not explained by a blame entry, in file order.
    pub exceptions: Vec<LogEntry>,

    /// Resolved blames, deduplicated by plugin identity.
    pub blamed_plugins: Vec<BlameRecord>,

    /// Plugin names from blame entries that matched no enabled plugin.
    pub unresolved_blames: Vec<String>,

    /// Physical lines consumed.
    pub lines_processed: u64,
}

// =============================================================================
// VM options
// =============================================================================

/// One option line from a VM options file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmOption {
    pub name: String,

    /// Value text. For `-XX:+Flag`/`-XX:-Flag` this is `"true"`/`"false"`.
    pub raw_value: String,

    pub is_boolean_toggle: bool,

    /// `true` for `+`, `false` for `-`; always `false` for non-toggles.
    pub toggle_state: bool,

    /// 1-based line number in the source file.
    pub line_number: usize,
}

/// A non-comment line that does not start with `-`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspiciousLine {
    pub line_number: usize,
    pub text: String,
}

/// Everything produced by one pass over a VM options file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedVmOptions {
    /// Every option line in file order, duplicates included.
    pub options: Vec<VmOption>,

    /// name -> value of the first occurrence of each name.
    pub mapped: BTreeMap<String, String>,

    /// name -> value of the last repeated occurrence of each duplicated name.
    pub duplicates: BTreeMap<String, String>,

    /// Whitelisted GC flags in the order seen, repeats included.
    pub gc_flags: Vec<String>,

    pub suspicious: Vec<SuspiciousLine>,
}

impl ParsedVmOptions {
    /// First-occurrence value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.mapped.get(name).map(String::as_str)
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Category of a diagnostic produced by a VM options check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticSeverity {
    /// Advisory: the configuration works but deserves attention.
    Warning,
    /// Required fix: the configuration is wrong.
    Error,
}

impl DiagnosticSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Error => "error",
        }
    }
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One finding of a VM options check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Identifier of the check that produced this diagnostic.
    pub check: &'static str,
    pub severity: DiagnosticSeverity,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(severity: Severity, header: &str, body: &str) -> LogEntry {
        LogEntry {
            line_number: 1,
            timestamp: "2024-03-01 10:15:30,123".to_string(),
            elapsed: "[  1000]".to_string(),
            severity,
            class: "#c.i.Foo".to_string(),
            header: header.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_exception_requires_error_and_body() {
        assert!(entry(Severity::Error, "boom", "\tat Foo\n").is_exception());
        assert!(!entry(Severity::Error, "boom", "").is_exception());
        assert!(!entry(Severity::Warn, "boom", "\tat Foo\n").is_exception());
    }

    #[test]
    fn test_blame_marker_is_trimmed() {
        assert!(entry(Severity::Error, "  Plugin to blame: X", "").is_blame());
        assert!(!entry(Severity::Error, "Blame: Plugin to blame", "").is_blame());
    }

    #[test]
    fn test_parsed_timestamp_accepts_both_separators() {
        let comma = entry(Severity::Info, "", "");
        let mut dot = comma.clone();
        dot.timestamp = "2024-03-01 10:15:30.123".to_string();
        assert_eq!(comma.parsed_timestamp(), dot.parsed_timestamp());
        assert!(comma.parsed_timestamp().is_some());
    }

    #[test]
    fn test_parsed_timestamp_rejects_impossible_date() {
        let mut e = entry(Severity::Info, "", "");
        e.timestamp = "2024-13-40 10:15:30,123".to_string();
        assert!(e.parsed_timestamp().is_none());
    }

    #[test]
    fn test_severity_keyword_roundtrip() {
        for kw in ["INFO", "ERROR", "DEBUG", "WARN"] {
            assert_eq!(Severity::from_keyword(kw).unwrap().keyword(), kw);
        }
        assert_eq!(Severity::from_keyword("error"), None);
        assert_eq!(Severity::Unspecified.to_string(), "");
    }

    #[test]
    fn test_plugin_identity_defaults_when_deserialised() {
        let p: PluginIdentity = serde_json::from_str(r#"{"name":"My Plugin"}"#).unwrap();
        assert!(p.enabled);
        assert!(p.version.is_empty());
    }
}
