// IdeDoctor - core/log_parser.rs
//
// Header-line lexer for IDE application logs.
//
// A header looks like:
//
//   2024-03-01 10:15:30,123 [  61174]  ERROR - #c.i.o.w.i.ToolWindowManagerImpl - Already disposed
//   ^timestamp              ^elapsed   ^sev    ^class                             ^header
//
// Fields are consumed strictly left to right in that order. Only the
// timestamp is mandatory; every other field degrades to an empty value and
// lexing continues with whatever text is left.

use crate::core::model::Severity;
use crate::util::constants;
use regex::Regex;
use std::sync::OnceLock;

/// Fields extracted from a header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    pub timestamp: String,
    pub elapsed: String,
    pub severity: Severity,
    pub class: String,
    pub header: String,
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}[.,]\d{3}")
            .expect("log_parser: invalid timestamp regex")
    })
}

// The closing dash must be followed by whitespace or end of line so that
// dashes inside a class name (`compiler-plugin`) do not end the token early.
fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*-\s*(\S.*?)\s*-(?:\s|$)").expect("log_parser: invalid class regex")
    })
}

/// Left-to-right lexer over a single log line.
///
/// Each method consumes the field it recognises from the front of the
/// remaining text and leaves the rest untouched when the field is absent.
#[derive(Debug)]
pub struct HeaderLexer<'a> {
    rest: &'a str,
}

impl<'a> HeaderLexer<'a> {
    /// Start lexing `line`. A trailing `\n` or `\r\n` is ignored.
    pub fn new(line: &'a str) -> Self {
        Self {
            rest: line.trim_end_matches(['\n', '\r']),
        }
    }

    /// Consume the leading timestamp. `None` means the line is not a header.
    pub fn timestamp(&mut self) -> Option<&'a str> {
        let m = timestamp_re().find(self.rest)?;
        let ts = &self.rest[..m.end()];
        self.rest = &self.rest[m.end()..];
        Some(ts)
    }

    /// Consume a `[...]` run if it is the next token. Returns "" otherwise.
    pub fn elapsed(&mut self) -> &'a str {
        let trimmed = self.rest.trim_start();
        if !trimmed.starts_with('[') {
            return "";
        }
        match trimmed.find(']') {
            Some(end) => {
                self.rest = &trimmed[end + 1..];
                &trimmed[..=end]
            }
            None => "",
        }
    }

    /// Consume the first severity keyword (in fixed priority order) that
    /// prefixes the trimmed remainder.
    pub fn severity(&mut self) -> Severity {
        let trimmed = self.rest.trim_start();
        for keyword in constants::SEVERITY_KEYWORDS {
            if let Some(after) = trimmed.strip_prefix(keyword) {
                self.rest = after;
                return Severity::from_keyword(keyword).unwrap_or_default();
            }
        }
        Severity::Unspecified
    }

    /// Consume a `- Class -` token. Returns the trimmed inner text or "".
    pub fn class(&mut self) -> &'a str {
        match class_re().captures(self.rest) {
            Some(caps) => {
                let end = caps.get(0).map_or(0, |m| m.end());
                let class = caps.get(1).map_or("", |m| m.as_str().trim());
                self.rest = &self.rest[end..];
                class
            }
            None => "",
        }
    }

    /// Whatever is left, trimmed.
    pub fn remainder(self) -> &'a str {
        self.rest.trim()
    }
}

/// Classify one physical line: `Some` for a new-entry header, `None` for a
/// continuation line.
pub fn parse_header(line: &str) -> Option<HeaderFields> {
    let mut lexer = HeaderLexer::new(line);
    let timestamp = lexer.timestamp()?;
    let elapsed = lexer.elapsed();
    let severity = lexer.severity();
    let class = lexer.class();
    let header = lexer.remainder();

    Some(HeaderFields {
        timestamp: timestamp.to_string(),
        elapsed: elapsed.to_string(),
        severity,
        class: class.to_string(),
        header: header.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_header() {
        let line = "2024-03-01 10:15:30,123 [  61174]  ERROR - .wm.impl.ToolWindowManagerImpl - Already disposed: Project(name=demo)\n";
        let fields = parse_header(line).expect("header");
        assert_eq!(fields.timestamp, "2024-03-01 10:15:30,123");
        assert_eq!(fields.elapsed, "[  61174]");
        assert_eq!(fields.severity, Severity::Error);
        assert_eq!(fields.class, ".wm.impl.ToolWindowManagerImpl");
        assert_eq!(fields.header, "Already disposed: Project(name=demo)");
    }

    #[test]
    fn test_dot_millisecond_separator() {
        let fields = parse_header("2024-03-01 10:15:30.999 [1] INFO - #c.i.Foo - hi").unwrap();
        assert_eq!(fields.timestamp, "2024-03-01 10:15:30.999");
        assert_eq!(fields.header, "hi");
    }

    #[test]
    fn test_continuation_lines_are_not_headers() {
        assert!(parse_header("\tat com.intellij.Foo.bar(Foo.java:12)").is_none());
        assert!(parse_header("").is_none());
        assert!(parse_header("Caused by: java.lang.IllegalStateException").is_none());
        // Timestamp must be at line start.
        assert!(parse_header(" 2024-03-01 10:15:30,123 [1] INFO - #c.i.Foo - hi").is_none());
        // Milliseconds are mandatory.
        assert!(parse_header("2024-03-01 10:15:30 [1] INFO - #c.i.Foo - hi").is_none());
    }

    #[test]
    fn test_missing_elapsed_token() {
        let fields = parse_header("2024-03-01 10:15:30,123 WARN - #c.i.Foo - careful").unwrap();
        assert_eq!(fields.elapsed, "");
        assert_eq!(fields.severity, Severity::Warn);
        assert_eq!(fields.class, "#c.i.Foo");
        assert_eq!(fields.header, "careful");
    }

    #[test]
    fn test_missing_severity_keeps_lexing() {
        let fields = parse_header("2024-03-01 10:15:30,123 [   5] TRACE - #c.i.Foo - x").unwrap();
        assert_eq!(fields.severity, Severity::Unspecified);
        assert_eq!(fields.class, "");
        assert_eq!(fields.header, "TRACE - #c.i.Foo - x");
    }

    #[test]
    fn test_missing_class_header_follows_severity() {
        let fields = parse_header("2024-03-01 10:15:30,123 [   5] INFO  plain message").unwrap();
        assert_eq!(fields.class, "");
        assert_eq!(fields.header, "plain message");
    }

    #[test]
    fn test_severity_priority_and_prefix_match() {
        // WARNING is prefixed by WARN.
        let fields = parse_header("2024-03-01 10:15:30,123 [1] WARNING - #c.i.Foo - x").unwrap();
        assert_eq!(fields.severity, Severity::Warn);
        let fields = parse_header("2024-03-01 10:15:30,123 [1] DEBUG - #c.i.Foo - x").unwrap();
        assert_eq!(fields.severity, Severity::Debug);
    }

    #[test]
    fn test_class_with_inner_dash() {
        let fields =
            parse_header("2024-03-01 10:15:30,123 [1] INFO - #o.j.compiler-plugin - loaded")
                .unwrap();
        assert_eq!(fields.class, "#o.j.compiler-plugin");
        assert_eq!(fields.header, "loaded");
    }

    #[test]
    fn test_bracket_in_header_is_not_elapsed() {
        let fields = parse_header("2024-03-01 10:15:30,123 INFO - #c.i.Foo - took [42] ms").unwrap();
        assert_eq!(fields.elapsed, "");
        assert_eq!(fields.header, "took [42] ms");
    }

    #[test]
    fn test_crlf_terminator_is_ignored() {
        let fields = parse_header("2024-03-01 10:15:30,123 [1] INFO - #c.i.Foo - hi\r\n").unwrap();
        assert_eq!(fields.header, "hi");
    }

    #[test]
    fn test_lexer_steps_in_order() {
        let mut lexer = HeaderLexer::new("2024-03-01 10:15:30,123 [7] ERROR - A - b");
        assert!(lexer.timestamp().is_some());
        assert_eq!(lexer.elapsed(), "[7]");
        assert_eq!(lexer.severity(), Severity::Error);
        assert_eq!(lexer.class(), "A");
        assert_eq!(lexer.remainder(), "b");
    }
}
