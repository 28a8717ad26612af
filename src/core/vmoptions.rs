// IdeDoctor - core/vmoptions.rs
//
// Tokenises a VM options file (one runtime flag per line) into a
// first-occurrence registry, a duplicate registry and the ordered list of
// garbage-collector flags.
// Core layer: accepts BufRead trait objects, never opens files itself.

use crate::core::model::{ParsedVmOptions, SuspiciousLine, VmOption};
use crate::util::constants;
use crate::util::error::VmOptionsError;
use crate::util::logging::preview;
use std::io::BufRead;
use std::path::Path;

/// Split one option line into name, value and toggle information.
///
/// Rules, first match wins:
/// 1. `-Xmx`/`-Xms`/`-Xmn` prefix: name is the prefix, value the rest.
/// 2. `-XX:+Flag` / `-XX:-Flag`: name is the whole line, value `"true"`/`"false"`.
/// 3. Otherwise split at the first `=`, else the first `:`, else the first
///    space; the value is trimmed. No delimiter means an empty value.
pub fn split_option(line: &str) -> (String, String, Option<bool>) {
    for prefix in constants::HEAP_OPTION_PREFIXES {
        if let Some(value) = line.strip_prefix(prefix) {
            return (prefix.to_string(), value.to_string(), None);
        }
    }

    if let Some(state) = toggle_state(line) {
        return (line.to_string(), state.to_string(), Some(state));
    }

    for delimiter in constants::OPTION_DELIMITERS {
        if let Some((name, value)) = line.split_once(*delimiter) {
            return (name.to_string(), value.trim().to_string(), None);
        }
    }

    (line.to_string(), String::new(), None)
}

/// `Some(true)` for `-XX:+Flag`, `Some(false)` for `-XX:-Flag`.
fn toggle_state(line: &str) -> Option<bool> {
    let rest = line.strip_prefix("-XX:")?;
    let (state, flag) = if let Some(flag) = rest.strip_prefix('+') {
        (true, flag)
    } else if let Some(flag) = rest.strip_prefix('-') {
        (false, flag)
    } else {
        return None;
    };
    let is_flag = !flag.is_empty() && flag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    is_flag.then_some(state)
}

/// One parse session over a VM options file.
#[derive(Debug, Default)]
pub struct VmOptionsParser {
    parsed: ParsedVmOptions,
    line_number: usize,
}

impl VmOptionsParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one physical line.
    pub fn feed_line(&mut self, raw: &str) {
        self.line_number += 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            return;
        }

        if !line.starts_with('-') {
            tracing::warn!(
                line = self.line_number,
                text = preview(line),
                "Suspicious VM options line (does not start with '-'); ignored"
            );
            self.parsed.suspicious.push(SuspiciousLine {
                line_number: self.line_number,
                text: line.to_string(),
            });
            return;
        }

        if constants::GC_FLAGS.contains(&line) {
            self.parsed.gc_flags.push(line.to_string());
        }

        let (name, value, toggle) = split_option(line);

        if self.parsed.mapped.contains_key(&name) {
            tracing::debug!(option = %name, line = self.line_number, "Duplicate VM option");
            self.parsed.duplicates.insert(name.clone(), value.clone());
        } else {
            self.parsed.mapped.insert(name.clone(), value.clone());
        }

        self.parsed.options.push(VmOption {
            name,
            raw_value: value,
            is_boolean_toggle: toggle.is_some(),
            toggle_state: toggle.unwrap_or(false),
            line_number: self.line_number,
        });
    }

    pub fn finish(self) -> ParsedVmOptions {
        tracing::debug!(
            options = self.parsed.options.len(),
            unique = self.parsed.mapped.len(),
            duplicates = self.parsed.duplicates.len(),
            gc_flags = self.parsed.gc_flags.len(),
            suspicious = self.parsed.suspicious.len(),
            "VM options parsing complete"
        );
        self.parsed
    }
}

/// Parse an in-memory sequence of option lines.
pub fn parse_vm_options<I, S>(lines: I) -> ParsedVmOptions
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = VmOptionsParser::new();
    for line in lines {
        parser.feed_line(line.as_ref());
    }
    parser.finish()
}

/// Parse a VM options file from a reader. Bytes that are not valid UTF-8
/// are replaced; only a read failure aborts the pass.
pub fn read_vm_options<R: BufRead>(
    mut reader: R,
    source: &Path,
) -> Result<ParsedVmOptions, VmOptionsError> {
    let mut parser = VmOptionsParser::new();
    let mut buf: Vec<u8> = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| VmOptionsError::Io {
                path: source.to_path_buf(),
                source: e,
            })?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        parser.feed_line(line.trim_end_matches(['\n', '\r']));
    }
    Ok(parser.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_heap_prefix_options() {
        assert_eq!(
            split_option("-Xmx2048m"),
            ("-Xmx".to_string(), "2048m".to_string(), None)
        );
        assert_eq!(split_option("-Xmn").0, "-Xmn");
    }

    #[test]
    fn test_boolean_toggles() {
        assert_eq!(
            split_option("-XX:+UseG1GC"),
            ("-XX:+UseG1GC".to_string(), "true".to_string(), Some(true))
        );
        assert_eq!(
            split_option("-XX:-OmitStackTraceInFastThrow"),
            (
                "-XX:-OmitStackTraceInFastThrow".to_string(),
                "false".to_string(),
                Some(false)
            )
        );
    }

    #[test]
    fn test_delimiter_priority() {
        // '=' wins over ':' even when ':' comes first.
        assert_eq!(
            split_option("-XX:ReservedCodeCacheSize=512m"),
            ("-XX:ReservedCodeCacheSize".to_string(), "512m".to_string(), None)
        );
        assert_eq!(
            split_option("-javaagent:/opt/agent.jar"),
            ("-javaagent".to_string(), "/opt/agent.jar".to_string(), None)
        );
        assert_eq!(
            split_option("-Dfoo=a:b c"),
            ("-Dfoo".to_string(), "a:b c".to_string(), None)
        );
        assert_eq!(
            split_option("-agentlib  jdwp "),
            ("-agentlib".to_string(), "jdwp".to_string(), None)
        );
        assert_eq!(split_option("-ea"), ("-ea".to_string(), String::new(), None));
    }

    #[test]
    fn test_first_occurrence_wins_and_duplicate_recorded() {
        let parsed = parse_vm_options(["-Xmx1048m", "-Xmx2048m"]);
        assert_eq!(parsed.get("-Xmx"), Some("1048m"));
        assert_eq!(parsed.duplicates.get("-Xmx").map(String::as_str), Some("2048m"));
    }

    #[test]
    fn test_only_last_duplicate_is_kept_but_history_is_complete() {
        let parsed = parse_vm_options(["-Xmx1g", "-Xmx2g", "-Xmx3g"]);
        assert_eq!(parsed.get("-Xmx"), Some("1g"));
        assert_eq!(parsed.duplicates.len(), 1);
        assert_eq!(parsed.duplicates["-Xmx"], "3g");
        let history: Vec<&str> = parsed
            .options
            .iter()
            .filter(|o| o.name == "-Xmx")
            .map(|o| o.raw_value.as_str())
            .collect();
        assert_eq!(history, vec!["1g", "2g", "3g"]);
    }

    #[test]
    fn test_comments_blanks_and_suspicious_lines() {
        let parsed = parse_vm_options(["# comment", "", "   ", "Xmx2g", "-ea"]);
        assert_eq!(parsed.options.len(), 1);
        assert_eq!(parsed.suspicious.len(), 1);
        assert_eq!(parsed.suspicious[0].line_number, 4);
        assert_eq!(parsed.suspicious[0].text, "Xmx2g");
    }

    #[test]
    fn test_gc_flags_in_order_with_repeats() {
        let parsed = parse_vm_options([
            "-XX:+UseG1GC",
            "-XX:+UseZGC",
            "-XX:+UseG1GC",
            "-XX:-UseParallelGC",
            "-XX:+UseFooGC",
        ]);
        assert_eq!(
            parsed.gc_flags,
            vec!["-XX:+UseG1GC", "-XX:+UseZGC", "-XX:+UseG1GC"]
        );
        assert_eq!(parsed.get("-XX:+UseG1GC"), Some("true"));
        assert_eq!(parsed.get("-XX:-UseParallelGC"), Some("false"));
    }

    #[test]
    fn test_lines_are_trimmed() {
        let parsed = parse_vm_options(["  -XX:+UseZGC  \r"]);
        assert_eq!(parsed.gc_flags, vec!["-XX:+UseZGC"]);
        assert!(parsed.options[0].is_boolean_toggle);
        assert!(parsed.options[0].toggle_state);
    }

    #[test]
    fn test_read_vm_options_from_reader() {
        let content = "-Xms128m\n-Xmx750m\n-XX:+UseG1GC\n";
        let parsed = read_vm_options(content.as_bytes(), &PathBuf::from("idea64.vmoptions"))
            .unwrap();
        assert_eq!(parsed.mapped.len(), 3);
        assert_eq!(parsed.get("-Xms"), Some("128m"));
    }

    #[test]
    fn test_read_vm_options_invalid_utf8_is_lossy() {
        let content: &[u8] = b"-Xmx2g\r\n-Duser.name=J\xF6rg\n-Xms1g\n";
        let parsed = read_vm_options(content, &PathBuf::from("idea64.vmoptions")).unwrap();
        assert_eq!(parsed.options.len(), 3);
        assert_eq!(parsed.get("-Xmx"), Some("2g"));
        assert_eq!(parsed.get("-Duser.name"), Some("J\u{FFFD}rg"));
        assert_eq!(parsed.get("-Xms"), Some("1g"));
    }
}
