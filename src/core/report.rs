// IdeDoctor - core/report.rs
//
// Diagnosis report assembly and rendering: human-readable text, JSON, and
// CSV export of the log entry sequence.
// Core layer: writes to any Write trait object.

use crate::core::model::{
    BlameRecord, Diagnostic, DiagnosticSeverity, LogEntry, LogParseResult, ParsedVmOptions,
};
use crate::util::error::ReportError;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Combined outcome of one diagnosis run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisReport {
    pub log_source: Option<PathBuf>,
    pub log: Option<LogParseResult>,
    pub vm_options_source: Option<PathBuf>,
    pub vm_options: Option<ParsedVmOptions>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosisReport {
    /// True when something needs fixing: an error diagnostic or an exception
    /// no plugin was blamed for.
    pub fn has_errors(&self) -> bool {
        let error_diagnostic = self
            .diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error);
        let unexplained = self
            .log
            .as_ref()
            .is_some_and(|log| !log.exceptions.is_empty());
        error_diagnostic || unexplained
    }

    /// Earliest and latest parsable entry timestamps in the log.
    pub fn time_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let log = self.log.as_ref()?;
        let mut stamps = log.entries.iter().filter_map(LogEntry::parsed_timestamp);
        let first = stamps.next()?;
        let (min, max) = stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some((min, max))
    }
}

// =============================================================================
// Text
// =============================================================================

fn describe_entry(entry: &LogEntry) -> String {
    let class = if entry.class.is_empty() {
        String::new()
    } else {
        format!("{}: ", entry.class)
    };
    format!(
        "line {} {} {}{}",
        entry.line_number, entry.timestamp, class, entry.header
    )
}

fn describe_blame(record: &BlameRecord) -> String {
    let plugin = &record.plugin;
    let mut line = format!("{} {}", plugin.name, plugin.version);
    if !plugin.id.is_empty() {
        line.push_str(&format!(" ({})", plugin.id));
    }
    line.push_str(&format!(" blamed at line {}", record.line_number));
    if let Some(explained) = &record.explained {
        line.push_str(&format!(" for: {}", explained.header));
    }
    line
}

/// Render the report for a terminal.
pub fn render_text(report: &DiagnosisReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} report\n\n",
        crate::util::constants::APP_NAME
    ));

    if let Some(log) = &report.log {
        let source = report
            .log_source
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<log>".to_string());
        out.push_str(&format!(
            "Application log: {source} ({} entries, {} lines)\n",
            log.entries.len(),
            log.lines_processed
        ));
        if let Some((first, last)) = report.time_span() {
            out.push_str(&format!("  Time span: {first} .. {last}\n"));
        }

        out.push_str(&format!(
            "  Unexplained exceptions: {}\n",
            log.exceptions.len()
        ));
        for entry in &log.exceptions {
            out.push_str(&format!("    {}\n", describe_entry(entry)));
        }

        out.push_str(&format!("  Blamed plugins: {}\n", log.blamed_plugins.len()));
        for record in &log.blamed_plugins {
            out.push_str(&format!("    {}\n", describe_blame(record)));
        }

        if !log.unresolved_blames.is_empty() {
            out.push_str(&format!(
                "  Blamed but not enabled: {}\n",
                log.unresolved_blames.join(", ")
            ));
        }
        out.push('\n');
    }

    if let Some(options) = &report.vm_options {
        let source = report
            .vm_options_source
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<vm options>".to_string());
        out.push_str(&format!(
            "VM options: {source} ({} options, {} unique)\n",
            options.options.len(),
            options.mapped.len()
        ));
        for line in &options.suspicious {
            out.push_str(&format!(
                "  Ignored line {}: {}\n",
                line.line_number, line.text
            ));
        }
        out.push('\n');
    }

    out.push_str("Diagnostics:\n");
    if report.diagnostics.is_empty() {
        out.push_str("  none\n");
    }
    for d in &report.diagnostics {
        out.push_str(&format!("  [{}] {}: {}\n", d.severity, d.check, d.message));
    }

    out
}

// =============================================================================
// JSON
// =============================================================================

#[derive(Serialize)]
struct JsonLog<'a> {
    source: Option<&'a Path>,
    entry_count: usize,
    lines_processed: u64,
    first_timestamp: Option<String>,
    last_timestamp: Option<String>,
    exceptions: &'a [LogEntry],
    blamed_plugins: &'a [BlameRecord],
    unresolved_blames: &'a [String],
}

#[derive(Serialize)]
struct JsonVmOptions<'a> {
    source: Option<&'a Path>,
    #[serde(flatten)]
    parsed: &'a ParsedVmOptions,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    log: Option<JsonLog<'a>>,
    vm_options: Option<JsonVmOptions<'a>>,
    diagnostics: &'a [Diagnostic],
    has_errors: bool,
}

/// Render the report as pretty-printed JSON. The full entry list is left
/// out; use `export_entries_csv` for that.
pub fn render_json(report: &DiagnosisReport) -> Result<String, ReportError> {
    let span = report.time_span();
    let json = JsonReport {
        log: report.log.as_ref().map(|log| JsonLog {
            source: report.log_source.as_deref(),
            entry_count: log.entries.len(),
            lines_processed: log.lines_processed,
            first_timestamp: span.map(|(first, _)| first.to_string()),
            last_timestamp: span.map(|(_, last)| last.to_string()),
            exceptions: &log.exceptions,
            blamed_plugins: &log.blamed_plugins,
            unresolved_blames: &log.unresolved_blames,
        }),
        vm_options: report.vm_options.as_ref().map(|parsed| JsonVmOptions {
            source: report.vm_options_source.as_deref(),
            parsed,
        }),
        diagnostics: &report.diagnostics,
        has_errors: report.has_errors(),
    };
    serde_json::to_string_pretty(&json).map_err(|e| ReportError::Json { source: e })
}

// =============================================================================
// CSV
// =============================================================================

/// Export log entries to CSV.
///
/// Writes: line, timestamp, elapsed, severity, class, header, body
pub fn export_entries_csv<W: Write>(
    entries: &[LogEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ReportError> {
    let csv_err = |e: csv::Error| ReportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "line", "timestamp", "elapsed", "severity", "class", "header", "body",
        ])
        .map_err(csv_err)?;

    let mut count = 0;
    for entry in entries {
        let line = entry.line_number.to_string();
        csv_writer
            .write_record([
                line.as_str(),
                entry.timestamp.as_str(),
                entry.elapsed.as_str(),
                entry.severity.keyword(),
                entry.class.as_str(),
                entry.header.as_str(),
                entry.body.as_str(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ReportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::{parse_log_str, AggregatorConfig};
    use crate::core::checks::{run_all_checks, CheckContext};
    use crate::core::model::PluginIdentity;
    use crate::core::vmoptions::parse_vm_options;

    const LOG: &str = "2024-03-01 10:00:00,000 [   1]   INFO - #c.i.Startup - start\n\
                       2024-03-01 10:05:00,000 [ 300]  ERROR - #c.i.Foo - boom\n\
                       \tat Foo.bar(Foo.java:1)\n\
                       2024-03-01 10:06:00,000 [ 360]   INFO - #c.i.Foo - later\n";

    fn report() -> DiagnosisReport {
        let plugins: Vec<PluginIdentity> = Vec::new();
        let log = parse_log_str(LOG, &plugins, AggregatorConfig::default());
        let options = parse_vm_options(["-Xmx1048m", "-Xms1228m", "junk"]);
        let diagnostics = run_all_checks(&options, &CheckContext::default());
        DiagnosisReport {
            log_source: Some(PathBuf::from("idea.log")),
            log: Some(log),
            vm_options_source: Some(PathBuf::from("idea64.vmoptions")),
            vm_options: Some(options),
            diagnostics,
        }
    }

    #[test]
    fn test_has_errors_and_time_span() {
        let r = report();
        assert!(r.has_errors());
        let (first, last) = r.time_span().unwrap();
        assert_eq!(first.to_string(), "2024-03-01 10:00:00");
        assert_eq!(last.to_string(), "2024-03-01 10:06:00");
        assert!(!DiagnosisReport::default().has_errors());
    }

    #[test]
    fn test_render_text_mentions_findings() {
        let text = render_text(&report());
        assert!(text.contains("Application log: idea.log (3 entries, 4 lines)"));
        assert!(text.contains("Unexplained exceptions: 1"));
        assert!(text.contains("#c.i.Foo: boom"));
        assert!(text.contains("Ignored line 3: junk"));
        assert!(text.contains("[error] xmx-vs-xms"));
    }

    #[test]
    fn test_render_json_shape() {
        let json = render_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["log"]["entry_count"], 3);
        assert_eq!(value["log"]["exceptions"][0]["severity"], "ERROR");
        assert_eq!(value["vm_options"]["mapped"]["-Xmx"], "1048m");
        assert_eq!(value["diagnostics"][0]["severity"], "Error");
        assert_eq!(value["has_errors"], true);
    }

    #[test]
    fn test_csv_export() {
        let r = report();
        let entries = &r.log.as_ref().unwrap().entries;
        let mut buf = Vec::new();
        let count = export_entries_csv(entries, &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(count, 3);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("line,timestamp,elapsed,severity,class,header,body"));
        assert!(output.contains("Foo.java:1"));
    }
}
