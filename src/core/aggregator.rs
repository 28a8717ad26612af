// IdeDoctor - core/aggregator.rs
//
// Stream-oriented reduction of an application log into entries, exceptions
// and blamed plugins.
// Core layer: accepts BufRead trait objects, never opens files itself.
//
// One `LogAggregator` is one parse session. It owns all intermediate state
// (open entry, exception list, blame records), so two sessions never share
// anything and the same input always yields the same result.

use crate::core::blame::{BlameCorrelator, EnabledPlugins};
use crate::core::log_parser::{self, HeaderFields};
use crate::core::model::{LogEntry, LogParseResult};
use crate::util::constants;
use crate::util::error::LogError;
use crate::util::logging::preview;
use std::io::BufRead;
use std::path::Path;

/// Tunables for a log parse session.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Entries that must already exist before a blame entry is correlated.
    pub blame_min_prior_entries: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            blame_min_prior_entries: constants::DEFAULT_BLAME_MIN_PRIOR_ENTRIES,
        }
    }
}

/// Line-by-line reducer. States: no open entry / one open entry.
pub struct LogAggregator {
    config: AggregatorConfig,
    correlator: BlameCorrelator,
    entries: Vec<LogEntry>,
    exceptions: Vec<LogEntry>,
    open: Option<LogEntry>,
    lines_processed: u64,
    discarded_lines: u64,
}

impl LogAggregator {
    pub fn new(plugins: &dyn EnabledPlugins, config: AggregatorConfig) -> Self {
        Self {
            config,
            correlator: BlameCorrelator::new(plugins),
            entries: Vec::new(),
            exceptions: Vec::new(),
            open: None,
            lines_processed: 0,
            discarded_lines: 0,
        }
    }

    /// Feed one physical line, terminator included. Continuation lines are
    /// appended to the open entry's body verbatim.
    pub fn feed_line(&mut self, line: &str) {
        self.lines_processed += 1;
        match log_parser::parse_header(line) {
            Some(fields) => self.start_entry(fields),
            None => match self.open.as_mut() {
                Some(entry) => entry.body.push_str(line),
                None => {
                    self.discarded_lines += 1;
                    tracing::trace!(
                        line = self.lines_processed,
                        text = preview(line),
                        "Discarding line before first header"
                    );
                }
            },
        }
    }

    fn start_entry(&mut self, fields: HeaderFields) {
        self.close_open_entry();

        let entry = LogEntry {
            line_number: self.lines_processed,
            timestamp: fields.timestamp,
            elapsed: fields.elapsed,
            severity: fields.severity,
            class: fields.class,
            header: fields.header,
            body: String::new(),
        };
        if entry.is_blame() {
            self.handle_blame(&entry.header);
        }
        self.open = Some(entry);
    }

    /// Move the open entry into the entry list, recording it as an exception
    /// when it qualifies.
    fn close_open_entry(&mut self) {
        if let Some(entry) = self.open.take() {
            if entry.is_exception() {
                self.exceptions.push(entry.clone());
            }
            self.entries.push(entry);
        }
    }

    fn handle_blame(&mut self, header: &str) {
        let line_number = self.lines_processed;
        if self.entries.len() < self.config.blame_min_prior_entries {
            tracing::debug!(
                line = line_number,
                prior_entries = self.entries.len(),
                required = self.config.blame_min_prior_entries,
                "Blame entry ignored: too few prior entries"
            );
            return;
        }
        if let Some(plugin) = self.correlator.correlate(header, line_number) {
            let explained = self.exceptions.pop();
            self.correlator.record(plugin, line_number, explained);
        }
    }

    /// End of stream: close the last entry and hand back the results.
    pub fn finish(mut self) -> LogParseResult {
        self.close_open_entry();
        let (blamed_plugins, unresolved_blames) = self.correlator.finish();

        tracing::debug!(
            entries = self.entries.len(),
            exceptions = self.exceptions.len(),
            blamed = blamed_plugins.len(),
            unresolved = unresolved_blames.len(),
            discarded = self.discarded_lines,
            lines = self.lines_processed,
            "Log parsing complete"
        );

        LogParseResult {
            entries: self.entries,
            exceptions: self.exceptions,
            blamed_plugins,
            unresolved_blames,
            lines_processed: self.lines_processed,
        }
    }
}

/// Parse a whole log from a reader.
///
/// Lines are read as raw bytes and decoded lossily, so invalid UTF-8 never
/// aborts the pass. Any read failure does, and no partial result is returned.
///
/// # Arguments
/// * `reader` - Already-open log source (the app layer owns the file)
/// * `source` - Path of the source, for error context only
/// * `plugins` - Enabled-plugin collaborator used to resolve blame entries
/// * `config` - Session tunables
pub fn parse_log<R: BufRead>(
    mut reader: R,
    source: &Path,
    plugins: &dyn EnabledPlugins,
    config: AggregatorConfig,
) -> Result<LogParseResult, LogError> {
    let mut aggregator = LogAggregator::new(plugins, config);
    let mut buf: Vec<u8> = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| LogError::Read {
                path: source.to_path_buf(),
                line_number: aggregator.lines_processed + 1,
                source: e,
            })?;
        if read == 0 {
            break;
        }
        aggregator.feed_line(&String::from_utf8_lossy(&buf));
    }
    Ok(aggregator.finish())
}

/// Parse log text already held in memory.
pub fn parse_log_str(
    content: &str,
    plugins: &dyn EnabledPlugins,
    config: AggregatorConfig,
) -> LogParseResult {
    let mut aggregator = LogAggregator::new(plugins, config);
    for line in content.split_inclusive('\n') {
        aggregator.feed_line(line);
    }
    aggregator.finish()
}
