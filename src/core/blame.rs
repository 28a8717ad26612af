// IdeDoctor - core/blame.rs
//
// Correlates "Plugin to blame" log entries with the plugins that are
// currently enabled. The plugin list itself comes from the caller through
// the `EnabledPlugins` trait; this module never touches the filesystem.

use crate::core::model::{BlameRecord, LogEntry, PluginIdentity};
use crate::util::constants;

/// Source of the currently enabled plugins.
///
/// Iteration order matters: when several plugins share a display name the
/// first one returned wins.
pub trait EnabledPlugins {
    fn enabled_plugins(&self) -> Vec<PluginIdentity>;
}

impl EnabledPlugins for [PluginIdentity] {
    fn enabled_plugins(&self) -> Vec<PluginIdentity> {
        self.iter().filter(|p| p.enabled).cloned().collect()
    }
}

impl EnabledPlugins for Vec<PluginIdentity> {
    fn enabled_plugins(&self) -> Vec<PluginIdentity> {
        self.as_slice().enabled_plugins()
    }
}

/// Extract the plugin name from a blame header.
///
/// `"Plugin to blame: My Plugin version: 1.2.3"` yields `"My Plugin"`.
/// Everything from the first `version:` onward is dropped.
pub fn extract_plugin_name(header: &str) -> &str {
    let text = header.trim();
    let text = text.strip_prefix(constants::BLAME_MARKER).unwrap_or(text);
    let text = text.trim_start();
    let text = text.strip_prefix(':').unwrap_or(text);
    let text = match text.find(constants::BLAME_VERSION_TOKEN) {
        Some(idx) => &text[..idx],
        None => text,
    };
    text.trim()
}

/// Per-session blame state: the enabled plugins snapshot plus the records
/// resolved so far.
#[derive(Debug, Default)]
pub struct BlameCorrelator {
    plugins: Vec<PluginIdentity>,
    records: Vec<BlameRecord>,
    unresolved: Vec<String>,
}

impl BlameCorrelator {
    /// Snapshot the enabled plugins once for the whole session.
    pub fn new(source: &dyn EnabledPlugins) -> Self {
        let plugins = source.enabled_plugins();
        tracing::debug!(enabled = plugins.len(), "Blame correlator ready");
        Self {
            plugins,
            records: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// Look up the plugin named by a blame header. Exact match on display
    /// name; first match in the supplied order.
    pub fn resolve(&self, header: &str) -> Option<&PluginIdentity> {
        let name = extract_plugin_name(header);
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Resolve a blame entry. On success the matched plugin is returned so
    /// the caller can retire the exception it explains and `record` it; on
    /// failure the name is remembered as unresolved.
    pub fn correlate(&mut self, header: &str, line_number: u64) -> Option<PluginIdentity> {
        match self.resolve(header).cloned() {
            Some(plugin) => {
                tracing::debug!(
                    plugin = %plugin.name,
                    version = %plugin.version,
                    line = line_number,
                    "Blame resolved"
                );
                Some(plugin)
            }
            None => {
                let name = extract_plugin_name(header).to_string();
                tracing::warn!(
                    plugin = %name,
                    line = line_number,
                    "Blamed plugin is not among the enabled plugins"
                );
                self.unresolved.push(name);
                None
            }
        }
    }

    /// Store a resolved blame together with the exception it explained.
    pub fn record(&mut self, plugin: PluginIdentity, line_number: u64, explained: Option<LogEntry>) {
        self.records.push(BlameRecord {
            plugin,
            line_number,
            explained,
        });
    }

    /// Finish the session: records deduplicated by full plugin identity
    /// (first occurrence kept) and the unresolved names.
    pub fn finish(self) -> (Vec<BlameRecord>, Vec<String>) {
        let mut deduped: Vec<BlameRecord> = Vec::with_capacity(self.records.len());
        for record in self.records {
            if !deduped.iter().any(|r| r.plugin == record.plugin) {
                deduped.push(record);
            }
        }
        (deduped, self.unresolved)
    }
}
