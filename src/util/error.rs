// IdeDoctor - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all IdeDoctor operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum DoctorError {
    /// Reading the application log failed.
    Log(LogError),

    /// Reading the VM options file failed.
    VmOptions(VmOptionsError),

    /// Loading the enabled-plugin list failed.
    Plugins(PluginListError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// Rendering or writing a report failed.
    Report(ReportError),
}

impl fmt::Display for DoctorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Log(e) => write!(f, "Log error: {e}"),
            Self::VmOptions(e) => write!(f, "VM options error: {e}"),
            Self::Plugins(e) => write!(f, "Plugin list error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Report(e) => write!(f, "Report error: {e}"),
        }
    }
}

impl std::error::Error for DoctorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Log(e) => Some(e),
            Self::VmOptions(e) => Some(e),
            Self::Plugins(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Report(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Log errors
// ---------------------------------------------------------------------------

/// Errors raised while reading an application log.
///
/// Malformed content is never an error; only I/O failures are.
#[derive(Debug)]
pub enum LogError {
    /// The log file could not be opened.
    Open { path: PathBuf, source: io::Error },

    /// Reading a line failed part-way through the file.
    Read {
        path: PathBuf,
        line_number: u64,
        source: io::Error,
    },
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open log '{}': {source}", path.display())
            }
            Self::Read {
                path,
                line_number,
                source,
            } => write!(
                f,
                "'{}' line {line_number}: read failed: {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Read { source, .. } => Some(source),
        }
    }
}

impl From<LogError> for DoctorError {
    fn from(e: LogError) -> Self {
        Self::Log(e)
    }
}

// ---------------------------------------------------------------------------
// VM options errors
// ---------------------------------------------------------------------------

/// Errors raised while reading a VM options file.
#[derive(Debug)]
pub enum VmOptionsError {
    /// I/O error opening or reading the options file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for VmOptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read VM options '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for VmOptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<VmOptionsError> for DoctorError {
    fn from(e: VmOptionsError) -> Self {
        Self::VmOptions(e)
    }
}

// ---------------------------------------------------------------------------
// Plugin list errors
// ---------------------------------------------------------------------------

/// Errors raised while loading the enabled-plugin list.
#[derive(Debug)]
pub enum PluginListError {
    /// I/O error reading the plugin list file.
    Io { path: PathBuf, source: io::Error },

    /// The plugin list is not a valid JSON array of plugin records.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for PluginListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read plugin list '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "invalid plugin list '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PluginListError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<PluginListError> for DoctorError {
    fn from(e: PluginListError) -> Self {
        Self::Plugins(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for DoctorError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors related to report rendering and export.
#[derive(Debug)]
pub enum ReportError {
    /// I/O error writing an export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json { source: serde_json::Error },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { source } => write!(f, "JSON rendering error: {source}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source } => Some(source),
        }
    }
}

impl From<ReportError> for DoctorError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

/// Convenience type alias for IdeDoctor results.
pub type Result<T> = std::result::Result<T, DoctorError>;
