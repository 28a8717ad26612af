// IdeDoctor - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for IdeDoctor configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/idedoctor/ or %APPDATA%\IdeDoctor\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[log]` section.
    pub log: LogSection,
    /// `[vmoptions]` section.
    pub vmoptions: VmOptionsSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[log]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Entries required before a blame entry is correlated.
    pub blame_min_prior_entries: Option<usize>,
}

/// `[vmoptions]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct VmOptionsSection {
    /// Address width of the target runtime (32 or 64).
    pub address_width: Option<u32>,
    /// Largest acceptable -Xmx on a 32-bit runtime, in bytes.
    pub xmx_32bit_limit_bytes: Option<u64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub blame_min_prior_entries: usize,
    pub address_width: u32,
    pub xmx_32bit_limit_bytes: u64,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            blame_min_prior_entries: constants::DEFAULT_BLAME_MIN_PRIOR_ENTRIES,
            address_width: usize::BITS,
            xmx_32bit_limit_bytes: constants::DEFAULT_XMX_32BIT_LIMIT_BYTES,
            log_level: None,
        }
    }
}

/// Load `config.toml` from the platform config directory.
///
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus a warning; the run still proceeds.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match load_config_file(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Load an explicitly named config file. Unlike `load_config`, I/O and
/// parse failures are returned as errors.
pub fn load_config_file(path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Log: blame_min_prior_entries --
    if let Some(n) = raw.log.blame_min_prior_entries {
        if n <= constants::MAX_BLAME_MIN_PRIOR_ENTRIES {
            config.blame_min_prior_entries = n;
        } else {
            warnings.push(format!(
                "[log] blame_min_prior_entries = {n} is out of range (0-{}). Using default ({}).",
                constants::MAX_BLAME_MIN_PRIOR_ENTRIES,
                constants::DEFAULT_BLAME_MIN_PRIOR_ENTRIES,
            ));
        }
    }

    // -- VM options: address_width --
    if let Some(width) = raw.vmoptions.address_width {
        if constants::VALID_ADDRESS_WIDTHS.contains(&width) {
            config.address_width = width;
        } else {
            warnings.push(format!(
                "[vmoptions] address_width = {width} is not recognised. \
                 Expected 32 or 64. Using host width ({}).",
                usize::BITS,
            ));
        }
    }

    // -- VM options: xmx_32bit_limit_bytes --
    if let Some(limit) = raw.vmoptions.xmx_32bit_limit_bytes {
        if limit > 0 {
            config.xmx_32bit_limit_bytes = limit;
        } else {
            warnings.push(format!(
                "[vmoptions] xmx_32bit_limit_bytes must be positive. Using default ({}).",
                constants::DEFAULT_XMX_32BIT_LIMIT_BYTES,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_config_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(constants::CONFIG_FILE_NAME),
            "[log]\nblame_min_prior_entries = 2\n\n[vmoptions]\naddress_width = 32\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.blame_min_prior_entries, 2);
        assert_eq!(config.address_width, 32);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let raw: RawConfig = toml::from_str(
            "[log]\nblame_min_prior_entries = 5000\n[vmoptions]\naddress_width = 16\nxmx_32bit_limit_bytes = 0\n[logging]\nlevel = \"loud\"\n",
        )
        .unwrap();
        let (config, warnings) = validate(raw);
        assert_eq!(warnings.len(), 4);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unparseable_default_config_warns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(constants::CONFIG_FILE_NAME), "[log\n").unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_file(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
