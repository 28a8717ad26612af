// IdeDoctor - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "IdeDoctor";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "IdeDoctor";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Application log parsing
// =============================================================================

/// Literal that opens the header of a blame entry (after trimming).
pub const BLAME_MARKER: &str = "Plugin to blame";

/// Token that starts the trailing version fragment of a blame header.
pub const BLAME_VERSION_TOKEN: &str = "version:";

/// Number of entries that must already have been produced before a blame
/// entry is correlated with the preceding exception.
///
/// Entries near the top of a log (startup banner, JVM info) never carry a
/// blame for anything earlier, but the exact threshold is inherited from the
/// behaviour of the IDE's own log layout and kept adjustable via
/// `[log] blame_min_prior_entries`.
pub const DEFAULT_BLAME_MIN_PRIOR_ENTRIES: usize = 4;

/// Hard upper bound on the configurable blame gate.
pub const MAX_BLAME_MIN_PRIOR_ENTRIES: usize = 1_000;

/// Severity keywords in the fixed priority order used by the header lexer.
pub const SEVERITY_KEYWORDS: &[&str] = &["INFO", "ERROR", "DEBUG", "WARN"];

// =============================================================================
// VM options
// =============================================================================

/// Heap-size options whose name is exactly the 4-character prefix.
pub const HEAP_OPTION_PREFIXES: &[&str] = &["-Xmx", "-Xms", "-Xmn"];

/// Name/value delimiters for generic options, in priority order.
pub const OPTION_DELIMITERS: &[char] = &['=', ':', ' '];

/// Garbage collector selection flags recognised by the multiple-GC check.
pub const GC_FLAGS: &[&str] = &[
    "-XX:+UseSerialGC",
    "-XX:+UseParallelGC",
    "-XX:+UseG1GC",
    "-XX:+UseShenandoahGC",
    "-XX:+UseEpsilonGC",
    "-XX:+UseConcMarkSweepGC",
    "-XX:+UseZGC",
];

/// Name of the maximum-heap option.
pub const XMX_OPTION: &str = "-Xmx";

/// Name of the initial-heap option.
pub const XMS_OPTION: &str = "-Xms";

/// Name of the Java agent option.
pub const JAVA_AGENT_OPTION: &str = "-javaagent";

/// Largest `-Xmx` a 32-bit runtime can reserve, in bytes (2.4 GiB).
pub const DEFAULT_XMX_32BIT_LIMIT_BYTES: u64 = 2_576_980_377;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of an input line included in debug output.
/// Prevents accidental exposure of sensitive data in long lines.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Accepted values for `[vmoptions] address_width`.
pub const VALID_ADDRESS_WIDTHS: &[u32] = &[32, 64];
