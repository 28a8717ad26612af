// IdeDoctor - core/checks.rs
//
// Independent checks over parsed VM options. Each check is pure, returns at
// most one diagnostic, and never prevents the others from running.

use crate::core::model::{Diagnostic, DiagnosticSeverity, ParsedVmOptions};
use crate::util::constants;

/// Environment facts the checks depend on.
#[derive(Debug, Clone)]
pub struct CheckContext {
    /// Address width of the runtime in bits (32 or 64).
    pub address_width: u32,

    /// Largest acceptable `-Xmx` on a 32-bit runtime, in bytes.
    pub xmx_32bit_limit_bytes: u64,
}

impl Default for CheckContext {
    fn default() -> Self {
        Self {
            address_width: usize::BITS,
            xmx_32bit_limit_bytes: constants::DEFAULT_XMX_32BIT_LIMIT_BYTES,
        }
    }
}

/// A single VM options check.
pub trait Check {
    /// Stable identifier, carried on every diagnostic the check emits.
    fn id(&self) -> &'static str;

    fn run(&self, options: &ParsedVmOptions, ctx: &CheckContext) -> Option<Diagnostic>;
}

fn warning(check: &'static str, message: String) -> Diagnostic {
    Diagnostic {
        check,
        severity: DiagnosticSeverity::Warning,
        message,
    }
}

fn error(check: &'static str, message: String) -> Diagnostic {
    Diagnostic {
        check,
        severity: DiagnosticSeverity::Error,
        message,
    }
}

/// Convert a heap size such as `512m` to bytes.
///
/// Exactly one trailing unit letter is required: `k`, `m` or `g` (either
/// case). A bare number, an unknown unit or an empty string is invalid.
pub fn parse_byte_size(value: &str) -> Option<u64> {
    let unit = value.chars().last()?;
    let multiplier: u64 = match unit {
        'k' | 'K' => 1 << 10,
        'm' | 'M' => 1 << 20,
        'g' | 'G' => 1 << 30,
        _ => return None,
    };
    let digits = &value[..value.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()?.checked_mul(multiplier)
}

// =============================================================================
// Checks
// =============================================================================

/// Warns when any option name occurs more than once.
pub struct DuplicateOptionsCheck;

impl Check for DuplicateOptionsCheck {
    fn id(&self) -> &'static str {
        "duplicate-options"
    }

    fn run(&self, options: &ParsedVmOptions, _ctx: &CheckContext) -> Option<Diagnostic> {
        if options.duplicates.is_empty() {
            return None;
        }
        let names: Vec<&str> = options.duplicates.keys().map(String::as_str).collect();
        Some(warning(
            self.id(),
            format!("Duplicate VM options found: {}", names.join(", ")),
        ))
    }
}

/// Warns when a Java agent is attached.
pub struct JavaAgentCheck;

impl Check for JavaAgentCheck {
    fn id(&self) -> &'static str {
        "java-agent"
    }

    fn run(&self, options: &ParsedVmOptions, _ctx: &CheckContext) -> Option<Diagnostic> {
        let agent = options.get(constants::JAVA_AGENT_OPTION)?;
        Some(warning(
            self.id(),
            format!("A Java agent is attached to the IDE: {agent}"),
        ))
    }
}

/// Errors when two or more GC selection flags are present. Repeats of the
/// same flag count individually.
pub struct MultipleGcCheck;

impl Check for MultipleGcCheck {
    fn id(&self) -> &'static str {
        "multiple-gc"
    }

    fn run(&self, options: &ParsedVmOptions, _ctx: &CheckContext) -> Option<Diagnostic> {
        if options.gc_flags.len() < 2 {
            return None;
        }
        Some(error(
            self.id(),
            format!(
                "Multiple garbage collectors are selected: {}",
                options.gc_flags.join(", ")
            ),
        ))
    }
}

/// Errors when `-Xmx` is larger than a 32-bit runtime can address. Only
/// runs on 32-bit.
pub struct XmxOn32BitCheck;

impl Check for XmxOn32BitCheck {
    fn id(&self) -> &'static str {
        "xmx-32bit"
    }

    fn run(&self, options: &ParsedVmOptions, ctx: &CheckContext) -> Option<Diagnostic> {
        if ctx.address_width != 32 {
            return None;
        }
        let xmx = options.get(constants::XMX_OPTION)?;
        let bytes = parse_byte_size(xmx)?;
        if bytes <= ctx.xmx_32bit_limit_bytes {
            return None;
        }
        Some(error(
            self.id(),
            format!(
                "Xmx value (current value {xmx}) is too high for a 32-bit runtime \
                 (maximum {} bytes)",
                ctx.xmx_32bit_limit_bytes
            ),
        ))
    }
}

/// Errors when either heap value is missing or unreadable, or when `-Xmx` is
/// smaller than `-Xms`.
pub struct XmxVsXmsCheck;

impl Check for XmxVsXmsCheck {
    fn id(&self) -> &'static str {
        "xmx-vs-xms"
    }

    fn run(&self, options: &ParsedVmOptions, _ctx: &CheckContext) -> Option<Diagnostic> {
        let Some(xmx) = options.get(constants::XMX_OPTION) else {
            return Some(error(self.id(), "Xmx value is not set".to_string()));
        };
        let Some(xms) = options.get(constants::XMS_OPTION) else {
            return Some(error(
                self.id(),
                format!("Xms value is not set (Xmx current value {xmx})"),
            ));
        };
        let Some(xmx_bytes) = parse_byte_size(xmx) else {
            return Some(error(
                self.id(),
                format!("Xmx value (current value {xmx}) is not a valid size"),
            ));
        };
        let Some(xms_bytes) = parse_byte_size(xms) else {
            return Some(error(
                self.id(),
                format!("Xms value (current value {xms}) is not a valid size"),
            ));
        };
        if xmx_bytes < xms_bytes {
            return Some(error(
                self.id(),
                format!(
                    "Xmx value (current value {xmx}) should be higher than Xms (current value {xms})"
                ),
            ));
        }
        None
    }
}

/// All checks in reporting order.
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(DuplicateOptionsCheck),
        Box::new(JavaAgentCheck),
        Box::new(MultipleGcCheck),
        Box::new(XmxOn32BitCheck),
        Box::new(XmxVsXmsCheck),
    ]
}

/// Run every check and collect whatever they report.
pub fn run_all_checks(options: &ParsedVmOptions, ctx: &CheckContext) -> Vec<Diagnostic> {
    let diagnostics: Vec<Diagnostic> = default_checks()
        .iter()
        .filter_map(|check| check.run(options, ctx))
        .collect();

    for d in &diagnostics {
        tracing::debug!(check = d.check, severity = %d.severity, "{}", d.message);
    }

    diagnostics
}
