// IdeDoctor - app/diagnose.rs
//
// Orchestrates one diagnosis run: opens the inputs, runs the log pipeline
// and the VM options pipeline, and assembles the report.
//
// The two pipelines share nothing. Any I/O failure on an input aborts the
// whole run and no partial report is returned.

use crate::core::aggregator::{self, AggregatorConfig};
use crate::core::blame::EnabledPlugins;
use crate::core::checks::{self, CheckContext};
use crate::core::report::DiagnosisReport;
use crate::core::vmoptions;
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::error::{LogError, Result, VmOptionsError};
use std::path::PathBuf;
use std::time::Instant;

/// What to diagnose.
#[derive(Debug, Clone, Default)]
pub struct DiagnoseRequest {
    pub log_path: Option<PathBuf>,
    pub vm_options_path: Option<PathBuf>,
    pub config: AppConfig,
}

impl DiagnoseRequest {
    fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            blame_min_prior_entries: self.config.blame_min_prior_entries,
        }
    }

    fn check_context(&self) -> CheckContext {
        CheckContext {
            address_width: self.config.address_width,
            xmx_32bit_limit_bytes: self.config.xmx_32bit_limit_bytes,
        }
    }
}

/// Run every requested pipeline and build the report.
pub fn run_diagnosis(
    request: &DiagnoseRequest,
    plugins: &dyn EnabledPlugins,
) -> Result<DiagnosisReport> {
    let started = Instant::now();
    let mut report = DiagnosisReport::default();

    if let Some(path) = &request.log_path {
        tracing::info!(path = %path.display(), "Parsing application log");
        let reader = fs::open_buffered(path).map_err(|e| LogError::Open {
            path: path.clone(),
            source: e,
        })?;
        let log = aggregator::parse_log(reader, path, plugins, request.aggregator_config())?;
        report.log_source = Some(path.clone());
        report.log = Some(log);
    }

    if let Some(path) = &request.vm_options_path {
        tracing::info!(path = %path.display(), "Parsing VM options");
        let reader = fs::open_buffered(path).map_err(|e| VmOptionsError::Io {
            path: path.clone(),
            source: e,
        })?;
        let options = vmoptions::read_vm_options(reader, path)?;
        report.diagnostics = checks::run_all_checks(&options, &request.check_context());
        report.vm_options_source = Some(path.clone());
        report.vm_options = Some(options);
    }

    tracing::info!(
        diagnostics = report.diagnostics.len(),
        has_errors = report.has_errors(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Diagnosis complete"
    );

    Ok(report)
}
