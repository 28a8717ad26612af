// IdeDoctor - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (config.toml)
// 3. Logging initialisation (debug mode support)
// 4. Running the diagnosis and printing the report

use clap::{Parser, ValueEnum};
use ide_doctor::app::{diagnose, plugins};
use ide_doctor::core::model::PluginIdentity;
use ide_doctor::core::report;
use ide_doctor::platform::config::{self, PlatformPaths};
use ide_doctor::util;
use ide_doctor::util::error::{DoctorError, ReportError};
use std::path::PathBuf;
use std::process::ExitCode;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// IdeDoctor - diagnose an IDE's application log and VM options.
///
/// Finds crash entries in the log, attributes them to the plugins the IDE
/// blamed, and checks the VM options file for misconfigured runtime flags.
#[derive(Parser, Debug)]
#[command(name = "ide-doctor", version, about)]
#[command(group(
    clap::ArgGroup::new("inputs")
        .required(true)
        .multiple(true)
        .args(["log", "vm_options"]),
))]
struct Cli {
    /// Application log file (e.g. idea.log).
    #[arg(short = 'l', long = "log")]
    log: Option<PathBuf>,

    /// VM options file (e.g. idea64.vmoptions).
    #[arg(short = 'o', long = "vm-options")]
    vm_options: Option<PathBuf>,

    /// JSON file listing installed plugins, used to resolve blamed plugins.
    #[arg(short = 'p', long = "plugins")]
    plugins: Option<PathBuf>,

    /// Config file (defaults to config.toml in the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Report format.
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write every parsed log entry to this CSV file.
    #[arg(long = "entries-csv")]
    entries_csv: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn run(cli: Cli) -> Result<bool, DoctorError> {
    // Config is loaded before tracing exists, so its warnings are replayed
    // once the subscriber is installed.
    let (app_config, config_warnings) = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&PlatformPaths::resolve().config_dir),
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "IdeDoctor starting"
    );

    let plugin_list: Vec<PluginIdentity> = match &cli.plugins {
        Some(path) => plugins::load_plugin_list(path)?,
        None => {
            tracing::debug!("No plugin list given; blame entries will stay unresolved");
            Vec::new()
        }
    };

    let request = diagnose::DiagnoseRequest {
        log_path: cli.log.clone(),
        vm_options_path: cli.vm_options.clone(),
        config: app_config,
    };
    let diagnosis = diagnose::run_diagnosis(&request, &plugin_list)?;

    if let (Some(csv_path), Some(log)) = (&cli.entries_csv, &diagnosis.log) {
        let file = std::fs::File::create(csv_path).map_err(|e| ReportError::Io {
            path: csv_path.clone(),
            source: e,
        })?;
        let written = report::export_entries_csv(&log.entries, file, csv_path)?;
        tracing::info!(path = %csv_path.display(), entries = written, "Exported log entries");
    }

    let rendered = match cli.format {
        OutputFormat::Text => report::render_text(&diagnosis),
        OutputFormat::Json => report::render_json(&diagnosis)?,
    };
    println!("{rendered}");

    Ok(diagnosis.has_errors())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(2),
        Err(e) => {
            tracing::error!(error = %e, "Diagnosis failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
