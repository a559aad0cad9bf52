//! File logging for the CLI and the interactive table.
//!
//! Logs go to `<data_dir>/logs` only, so the full-screen table never gets
//! interleaved output. A failed init leaves the process running without logs.

use std::path::Path;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

use crate::error::{LedgerError, Result};

const LOG_FILE_BASENAME: &str = "ledgerbook";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Environment variable that overrides the configured level.
pub const LOG_ENV: &str = "LEDGERBOOK_LOG";

/// Start logging into `log_dir`. Keep the returned handle alive for the
/// lifetime of the process.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<LoggerHandle> {
    let requested = std::env::var(LOG_ENV).unwrap_or_else(|_| level.to_string());
    let level = normalize_level(&requested)?;

    std::fs::create_dir_all(log_dir)?;
    let handle = Logger::try_with_str(level)
        .map_err(|e| LedgerError::Settings(format!("invalid log level `{level}`: {e}")))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|e| LedgerError::Other(format!("failed to start logger: {e}")))?;

    info!(
        "ledgerbook {} started, level={level}",
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}

fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok("off"),
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LedgerError::Settings(format!(
            "unsupported log level `{other}`; expected off|trace|debug|info|warn|error"
        ))),
    }
}
