use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

const ENV_VAR: &str = "SHEETDEX_LOG";

/// Install the global subscriber.
///
/// Events go to the configured log file since the terminal belongs to the
/// UI. When `stderr` is set (plain CLI commands) warnings are echoed there as
/// well. The returned guard flushes the file writer on drop.
pub fn init(config: &LogConfig, stderr: bool) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match config.file.as_deref() {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let filter = EnvFilter::try_from_env(ENV_VAR)
                .unwrap_or_else(|_| EnvFilter::new(&config.level));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .with_filter(EnvFilter::new("warn"))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(guard)
}

fn file_writer(path: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let file_name = path
        .file_name()
        .with_context(|| format!("log path {} has no file name", path.display()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
