//! Logging configuration using tracing.
//!
//! The terminal belongs to the UI, so events go to a daily-rolling file.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "USERDECK_LOG";

/// Initialize the logging subsystem, writing `userdeck.log.<date>` under `log_dir`.
///
/// Level is controlled by the `USERDECK_LOG` environment variable, e.g.
/// `USERDECK_LOG=debug userdeck`.
pub fn init(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "userdeck.log");
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("userdeck=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .context("install tracing subscriber")?;

    tracing::info!(log_dir = %log_dir.display(), "userdeck starting");
    Ok(())
}
