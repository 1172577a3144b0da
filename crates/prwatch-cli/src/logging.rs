//! Tracing setup: human-readable events on stderr plus a per-run log file.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use prwatch_core::AppConfig;

/// `run_<YYYYMMDD_HHMM>.log` for the given local start time.
pub(crate) fn log_file_name(started_at: NaiveDateTime) -> String {
    format!("run_{}.log", started_at.format("%Y%m%d_%H%M"))
}

/// Installs the global subscriber and returns the log file path.
///
/// `RUST_LOG` takes precedence over `PRWATCH_LOG_LEVEL`; `debug` overrides
/// both.
pub(crate) fn init(config: &AppConfig, debug: bool) -> anyhow::Result<PathBuf> {
    let env_filter = if debug {
        EnvFilter::try_new("debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?
    };

    fs::create_dir_all(&config.log_dir).with_context(|| {
        format!(
            "failed to create log directory {}",
            config.log_dir.display()
        )
    })?;
    let path = config
        .log_dir
        .join(log_file_name(Local::now().naive_local()));
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn log_file_name_uses_minute_resolution() {
        let started_at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(9, 5, 42))
            .expect("valid timestamp");
        assert_eq!(log_file_name(started_at), "run_20240501_0905.log");
    }
}
