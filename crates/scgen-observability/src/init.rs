// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization
//!
//! Console output goes to stderr so tools can print results on stdout. With
//! the `file-logging` feature, logs are also written under a timestamped run
//! folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       ├── scgen-device.log
//!       ├── scgen-kernel.log
//!       └── scgen.log (combined)
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scgen_config::{LogFormat, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps file writers alive; logs are flushed when dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Filter directives for the configured level plus per-crate debug flags
pub fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = debug_flags.filter_directives(&config.level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter '{}'", directives))
}

fn console_layer(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<BoxedLayer> {
    let filter = build_filter(debug_flags, config)?;
    let layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };
    Ok(layer)
}

/// Initialize the global subscriber
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags raising selected crates to `debug`
/// * `config` - Level, console format and file-logging settings
///
/// # Errors
///
/// Fails on an invalid level, when the log directory cannot be created, or
/// when a global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    #[allow(unused_mut)]
    let mut layers: Vec<BoxedLayer> = vec![console_layer(debug_flags, config)?];

    #[cfg(feature = "file-logging")]
    let (file_guards, log_dir) = if config.file_logging {
        let (file_layers, guards, run_folder) = file_layers(debug_flags, config)?;
        layers.extend(file_layers);
        (guards, Some(run_folder))
    } else {
        (Vec::new(), None)
    };

    #[cfg(not(feature = "file-logging"))]
    let log_dir: Option<PathBuf> = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    warn_if_file_logging_unavailable(config);

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

#[cfg(not(feature = "file-logging"))]
fn warn_if_file_logging_unavailable(config: &LoggingConfig) {
    if config.file_logging {
        tracing::warn!("logging.file_logging is set but scgen was built without the file-logging feature");
    }
}

#[cfg(feature = "file-logging")]
fn warn_if_file_logging_unavailable(_config: &LoggingConfig) {}

#[cfg(feature = "file-logging")]
fn file_layers(
    debug_flags: &CrateDebugFlags,
    config: &LoggingConfig,
) -> Result<(
    Vec<BoxedLayer>,
    Vec<tracing_appender::non_blocking::WorkerGuard>,
    PathBuf,
)> {
    use tracing_appender::rolling;

    let now = chrono::Utc::now();
    let run_folder = config.log_dir.join(crate::retention::run_folder_name(now));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    crate::retention::cleanup_old_logs(
        &config.log_dir,
        config.retention_days,
        config.retention_runs,
        now,
    )?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guards = Vec::new();

    // one file per crate
    for crate_name in crate::KNOWN_CRATES {
        let appender = rolling::daily(&run_folder, format!("{}.log", crate_name));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);

        let directives = format!("{}=debug,off", crate::crate_target(crate_name));
        let filter = EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid log filter '{}'", directives))?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter)
                .boxed(),
        );
    }

    let appender = rolling::daily(&run_folder, "scgen.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);
    layers.push(
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(build_filter(debug_flags, config)?)
            .boxed(),
    );

    Ok((layers, guards, run_folder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-scgen-device".to_string()]);
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..Default::default()
        };
        let filter = build_filter(&flags, &config).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("scgen_device=debug"));
        assert!(rendered.contains("warn"));
    }

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggingConfig {
            level: "scgen_device=loud".to_string(),
            ..Default::default()
        };
        assert!(build_filter(&CrateDebugFlags::default(), &config).is_err());
    }

    #[test]
    fn test_init_once() {
        let config = LoggingConfig {
            format: LogFormat::Json,
            ..Default::default()
        };
        let guard = init_logging(&CrateDebugFlags::default(), &config).unwrap();
        assert!(guard.log_dir().is_none());

        tracing::info!("logging initialized");
        assert!(init_logging(&CrateDebugFlags::default(), &config).is_err());
    }
}
