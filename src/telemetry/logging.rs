//! Logging configuration and initialization
//!
//! Structured logging with tracing: a compact console layer, JSON output for
//! log collection, and an optional non-blocking file layer.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::settings::PlayerSettings;

/// Environment variable holding the log filter
pub const LOG_FILTER_ENV: &str = "MULTIVIEW_LOG";

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "MULTIVIEW_LOG_FORMAT";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Enable console output (default: true)
    pub console_enabled: bool,
    /// Also write to this file (default: None)
    pub file_path: Option<PathBuf>,
    /// Use JSON format for console logs (default: false)
    pub json_format: bool,
    /// Filter used when no environment filter is set (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_path: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Logging configuration for the given settings
    pub fn from_settings(settings: &PlayerSettings) -> Self {
        Self {
            file_path: settings.log_file.as_ref().map(PathBuf::from),
            ..Self::default()
        }
    }
}

/// Whether a `MULTIVIEW_LOG_FORMAT` value asks for JSON
fn wants_json(value: Option<&str>, fallback: bool) -> bool {
    value.map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(fallback)
}

/// Initialize the logging system with the given configuration
///
/// Returns a guard that must be kept alive for the duration of the program
/// so the file writer is flushed.
///
/// # Environment Variables
///
/// - `MULTIVIEW_LOG`: log filter (e.g. "debug", "info,mpv=warn"), falling back to `RUST_LOG`
/// - `MULTIVIEW_LOG_FORMAT`: set to "json" for JSON console output
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let use_json = wants_json(std::env::var(LOG_FORMAT_ENV).ok().as_deref(), config.json_format);

    let mut file_guard: Option<WorkerGuard> = None;
    let file_layer = match &config.file_path {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            file_guard = Some(guard);
            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    let json_layer = (config.console_enabled && use_json).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    let console_layer = (config.console_enabled && !use_json).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(json_layer)
        .with(console_layer)
        .try_init()?;

    if let Some(path) = &config.file_path {
        eprintln!("Logging to file: {}", path.display());
    }

    tracing::info!(
        target: "multiview",
        version = env!("CARGO_PKG_VERSION"),
        json_format = use_json,
        file_enabled = config.file_path.is_some(),
        "Logging initialized"
    );

    Ok(file_guard)
}

pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;
