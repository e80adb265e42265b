//! Tracing subscriber setup: console plus optional daily log file.

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::LoggingConfig;

/// Log file name prefix; the appender adds the date.
const LOG_FILE_PREFIX: &str = "petshop-console.log";

/// Platform data directory for log files, if one can be determined.
pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("br", "PetShop", "petshop-console").map(|dirs| dirs.data_local_dir().join("logs"))
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize logging.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the lifetime of the process.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let console = fmt::layer().with_filter(env_filter(&config.level));

    let file_dir = config
        .file_enabled
        .then(log_dir)
        .flatten()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    match file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(env_filter(&config.level));

            tracing_subscriber::registry().with(console).with(file).init();
            tracing::info!("Logging to {}", dir.display());
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(console).init();
            None
        }
    }
}
