use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "lingohub.log";

/// Must be held for the lifetime of the process; dropping it flushes and
/// stops the background log writer.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// File-log settings, read from `ENABLE_FILE_LOGS` and `LOG_DIR`. Stdout
/// logging is always on; the daily-rolling file layer is opt-in for
/// deployments that ship logs from disk.
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub file_logs: bool,
    pub dir: String,
}

impl LogOptions {
    pub fn from_env() -> Self {
        Self {
            file_logs: env_flag("ENABLE_FILE_LOGS"),
            dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let options = LogOptions::from_env();
    let env_filter = EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));
    let stdout_layer = fmt::layer().with_target(true);

    if options.file_logs {
        if let Err(err) = std::fs::create_dir_all(&options.dir) {
            eprintln!("failed to create log directory {}: {err}", options.dir);
        } else {
            let file_appender =
                RollingFileAppender::new(Rotation::DAILY, &options.dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();

            return Some(FileLogGuard { _guard: guard });
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();

    None
}
