use std::path::Path;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "jjil";
const MAX_LOG_FILES: usize = 5;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// `RUST_LOG` when set, otherwise `base_level`.
fn env_filter(base_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .unwrap_or_else(|e| panic!("Invalid log filter '{}': {}", base_level, e))
}

/// Installs console output plus daily rolling files under `logs/`.
pub fn setup_logging(base_level: &str) {
    setup_logging_in(base_level, LOG_DIR);
}

/// Like [`setup_logging`], writing `jjil.*.log` files into `dir`.
///
/// WARN and above go to stderr, the rest to stdout. Panics when called twice.
pub fn setup_logging_in(base_level: &str, dir: impl AsRef<Path>) {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .unwrap_or_else(|e| panic!("Failed to create log directory {}: {}", dir.display(), e));

    let appender = Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .unwrap_or_else(|e| panic!("Failed to create log file appender: {}", e));

    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    LOG_GUARD.set(guard).expect("Logging already initialized");

    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr.with_max_level(Level::WARN).or_else(std::io::stdout));

    let file = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter(base_level))
        .with(console)
        .with(file)
        .try_init()
        .unwrap_or_else(|e| panic!("Logger initialization failed: {}", e));
}

/// Console-only subscriber for tests; repeated calls are no-ops.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("debug"))
        .with_test_writer()
        .try_init();
}
