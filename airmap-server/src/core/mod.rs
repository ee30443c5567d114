//! Server setup that is not tied to a route: configuration, shared state and logging.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod config;
pub mod state;

const LOG_FILE_PREFIX: &str = "airmap-server.log";

/// Installs the global subscriber: stdout always, plus a daily rolling file in
/// `log_dir` when given. `log` records are forwarded to the same subscriber.
///
/// The returned guard flushes the file writer when dropped, so keep it alive
/// for as long as the server runs.
pub fn init_logger(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    log::debug!("Done initializing logger");
    Ok(guard)
}
