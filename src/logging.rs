//! File logging. The terminal belongs to the UI, so logs go to a daily
//! rolling file under the project's data directory.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::Config;

pub fn log_dir() -> PathBuf {
  Config::project_dirs()
    .map(|dirs| dirs.data_local_dir().join("logs"))
    .unwrap_or_else(|| std::env::temp_dir().join("apodview-logs"))
}

/// Install the global subscriber. Filter comes from `RUST_LOG`, defaulting to
/// `info,apodview=debug`. The returned guard must be held for the app lifetime.
pub fn init_logging() -> Option<WorkerGuard> {
  use tracing_subscriber::{EnvFilter, fmt, prelude::*};

  let dir = log_dir();
  if std::fs::create_dir_all(&dir).is_err() {
    return None;
  }

  let file_appender = tracing_appender::rolling::daily(&dir, "apodview.log");
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,apodview=debug"));

  let _ = tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(non_blocking).with_ansi(false).with_target(true))
    .try_init();

  Some(guard)
}
