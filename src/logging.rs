//! Tracing configuration and log routing.
//!
//! The server writes compact lines to stdout and appends the same events, with targets, to
//! `Config::log_file` through a non-blocking writer. The CLI only logs to stderr.
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the server subscriber: `RUST_LOG` filtering (default `info`), stdout, and `log_file`.
///
/// If the log file cannot be opened the server keeps running with stdout only.
pub fn init_tracing(log_file: &Path) {
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = open_log_file(log_file).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

/// Configure a stderr-only subscriber for the command-line tool.
///
/// Stdout is reserved for summaries, so diagnostics go to stderr and default to `warn`.
pub fn init_cli_tracing() {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(stderr_layer)
        .init();
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Option<NonBlocking> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(err) = fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_parents_are_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("server.log");

        assert!(open_log_file(&path).is_some());
        assert!(path.is_file());
    }

    #[test]
    fn unopenable_log_file_falls_back_to_stdout_only() {
        let dir = tempfile::tempdir().expect("tempdir");

        // A directory cannot be opened for appending.
        assert!(open_log_file(dir.path()).is_none());
    }
}
