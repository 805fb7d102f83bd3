use std::io;
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

// Keeps the non-blocking writer flushing until process exit.
static WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Route `tracing` output to a plain-text log file.
///
/// The first successful call installs the subscriber for the whole
/// process and later calls return without effect. `filter` is a tracing
/// directive string such as "outpost=debug"; a set `RUST_LOG`
/// environment variable wins over it. Errors creating or opening the
/// log file are returned to the caller.
pub fn init_logging<P: AsRef<Path>>(path: P, filter: &str) -> io::Result<()> {
    if WRITER_GUARD.get().is_some() {
        return Ok(());
    }

    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    if WRITER_GUARD.set(guard).is_err() {
        // lost a race with another initializer; its subscriber stands
        return Ok(());
    }

    let directives = match std::env::var("RUST_LOG") {
        Ok(env) => EnvFilter::new(env),
        Err(_) => EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let subscriber = fmt()
        .with_env_filter(directives)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .finish();

    // Tests may have installed a subscriber already; the file writer
    // still flushes whatever does get through.
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}
