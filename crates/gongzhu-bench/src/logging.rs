use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

pub const TRACE_FILE: &str = "trace.jsonl";

/// Keeps the non-blocking writer alive; dropping it flushes pending events.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub trace_path: PathBuf,
}

/// Install a JSON `tracing` subscriber writing next to the summary file.
///
/// Returns `None` when structured logging is disabled. `RUST_LOG` takes
/// precedence over the configured level.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let trace_dir = outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&trace_dir)
        .with_context(|| format!("creating trace directory at {}", trace_dir.display()))?;

    let trace_path = trace_dir.join(TRACE_FILE);
    let file = File::create(&trace_path)
        .with_context(|| format!("creating trace file at {}", trace_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A subscriber may already be installed, e.g. by another test.
    let _ = tracing::subscriber::set_global_default(subscriber);
    tracing::event!(Level::INFO, run_id, "structured logging enabled");

    Ok(Some(LoggingGuard {
        _guard: guard,
        trace_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = ResolvedOutputs {
            jsonl: dir.path().join("deals.jsonl"),
            summary_md: dir.path().join("summary.md"),
        };
        let guard = init_logging(&LoggingConfig::default(), &outputs, "quiet").unwrap();
        assert!(guard.is_none());
        assert!(!dir.path().join(TRACE_FILE).exists());
    }

    #[test]
    fn enabled_logging_creates_trace_file() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = ResolvedOutputs {
            jsonl: dir.path().join("deals.jsonl"),
            summary_md: dir.path().join("out").join("summary.md"),
        };
        let logging = LoggingConfig {
            enable_structured: true,
            tracing_level: "debug".to_string(),
        };
        let guard = init_logging(&logging, &outputs, "loud").unwrap().unwrap();
        assert_eq!(guard.trace_path, dir.path().join("out").join(TRACE_FILE));
        assert!(guard.trace_path.exists());
    }
}
