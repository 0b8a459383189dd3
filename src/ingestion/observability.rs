use std::fmt;
use std::sync::Arc;

use crate::error::ConversionError;

use super::unified::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Soft failure: the input was readable but yielded no usable rows.
    Warning,
    /// Hard failure: the conversion produced nothing.
    Error,
    /// Hard failure caused by I/O underneath a reader.
    Critical,
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Declared file name (or bare extension) of the payload.
    pub file_name: String,
    /// Format used for conversion; `None` when it could not be determined.
    pub format: Option<IngestionFormat>,
    /// Payload size in bytes.
    pub bytes: usize,
}

/// Stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of headers.
    pub headers: usize,
    /// Number of converted rows.
    pub rows: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Soft failures are reported through [`Self::on_failure`] with [`IngestionSeverity::Warning`].
pub trait IngestionObserver: Send + Sync {
    /// Called when a conversion produced rows.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a conversion failed, softly or hard.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &ConversionError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &ConversionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }

    /// Append another observer.
    pub fn push(&mut self, observer: Arc<dyn IngestionObserver>) {
        self.observers.push(observer);
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &ConversionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &ConversionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs ingestion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!(
            "[ingest][ok] format={:?} file={} headers={} rows={}",
            ctx.format, ctx.file_name, stats.headers, stats.rows
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &ConversionError) {
        eprintln!(
            "[ingest][{:?}] format={:?} file={} err={}",
            severity, ctx.format, ctx.file_name, error
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &ConversionError) {
        eprintln!(
            "[ALERT][ingest][{:?}] format={:?} file={} err={}",
            severity, ctx.format, ctx.file_name, error
        );
    }
}

/// Forwards ingestion events to the `log` facade (target `datavis_ingest::ingest`).
///
/// Successes log at `info`, soft failures at `warn`, hard failures and alerts at `error`.
#[derive(Debug, Default)]
pub struct LogObserver;

const LOG_TARGET: &str = "datavis_ingest::ingest";

impl IngestionObserver for LogObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        log::info!(
            target: LOG_TARGET,
            "ok format={:?} file={} bytes={} headers={} rows={}",
            ctx.format, ctx.file_name, ctx.bytes, stats.headers, stats.rows
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &ConversionError) {
        let level = match severity {
            IngestionSeverity::Info => log::Level::Info,
            IngestionSeverity::Warning => log::Level::Warn,
            IngestionSeverity::Error | IngestionSeverity::Critical => log::Level::Error,
        };
        log::log!(
            target: LOG_TARGET,
            level,
            "fail severity={:?} format={:?} file={} err={}",
            severity, ctx.format, ctx.file_name, error
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &ConversionError) {
        log::error!(
            target: LOG_TARGET,
            "ALERT severity={:?} format={:?} file={} err={}",
            severity, ctx.format, ctx.file_name, error
        );
    }
}
