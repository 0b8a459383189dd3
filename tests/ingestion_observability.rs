use std::io;
use std::sync::{Arc, Mutex};

use datavis_ingest::ingestion::{
    ingest_from_bytes, severity_for_error, CompositeObserver, IngestionContext, IngestionFormat, IngestionObserver,
    IngestionOptions, IngestionSeverity, IngestionStats, LogObserver, StdErrObserver,
};
use datavis_ingest::ConversionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &ConversionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &ConversionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

/// Only overrides `on_failure`, so alerts reach it through the default forwarding.
#[derive(Default)]
struct FailureOnlyObserver {
    seen: Mutex<Vec<(Option<IngestionFormat>, IngestionSeverity)>>,
}

impl IngestionObserver for FailureOnlyObserver {
    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, _error: &ConversionError) {
        self.seen.lock().unwrap().push((ctx.format, severity));
    }
}

fn options_with(observer: Arc<dyn IngestionObserver>, alert_at_or_above: IngestionSeverity) -> IngestionOptions {
    IngestionOptions {
        observer: Some(observer),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn observer_receives_stats_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestionSeverity::Critical);

    let _ = ingest_from_bytes(b"Date,Amount\n2024-01-01,1\n2024-01-02,2\n", "a.csv", &opts);

    assert_eq!(
        obs.successes.lock().unwrap().clone(),
        vec![IngestionStats { headers: 2, rows: 2 }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn soft_failure_is_a_warning_without_alert() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestionSeverity::Critical);

    let conversion = ingest_from_bytes(b"Date,Amount\n", "a.csv", &opts);
    assert!(!conversion.headers().is_empty());

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Warning]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn hard_failure_alerts_when_threshold_is_lowered() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestionSeverity::Error);

    let _ = ingest_from_bytes(b"whatever", "notes.txt", &opts);

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
}

#[test]
fn default_alert_forwards_to_on_failure() {
    let obs = Arc::new(FailureOnlyObserver::default());
    let opts = options_with(obs.clone(), IngestionSeverity::Warning);

    let _ = ingest_from_bytes(b"[]", "empty.json", &opts);

    assert_eq!(
        obs.seen.lock().unwrap().clone(),
        vec![
            (Some(IngestionFormat::Json), IngestionSeverity::Warning),
            (Some(IngestionFormat::Json), IngestionSeverity::Warning),
        ]
    );
}

#[test]
fn composite_observer_fans_out() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let mut composite = CompositeObserver::new(vec![a.clone() as Arc<dyn IngestionObserver>]);
    composite.push(b.clone());
    composite.push(Arc::new(LogObserver));
    composite.push(Arc::new(StdErrObserver));

    let opts = options_with(Arc::new(composite), IngestionSeverity::Error);
    let _ = ingest_from_bytes(b"<root/>", "broken.xml", &opts);

    for obs in [&a, &b] {
        assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
        assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    }
}

#[test]
fn io_errors_anywhere_in_the_chain_are_critical() {
    let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "stream closed");
    let err = ConversionError::from(csv::Error::from(io_err));
    assert_eq!(severity_for_error(&err), IngestionSeverity::Critical);

    assert_eq!(
        severity_for_error(&ConversionError::UnknownFormat),
        IngestionSeverity::Error
    );
    assert_eq!(
        severity_for_error(&ConversionError::NoData {
            message: "nothing".to_owned()
        }),
        IngestionSeverity::Warning
    );
}

#[test]
fn severities_are_ordered() {
    assert!(IngestionSeverity::Info < IngestionSeverity::Warning);
    assert!(IngestionSeverity::Warning < IngestionSeverity::Error);
    assert!(IngestionSeverity::Error < IngestionSeverity::Critical);
}
