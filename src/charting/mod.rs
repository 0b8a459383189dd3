//! Schema inference and chart-series projection.
//!
//! [`infer_type`] scores a header set against two fixed vocabularies; [`prepare_chart_data`]
//! routes the rows to the matching processor:
//!
//! - [`stock`]: strict, rows with an unparseable date label are dropped
//! - [`bank`]: lenient, unparseable date labels keep their raw text
//! - [`generic`]: labels are always plain text
//!
//! Processors never fail. Diagnostics travel in [`ChartSeries::error`] next to a well-formed
//! (possibly empty) series.
//!
//! ```
//! use datavis_ingest::charting::{infer_type, prepare_chart_data, ChartKind};
//! use datavis_ingest::types::{Row, Value};
//!
//! let headers: Vec<String> = ["Date", "Description", "Amount", "Balance"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! assert_eq!(infer_type(&headers), ChartKind::Bank);
//!
//! let mut row = Row::new();
//! row.insert("Date".into(), Value::text("01/15/2024"));
//! row.insert("Amount".into(), Value::text("$1,200.50"));
//!
//! let chart = prepare_chart_data(&[row], &headers, None, None);
//! assert_eq!(chart.series.labels, vec!["2024-01-15"]);
//! assert_eq!(chart.series.values, vec![1200.5]);
//! ```

pub mod bank;
pub mod columns;
pub mod generic;
pub mod stock;

use serde::Serialize;

use crate::types::Row;

/// Vocabulary voting for [`ChartKind::Stock`].
pub const STOCK_INDICATORS: [&str; 9] = [
    "date", "open", "high", "low", "close", "volume", "adjusted", "return", "ticker",
];
/// Vocabulary voting for [`ChartKind::Bank`].
pub const BANK_INDICATORS: [&str; 8] = [
    "date",
    "transaction type",
    "amount",
    "balance",
    "description",
    "payee",
    "withdrawal",
    "deposit",
];
pub const STOCK_THRESHOLD: usize = 4;
pub const BANK_THRESHOLD: usize = 3;

/// Inferred shape of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Stock,
    Bank,
    Generic,
    /// No headers at all; charted like [`ChartKind::Generic`].
    Unknown,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Bank => "bank",
            Self::Generic => "generic",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify a header set.
///
/// Each header counts once per vocabulary it belongs to (case-insensitive, whole name). A kind
/// wins only by reaching its threshold and strictly beating the other score; ties are generic.
pub fn infer_type(headers: &[String]) -> ChartKind {
    if headers.is_empty() {
        return ChartKind::Unknown;
    }

    let lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let stock = vocabulary_score(&lower, &STOCK_INDICATORS);
    let bank = vocabulary_score(&lower, &BANK_INDICATORS);
    log::debug!("schema scores: stock={stock} bank={bank}");

    if stock >= STOCK_THRESHOLD && stock > bank {
        ChartKind::Stock
    } else if bank >= BANK_THRESHOLD && bank > stock {
        ChartKind::Bank
    } else {
        ChartKind::Generic
    }
}

fn vocabulary_score(lower_headers: &[String], vocabulary: &[&str]) -> usize {
    lower_headers
        .iter()
        .filter(|h| vocabulary.contains(&h.as_str()))
        .count()
}

/// A label/value series ready for plotting.
///
/// Invariant: `labels.len() == values.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    /// X-axis labels.
    pub labels: Vec<String>,
    /// Y-axis values.
    pub values: Vec<f64>,
    /// Column the labels came from; `None` when processing stopped before extraction.
    pub label_column: Option<String>,
    /// Column the values came from; `None` when processing stopped before extraction.
    pub value_column: Option<String>,
    /// Headers the processor offers as Y-axis choices.
    pub numeric_headers: Vec<String>,
    /// Headers the processor offers as X-axis choices.
    pub label_headers: Vec<String>,
    /// Diagnostic for display; `None` on success.
    pub error: Option<String>,
}

impl ChartSeries {
    /// Number of plotted points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub(crate) fn rejected(
        numeric_headers: Vec<String>,
        label_headers: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        log::debug!("chart processing stopped: {message}");
        Self {
            numeric_headers,
            label_headers,
            error: Some(message),
            ..Self::default()
        }
    }

    pub(crate) fn assemble(
        labels: Vec<String>,
        values: Vec<f64>,
        label_column: String,
        value_column: String,
        numeric_headers: Vec<String>,
        label_headers: Vec<String>,
        type_name: &str,
    ) -> Self {
        let error = labels.is_empty().then(|| {
            format!("No valid data points extracted using the selected columns for {type_name} type.")
        });
        Self {
            labels,
            values,
            label_column: Some(label_column),
            value_column: Some(value_column),
            numeric_headers,
            label_headers,
            error,
        }
    }
}

/// Resolved columns must be actual headers (exact match).
pub(crate) fn check_columns(
    headers: &[String],
    label_column: &str,
    value_column: &str,
    type_name: &str,
) -> Result<(), String> {
    if !headers.iter().any(|h| h == label_column) {
        return Err(format!(
            "Determined Label column '{label_column}' not found in headers for {type_name} type."
        ));
    }
    if !headers.iter().any(|h| h == value_column) {
        return Err(format!(
            "Determined Amount column '{value_column}' not found in headers for {type_name} type."
        ));
    }
    Ok(())
}

/// The inferred kind together with the series its processor produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedChart {
    pub kind: ChartKind,
    pub series: ChartSeries,
}

/// Infer the table kind and run the matching processor.
///
/// `label` / `value` are explicit axis selections; each one that is `None` (or empty) is
/// auto-detected independently.
pub fn prepare_chart_data(
    rows: &[Row],
    headers: &[String],
    label: Option<&str>,
    value: Option<&str>,
) -> PreparedChart {
    let kind = infer_type(headers);
    log::info!("inferred data type: {}", kind.as_str());

    let series = match kind {
        ChartKind::Stock => stock::process(rows, headers, label, value),
        ChartKind::Bank => bank::process(rows, headers, label, value),
        ChartKind::Generic | ChartKind::Unknown => generic::process(rows, headers, label, value),
    };
    PreparedChart { kind, series }
}
