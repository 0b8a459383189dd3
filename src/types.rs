//! Core data model types for ingestion.
//!
//! Every converter produces a [`Conversion`]: a tagged outcome wrapping a [`Table`] of
//! header-keyed [`Row`]s. [`ConversionResult`] is the flat, JSON-friendly view of the same
//! outcome (`headers`, `rows`, optional `error`).

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// ISO-8601 rendering used whenever a timestamp leaves the core.
pub(crate) const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single cleaned cell value.
///
/// `DateTime` only appears between a spreadsheet reader and the dispatcher's final normalization
/// pass; callers of [`crate::ingestion::ingest_from_bytes`] only ever see `Null`, `Number` or
/// `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// Floating point number.
    Number(f64),
    /// UTF-8 string.
    Text(String),
    /// Native timestamp (pre-normalization only).
    DateTime(NaiveDateTime),
}

impl Value {
    /// Build a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness used by the "keep a row only if something is in it" filters:
    /// null, empty text and zero are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::DateTime(_) => true,
        }
    }

    /// Render the value as a chart label.
    ///
    /// Integral numbers keep a trailing `.0` (`100.0`), matching how the same rows are shown in
    /// tables; null becomes the empty string.
    pub fn to_label(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::DateTime(dt) => dt.format(ISO_DATETIME_FORMAT).to_string(),
        }
    }

    /// Convert a native timestamp into its ISO-8601 text form; other values are unchanged.
    pub fn into_transport(self) -> Self {
        match self {
            Self::DateTime(dt) => Self::Text(dt.format(ISO_DATETIME_FORMAT).to_string()),
            other => other,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{n:.1}")
    } else {
        n.to_string()
    }
}

/// One record: header name -> cleaned value.
///
/// Keys are exactly the non-empty headers present for the record.
pub type Row = BTreeMap<String, Value>;

/// Ordered headers plus the rows recovered for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names in document order. May contain empty strings for unnamed columns.
    pub headers: Vec<String>,
    /// Cleaned records.
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the index of a header by exact name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Outcome of a single conversion.
///
/// - `Complete`: rows were recovered.
/// - `Partial`: soft failure; the reason is always [`ConversionError::NoData`] and `table` keeps
///   whatever headers (and, rarely, rows) were recovered before the condition was detected.
/// - `Failed`: hard failure; nothing is retained.
#[derive(Debug)]
pub enum Conversion {
    Complete(Table),
    Partial {
        table: Table,
        reason: ConversionError,
    },
    Failed(ConversionError),
}

impl Conversion {
    /// Classify a finished table: no rows means the soft `NoData` condition.
    pub(crate) fn from_table(table: Table, no_rows_message: &str) -> Self {
        if table.rows.is_empty() {
            Self::Partial {
                table,
                reason: ConversionError::no_data(no_rows_message),
            }
        } else {
            Self::Complete(table)
        }
    }

    /// Soft failure with no headers recovered.
    pub(crate) fn empty(message: &str) -> Self {
        Self::Partial {
            table: Table::default(),
            reason: ConversionError::no_data(message),
        }
    }

    /// The recovered table, if any. Hard failures have none.
    pub fn table(&self) -> Option<&Table> {
        match self {
            Self::Complete(table) | Self::Partial { table, .. } => Some(table),
            Self::Failed(_) => None,
        }
    }

    /// Headers recovered by the conversion (empty on hard failure).
    pub fn headers(&self) -> &[String] {
        self.table().map(|t| t.headers.as_slice()).unwrap_or(&[])
    }

    /// Rows recovered by the conversion (empty on hard failure).
    pub fn rows(&self) -> &[Row] {
        self.table().map(|t| t.rows.as_slice()).unwrap_or(&[])
    }

    /// The soft or hard failure reason, if any.
    pub fn error(&self) -> Option<&ConversionError> {
        match self {
            Self::Complete(_) => None,
            Self::Partial { reason, .. } => Some(reason),
            Self::Failed(err) => Some(err),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Apply `f` to the rows of a `Complete` or `Partial` outcome.
    pub(crate) fn map_rows<F>(self, f: F) -> Self
    where
        F: FnMut(Row) -> Row,
    {
        match self {
            Self::Complete(table) => Self::Complete(map_table_rows(table, f)),
            Self::Partial { table, reason } => Self::Partial {
                table: map_table_rows(table, f),
                reason,
            },
            failed @ Self::Failed(_) => failed,
        }
    }

    /// Flatten into the `(headers, rows, error)` contract.
    pub fn into_result(self) -> ConversionResult {
        self.into()
    }
}

fn map_table_rows<F>(table: Table, f: F) -> Table
where
    F: FnMut(Row) -> Row,
{
    Table {
        headers: table.headers,
        rows: table.rows.into_iter().map(f).collect(),
    }
}

/// Flat, serializable view of a [`Conversion`].
///
/// Invariant: when `error` describes a hard failure, `headers` and `rows` are both empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub error: Option<String>,
}

impl From<Conversion> for ConversionResult {
    fn from(c: Conversion) -> Self {
        match c {
            Conversion::Complete(table) => Self {
                headers: table.headers,
                rows: table.rows,
                error: None,
            },
            Conversion::Partial { table, reason } => Self {
                headers: table.headers,
                rows: table.rows,
                error: Some(reason.to_string()),
            },
            Conversion::Failed(err) => Self {
                headers: Vec::new(),
                rows: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }
}
