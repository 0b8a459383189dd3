//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_bytes`], which converts a fully materialized payload
//! into a [`Conversion`] based on the declared file name.
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file extension.
//! - `.xml` payloads are tried as generic `<record>` XML first, then as SpreadsheetML.
//! - Every native timestamp left in the rows is rendered as ISO-8601 text before returning.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::types::{Conversion, Row, Value};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, json, spreadsheetml, xml};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// XLSX/XLS workbooks (feature-gated behind `excel`).
    Excel,
    /// OpenDocument spreadsheets (feature-gated behind `excel`).
    Ods,
    /// JSON array-of-objects, single object, or NDJSON.
    Json,
    /// Generic `<record>` XML or SpreadsheetML.
    Xml,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive, leading dot optional).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            "ods" => Some(Self::Ods),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// Infer the format from a file name such as `statement.CSV`, an extension such as `.csv`,
    /// or a bare extension such as `csv`. A dotless name that is not a known extension
    /// (`README`) has no type at all.
    pub fn from_file_name(file_name: &str) -> Result<Self, ConversionError> {
        let ext = extension_of(file_name).ok_or(ConversionError::UnknownFormat)?;
        Self::from_extension(ext).ok_or_else(|| ConversionError::UnsupportedFormat {
            extension: format!(".{}", ext.to_lowercase()),
        })
    }
}

fn extension_of(file_name: &str) -> Option<&str> {
    let name = file_name.trim();
    let ext = match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => IngestionFormat::from_extension(name).map(|_| name)?,
    };
    (!ext.is_empty()).then_some(ext)
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<IngestionFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Convert a payload based on its declared file name.
///
/// Never panics and never returns `Err`: every failure is carried by the returned
/// [`Conversion`]. Flatten it with [`Conversion::into_result`] for the
/// `(headers, rows, error)` view.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` when rows were produced, with header/row counts
/// - `on_failure` otherwise, with a computed severity (soft failures are `Warning`)
/// - `on_alert` when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```
/// use datavis_ingest::ingestion::{ingest_from_bytes, IngestionOptions};
///
/// let csv = b"Date,Amount\n2024-01-01,$100\n,\n2024-01-02,(50)\n";
/// let result = ingest_from_bytes(csv, "statement.csv", &IngestionOptions::default()).into_result();
///
/// assert!(result.error.is_none());
/// assert_eq!(result.headers, vec!["Date", "Amount"]);
/// assert_eq!(result.rows.len(), 2);
/// ```
///
/// ## Force a format explicitly (override extension inference)
///
/// ```
/// use datavis_ingest::ingestion::{ingest_from_bytes, IngestionFormat, IngestionOptions};
///
/// let opts = IngestionOptions {
///     format: Some(IngestionFormat::Json),
///     ..Default::default()
/// };
/// let conversion = ingest_from_bytes(br#"[{"amount": "1,000"}]"#, "upload.bin", &opts);
/// assert!(conversion.is_complete());
/// ```
pub fn ingest_from_bytes(bytes: &[u8], file_name: &str, options: &IngestionOptions) -> Conversion {
    let format = match options.format {
        Some(f) => Ok(f),
        None => IngestionFormat::from_file_name(file_name),
    };

    let ctx = IngestionContext {
        file_name: file_name.to_owned(),
        format: format.as_ref().ok().copied(),
        bytes: bytes.len(),
    };

    let conversion = match format {
        Ok(f) => {
            log::debug!("converting {file_name} as {f:?} ({} bytes)", bytes.len());
            convert_with_format(bytes, f).map_rows(normalize_row)
        }
        Err(e) => Conversion::Failed(e),
    };

    if let Some(obs) = options.observer.as_ref() {
        report(obs.as_ref(), &ctx, &conversion, options.alert_at_or_above);
    }

    conversion
}

/// Run the converter for an explicit format, without normalization or observers.
pub fn convert_with_format(bytes: &[u8], format: IngestionFormat) -> Conversion {
    match format {
        IngestionFormat::Csv => csv::convert_csv_from_bytes(bytes),
        IngestionFormat::Json => json::convert_json_from_bytes(bytes),
        IngestionFormat::Xml => convert_xml(bytes),
        IngestionFormat::Excel | IngestionFormat::Ods => convert_spreadsheet(bytes, format),
    }
}

/// Two-phase XML conversion: generic `<record>` XML first, then SpreadsheetML through the CSV
/// converter.
pub fn convert_xml(bytes: &[u8]) -> Conversion {
    let generic = xml::convert_xml_from_bytes(bytes);
    if !generic.rows().is_empty() {
        return generic;
    }
    log::debug!("generic xml yielded no rows; trying spreadsheetml");

    match spreadsheetml::spreadsheetml_to_csv(bytes) {
        Some(text) => csv::convert_csv_from_str(&text),
        None => {
            let detail = generic
                .error()
                .map(ToString::to_string)
                .unwrap_or_else(|| "no rows".to_owned());
            Conversion::Failed(ConversionError::XmlUnrecognized { detail })
        }
    }
}

fn convert_spreadsheet(bytes: &[u8], format: IngestionFormat) -> Conversion {
    // Avoid unused warnings when the feature is off.
    let _ = (bytes, format);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        if format == IngestionFormat::Ods {
            excel::convert_ods_from_bytes(bytes)
        } else {
            excel::convert_xlsx_from_bytes(bytes)
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Conversion::Failed(ConversionError::ExcelDisabled)
    }
}

fn normalize_row(row: Row) -> Row {
    row.into_iter()
        .map(|(k, v)| (k, Value::into_transport(v)))
        .collect()
}

fn report(
    obs: &dyn IngestionObserver,
    ctx: &IngestionContext,
    conversion: &Conversion,
    alert_at_or_above: IngestionSeverity,
) {
    match conversion.error() {
        None => obs.on_success(
            ctx,
            IngestionStats {
                headers: conversion.headers().len(),
                rows: conversion.rows().len(),
            },
        ),
        Some(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// Severity of a conversion failure: I/O anywhere in the source chain is `Critical`, the soft
/// "no data" condition is `Warning`, everything else is `Error`.
pub fn severity_for_error(e: &ConversionError) -> IngestionSeverity {
    if e.is_soft() {
        IngestionSeverity::Warning
    } else if error_chain_contains_io(e) {
        IngestionSeverity::Critical
    } else {
        IngestionSeverity::Error
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        if let Some(csv_err) = err.downcast_ref::<::csv::Error>() {
            if matches!(csv_err.kind(), ::csv::ErrorKind::Io(_)) {
                return true;
            }
        }
        cur = err.source();
    }
    false
}

/// Convenience helper for callers that want an owned request object.
///
/// This can be useful if you want to enqueue ingestion work in a job system.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Raw payload.
    pub bytes: Vec<u8>,
    /// Declared file name or extension.
    pub file_name: String,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    /// Build a request with default options.
    pub fn new(bytes: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            options: IngestionOptions::default(),
        }
    }

    /// Execute the request by calling [`ingest_from_bytes`].
    pub fn run(&self) -> Conversion {
        ingest_from_bytes(&self.bytes, &self.file_name, &self.options)
    }
}
