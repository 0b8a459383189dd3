//! `datavis-ingest` turns uploaded tabular files into uniform rows and chart-ready series.
//!
//! The library works on fully materialized payloads: a caller hands over raw bytes plus the
//! declared file name, and gets back in-memory structures. There is no file-system, network or
//! session access anywhere in the crate.
//!
//! ## What you can ingest
//!
//! **File formats (picked by extension, case-insensitive):**
//!
//! - **CSV**: `.csv`
//! - **JSON**: `.json` (array of objects, single object, or NDJSON)
//! - **XML**: `.xml`, either generic `<record>` lists or SpreadsheetML 2003 exports
//! - **Spreadsheets** (requires the Cargo feature `excel`, on by default): `.xlsx`, `.xls`, `.ods`
//!
//! Every conversion yields a [`types::Conversion`], which is one of:
//!
//! - `Complete`: rows were recovered
//! - `Partial`: soft failure ("no data rows"), headers may still be present
//! - `Failed`: hard failure, nothing retained
//!
//! [`types::Conversion::into_result`] flattens it into the serializable `(headers, rows, error)`
//! view, [`types::ConversionResult`]. Cells are always text, numbers or null once they leave
//! [`ingestion::ingest_from_bytes`].
//!
//! ## Quick example: ingest, then chart
//!
//! ```rust
//! use datavis_ingest::charting::{prepare_chart_data, ChartKind};
//! use datavis_ingest::ingestion::{ingest_from_bytes, IngestionOptions};
//!
//! let csv = b"Date,Open,High,Low,Close,Volume\n\
//!             2024-01-02,10,12,9,11,1000\n\
//!             not a date,11,13,10,12,1100\n\
//!             2024-01-04,12,14,11,13,900\n";
//!
//! let conversion = ingest_from_bytes(csv, "prices.csv", &IngestionOptions::default());
//! let chart = prepare_chart_data(conversion.rows(), conversion.headers(), None, None);
//!
//! assert_eq!(chart.kind, ChartKind::Stock);
//! assert_eq!(chart.series.label_column.as_deref(), Some("Date"));
//! assert_eq!(chart.series.value_column.as_deref(), Some("Close"));
//! // The unparseable date is dropped by the stock processor.
//! assert_eq!(chart.series.labels, vec!["2024-01-02", "2024-01-04"]);
//! assert_eq!(chart.series.values, vec![11.0, 13.0]);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: dispatcher, per-format converters and observers
//! - [`charting`]: schema inference and the stock/bank/generic chart processors
//! - [`cleaning`]: amount and date cleaners shared by both layers
//! - [`types`]: value, row and conversion outcome types
//! - [`error`]: the error enum carried by failed conversions
//! - `export`: converted table to XLSX bytes (feature `export`, on by default)

pub mod charting;
pub mod cleaning;
pub mod error;
#[cfg(feature = "export")]
pub mod export;
pub mod ingestion;
pub mod types;

pub use error::{ConversionError, ConversionResultOf};
pub use types::{Conversion, ConversionResult, Row, Table, Value};
