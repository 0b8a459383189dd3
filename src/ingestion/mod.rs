//! Ingestion entrypoints and converters.
//!
//! Most callers should use [`ingest_from_bytes`] (from [`unified`]) which:
//!
//! - picks a converter from the declared file extension (or you can override via
//!   [`IngestionOptions`])
//! - returns a [`crate::types::Conversion`] whose rows only hold text, numbers and nulls
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific converters are also available under:
//! - [`csv`]
//! - [`excel`] (XLSX and ODS, feature `excel`)
//! - [`json`]
//! - [`xml`] and [`spreadsheetml`]

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod observability;
pub mod spreadsheetml;
pub mod unified;
pub mod xml;

pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, LogObserver,
    StdErrObserver,
};
pub use unified::{
    convert_with_format, convert_xml, ingest_from_bytes, severity_for_error, IngestionFormat, IngestionOptions,
    IngestionRequest,
};
