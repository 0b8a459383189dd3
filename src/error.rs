use thiserror::Error;

/// Convenience result type for fallible conversion helpers.
pub type ConversionResultOf<T> = Result<T, ConversionError>;

/// Error type carried by conversion outcomes.
///
/// This is a single error enum shared across the CSV/XML/JSON (and optional spreadsheet)
/// converters. Converters never return it through `Err` at their public boundary; it travels
/// inside [`crate::types::Conversion`] so callers always receive a well-formed result.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[cfg(feature = "excel")]
    /// Spreadsheet container error (feature-gated behind `excel`).
    #[error("Error processing spreadsheet file: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// CSV reader error.
    #[error("An error occurred during CSV processing: {0}")]
    Csv(#[from] csv::Error),

    /// The document is not well-formed XML.
    #[error("Error parsing generic XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document is not valid JSON.
    #[error("Error decoding JSON file: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is not valid UTF-8 text.
    #[error("Error decoding {format} content: {source}")]
    Decode {
        format: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The input is readable but does not have the structure a converter requires
    /// (missing required columns, no `<record>` elements, non-object JSON records, ...).
    #[error("{message}")]
    SchemaMismatch { message: String },

    /// The input is structurally fine but yielded no usable rows. This is the only soft
    /// failure: a [`crate::types::Conversion::Partial`] carries it next to any recovered headers.
    #[error("{message}")]
    NoData { message: String },

    /// The declared extension does not map to a converter.
    #[error("Unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },

    /// No extension could be read from the declared file name.
    #[error("Could not determine file type.")]
    UnknownFormat,

    /// Neither the generic `<record>` dialect nor SpreadsheetML produced rows.
    #[error(
        "XML conversion failed (neither generic nor SpreadsheetML format recognized or contained data): {detail}"
    )]
    XmlUnrecognized { detail: String },

    /// XLSX/ODS input while the `excel` feature is disabled.
    #[error("spreadsheet ingestion not enabled (enable cargo feature 'excel')")]
    ExcelDisabled,

    #[cfg(feature = "export")]
    /// Workbook writer error (feature-gated behind `export`).
    #[error("Error writing XLSX workbook: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

impl ConversionError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn no_data(message: impl Into<String>) -> Self {
        Self::NoData {
            message: message.into(),
        }
    }

    /// `true` for the soft "nothing usable" condition.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}
