//! CSV converter.
//!
//! Rules:
//!
//! - The first row with any non-blank cell is the header (headers are trimmed). Blank rows are
//!   skipped everywhere.
//! - Short rows are padded with nulls; columns with an empty header are left out of the row.
//! - Columns named `amount` (case-insensitive) go through [`clean_amount`]; a miss stores null.
//! - Other cells keep their raw text.
//! - A row is kept only if at least one of its values is truthy.

use std::io::Read;

use crate::cleaning::clean_amount;
use crate::error::{ConversionError, ConversionResultOf};
use crate::types::{Conversion, Row, Table, Value};

const EMPTY_INPUT: &str = "CSV file is empty or contains only empty rows.";
const NO_DATA_ROWS: &str = "No data rows found in CSV.";

/// Convert raw CSV bytes (UTF-8, optional BOM).
pub fn convert_csv_from_bytes(bytes: &[u8]) -> Conversion {
    match std::str::from_utf8(bytes) {
        Ok(text) => convert_csv_from_str(text),
        Err(source) => Conversion::Failed(ConversionError::Decode {
            format: "CSV",
            source,
        }),
    }
}

/// Convert CSV text.
pub fn convert_csv_from_str(text: &str) -> Conversion {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rdr = reader_builder().from_reader(text.as_bytes());
    convert_csv_from_reader(&mut rdr)
}

/// Convert CSV data from an existing reader.
///
/// The reader must be built without header handling (`has_headers(false)`) so that leading blank
/// rows can be skipped before the header is chosen; `flexible(true)` is needed for ragged rows.
pub fn convert_csv_from_reader<R: Read>(rdr: &mut csv::Reader<R>) -> Conversion {
    match read_table(rdr) {
        Ok(conversion) => conversion,
        Err(e) => {
            log::warn!("csv conversion failed: {e}");
            Conversion::Failed(e)
        }
    }
}

pub(crate) fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

fn read_table<R: Read>(rdr: &mut csv::Reader<R>) -> ConversionResultOf<Conversion> {
    let mut records = rdr.records();

    let mut header_record = None;
    for result in records.by_ref() {
        let record = result?;
        if !is_blank(&record) {
            header_record = Some(record);
            break;
        }
    }
    let Some(header_record) = header_record else {
        return Ok(Conversion::empty(EMPTY_INPUT));
    };

    let headers: Vec<String> = header_record.iter().map(|h| h.trim().to_owned()).collect();
    log::debug!("csv header has {} columns", headers.len());

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        let row = build_row(&headers, &record);
        if row.values().any(Value::is_truthy) {
            rows.push(row);
        }
    }

    Ok(Conversion::from_table(Table::new(headers, rows), NO_DATA_ROWS))
}

fn build_row(headers: &[String], record: &csv::StringRecord) -> Row {
    let mut row = Row::new();
    for (idx, header) in headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        let raw = record.get(idx).map(Value::from).unwrap_or(Value::Null);
        let value = if header.eq_ignore_ascii_case("amount") {
            clean_amount(&raw).map_or(Value::Null, Value::Number)
        } else {
            raw
        };
        row.insert(header.clone(), value);
    }
    row
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}
