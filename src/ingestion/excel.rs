#![cfg(feature = "excel")]

//! Spreadsheet converters (`.xlsx`/`.xls` and `.ods`), backed by `calamine`.
//!
//! Both converters read the first sheet only and treat its first row as the header.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, open_workbook_from_rs, Data, Ods, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::cleaning::{clean_amount, clean_date};
use crate::error::{ConversionError, ConversionResultOf};
use crate::types::{Conversion, Row, Table, Value, ISO_DATETIME_FORMAT};

/// Header synonyms for the ODS date column, in priority order.
pub const ODS_DATE_HEADERS: [&str; 3] = ["date", "posting date", "transaction date"];
/// Header synonyms for the ODS amount column, in priority order.
pub const ODS_AMOUNT_HEADERS: [&str; 4] = ["amount", "value", "credit", "debit"];

const ODS_MISSING_COLUMNS: &str = "Could not find required 'Date' or 'Amount' columns in the ODS file based on common headers. Please check your ODS file headers.";

/// Convert an XLSX (or legacy XLS) workbook.
///
/// Every cell passes through as-is, except timestamps which become ISO-8601 date-time text.
/// Fully empty data rows are skipped; an empty or header-only first sheet is a soft failure.
pub fn convert_xlsx_from_bytes(bytes: &[u8]) -> Conversion {
    let result = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(ConversionError::from)
        .and_then(first_sheet);

    match result {
        Ok(Some(range)) => xlsx_table(&range),
        Ok(None) => Conversion::empty("XLSX file contains no sheets."),
        Err(e) => {
            log::warn!("xlsx conversion failed: {e}");
            Conversion::Failed(e)
        }
    }
}

/// Convert an ODS workbook into normalized `{Date, Amount}` rows.
///
/// The date and amount columns are resolved through [`ODS_DATE_HEADERS`] and
/// [`ODS_AMOUNT_HEADERS`]; every other column is discarded. A row survives only if both values
/// clean successfully.
pub fn convert_ods_from_bytes(bytes: &[u8]) -> Conversion {
    let result = open_workbook_from_rs::<Ods<_>, _>(Cursor::new(bytes))
        .map_err(|e| ConversionError::from(calamine::Error::from(e)))
        .and_then(first_sheet);

    match result {
        Ok(Some(range)) => ods_table(&range),
        Ok(None) => Conversion::empty("ODS file contains no sheets."),
        Err(e) => {
            log::warn!("ods conversion failed: {e}");
            Conversion::Failed(e)
        }
    }
}

fn first_sheet<'a, W>(mut workbook: W) -> ConversionResultOf<Option<Range<Data>>>
where
    W: Reader<Cursor<&'a [u8]>>,
    calamine::Error: From<W::Error>,
{
    match workbook.worksheet_range_at(0) {
        Some(range) => Ok(Some(range.map_err(calamine::Error::from)?)),
        None => Ok(None),
    }
}

fn xlsx_table(range: &Range<Data>) -> Conversion {
    let mut rows_iter = range.rows();
    let Some(header_cells) = rows_iter.next() else {
        return Conversion::empty("XLSX sheet is empty.");
    };
    let headers: Vec<String> = header_cells.iter().map(cell_to_header_string).collect();

    let mut rows = Vec::new();
    for cells in rows_iter {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let mut row = Row::new();
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = cells.get(idx).map_or(Value::Null, cell_to_value).into_transport();
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }

    log::debug!("xlsx: {} headers, {} rows", headers.len(), rows.len());
    Conversion::from_table(Table::new(headers, rows), "No data rows found in XLSX sheet.")
}

fn ods_table(range: &Range<Data>) -> Conversion {
    let mut rows_iter = range.rows();
    let Some(header_cells) = rows_iter.next() else {
        return Conversion::empty("ODS sheet is empty.");
    };
    let headers: Vec<String> = header_cells
        .iter()
        .map(|c| cell_to_header_string(c).trim().to_owned())
        .collect();

    let (Some(date_idx), Some(amount_idx)) = (
        lookup_header(&headers, &ODS_DATE_HEADERS),
        lookup_header(&headers, &ODS_AMOUNT_HEADERS),
    ) else {
        log::debug!("ods: no date/amount column in {headers:?}");
        return Conversion::Failed(ConversionError::schema(ODS_MISSING_COLUMNS));
    };
    let max_idx = date_idx.max(amount_idx);

    let mut rows = Vec::new();
    for (idx0, cells) in rows_iter.enumerate() {
        // 1-based sheet row, header included.
        let sheet_row = idx0 + 2;
        let values: Vec<Value> = cells.iter().map(cell_to_value).collect();
        if values.len() <= max_idx || !values.iter().any(Value::is_truthy) {
            log::debug!("ods: skipping empty or short row {sheet_row}");
            continue;
        }

        match (clean_date(&values[date_idx]), clean_amount(&values[amount_idx])) {
            (Some(date), Some(amount)) => {
                let mut row = Row::new();
                row.insert("Date".to_owned(), Value::Text(date));
                row.insert("Amount".to_owned(), Value::Number(amount));
                rows.push(row);
            }
            _ => log::debug!("ods: skipping row {sheet_row}, date or amount did not clean"),
        }
    }

    let headers = vec!["Date".to_owned(), "Amount".to_owned()];
    Conversion::from_table(
        Table::new(headers, rows),
        "No valid Date/Amount rows found in the ODS file.",
    )
}

/// Find the first synonym present in `headers` (case-insensitive). Among duplicate headers, the
/// last one wins.
fn lookup_header(headers: &[String], synonyms: &[&str]) -> Option<usize> {
    synonyms.iter().find_map(|wanted| {
        headers
            .iter()
            .rposition(|h| !h.is_empty() && h.to_lowercase() == *wanted)
    })
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format(ISO_DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| dt.to_string()),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::String(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Bool(b) => Value::Text(b.to_string()),
        Data::Error(e) => Value::Text(e.to_string()),
        Data::DateTime(dt) if dt.is_duration() => Value::Number(dt.as_f64()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => Value::DateTime(d),
            None => {
                log::debug!("unrepresentable spreadsheet timestamp {dt}");
                Value::Text(dt.to_string())
            }
        },
        Data::DateTimeIso(s) => parse_iso_cell(s),
    }
}

fn parse_iso_cell(s: &str) -> Value {
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Value::DateTime(dt);
    }
    match s.parse::<NaiveDate>() {
        Ok(d) => Value::DateTime(d.and_time(chrono::NaiveTime::MIN)),
        Err(_) => Value::Text(s.to_owned()),
    }
}
