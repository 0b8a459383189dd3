#![cfg(feature = "export")]

//! Write a converted [`Table`] back out as an XLSX workbook.
//!
//! The workbook holds a single sheet named `Sheet1`: the headers in row 0, then one row per
//! record in table order. Numbers are written as numbers, text as strings and nulls are left
//! blank. Only bytes are produced; storing them is up to the caller.

use rust_xlsxwriter::{ColNum, RowNum, Workbook, Worksheet, XlsxError};

use crate::error::ConversionResultOf;
use crate::types::{Table, Value, ISO_DATETIME_FORMAT};

/// Name of the only worksheet in exported workbooks.
pub const SHEET_NAME: &str = "Sheet1";

/// Render `table` as XLSX bytes.
///
/// ```
/// use datavis_ingest::export::table_to_xlsx;
/// use datavis_ingest::ingestion::{ingest_from_bytes, IngestionOptions};
///
/// let conversion = ingest_from_bytes(b"Date,Amount\n2024-01-01,$5\n", "in.csv", &IngestionOptions::default());
/// let bytes = table_to_xlsx(conversion.table().unwrap()).unwrap();
/// assert!(bytes.starts_with(b"PK"));
/// ```
pub fn table_to_xlsx(table: &Table) -> ConversionResultOf<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (idx, header) in table.headers.iter().enumerate() {
        sheet.write_string(0, col_num(idx)?, header)?;
    }

    for (idx0, row) in table.rows.iter().enumerate() {
        let row_num = row_num(idx0 + 1)?;
        for (idx, header) in table.headers.iter().enumerate() {
            if let Some(value) = row.get(header) {
                write_value(sheet, row_num, col_num(idx)?, value)?;
            }
        }
    }

    log::debug!(
        "exported {} rows x {} columns to xlsx",
        table.rows.len(),
        table.headers.len()
    );
    Ok(workbook.save_to_buffer()?)
}

fn write_value(sheet: &mut Worksheet, row: RowNum, col: ColNum, value: &Value) -> Result<(), XlsxError> {
    match value {
        Value::Null => {}
        Value::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
        Value::Text(s) => {
            sheet.write_string(row, col, s)?;
        }
        Value::DateTime(dt) => {
            sheet.write_string(row, col, dt.format(ISO_DATETIME_FORMAT).to_string())?;
        }
    }
    Ok(())
}

fn col_num(idx: usize) -> Result<ColNum, XlsxError> {
    ColNum::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

fn row_num(idx: usize) -> Result<RowNum, XlsxError> {
    RowNum::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}
