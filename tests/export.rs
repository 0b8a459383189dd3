#![cfg(all(feature = "excel", feature = "export"))]

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader};
use datavis_ingest::export::{table_to_xlsx, SHEET_NAME};
use datavis_ingest::ingestion::excel::convert_xlsx_from_bytes;
use datavis_ingest::ingestion::{ingest_from_bytes, IngestionOptions};
use datavis_ingest::types::{Row, Table, Value};

#[test]
fn exported_workbook_has_a_single_sheet1() {
    let table = Table::new(vec!["a".to_owned()], vec![]);
    let bytes = table_to_xlsx(&table).unwrap();

    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_owned()]);
}

#[test]
fn converted_statement_exports_and_reads_back() {
    let bytes = std::fs::read("tests/fixtures/statement.csv").unwrap();
    let conversion = ingest_from_bytes(&bytes, "statement.csv", &IngestionOptions::default());
    let table = conversion.table().unwrap();

    let exported = table_to_xlsx(table).unwrap();
    let reread = convert_xlsx_from_bytes(&exported);

    assert_eq!(reread.headers(), table.headers.as_slice());
    let rows = reread.rows();
    assert_eq!(rows.len(), 4);
    // Numbers stay numeric, text stays text, nulls come back blank.
    assert_eq!(rows[1]["Amount"], Value::Number(1200.0));
    assert_eq!(rows[1]["Balance"], Value::text("2,195.50"));
    assert_eq!(rows[3]["Amount"], Value::Null);
    assert_eq!(rows[0]["Date"], Value::text("01/15/2024"));
}

#[test]
fn headers_without_values_leave_blank_cells() {
    let mut first = Row::new();
    first.insert("Label".to_owned(), Value::text("x"));
    let mut second = Row::new();
    second.insert("Label".to_owned(), Value::text("y"));
    second.insert("Value".to_owned(), Value::Number(2.0));
    let table = Table::new(vec!["Label".to_owned(), "Value".to_owned()], vec![first, second]);

    let reread = convert_xlsx_from_bytes(&table_to_xlsx(&table).unwrap());
    let rows = reread.rows();
    assert_eq!(rows[0]["Value"], Value::Null);
    assert_eq!(rows[1]["Value"], Value::Number(2.0));
}
