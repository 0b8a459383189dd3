use datavis_ingest::ingestion::csv::{convert_csv_from_bytes, convert_csv_from_reader, convert_csv_from_str};
use datavis_ingest::types::{Conversion, Value};
use datavis_ingest::ConversionError;

fn statement_bytes() -> Vec<u8> {
    std::fs::read("tests/fixtures/statement.csv").unwrap()
}

#[test]
fn convert_csv_cleans_amounts_and_skips_blank_rows() {
    let conversion = convert_csv_from_str("Date,Amount\n2024-01-01,$100\n,\n2024-01-02,(50)\n");
    assert!(conversion.is_complete());
    assert_eq!(conversion.headers(), ["Date", "Amount"]);

    let rows = conversion.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Amount"], Value::Number(100.0));
    assert_eq!(rows[1]["Amount"], Value::Number(-50.0));
    assert_eq!(rows[1]["Date"], Value::text("2024-01-02"));
}

#[test]
fn convert_csv_from_fixture_skips_leading_blank_rows() {
    let conversion = convert_csv_from_bytes(&statement_bytes());
    assert_eq!(conversion.headers(), ["Date", "Description", "Amount", "Balance"]);

    let rows = conversion.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["Amount"], Value::Number(4.5));
    assert_eq!(rows[1]["Amount"], Value::Number(1200.0));
    assert_eq!(rows[2]["Amount"], Value::Number(-20.0));
    // Non-amount columns keep their text.
    assert_eq!(rows[1]["Balance"], Value::text("2,195.50"));
    // A failed amount becomes null but the row survives on its other values.
    assert_eq!(rows[3]["Amount"], Value::Null);
    assert_eq!(rows[3]["Date"], Value::text("garbage"));
}

#[test]
fn convert_csv_pads_short_rows_and_ignores_extra_cells() {
    let conversion = convert_csv_from_str("a,b,c\n1\nx,y,z,extra\n");
    let rows = conversion.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["a"], Value::text("1"));
    assert_eq!(rows[0]["b"], Value::Null);
    assert_eq!(rows[0]["c"], Value::Null);
    assert_eq!(rows[1].len(), 3);
}

#[test]
fn convert_csv_drops_columns_without_a_header() {
    let conversion = convert_csv_from_str("Name,,AMOUNT\nrent,ignored,\"$1,234.56\"\n");
    assert_eq!(conversion.headers(), ["Name", "", "AMOUNT"]);

    let row = &conversion.rows()[0];
    assert_eq!(row.len(), 2);
    assert!(!row.contains_key(""));
    assert_eq!(row["AMOUNT"], Value::Number(1234.56));
}

#[test]
fn convert_csv_drops_rows_without_any_truthy_value() {
    let conversion = convert_csv_from_str("Name,Amount\n,abc\n  ,  \nok,0\n");
    let rows = conversion.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Name"], Value::text("ok"));
    assert_eq!(rows[0]["Amount"], Value::Number(0.0));
}

#[test]
fn convert_csv_header_only_is_a_soft_failure_with_headers() {
    match convert_csv_from_str("Date,Amount\n,\n") {
        Conversion::Partial { table, reason } => {
            assert_eq!(table.headers, vec!["Date", "Amount"]);
            assert!(table.rows.is_empty());
            assert!(reason.is_soft());
            assert_eq!(reason.to_string(), "No data rows found in CSV.");
        }
        other => panic!("expected a soft failure, got {other:?}"),
    }
}

#[test]
fn convert_csv_empty_input_is_a_soft_failure() {
    for input in ["", "\n\n", ",,\n , \n"] {
        let result = convert_csv_from_str(input).into_result();
        assert!(result.headers.is_empty());
        assert!(result.rows.is_empty());
        assert_eq!(
            result.error.as_deref(),
            Some("CSV file is empty or contains only empty rows.")
        );
    }
}

#[test]
fn convert_csv_strips_byte_order_mark() {
    let conversion = convert_csv_from_bytes("\u{feff}Date,Amount\n2024-01-01,5\n".as_bytes());
    assert_eq!(conversion.headers(), ["Date", "Amount"]);
}

#[test]
fn convert_csv_invalid_utf8_is_a_hard_failure() {
    let conversion = convert_csv_from_bytes(b"Date,Amount\n\xff\xfe,1\n");
    assert!(matches!(
        conversion.error(),
        Some(ConversionError::Decode { format: "CSV", .. })
    ));

    let result = conversion.into_result();
    assert!(result.headers.is_empty());
    assert!(result.rows.is_empty());
    assert!(result.error.unwrap().starts_with("Error decoding CSV content"));
}

#[test]
fn convert_csv_from_reader_accepts_custom_delimiters() {
    let input = "Date;Amount\n2024-01-01;$7\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b';')
        .from_reader(input.as_bytes());

    let conversion = convert_csv_from_reader(&mut rdr);
    assert_eq!(conversion.rows()[0]["Amount"], Value::Number(7.0));
}
