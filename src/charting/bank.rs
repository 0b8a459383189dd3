//! Bank ledger processor.
//!
//! Date labels that fail to parse fall back to the raw value, stringified; the row is kept.

use super::columns::{
    extract_points, find_matching_header, headers_in_vocabulary, is_date_like, select_or_resolve, LabelPolicy, Rule,
};
use super::ChartSeries;
use crate::types::Row;

/// Y-axis candidates.
pub const NUMERIC_VOCABULARY: [&str; 4] = ["amount", "balance", "credit", "debit"];
/// X-axis candidates.
pub const LABEL_VOCABULARY: [&str; 4] = ["date", "transaction type", "description", "payee"];

const TYPE_NAME: &str = "bank";

/// Project bank rows onto a label/value series.
pub fn process(rows: &[Row], headers: &[String], label: Option<&str>, value: Option<&str>) -> ChartSeries {
    let numeric_headers = headers_in_vocabulary(headers, &NUMERIC_VOCABULARY);
    let mut label_headers = headers_in_vocabulary(headers, &LABEL_VOCABULARY);
    if let Some(date) = find_matching_header(headers, &["date"]) {
        label_headers.retain(|h| h != date);
        label_headers.insert(0, date.to_owned());
    }

    if rows.is_empty() || headers.is_empty() {
        return ChartSeries::rejected(
            numeric_headers,
            label_headers,
            "No data or headers available for bank charting.",
        );
    }

    let label_column = select_or_resolve(
        label,
        headers,
        &[
            Rule::Named(&["date"]),
            Rule::Named(&["description", "transaction type", "payee"]),
            Rule::FirstOf(&label_headers),
        ],
    );
    let value_column = select_or_resolve(
        value,
        headers,
        &[
            Rule::Named(&["amount", "balance", "credit", "debit"]),
            Rule::FirstOf(&numeric_headers),
        ],
    );
    let (Some(label_column), Some(value_column)) = (label_column, value_column) else {
        return ChartSeries::rejected(
            numeric_headers,
            label_headers,
            "Could not identify suitable columns for bank charting (Label/Amount), even with fallback.",
        );
    };

    if let Err(message) = super::check_columns(headers, &label_column, &value_column, TYPE_NAME) {
        return ChartSeries::rejected(numeric_headers, label_headers, message);
    }

    let policy = if is_date_like(&label_column, &LABEL_VOCABULARY) {
        LabelPolicy::DateOrRaw
    } else {
        LabelPolicy::Verbatim
    };
    let (labels, values) = extract_points(rows, &label_column, &value_column, policy);

    ChartSeries::assemble(
        labels,
        values,
        label_column,
        value_column,
        numeric_headers,
        label_headers,
        TYPE_NAME,
    )
}
