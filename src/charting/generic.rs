//! Fallback processor for tables that are neither stock nor bank shaped.

use super::columns::{extract_points, headers_containing, select_or_resolve, LabelPolicy, Rule};
use super::ChartSeries;
use crate::types::Row;

/// A header is numeric when its lower-cased name contains any of these fragments.
pub const NUMERIC_FRAGMENTS: [&str; 11] = [
    "amount", "value", "price", "volume", "count", "score", "change", "open", "high", "low", "close",
];

const TYPE_NAME: &str = "generic";

/// Project arbitrary rows onto a label/value series. Labels are never date-cleaned.
pub fn process(rows: &[Row], headers: &[String], label: Option<&str>, value: Option<&str>) -> ChartSeries {
    let numeric_headers = headers_containing(headers, &NUMERIC_FRAGMENTS);
    let label_headers = headers.to_vec();

    if rows.is_empty() || headers.is_empty() {
        return ChartSeries::rejected(
            numeric_headers,
            label_headers,
            "No data or headers available for charting.",
        );
    }

    let label_column = select_or_resolve(label, headers, &[Rule::FirstOf(&label_headers)]);
    let value_column = select_or_resolve(value, headers, &[Rule::FirstOf(&numeric_headers)]);
    let (Some(label_column), Some(value_column)) = (label_column, value_column) else {
        return ChartSeries::rejected(
            numeric_headers,
            label_headers,
            "Could not identify suitable columns for charting (Label/Amount) for generic type, even with fallback.",
        );
    };

    if let Err(message) = super::check_columns(headers, &label_column, &value_column, TYPE_NAME) {
        return ChartSeries::rejected(numeric_headers, label_headers, message);
    }

    let (labels, values) = extract_points(rows, &label_column, &value_column, LabelPolicy::Verbatim);

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
