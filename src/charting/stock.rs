//! Stock series processor.
//!
//! Rows whose date label does not parse are dropped.

use super::columns::{extract_points, headers_in_vocabulary, is_date_like, select_or_resolve, LabelPolicy, Rule};
use super::ChartSeries;
use crate::types::Row;

/// Y-axis candidates.
pub const NUMERIC_VOCABULARY: [&str; 7] = ["open", "high", "low", "close", "volume", "adjusted", "return"];
/// Label names that receive date treatment; every header is offered as an X-axis candidate.
pub const LABEL_VOCABULARY: [&str; 3] = ["date", "ticker", "name"];

const TYPE_NAME: &str = "stock";

/// Project stock rows onto a label/value series.
pub fn process(rows: &[Row], headers: &[String], label: Option<&str>, value: Option<&str>) -> ChartSeries {
    let numeric_headers = headers_in_vocabulary(headers, &NUMERIC_VOCABULARY);
    let label_headers = headers.to_vec();

    if rows.is_empty() || headers.is_empty() {
        return ChartSeries::rejected(
            numeric_headers,
            label_headers,
            "No data or headers available for stock charting.",
        );
    }

    let label_column = select_or_resolve(
        label,
        headers,
        &[
            Rule::Named(&["date"]),
            Rule::Named(&["ticker", "name"]),
            Rule::FirstOf(&label_headers),
        ],
    );
    let value_column = select_or_resolve(
        value,
        headers,
        &[
            Rule::Named(&["adjusted", "close", "open", "high", "low", "volume"]),
            Rule::FirstOf(&numeric_headers),
        ],
    );
    let (Some(label_column), Some(value_column)) = (label_column, value_column) else {
        return ChartSeries::rejected(
            numeric_headers,
            label_headers,
            "Could not identify suitable columns for stock charting (Label/Amount), even with fallback.",
        );
    };

    if let Err(message) = super::check_columns(headers, &label_column, &value_column, TYPE_NAME) {
        return ChartSeries::rejected(numeric_headers, label_headers, message);
    }

    let policy = if is_date_like(&label_column, &LABEL_VOCABULARY) {
        LabelPolicy::DateOrSkip
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
