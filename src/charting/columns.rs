//! Header vocabularies and ordered lookup rules shared by the chart processors.
//!
//! Every fallback chain is a plain list of candidate names evaluated in order, so the rules stay
//! inspectable and testable without running a processor.

use crate::cleaning::{clean_amount, clean_date};
use crate::types::{Row, Value};

/// First header equal (case-insensitively) to one of `candidates`, trying candidates in order.
pub fn find_matching_header<'a>(headers: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .find(|h| h.to_lowercase() == candidate.to_lowercase())
            .map(String::as_str)
    })
}

/// Headers whose lower-cased name is a member of `vocabulary`, in header order.
pub fn headers_in_vocabulary(headers: &[String], vocabulary: &[&str]) -> Vec<String> {
    headers
        .iter()
        .filter(|h| vocabulary.contains(&h.to_lowercase().as_str()))
        .cloned()
        .collect()
}

/// Headers whose lower-cased name contains any of `fragments`, in header order.
pub fn headers_containing(headers: &[String], fragments: &[&str]) -> Vec<String> {
    headers
        .iter()
        .filter(|h| {
            let lower = h.to_lowercase();
            fragments.iter().any(|f| lower.contains(f))
        })
        .cloned()
        .collect()
}

/// A label column is date-like when it belongs to the processor's label vocabulary and its name
/// mentions "date".
pub fn is_date_like(column: &str, label_vocabulary: &[&str]) -> bool {
    let lower = column.to_lowercase();
    label_vocabulary.contains(&lower.as_str()) && lower.contains("date")
}

/// An ordered fallback chain: the first rule that yields a header wins.
pub(crate) enum Rule<'r> {
    /// First header matching one of these names (case-insensitive, candidate order).
    Named(&'r [&'r str]),
    /// First entry of a precomputed candidate list.
    FirstOf(&'r [String]),
}

pub(crate) fn resolve(headers: &[String], rules: &[Rule<'_>]) -> Option<String> {
    rules.iter().find_map(|rule| match rule {
        Rule::Named(names) => find_matching_header(headers, names).map(str::to_owned),
        Rule::FirstOf(candidates) => candidates.first().cloned(),
    })
}

/// Explicit selection wins; an empty selection counts as none.
pub(crate) fn select_or_resolve(
    selected: Option<&str>,
    headers: &[String],
    rules: &[Rule<'_>],
) -> Option<String> {
    match selected.filter(|s| !s.is_empty()) {
        Some(s) => Some(s.to_owned()),
        None => resolve(headers, rules),
    }
}

/// What happens to a row's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelPolicy {
    /// Stringify the raw value.
    Verbatim,
    /// Clean as a date; on failure keep the raw value stringified.
    DateOrRaw,
    /// Clean as a date; on failure drop the row.
    DateOrSkip,
}

/// Walk the rows and collect `(label, value)` pairs. Rows whose value does not clean are dropped.
pub(crate) fn extract_points(
    rows: &[Row],
    label_column: &str,
    value_column: &str,
    policy: LabelPolicy,
) -> (Vec<String>, Vec<f64>) {
    let mut labels = Vec::new();
    let mut values = Vec::new();

    for (idx0, row) in rows.iter().enumerate() {
        let raw_label = row.get(label_column).unwrap_or(&Value::Null);
        let label = match policy {
            LabelPolicy::Verbatim => raw_label.to_label(),
            LabelPolicy::DateOrRaw => clean_date(raw_label).unwrap_or_else(|| {
                log::warn!(
                    "row {}: date parsing failed for column '{label_column}', using raw value",
                    idx0 + 1
                );
                raw_label.to_label()
            }),
            LabelPolicy::DateOrSkip => match clean_date(raw_label) {
                Some(date) => date,
                None => {
                    log::warn!(
                        "row {}: skipping, date parsing failed for column '{label_column}' (raw={raw_label:?})",
                        idx0 + 1
                    );
                    continue;
                }
            },
        };

        let Some(value) = row.get(value_column).and_then(clean_amount) else {
            log::debug!("row {}: no numeric value in column '{value_column}'", idx0 + 1);
            continue;
        };
        labels.push(label);
        values.push(value);
    }

    (labels, values)
}

#[cfg(test)]
mod tests {
    use super::{find_matching_header, headers_containing, is_date_like, resolve, Rule};

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matching_follows_candidate_order() {
        let h = headers(&["Payee", "Description", "Balance", "Amount"]);
        assert_eq!(
            find_matching_header(&h, &["description", "transaction type", "payee"]),
            Some("Description")
        );
        assert_eq!(find_matching_header(&h, &["amount", "balance"]), Some("Amount"));
        assert_eq!(find_matching_header(&h, &["ticker"]), None);
    }

    #[test]
    fn matching_is_exact_not_substring() {
        let h = headers(&["Posting Date"]);
        assert_eq!(find_matching_header(&h, &["date"]), None);
    }

    #[test]
    fn resolve_falls_through_rules() {
        let h = headers(&["Memo", "Total"]);
        let numeric = headers(&["Total"]);
        let rules = [Rule::Named(&["amount"]), Rule::FirstOf(&numeric)];
        assert_eq!(resolve(&h, &rules).as_deref(), Some("Total"));
        assert_eq!(resolve(&h, &[Rule::Named(&["amount"])]), None);
    }

    #[test]
    fn substring_vocabulary_and_date_likeness() {
        let h = headers(&["Unit Price", "Closed", "Name"]);
        assert_eq!(headers_containing(&h, &["price", "close"]), headers(&["Unit Price", "Closed"]));
        assert!(is_date_like("DATE", &["date", "ticker"]));
        assert!(!is_date_like("Ticker", &["date", "ticker"]));
        assert!(!is_date_like("Trade Date", &["date", "ticker"]));
    }
}
