//! SpreadsheetML (Office 2003 XML workbook) reinterpretation.
//!
//! Bank exports in this dialect carry a few banner rows before the real header and summary rows
//! after the data. The header is found by keyword voting over the first rows, replaced by the
//! canonical header list, and the dated rows after it are re-emitted as CSV text so they go
//! through the regular CSV converter.

use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::Node;

use super::xml::{decode_xml, element_text, parse_document};

/// Namespace of SpreadsheetML elements and attributes.
pub const SPREADSHEETML_NAMESPACE: &str = "urn:schemas-microsoft-com:office:spreadsheet";

/// Canonical header emitted for every recognized document.
pub const SPREADSHEETML_HEADERS: [&str; 5] =
    ["Posting date", "Description", "Type", "Amount", "Reconcile"];

/// Only this many leading rows are considered when looking for the header.
pub const HEADER_SEARCH_ROWS: usize = 10;

/// Minimum number of canonical keywords a row must contain to be the header.
pub const HEADER_MATCH_THRESHOLD: usize = 3;

static HEADER_KEYWORDS: Lazy<[Regex; 5]> = Lazy::new(|| {
    SPREADSHEETML_HEADERS
        .map(|kw| Regex::new(&format!(r"\b{}\b", regex::escape(&kw.to_lowercase()))).unwrap())
});

static DATA_ROW_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{4}-\d{2}-\d{2}T|\d{2}/\d{2}/\d{4})").unwrap());

/// Reinterpret a SpreadsheetML document as CSV text.
///
/// Returns `None` when the payload is not SpreadsheetML (no worksheet/table, unparseable XML),
/// when no header row is found in the first [`HEADER_SEARCH_ROWS`] rows, or when no dated data
/// row follows the header. `None` is not an error: the caller may try another interpretation.
pub fn spreadsheetml_to_csv(bytes: &[u8]) -> Option<String> {
    let text = decode_xml(bytes).ok()?;
    let doc = match parse_document(text) {
        Ok(doc) => doc,
        Err(e) => {
            log::debug!("spreadsheetml: not well-formed xml: {e}");
            return None;
        }
    };

    let worksheet = find_descendant(doc.root_element(), "Worksheet")?;
    let table = find_descendant(worksheet, "Table")?;
    let rows: Vec<Node<'_, '_>> = table
        .descendants()
        .skip(1)
        .filter(|n| n.has_tag_name((SPREADSHEETML_NAMESPACE, "Row")))
        .collect();
    log::debug!("spreadsheetml: found {} rows", rows.len());

    let mut header_idx = None;
    for (idx, row) in rows.iter().take(HEADER_SEARCH_ROWS).enumerate() {
        if is_header_row(&row_values(row)?) {
            header_idx = Some(idx);
            break;
        }
    }
    let Some(header_idx) = header_idx else {
        log::debug!("spreadsheetml: no header row in the first {HEADER_SEARCH_ROWS} rows");
        return None;
    };

    let mut data_rows = Vec::new();
    for row in &rows[header_idx + 1..] {
        let mut values = row_values(row)?;
        if is_data_row(&values) {
            if values.len() < SPREADSHEETML_HEADERS.len() {
                values.resize(SPREADSHEETML_HEADERS.len(), String::new());
            }
            data_rows.push(values);
        }
    }
    if data_rows.is_empty() {
        log::debug!("spreadsheetml: no dated rows after header row {header_idx}");
        return None;
    }

    write_csv(&data_rows)
}

/// Number of canonical header keywords found as whole words in a row.
pub fn header_keyword_hits(values: &[String]) -> usize {
    let joined = values
        .iter()
        .map(|v| v.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    HEADER_KEYWORDS.iter().filter(|re| re.is_match(&joined)).count()
}

/// `true` when a row votes for at least [`HEADER_MATCH_THRESHOLD`] keywords.
pub fn is_header_row(values: &[String]) -> bool {
    header_keyword_hits(values) >= HEADER_MATCH_THRESHOLD
}

/// `true` when the first cell starts like an ISO timestamp or an `MM/DD/YYYY` date.
pub fn is_data_row(values: &[String]) -> bool {
    values
        .first()
        .is_some_and(|first| !first.is_empty() && DATA_ROW_DATE.is_match(first))
}

fn find_descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.has_tag_name((SPREADSHEETML_NAMESPACE, name)))
}

/// Rebuild a row's cell texts, honouring sparse `ss:Index` (1-based) attributes. Skipped columns
/// become empty strings. `None` if an index attribute is not an integer.
fn row_values(row: &Node<'_, '_>) -> Option<Vec<String>> {
    let mut values = Vec::new();
    let mut next_col: i64 = 1;

    for cell in row
        .descendants()
        .skip(1)
        .filter(|n| n.has_tag_name((SPREADSHEETML_NAMESPACE, "Cell")))
    {
        if let Some(raw) = cell
            .attribute((SPREADSHEETML_NAMESPACE, "Index"))
            .filter(|s| !s.is_empty())
        {
            let col: i64 = match raw.trim().parse() {
                Ok(col) => col,
                Err(_) => {
                    log::debug!("spreadsheetml: invalid ss:Index {raw:?}");
                    return None;
                }
            };
            while next_col < col {
                values.push(String::new());
                next_col += 1;
            }
            next_col = col;
        }

        let value = cell
            .descendants()
            .skip(1)
            .find(|n| n.has_tag_name((SPREADSHEETML_NAMESPACE, "Data")))
            .map(|data| element_text(&data))
            .unwrap_or_default();
        values.push(value);
        next_col += 1;
    }

    Some(values)
}

fn write_csv(data_rows: &[Vec<String>]) -> Option<String> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    wtr.write_record(SPREADSHEETML_HEADERS).ok()?;
    for row in data_rows {
        wtr.write_record(row).ok()?;
    }
    let bytes = wtr.into_inner().ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::{header_keyword_hits, is_data_row, is_header_row};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn header_vote_counts_whole_words_only() {
        assert_eq!(
            header_keyword_hits(&row(&["Posting Date", "Description", "Amount"])),
            3
        );
        // "types" and "amounts" are not whole-word matches.
        assert_eq!(header_keyword_hits(&row(&["Types", "Amounts", "Reconciled"])), 0);
        assert!(!is_header_row(&row(&["Account", "Type", "Amount"])));
    }

    #[test]
    fn every_canonical_keyword_votes() {
        assert_eq!(
            header_keyword_hits(&row(&["Posting date", "Description", "Type", "Amount", "Reconcile"])),
            5
        );
    }

    #[test]
    fn keywords_may_span_adjacent_cells() {
        assert!(is_header_row(&row(&["Posting", "date", "Type", "Reconcile"])));
    }

    #[test]
    fn data_rows_start_with_a_date() {
        assert!(is_data_row(&row(&["2024-01-15T00:00:00.000", "x"])));
        assert!(is_data_row(&row(&["01/15/2024"])));
        assert!(!is_data_row(&row(&["2024-01-15"])));
        assert!(!is_data_row(&row(&["Total", "2024-01-15T00:00:00"])));
        assert!(!is_data_row(&row(&[])));
    }
}
