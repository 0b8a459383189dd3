//! Generic `<record>` XML converter.
//!
//! Expected shape (element names other than `record` are free-form):
//!
//! ```xml
//! <export>
//!   <record><date>2024-01-01</date><amount>$100</amount><memo>rent</memo></record>
//!   <record><date>2024-01-02</date><amount>(50)</amount></record>
//! </export>
//! ```
//!
//! Headers are the child element names of the first record. Every record is then looked up by
//! those names (direct children only, missing elements are null). Records with different shapes
//! are tolerated rather than rejected.

use roxmltree::{Document, Node, ParsingOptions};

use crate::cleaning::{clean_amount, clean_date};
use crate::error::{ConversionError, ConversionResultOf};
use crate::types::{Conversion, Row, Table, Value};

const RECORD_TAG: &str = "record";

/// Convert a generic `<record>` XML document.
pub fn convert_xml_from_bytes(bytes: &[u8]) -> Conversion {
    match decode_xml(bytes).and_then(convert_document) {
        Ok(conversion) => conversion,
        Err(e) => {
            log::debug!("generic xml conversion failed: {e}");
            Conversion::Failed(e)
        }
    }
}

/// Decode an XML payload as UTF-8, dropping a leading byte order mark.
pub(crate) fn decode_xml(bytes: &[u8]) -> ConversionResultOf<&str> {
    let text = std::str::from_utf8(bytes).map_err(|source| ConversionError::Decode {
        format: "XML",
        source,
    })?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Parse XML text, allowing a DTD.
pub(crate) fn parse_document(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options)
}

fn convert_document(text: &str) -> ConversionResultOf<Conversion> {
    let doc = parse_document(text)?;

    let records: Vec<Node<'_, '_>> = doc
        .root_element()
        .descendants()
        .skip(1)
        .filter(|n| n.is_element() && n.tag_name().namespace().is_none())
        .filter(|n| n.tag_name().name() == RECORD_TAG)
        .collect();
    log::debug!("generic xml: found {} <record> elements", records.len());

    let Some(first) = records.first() else {
        return Err(ConversionError::schema("No <record> elements found in the XML."));
    };

    let headers: Vec<String> = first
        .children()
        .filter(Node::is_element)
        .map(|n| qualified_name(&n))
        .collect();

    let rows = records
        .iter()
        .map(|record| build_row(&headers, record))
        .filter(|row| row.values().any(Value::is_truthy))
        .collect();

    Ok(Conversion::from_table(
        Table::new(headers, rows),
        "No data rows extracted from <record> elements.",
    ))
}

fn build_row(headers: &[String], record: &Node<'_, '_>) -> Row {
    let mut row = Row::new();
    for header in headers {
        let raw: Value = record
            .children()
            .find(|c| c.is_element() && qualified_name(c) == *header)
            .map(|el| element_text(&el))
            .into();

        let value = if header.eq_ignore_ascii_case("amount") {
            clean_amount(&raw).map_or(Value::Null, Value::Number)
        } else if header.eq_ignore_ascii_case("date") {
            clean_date(&raw).map_or(Value::Null, Value::Text)
        } else {
            raw
        };
        row.insert(header.clone(), value);
    }
    row
}

/// Element name as a header: the local name, or `{namespace}name` for namespaced elements.
fn qualified_name(node: &Node<'_, '_>) -> String {
    let tag = node.tag_name();
    match tag.namespace() {
        Some(ns) => format!("{{{ns}}}{}", tag.name()),
        None => tag.name().to_owned(),
    }
}

/// All descendant text of `node`, concatenated and trimmed.
pub(crate) fn element_text(node: &Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_owned()
}
