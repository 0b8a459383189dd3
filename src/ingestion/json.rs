//! JSON converter.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single JSON object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Headers are the union of object keys in first-seen order. Keys named `amount` go through
//! [`clean_amount`] and keys named `date` through [`clean_date`] (case-insensitive); other scalars
//! pass through, booleans as text and nested values as compact JSON text.

use serde_json::Map;

use crate::cleaning::{clean_amount, clean_date};
use crate::error::{ConversionError, ConversionResultOf};
use crate::types::{Conversion, Row, Table, Value};

type JsonObject = Map<String, serde_json::Value>;

/// Convert raw JSON bytes (UTF-8, optional BOM).
pub fn convert_json_from_bytes(bytes: &[u8]) -> Conversion {
    match std::str::from_utf8(bytes) {
        Ok(text) => convert_json_from_str(text),
        Err(source) => Conversion::Failed(ConversionError::Decode {
            format: "JSON",
            source,
        }),
    }
}

/// Convert JSON text.
pub fn convert_json_from_str(input: &str) -> Conversion {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Conversion::empty("JSON file is empty.");
    }

    match parse_records(trimmed).and_then(|records| build_table(&records)) {
        Ok(table) => Conversion::from_table(table, "No data rows found in JSON."),
        Err(e) => {
            log::warn!("json conversion failed: {e}");
            Conversion::Failed(e)
        }
    }
}

fn parse_records(trimmed: &str) -> ConversionResultOf<Vec<serde_json::Value>> {
    // First try parsing as a single JSON value (array or object).
    let whole_err = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Array(items)) => return Ok(items),
        Ok(v @ serde_json::Value::Object(_)) => return Ok(vec![v]),
        Ok(_) => {
            return Err(ConversionError::schema(
                "JSON must be an object, an array of objects, or NDJSON",
            ));
        }
        Err(e) => e,
    };

    let lines: Vec<(usize, &str)> = trimmed
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(whole_err.into());
    }

    // Fall back to NDJSON.
    lines
        .into_iter()
        .map(|(line_no, line)| {
            serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                ConversionError::schema(format!("invalid NDJSON at line {line_no}: {e}"))
            })
        })
        .collect()
}

fn build_table(records: &[serde_json::Value]) -> ConversionResultOf<Table> {
    let mut objects: Vec<&JsonObject> = Vec::with_capacity(records.len());
    for (idx0, v) in records.iter().enumerate() {
        let obj = v.as_object().ok_or_else(|| {
            ConversionError::schema(format!("record {} is not a JSON object", idx0 + 1))
        })?;
        objects.push(obj);
    }

    let mut headers: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|obj| build_row(&headers, obj))
        .filter(|row| row.values().any(Value::is_truthy))
        .collect();

    Ok(Table::new(headers, rows))
}

fn build_row(headers: &[String], obj: &JsonObject) -> Row {
    let mut row = Row::new();
    for header in headers.iter().filter(|h| !h.is_empty()) {
        let raw = obj.get(header).map_or(Value::Null, json_to_value);
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

fn json_to_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Text(b.to_string()),
        serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
            Value::Text(nested.to_string())
        }
    }
}
