//! Raw record parsing for the catalog's flat data sources.
//!
//! The catalog ships as delimited text (CSV) or JSON arrays depending on the
//! deployment, and the column spelling varies between exports (`Model ID`,
//! `model_id`, `modelID`). This module turns either format into an ordered
//! sequence of [`Record`]s keyed by canonical field names so the rest of the
//! pipeline never sees spelling variance.
//!
//! No validation happens here: short rows are padded, odd rows pass through
//! structurally intact, and entity-level invariants are enforced when the
//! catalog is built.

use std::collections::HashMap;

use crate::normalize::norm_key;

/// One parsed row: canonical field key → trimmed cell value.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Fetch a field by canonical key; absent fields read as empty.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    fn insert(&mut self, key: String, value: String) {
        self.fields.insert(key, value);
    }

    fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.is_empty())
    }
}

/// Sniff the format and parse. JSON documents start with `[` or `{` once the
/// BOM and leading whitespace are skipped; everything else is delimited text.
pub fn parse_auto(text: &str) -> Vec<Record> {
    let body = text.trim_start_matches('\u{feff}').trim_start();
    match body.chars().next() {
        Some('[') | Some('{') => parse_json(text),
        _ => parse_delimited(text),
    }
}

/// Parse comma-delimited text into records.
///
/// The first row is the header and defines canonical keys. Quoted cells may
/// contain commas, line breaks, and doubled quotes for a literal quote. Both
/// `\n` and `\r\n` endings are accepted, a leading byte-order-mark is
/// stripped, and fully blank rows are discarded. Short rows are padded with
/// empty strings; cells beyond the header are dropped.
///
/// Empty input yields an empty sequence, never an error.
pub fn parse_delimited(text: &str) -> Vec<Record> {
    let rows = split_rows(text.trim_start_matches('\u{feff}'));
    let mut iter = rows.into_iter();

    let header: Vec<String> = match iter.next() {
        Some(cells) => cells.iter().map(|c| norm_key(c)).collect(),
        None => return Vec::new(),
    };

    let mut records = Vec::new();
    for cells in iter {
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let mut record = Record::default();
        for (i, key) in header.iter().enumerate() {
            if key.is_empty() {
                continue;
            }
            let value = cells.get(i).map(|c| c.trim().to_string()).unwrap_or_default();
            record.insert(key.clone(), value);
        }
        records.push(record);
    }
    records
}

/// Split raw text into rows of unquoted cell strings.
fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();
    let mut saw_any = false;

    while let Some(c) = chars.next() {
        saw_any = true;
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => {
                row.push(std::mem::take(&mut cell));
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
            '\n' => {
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
            _ => cell.push(c),
        }
    }

    if saw_any && (!cell.is_empty() || !row.is_empty()) {
        row.push(cell);
        rows.push(row);
    }

    // Trailing newline produces a phantom single-empty-cell row.
    while rows
        .last()
        .map(|r| r.iter().all(|c| c.trim().is_empty()))
        .unwrap_or(false)
    {
        rows.pop();
    }
    rows
}

/// Parse a JSON document into records.
///
/// Accepts a top-level array of flat objects, or an object wrapping such an
/// array under any key. Object keys are canonicalized exactly like CSV
/// headers; scalar values are stringified (`null` becomes empty).
pub fn parse_json(text: &str) -> Vec<Record> {
    let body = text.trim_start_matches('\u{feff}');
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                serde_json::Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let mut records = Vec::new();
    for item in items {
        let serde_json::Value::Object(map) = item else {
            continue;
        };
        let mut record = Record::default();
        for (key, v) in map {
            let canonical = norm_key(&key);
            if canonical.is_empty() {
                continue;
            }
            let text = match v {
                serde_json::Value::String(s) => s.trim().to_string(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            record.insert(canonical, text);
        }
        if !record.is_blank() {
            records.push(record);
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_spelling_variants_collide() {
        for header in ["Model ID,Brand", "model_id,brand", "modelid,BRAND"] {
            let text = format!("{header}\nM1,Acme");
            let records = parse_delimited(&text);
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].get("modelid"), "M1");
            assert_eq!(records[0].get("brand"), "Acme");
        }
    }

    #[test]
    fn test_quoted_separator_and_newline() {
        let text = "id,name\nP1,\"bolt, hex\"\nP2,\"two\nlines\"";
        let records = parse_delimited(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("name"), "bolt, hex");
        assert_eq!(records[1].get("name"), "two\nlines");
    }

    #[test]
    fn test_doubled_quote_escape() {
        let text = "id,name\nP1,\"3\"\" bolt\"";
        let records = parse_delimited(text);
        assert_eq!(records[0].get("name"), "3\" bolt");
    }

    #[test]
    fn test_crlf_and_bom() {
        let text = "\u{feff}id,name\r\nP1,washer\r\nP2,screw\r\n";
        let records = parse_delimited(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("id"), "P1");
        assert_eq!(records[1].get("name"), "screw");
    }

    #[test]
    fn test_short_rows_pad_empty() {
        let text = "id,name,price\nP1,washer";
        let records = parse_delimited(text);
        assert_eq!(records[0].get("price"), "");
    }

    #[test]
    fn test_trailing_blank_rows_discarded() {
        let text = "id,name\nP1,washer\n,\n\n";
        let records = parse_delimited(text);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        assert!(parse_delimited("").is_empty());
        assert!(parse_delimited("\u{feff}").is_empty());
    }

    #[test]
    fn test_json_array() {
        let text = r#"[{"Part ID": "P1", "price": 4.5}, {"part_id": "P2", "name": null}]"#;
        let records = parse_json(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("partid"), "P1");
        assert_eq!(records[0].get("price"), "4.5");
        assert_eq!(records[1].get("partid"), "P2");
        assert_eq!(records[1].get("name"), "");
    }

    #[test]
    fn test_json_wrapped_array() {
        let text = r#"{"parts": [{"id": "P1"}]}"#;
        let records = parse_json(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("id"), "P1");
    }

    #[test]
    fn test_auto_sniff() {
        assert_eq!(parse_auto("id\nX").len(), 1);
        assert_eq!(parse_auto(" [{\"id\": \"X\"}]").len(), 1);
        assert_eq!(parse_auto("\u{feff}[{\"id\": \"X\"}]").len(), 1);
    }
}
