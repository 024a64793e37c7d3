// src/transport/quoting.rs
//! CSV-style quoting for the two-column transport format

use std::borrow::Cow;

use crate::error::{CoreError, Result};

/// Quote iff the field contains a comma, a quote or a line break.
pub fn quote_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Split one row into fields, tracking quote state character by character.
///
/// `""` inside quotes is a literal quote, a lone `"` toggles quoted mode and
/// a comma separates fields only outside quotes. Unquoted fields are trimmed;
/// whitespace between a closing quote and the next comma is dropped.
pub fn split_fields(row: &str, line: usize) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = FieldBuf::default();
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.text.push('"');
                chars.next();
            }
            '"' if in_quotes => {
                in_quotes = false;
                field.closed_at = Some(field.text.len());
            }
            '"' => {
                if !field.quoted && field.text.trim().is_empty() {
                    field.text.clear();
                }
                in_quotes = true;
                field.quoted = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).finish()),
            other => field.text.push(other),
        }
    }

    if in_quotes {
        return Err(CoreError::MalformedRow {
            line,
            reason: "unterminated quoted field".into(),
        });
    }
    fields.push(field.finish());
    Ok(fields)
}

#[derive(Default)]
struct FieldBuf {
    text: String,
    quoted: bool,
    closed_at: Option<usize>,
}

impl FieldBuf {
    fn finish(mut self) -> String {
        if !self.quoted {
            return self.text.trim().to_string();
        }
        if let Some(end) = self.closed_at {
            if self.text[end..].trim().is_empty() {
                self.text.truncate(end);
            }
        }
        self.text
    }
}

/// Split transport text into `(line_number, record)` pairs.
///
/// CR, LF and CRLF end a record only outside quotes, so a quoted field may
/// span lines; the line number is the one the record starts on.
pub(crate) fn split_records(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut records = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let mut start_line = 1;
    let mut line = 1;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b'\r' | b'\n' => {
                let width = if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                    2
                } else {
                    1
                };
                line += 1;
                if !in_quotes {
                    records.push((start_line, &text[start..i]));
                    start = i + width;
                    start_line = line;
                }
                i += width;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    if start < text.len() {
        records.push((start_line, &text[start..]));
    }
    records
}
