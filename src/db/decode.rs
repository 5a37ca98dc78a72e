//! Binary-to-text cell decoding.
//!
//! Strings on the analytics replicas are stored as BINARY/VARBINARY rather
//! than CHAR/VARCHAR, so text comes back as raw bytes and needs to be
//! converted before results are usable.

use crate::db::{Row, Value};

/// Attempts to decode a single cell value as UTF-8 text.
///
/// `Bytes` that decode cleanly become `String`; everything else (numbers,
/// already-decoded strings, bytes that are not valid UTF-8) is returned
/// unchanged.
pub fn try_decode(value: Value) -> Value {
    match value {
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Value::String(text),
            Err(err) => Value::Bytes(err.into_bytes()),
        },
        other => other,
    }
}

/// Applies [`try_decode`] to every cell of a row.
pub fn decode_row(row: Row) -> Row {
    row.into_iter().map(try_decode).collect()
}

/// Applies [`try_decode`] to every cell of every row.
///
/// Row and column structure is never altered.
pub fn decode_rows(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter().map(decode_row).collect()
}
