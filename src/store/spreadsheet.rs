// SPDX-License-Identifier: PMPL-1.0-or-later

//! Consolidated review spreadsheet (CSV).
//!
//! Header row is [`KEY_HEADER`] followed by one column per language display
//! name. Absent values are written as empty cells and read back as absent.

use super::{decode_text, write_atomic, StoreError};
use crate::i18n::Lang;
use crate::table::ConsolidatedTable;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Header of the key column.
pub const KEY_HEADER: &str = "Clave";

fn malformed(path: &Path, message: impl Into<String>) -> StoreError {
    StoreError::MalformedDocument {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Render the table as CSV text.
pub fn to_csv(table: &ConsolidatedTable) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![KEY_HEADER];
    header.extend(table.languages().iter().map(|lang| lang.display_name()));
    writer.write_record(&header)?;

    for (key, row) in table.rows() {
        let mut record = Vec::with_capacity(table.languages().len() + 1);
        record.push(key);
        for lang in table.languages() {
            record.push(row.get(lang).map(String::as_str).unwrap_or(""));
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Write the consolidated table to `path` atomically.
pub fn save_consolidated_file(table: &ConsolidatedTable, path: &Path) -> Result<(), StoreError> {
    let bytes = to_csv(table).map_err(|e| malformed(path, e.to_string()))?;
    write_atomic(path, &bytes)?;
    info!(rows = table.len(), path = %path.display(), "consolidated table saved");
    Ok(())
}

/// Parse CSV text produced by [`to_csv`] (or edited by a reviewer).
pub fn from_csv(content: &str, base: Lang, origin: &Path) -> Result<ConsolidatedTable, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| malformed(origin, e.to_string()))?
        .clone();
    let mut columns = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        if index == 0 {
            if !header.trim().eq_ignore_ascii_case(KEY_HEADER) {
                return Err(malformed(
                    origin,
                    format!("first column must be '{}', found '{}'", KEY_HEADER, header),
                ));
            }
            continue;
        }
        let lang = Lang::parse(header)
            .ok_or_else(|| malformed(origin, format!("unknown language column '{}'", header)))?;
        if columns.contains(&lang) {
            return Err(malformed(origin, format!("duplicate language column '{}'", header)));
        }
        columns.push(lang);
    }
    if !columns.contains(&base) {
        return Err(malformed(
            origin,
            format!("base language column '{}' is missing", base.display_name()),
        ));
    }

    let mut table = ConsolidatedTable::new(base, &columns);
    for record in reader.records() {
        let record = record.map_err(|e| malformed(origin, e.to_string()))?;
        let key = match record.get(0).map(str::trim) {
            Some(key) if !key.is_empty() => key,
            _ => continue,
        };
        if table.contains_key(key) {
            return Err(malformed(origin, format!("duplicate key '{}'", key)));
        }
        let row = table.insert_row(key);
        for (lang, value) in columns.iter().zip(record.iter().skip(1)) {
            if !value.is_empty() {
                row.insert(*lang, value.to_string());
            }
        }
    }
    debug!(rows = table.len(), path = %origin.display(), "consolidated table parsed");
    Ok(table)
}

/// Read a consolidated CSV file, tolerating a BOM and Windows-1252 text.
pub fn load_consolidated_file(path: &Path, base: Lang) -> Result<ConsolidatedTable, StoreError> {
    if !path.is_file() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    let content =
        decode_text(&bytes).ok_or_else(|| malformed(path, "neither UTF-8 nor Windows-1252 text"))?;
    from_csv(&content, base, path)
}
