//! CSV serialization for flat rows

use crate::error::{Error, Result};
use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Render one cell; missing and null cells are empty strings
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Serialize rows with a dynamic header: the first-seen union of keys
/// across all rows
pub fn csv_dynamic(records: &[Map<String, Value>]) -> Result<(Vec<String>, Bytes)> {
    let mut header: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.clone()) {
                header.push(key.clone());
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&header)
        .map_err(|e| Error::csv(e.to_string()))?;
    for record in records {
        let row: Vec<String> = header.iter().map(|key| cell(record.get(key))).collect();
        writer
            .write_record(&row)
            .map_err(|e| Error::csv(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::csv(e.to_string()))?;
    Ok((header, Bytes::from(bytes)))
}

/// Serialize rows against a fixed header; keys outside the header are
/// ignored, missing keys produce empty cells
pub fn csv_fixed(records: &[Map<String, Value>], fieldnames: &[&str]) -> Result<Bytes> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(fieldnames)
        .map_err(|e| Error::csv(e.to_string()))?;
    for record in records {
        let row: Vec<String> = fieldnames
            .iter()
            .map(|name| cell(record.get(*name)))
            .collect();
        writer
            .write_record(&row)
            .map_err(|e| Error::csv(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::csv(e.to_string()))?;
    Ok(bytes.into())
}
