//! In-memory form of a metadata store file.
//!
//! Rows keep the shape they were read in, so a rewrite reproduces every
//! untouched row exactly.

use crate::config::StoreFormat;
use crate::types::MetadataEntry;
use serde_json::{Map, Value};

/// Decoded content of a backing file
#[derive(Debug)]
pub(crate) enum Rows {
    Csv(Vec<csv::StringRecord>),
    Json(Vec<MetadataEntry>),
}

impl Rows {
    pub(crate) fn empty(format: StoreFormat) -> Self {
        match format {
            StoreFormat::Csv => Rows::Csv(Vec::new()),
            StoreFormat::Json => Rows::Json(Vec::new()),
        }
    }

    /// Parse a whole file; any malformed row fails the whole file
    pub(crate) fn decode(format: StoreFormat, bytes: &[u8]) -> Result<Self, String> {
        match format {
            StoreFormat::Csv => {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(false)
                    .from_reader(bytes);
                let mut records = Vec::new();
                for (index, record) in reader.records().enumerate() {
                    let record = record.map_err(|e| e.to_string())?;
                    if record.len() < 2 {
                        return Err(format!(
                            "row {} has {} column(s), expected at least 2",
                            index + 1,
                            record.len()
                        ));
                    }
                    records.push(record);
                }
                Ok(Rows::Csv(records))
            }
            StoreFormat::Json => {
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Rows::Json(Vec::new()));
                }
                serde_json::from_slice(bytes)
                    .map(Rows::Json)
                    .map_err(|e| e.to_string())
            }
        }
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, String> {
        match self {
            Rows::Csv(records) => {
                let mut writer = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(Vec::new());
                for record in records {
                    writer.write_record(record).map_err(|e| e.to_string())?;
                }
                writer.into_inner().map_err(|e| e.to_string())
            }
            Rows::Json(entries) => serde_json::to_vec_pretty(entries).map_err(|e| e.to_string()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Rows::Csv(records) => records.len(),
            Rows::Json(entries) => entries.len(),
        }
    }

    /// Drop every row keyed by (`file_path`, `file_name`)
    pub(crate) fn remove_key(&mut self, file_path: &str, file_name: &str) {
        match self {
            Rows::Csv(records) => records.retain(|r| {
                !(r.get(0) == Some(file_name) && r.get(1) == Some(file_path))
            }),
            Rows::Json(entries) => entries.retain(|e| !e.matches(file_path, file_name)),
        }
    }

    /// Append an entry
    ///
    /// In CSV, auxiliary field `fieldN` goes to column N. The row is padded to
    /// the width of the existing rows; a wider row is rejected.
    pub(crate) fn push(&mut self, entry: MetadataEntry) -> Result<(), String> {
        match self {
            Rows::Csv(records) => {
                let mut columns = vec![entry.file_name, entry.file_path];
                let mut n = 3;
                while let Some(value) = entry.extra.get(&format!("field{}", n)) {
                    columns.push(value_to_cell(value));
                    n += 1;
                }

                if let Some(width) = records.first().map(csv::StringRecord::len) {
                    if columns.len() > width {
                        return Err(format!(
                            "entry has {} columns but the store has {}",
                            columns.len(),
                            width
                        ));
                    }
                    columns.resize(width, String::new());
                }
                records.push(csv::StringRecord::from(columns));
                Ok(())
            }
            Rows::Json(entries) => {
                entries.push(entry);
                Ok(())
            }
        }
    }

    pub(crate) fn entries(&self) -> Vec<MetadataEntry> {
        match self {
            Rows::Csv(records) => records.iter().map(record_to_entry).collect(),
            Rows::Json(entries) => entries.clone(),
        }
    }
}

fn record_to_entry(record: &csv::StringRecord) -> MetadataEntry {
    let mut extra = Map::new();
    for (index, cell) in record.iter().enumerate().skip(2) {
        extra.insert(format!("field{}", index + 1), Value::String(cell.to_string()));
    }

    MetadataEntry {
        file_name: record.get(0).unwrap_or_default().to_string(),
        file_path: record.get(1).unwrap_or_default().to_string(),
        extra,
    }
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
