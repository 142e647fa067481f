//! Table loading from CSV and JSON-records files
//!
//! Header names are whitespace-trimmed. Empty CSV cells and JSON `null`
//! become missing values; CSV text becomes a number only when the number
//! prints back as the same text.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use pmdash_core::{Record, Table, Value};
use tracing::{debug, info};

/// Load a table, picking the reader from the file extension.
pub fn load_table(path: &Path) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let table = match extension.as_deref() {
        Some("csv") => read_csv(path)?,
        Some("json") => read_json(path)?,
        _ => bail!(
            "unsupported input file {}: expected a .csv or .json file",
            path.display()
        ),
    };

    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "loaded table"
    );
    Ok(table)
}

// ============================================================================
// CSV
// ============================================================================

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read CSV header from {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    debug!(?headers, "csv header");

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        // Header is line 1
        let row = row.with_context(|| format!("{}: malformed row {}", path.display(), i + 2))?;
        let record = headers
            .iter()
            .enumerate()
            .map(|(col, header)| (header.clone(), csv_cell(row.get(col).unwrap_or(""))))
            .collect::<Record>();
        records.push(record);
    }
    Ok(Table::from_records(records))
}

fn csv_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Missing;
    }
    // Only text that prints back unchanged becomes a number, so codes like
    // "0123" and amounts like "15000.50" keep their spelling.
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && n.to_string() == trimmed => Value::Number(n),
        _ => Value::Text(raw.to_string()),
    }
}

// ============================================================================
// JSON
// ============================================================================

fn read_json(path: &Path) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let rows: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_reader(BufReader::new(file)).with_context(|| {
            format!("{}: expected a JSON array of objects", path.display())
        })?;

    let records = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(key, value)| (key.trim().to_string(), json_cell(value)))
                .collect::<Record>()
        })
        .collect();
    Ok(Table::from_records(records))
}

fn json_cell(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Missing,
        serde_json::Value::Number(n) => n.as_f64().map_or(Value::Missing, Value::Number),
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Bool(b) => Value::Text(b.to_string()),
        other => Value::Text(other.to_string()),
    }
}
