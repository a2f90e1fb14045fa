use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, PlayerRecord, Table};
use crate::config::ColumnNames;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("failed to parse {path}: {source:#}")]
    Parse {
        path: PathBuf,
        source: anyhow::Error,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a player table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat scalar columns (recommended)
/// * `.json`    – `[{ "Nome": "...", "Ruolo": "D", ... }, ...]`
/// * `.csv`     – header row, one player per line
///
/// The team column is normalized to plain strings before the table is built,
/// see [`normalize_team`].
pub fn load_file(path: &Path, columns: &ColumnNames) -> Result<Table, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => std::fs::read_to_string(path)
            .context("reading JSON file")
            .and_then(|text| parse_json(&text)),
        "csv" => std::fs::File::open(path)
            .context("opening CSV")
            .and_then(parse_csv),
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    let (header, rows) = parsed.map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(build_table(header, rows, columns))
}

/// Normalize team cells and index the table.
fn build_table(header: Vec<String>, mut rows: Vec<PlayerRecord>, columns: &ColumnNames) -> Table {
    for row in &mut rows {
        if let Some(cell) = row.cells.remove(&columns.team) {
            row.insert(columns.team.clone(), normalize_team(cell));
        }
    }
    Table::with_columns(header, rows)
}

// ---------------------------------------------------------------------------
// Team normalization
// ---------------------------------------------------------------------------

/// Reduce a team cell to its canonical display string.
///
/// Previous-season exports sometimes carry the whole team object, either as a
/// JSON object or as a dict literal like `{'id': 5, 'name': 'Inter'}`. Those
/// become their `name` member; everything else becomes its display string.
pub fn normalize_team(value: CellValue) -> CellValue {
    match value {
        CellValue::Null => CellValue::Null,
        CellValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('{') && trimmed.ends_with('}') {
                if let Some(name) = structured_team_name(trimmed) {
                    return CellValue::String(name);
                }
            }
            CellValue::String(s)
        }
        other => CellValue::String(other.to_string()),
    }
}

fn structured_team_name(text: &str) -> Option<String> {
    if let Ok(JsonValue::Object(obj)) = serde_json::from_str::<JsonValue>(text) {
        return match obj.get("name") {
            Some(JsonValue::String(name)) => Some(name.clone()),
            Some(JsonValue::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
    }
    dict_literal_name(text)
}

/// Pull `name` out of a Python-style dict literal without a full parser.
fn dict_literal_name(text: &str) -> Option<String> {
    let start = text
        .find("'name'")
        .or_else(|| text.find("\"name\""))?
        + "'name'".len();
    let rest = text[start..].trim_start().strip_prefix(':')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let body = &rest[quote.len_utf8()..];
    let end = body.find(quote)?;
    Some(body[..end].to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `to_json(orient='records')`):
///
/// ```json
/// [
///   { "Nome": "Lautaro Martinez", "Ruolo": "A", "Squadra": "Inter", "Convenienza": 88.4 },
///   ...
/// ]
/// ```
fn parse_json(text: &str) -> Result<(Vec<String>, Vec<PlayerRecord>)> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let cells: BTreeMap<String, CellValue> = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();
        rows.push(PlayerRecord { cells });
    }

    Ok((Vec::new(), rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one player per record.
/// Cell types are guessed per value (integer, float, bool, text; empty is null).
fn parse_csv<R: Read>(input: R) -> Result<(Vec<String>, Vec<PlayerRecord>)> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut row = PlayerRecord::new();
        for (col_idx, value) in record.iter().enumerate() {
            let Some(col_name) = headers.get(col_idx) else {
                bail!("CSV row {row_no}: more fields than headers");
            };
            row.insert(col_name.clone(), guess_cell_type(value));
        }
        rows.push(row);
    }

    Ok((headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one player per row.
///
/// Scalar columns (strings, ints, floats, bools) map onto cell values; any
/// other Arrow type is kept as the name of its data type.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<(Vec<String>, Vec<PlayerRecord>)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let header: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row_idx in 0..batch.num_rows() {
            let mut row = PlayerRecord::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row_idx);
                row.insert(field.name().clone(), value);
            }
            rows.push(row);
        }
    }

    Ok((header, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| CellValue::String(s.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|s| CellValue::String(s.value(row).to_string())),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|arr| CellValue::Integer(arr.value(row) as i64)),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|arr| CellValue::Integer(arr.value(row))),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|arr| CellValue::Float(arr.value(row) as f64)),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|arr| CellValue::Float(arr.value(row))),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|arr| CellValue::Bool(arr.value(row))),
        other => Some(CellValue::String(format!("{other:?}"))),
    };
    value.unwrap_or(CellValue::Null)
}
