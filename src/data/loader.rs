use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, ColumnType, Table, Value};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per row (the primary format)
/// * `.json`    – `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat columns of primitive or string type
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string();

    match ext.as_str() {
        "csv" => {
            let file = File::open(path)
                .with_context(|| format!("opening CSV file {}", path.display()))?;
            load_csv(file, &name)
        }
        "json" => load_json(path, &name),
        "parquet" | "pq" => load_parquet(path, &name),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV bytes into a [`Table`]. The first record is the header row.
///
/// Ragged rows and invalid UTF-8 are reported as errors; nothing is skipped.
pub fn load_csv<R: Read>(reader: R, name: &str) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        for (col_idx, value) in record.iter().enumerate() {
            cells[col_idx].push(value.to_string());
        }
    }

    let columns = headers
        .iter()
        .zip(&cells)
        .map(|(header, raw)| {
            let raw: Vec<&str> = raw.iter().map(String::as_str).collect();
            Column::from_text_cells(header.clone(), &raw)
        })
        .collect();

    Table::new(name, columns).context("building table from CSV")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 25, "city": "A" },
///   { "age": 30, "city": "B" }
/// ]
/// ```
///
/// Keys missing from a record are treated as missing values.
fn load_json(path: &Path, name: &str) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    load_json_str(&text, name)
}

fn load_json_str(text: &str, name: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .iter()
        .map(|col| {
            let values = records
                .iter()
                .map(|rec| rec.get(col).map(json_to_value).unwrap_or(Value::Null))
                .collect();
            column_from_values(col.clone(), values)
        })
        .collect();

    Table::new(name, columns).context("building table from JSON")
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Integer, float, boolean and string columns keep their meaning; any other
/// Arrow type is rendered to text and treated as categorical.
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path, name: &str) -> Result<Table> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); schema.fields().len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, array) in batch.columns().iter().enumerate() {
            let field = schema.field(col_idx);
            let converted = arrow_to_values(array)
                .with_context(|| format!("Column '{}': unsupported data", field.name()))?;
            values[col_idx].extend(converted);
        }
    }

    let columns = schema
        .fields()
        .iter()
        .zip(values)
        .map(|(field, vals)| column_from_values(field.name().clone(), vals))
        .collect();

    Table::new(name, columns).context("building table from parquet")
}

/// Convert an Arrow column into cells.
fn arrow_to_values(col: &ArrayRef) -> Result<Vec<Value>> {
    let n = col.len();
    let cells = match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let arr = cast(col, &DataType::Int64)?;
            let arr = arr.as_primitive::<Int64Type>();
            (0..n)
                .map(|i| {
                    if arr.is_null(i) {
                        Value::Null
                    } else {
                        Value::Integer(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::UInt64 | DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let arr = cast(col, &DataType::Float64)?;
            let arr = arr.as_primitive::<Float64Type>();
            (0..n)
                .map(|i| {
                    if arr.is_null(i) || arr.value(i).is_nan() {
                        Value::Null
                    } else {
                        Value::Float(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::Boolean => {
            let arr = col.as_boolean();
            (0..n)
                .map(|i| {
                    if arr.is_null(i) {
                        Value::Null
                    } else {
                        Value::Bool(arr.value(i))
                    }
                })
                .collect()
        }
        _ => (0..n)
            .map(|i| {
                if col.is_null(i) {
                    Ok(Value::Null)
                } else {
                    Ok(Value::String(array_value_to_string(col, i)?))
                }
            })
            .collect::<Result<Vec<_>>>()?,
    };
    Ok(cells)
}

// ---------------------------------------------------------------------------
// Shared dtype inference for already-typed cells
// ---------------------------------------------------------------------------

/// Pick the dtype Pandas would give a column holding `values` and normalise
/// the cells to it.
fn column_from_values(name: String, values: Vec<Value>) -> Column {
    let present = || values.iter().filter(|v| !v.is_null());
    let any_missing = values.iter().any(Value::is_null);

    let dtype = if present().next().is_none() {
        ColumnType::Float64
    } else if present().all(|v| matches!(v, Value::Integer(_))) {
        if any_missing {
            ColumnType::Float64
        } else {
            ColumnType::Int64
        }
    } else if present().all(|v| matches!(v, Value::Integer(_) | Value::Float(_))) {
        ColumnType::Float64
    } else if !any_missing && present().all(|v| matches!(v, Value::Bool(_))) {
        ColumnType::Bool
    } else {
        ColumnType::Object
    };

    let values = values
        .into_iter()
        .map(|v| {
            if v.is_null() {
                return Value::Null;
            }
            match dtype {
                ColumnType::Float64 => v.as_f64().map(Value::Float).unwrap_or(Value::Null),
                ColumnType::Object => match v {
                    Value::String(_) => v,
                    other => Value::String(other.to_string()),
                },
                ColumnType::Int64 | ColumnType::Bool => v,
            }
        })
        .collect();

    Column::new(name, dtype, values)
}
