use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use serde::{Deserialize, Serialize};

use crate::error::EdaError;

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common Pandas dtypes.
/// Used as a map key for category counts, so `Value` must be `Ord` + `Hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "NaN"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64`; `None` for missing and non-numeric cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if !v.is_nan() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Column types and kinds
// ---------------------------------------------------------------------------

/// Storage type of a column, named after the Pandas dtype it mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnType {
    Int64,
    Float64,
    Bool,
    Object,
}

impl ColumnType {
    pub fn kind(self) -> Option<ColumnKind> {
        match self {
            ColumnType::Int64 | ColumnType::Float64 => Some(ColumnKind::Numeric),
            ColumnType::Object => Some(ColumnKind::Categorical),
            ColumnType::Bool => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Bool => "bool",
            ColumnType::Object => "object",
        };
        f.write_str(name)
    }
}

/// The two families of columns a user can visualize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnKind {
    #[default]
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 2] = [ColumnKind::Numeric, ColumnKind::Categorical];
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => f.write_str("Numeric"),
            ColumnKind::Categorical => f.write_str("Categorical"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// One named, typed column. `values.len()` equals the table's row count.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Build a column from raw text cells, inferring the dtype the way
    /// `pandas.read_csv` does.
    pub fn from_text_cells(name: impl Into<String>, cells: &[&str]) -> Self {
        let missing: Vec<bool> = cells.iter().map(|c| is_missing_token(c)).collect();
        let present = || {
            cells
                .iter()
                .zip(&missing)
                .filter(|(_, m)| !**m)
                .map(|(c, _)| c.trim())
        };
        let any_missing = missing.iter().any(|m| *m);
        let any_present = missing.iter().any(|m| !*m);

        let dtype = if !any_present {
            ColumnType::Float64
        } else if present().all(|c| c.parse::<i64>().is_ok()) {
            // Pandas has no nullable default int: a gap promotes to float64.
            if any_missing {
                ColumnType::Float64
            } else {
                ColumnType::Int64
            }
        } else if present().all(|c| parse_float(c).is_some()) {
            ColumnType::Float64
        } else if !any_missing && present().all(|c| parse_bool(c).is_some()) {
            ColumnType::Bool
        } else {
            ColumnType::Object
        };

        let values = cells
            .iter()
            .zip(&missing)
            .map(|(cell, &is_missing)| {
                if is_missing {
                    return Value::Null;
                }
                let cell = cell.trim();
                match dtype {
                    ColumnType::Int64 => cell.parse().map(Value::Integer).unwrap_or(Value::Null),
                    ColumnType::Float64 => parse_float(cell).map(Value::Float).unwrap_or(Value::Null),
                    ColumnType::Bool => parse_bool(cell).map(Value::Bool).unwrap_or(Value::Null),
                    ColumnType::Object => Value::String(cell.to_string()),
                }
            })
            .collect();

        Self::new(name, dtype, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn kind(&self) -> Option<ColumnKind> {
        self.dtype.kind()
    }

    /// Non-missing numeric values, in row order.
    pub fn numeric_values(&self) -> Result<Vec<f64>, EdaError> {
        if self.kind() != Some(ColumnKind::Numeric) {
            return Err(EdaError::NotNumeric(self.name.clone()));
        }
        Ok(self.values.iter().filter_map(Value::as_f64).collect())
    }
}

const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "<NA>"];

fn is_missing_token(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

fn parse_float(s: &str) -> Option<f64> {
    match s {
        "inf" | "Inf" => Some(f64::INFINITY),
        "-inf" | "-Inf" => Some(f64::NEG_INFINITY),
        _ => s.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// The loaded dataset. Immutable once built; a new upload builds a new table
/// with a fresh `id`.
#[derive(Debug, Clone)]
pub struct Table {
    id: u64,
    /// Display name, usually the file stem.
    pub name: String,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Assemble a table, checking that names are unique and lengths agree.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> anyhow::Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                anyhow::bail!("Duplicate column name '{}'", col.name);
            }
            if col.len() != n_rows {
                anyhow::bail!(
                    "Column '{}' has {} values but the table has {n_rows} rows",
                    col.name,
                    col.len()
                );
            }
        }
        Ok(Self {
            id: NEXT_TABLE_ID.fetch_add(1, AtomicOrdering::Relaxed),
            name: name.into(),
            columns,
            n_rows,
        })
    }

    /// Process-unique identity, used as the pipeline cache key.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Result<&Column, EdaError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| EdaError::UnknownColumn(name.to_string()))
    }

    /// Names of the columns of `kind`, in table order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind() == Some(kind))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Cells of row `row` in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &Value> + '_ {
        self.columns.iter().map(move |c| &c.values[row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_int_column() {
        let col = Column::from_text_cells("age", &["25", "30", "25"]);
        assert_eq!(col.dtype, ColumnType::Int64);
        assert_eq!(col.values[1], Value::Integer(30));
    }

    #[test]
    fn int_with_gap_becomes_float() {
        let col = Column::from_text_cells("age", &["25", "", "25"]);
        assert_eq!(col.dtype, ColumnType::Float64);
        assert_eq!(col.values[0], Value::Float(25.0));
        assert_eq!(col.values[1], Value::Null);
    }

    #[test]
    fn all_missing_column_is_float() {
        let col = Column::from_text_cells("empty", &["", "NA", "nan"]);
        assert_eq!(col.dtype, ColumnType::Float64);
        assert!(col.values.iter().all(Value::is_null));
        assert!(col.numeric_values().unwrap().is_empty());
    }

    #[test]
    fn infers_bool_and_object() {
        assert_eq!(
            Column::from_text_cells("flag", &["True", "false"]).dtype,
            ColumnType::Bool
        );
        assert_eq!(
            Column::from_text_cells("city", &["A", "B", "3"]).dtype,
            ColumnType::Object
        );
        assert_eq!(
            Column::from_text_cells("flag", &["true", ""]).dtype,
            ColumnType::Object
        );
    }

    #[test]
    fn mixed_int_float_is_float() {
        let col = Column::from_text_cells("x", &["1", "2.5"]);
        assert_eq!(col.dtype, ColumnType::Float64);
    }

    #[test]
    fn columns_of_kind_filters_by_type_in_order() {
        let table = Table::new(
            "t",
            vec![
                Column::from_text_cells("city", &["A"]),
                Column::from_text_cells("age", &["1"]),
                Column::from_text_cells("flag", &["true"]),
                Column::from_text_cells("score", &["1.5"]),
            ],
        )
        .unwrap();
        assert_eq!(table.columns_of_kind(ColumnKind::Numeric), vec!["age", "score"]);
        assert_eq!(table.columns_of_kind(ColumnKind::Categorical), vec!["city"]);
    }

    #[test]
    fn rejects_duplicate_names_and_ragged_columns() {
        let dup = Table::new(
            "t",
            vec![
                Column::from_text_cells("a", &["1"]),
                Column::from_text_cells("a", &["2"]),
            ],
        );
        assert!(dup.is_err());

        let ragged = Table::new(
            "t",
            vec![
                Column::from_text_cells("a", &["1"]),
                Column::from_text_cells("b", &["2", "3"]),
            ],
        );
        assert!(ragged.is_err());
    }

    #[test]
    fn tables_get_distinct_ids() {
        let a = Table::new("a", vec![]).unwrap();
        let b = Table::new("b", vec![]).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.n_rows(), 0);
    }

    #[test]
    fn numeric_values_rejects_text_column() {
        let col = Column::from_text_cells("city", &["A"]);
        assert!(matches!(col.numeric_values(), Err(EdaError::NotNumeric(_))));
    }
}
