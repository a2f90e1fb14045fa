use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a player table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes found in the upstream
/// analysis sheets.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

static NULL_CELL: CellValue = CellValue::Null;

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
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

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl CellValue {
    /// Numeric coercion used by every numeric operation.
    ///
    /// Numeric strings are parsed (after trimming); booleans, nulls, NaN and
    /// unparsable text are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Bool(_) | CellValue::Null => return None,
        };
        (!v.is_nan()).then_some(v)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// PlayerRecord – one row of a table
// ---------------------------------------------------------------------------

/// A single player row: column_name → value. Absent cells read as `Null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    pub cells: BTreeMap<String, CellValue>,
}

impl PlayerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and the loaders.
    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.cells.insert(column.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    /// Cell for `column`, or `Null` when the row has no such cell.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&NULL_CELL)
    }

    /// Numeric value of `column`, if coercible.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).as_f64()
    }

    /// Display string of `column` (`<null>` when missing).
    pub fn label(&self, column: &str) -> String {
        self.get(column).to_string()
    }
}

// ---------------------------------------------------------------------------
// Table – an ordered set of player rows
// ---------------------------------------------------------------------------

/// A loaded player table with pre-computed column indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// All player rows, in source order.
    pub rows: Vec<PlayerRecord>,
    /// Ordered list of column names (first-seen order).
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Table {
    /// Build column indices from rows alone.
    pub fn from_records(rows: Vec<PlayerRecord>) -> Self {
        Self::with_columns(Vec::new(), rows)
    }

    /// Build column indices, keeping `columns` first in the given order and
    /// appending any column only seen in the rows.
    pub fn with_columns(columns: Vec<String>, rows: Vec<PlayerRecord>) -> Self {
        let mut column_names = Vec::with_capacity(columns.len());
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for col in columns {
            if seen.insert(col.clone()) {
                column_names.push(col);
            }
        }

        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();
        for row in &rows {
            for (col, val) in &row.cells {
                if seen.insert(col.clone()) {
                    column_names.push(col.clone());
                }
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }

        Table {
            rows,
            column_names,
            unique_values,
        }
    }

    /// A new table with the rows at `indices` (in the given order) and the
    /// same column layout.
    pub fn subset<I>(&self, indices: I) -> Table
    where
        I: IntoIterator<Item = usize>,
    {
        let rows = indices
            .into_iter()
            .filter_map(|i| self.rows.get(i).cloned())
            .collect();
        Table::with_columns(self.column_names.clone(), rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Capability check shared by every core operation: true when all of
    /// `columns` are part of this table's schema.
    pub fn has_columns(&self, columns: &[&str]) -> bool {
        columns.iter().all(|c| self.has_column(c))
    }

    /// `(row index, value)` for every row whose `column` is numeric.
    pub fn numeric_cells(&self, column: &str) -> Vec<(usize, f64)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.number(column).map(|v| (i, v)))
            .collect()
    }

    /// Sorted display strings of the non-null values of `column`.
    pub fn distinct_labels(&self, column: &str) -> Vec<String> {
        let labels: BTreeSet<String> = self
            .unique_values
            .get(column)
            .into_iter()
            .flatten()
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect();
        labels.into_iter().collect()
    }
}
