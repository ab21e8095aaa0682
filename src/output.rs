//! Output representations for API results.
//!
//! Every operation on [`EveractiveApi`](crate::EveractiveApi) returns its
//! records either as they came ([`Output::Rows`]) or flattened into a
//! [`Table`] with one row per record.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use tabled::builder::Builder;
use tracing::warn;

use crate::error::{EveractiveError, Result};

/// Separator used to join nested keys into column names.
pub const COLUMN_SEPARATOR: &str = "_";

/// Requested output representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Row-oriented JSON records (`"json"`).
    #[default]
    Json,
    /// Flattened tabular form (`"table"`).
    Table,
}

impl OutputFormat {
    /// The string name of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Table => "table",
        }
    }

    /// Shape records into this representation.
    pub fn apply(self, records: Vec<Value>) -> Output {
        match self {
            Self::Json => Output::Rows(records),
            Self::Table => Output::Table(Table::from_records(&records)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = EveractiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            other => Err(EveractiveError::InvalidArgument(format!(
                "output_format must be either 'json' or 'table', got '{other}'"
            ))),
        }
    }
}

/// Anything an operation accepts as its output format.
pub trait IntoOutputFormat {
    /// Resolve into a recognized [`OutputFormat`].
    ///
    /// # Errors
    ///
    /// Returns [`EveractiveError::InvalidArgument`] for unrecognized names.
    fn into_output_format(self) -> Result<OutputFormat>;
}

impl IntoOutputFormat for OutputFormat {
    fn into_output_format(self) -> Result<OutputFormat> {
        Ok(self)
    }
}

impl IntoOutputFormat for &str {
    fn into_output_format(self) -> Result<OutputFormat> {
        self.parse()
    }
}

impl IntoOutputFormat for String {
    fn into_output_format(self) -> Result<OutputFormat> {
        self.parse()
    }
}

impl IntoOutputFormat for &String {
    fn into_output_format(self) -> Result<OutputFormat> {
        self.parse()
    }
}

/// Result of an API operation in the caller-selected representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Output {
    /// Records as returned by the API.
    Rows(Vec<Value>),
    /// Records flattened into columns.
    Table(Table),
}

impl Output {
    /// The rows, if this is row output.
    pub fn as_rows(&self) -> Option<&[Value]> {
        match self {
            Self::Rows(rows) => Some(rows),
            Self::Table(_) => None,
        }
    }

    /// The table, if this is tabular output.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Rows(_) => None,
            Self::Table(table) => Some(table),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Table(table) => table.rows.len(),
        }
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Records flattened into named columns.
///
/// Nested objects become `parent_child` columns; arrays stay whole as cell
/// values. Columns appear in the order they are first seen, and records
/// without a column get `null` there. When a literal key and a nested path
/// flatten to the same column (`a_b` and `{"a": {"b": ..}}`), the value
/// seen first is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Flatten records into a table.
    pub fn from_records(records: &[Value]) -> Self {
        let flattened: Vec<Map<String, Value>> = records.iter().map(flatten_record).collect();

        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        for record in &flattened {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = flattened
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.iter().map(cell_text));
        }
        write!(f, "{}", builder.build())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten one record. A non-object record becomes a single `value` column.
fn flatten_record(record: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    match record {
        Value::Object(object) => flatten_into(&mut out, None, object),
        other => {
            out.insert("value".to_string(), other.clone());
        }
    }
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, object: &Map<String, Value>) {
    for (key, value) in object {
        let column = match prefix {
            Some(prefix) => format!("{prefix}{COLUMN_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(out, Some(&column), nested),
            other => {
                if out.contains_key(&column) {
                    warn!(%column, "Flattened column already present, keeping first value");
                } else {
                    out.insert(column, other.clone());
                }
            }
        }
    }
}
