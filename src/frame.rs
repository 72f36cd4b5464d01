//! In-memory tabular input for the profiler.
//!
//! A [`Table`] is a list of named [`Column`]s whose cells are [`CellValue`]s.
//! Tables built from CSV get one storage type per column, the way a dataframe
//! reader assigns dtypes: a column whose every non-null cell is an integer is
//! stored as integers, one whose cells are all numeric as floats, and anything
//! else stays text. Classification relies on that distinction because the
//! list-literal and date rules only apply to text columns.

use std::{fmt, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::io_utils;

/// Tokens read as missing values when loading delimited text.
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Strict numeric coercion: integers and floats pass through, text must
    /// parse as a finite number after trimming.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) if f.is_finite() => Some(*f),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    pub fn non_null(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_null())
    }

    /// Builds a column from raw text cells, assigning a single storage type
    /// to the whole column.
    pub fn from_raw_cells(name: impl Into<String>, cells: &[Option<String>]) -> Self {
        let present = || cells.iter().flatten();
        let values = if present().all(|c| c.parse::<i64>().is_ok()) {
            cells
                .iter()
                .map(|c| match c.as_deref().map(str::parse::<i64>) {
                    Some(Ok(i)) => CellValue::Integer(i),
                    _ => CellValue::Null,
                })
                .collect()
        } else if present().all(|c| parse_float_cell(c).is_some()) {
            cells
                .iter()
                .map(|c| {
                    c.as_deref()
                        .and_then(parse_float_cell)
                        .map_or(CellValue::Null, CellValue::Float)
                })
                .collect()
        } else {
            cells
                .iter()
                .map(|c| match c {
                    Some(text) => CellValue::Text(text.clone()),
                    None => CellValue::Null,
                })
                .collect()
        };
        Self {
            name: name.into(),
            values,
        }
    }
}

fn parse_float_cell(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn is_null_token(value: &str) -> bool {
    NULL_TOKENS.contains(&value)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Builds a table from decoded CSV rows. Short rows are padded with nulls.
    pub fn from_rows(headers: &[String], rows: &[Vec<String>]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let cells = rows
                    .iter()
                    .map(|row| {
                        row.get(idx)
                            .map(|raw| raw.trim())
                            .filter(|trimmed| !is_null_token(trimmed))
                            .map(str::to_string)
                    })
                    .collect::<Vec<_>>();
                Column::from_raw_cells(header.trim(), &cells)
            })
            .collect();
        Self { columns }
    }
}

pub fn load_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers from {path:?}"))?;
    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        rows.push(decoded);
    }
    Ok(Table::from_rows(&headers, &rows))
}
