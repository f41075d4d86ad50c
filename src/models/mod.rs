use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ERROR: &str = "Error";
pub const INVALID_URL: &str = "Invalid URL";
pub const FOUND: &str = "Found";
/// Negative result of the keyword checks and the heading lookup
pub const NOT_FOUND: &str = "Not Found";
/// Negative result of the rating finder and the hero photo fallback
pub const NOT_FOUND_LOWER: &str = "Not found";
pub const NO_IMAGES_FOUND: &str = "No images found";

/// Name of the derived column placed first in every result table
pub const WEBSITE_COLUMN: &str = "Website";

/// Field values a spreadsheet reader treats as missing
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One cell of the uploaded spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    /// Raw text of a cell in a column that is entirely numeric or boolean
    Scalar(String),
    Empty,
}

impl CellValue {
    pub fn from_field(field: &str) -> Self {
        if NA_MARKERS.contains(&field) {
            CellValue::Empty
        } else {
            CellValue::Text(field.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            CellValue::Scalar(_) | CellValue::Empty => None,
        }
    }

    /// Demote a text cell to a typed scalar
    pub fn into_scalar(self) -> Self {
        match self {
            CellValue::Text(text) => CellValue::Scalar(text),
            other => other,
        }
    }
}

fn is_number(text: &str) -> bool {
    text.trim().parse::<f64>().is_ok()
}

fn is_boolean(text: &str) -> bool {
    matches!(text, "True" | "TRUE" | "true" | "False" | "FALSE" | "false")
}

/// True when every non-empty cell reads as a number, or every one as a
/// boolean, so the column carries no text at all.
pub fn is_scalar_column<'a>(cells: impl Iterator<Item = &'a CellValue> + Clone) -> bool {
    let texts = || cells.clone().filter_map(CellValue::as_text);
    texts().next().is_some() && (texts().all(is_number) || texts().all(is_boolean))
}

/// Value computed for one result cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Text(String),
    Count(usize),
}

impl Signal {
    pub fn text(value: impl Into<String>) -> Self {
        Signal::Text(value.into())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Text(text) => f.write_str(text),
            Signal::Count(count) => write!(f, "{}", count),
        }
    }
}

/// Spreadsheet as uploaded: header names plus rows of cells.
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl InputTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding with empty cells or dropping extras so it
    /// lines up with the header.
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(cells);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Enriched comparison table with `Website` as its first column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[cfg(test)]
impl ResultTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Look up a cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

/// Result table plus bookkeeping for one enrichment run
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows: usize,
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub table: ResultTable,
}
