//! Tabular data abstraction and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }
}

/// A column converted to categorical form.
///
/// `categories` holds the distinct non-blank values in first-seen order and
/// `codes` maps each row to its category, `None` for blank cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorical {
    pub categories: Vec<String>,
    pub codes: Vec<Option<usize>>,
}

impl Categorical {
    /// Value of the given row, if it is not blank.
    pub fn value(&self, row: usize) -> Option<&str> {
        self.codes
            .get(row)
            .copied()
            .flatten()
            .and_then(|code| self.categories.get(code))
            .map(|s| s.as_str())
    }

    /// Rename every category through `f`, keeping the row mapping.
    pub fn rename_categories<E>(
        &self,
        mut f: impl FnMut(&str) -> Result<String, E>,
    ) -> Result<Categorical, E> {
        let categories = self
            .categories
            .iter()
            .map(|c| f(c))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Categorical {
            categories,
            codes: self.codes.clone(),
        })
    }
}

/// The tabular dataset a cube is built from.
///
/// Columns are ordered, rows are ordered and cells are addressed by column
/// name.
pub trait TabularData {
    /// Column names in order.
    fn column_names(&self) -> Vec<&str>;

    /// Number of data rows.
    fn row_count(&self) -> usize;

    /// All cells of the named column, aligned by row index.
    fn column(&self, name: &str) -> Option<Vec<&str>>;

    /// Convert the named column into categorical form.
    fn to_categorical(&self, name: &str) -> Option<Categorical>;

    /// Overwrite the named column with the values of `categorical`.
    ///
    /// Returns `false` if the column does not exist.
    fn set_categorical(&mut self, name: &str, categorical: &Categorical) -> bool;
}

/// Represents parsed tabular data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// The delimiter used.
    pub delimiter: u8,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        Self {
            headers,
            rows,
            delimiter,
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// A cell with nothing in it but whitespace.
    pub fn is_blank(value: &str) -> bool {
        value.trim().is_empty()
    }

    /// A cell that stands for a missing observation.
    pub fn is_missing_observation(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("n/a")
    }

    /// Write the table back out as delimited text.
    pub fn to_csv_string(&self) -> crate::Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| crate::QubeError::io("<memory>", e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| crate::QubeError::Parse {
            row: 0,
            column: 0,
            message: e.to_string(),
        })
    }
}

impl TabularData for DataTable {
    fn column_names(&self) -> Vec<&str> {
        self.headers.iter().map(|h| h.as_str()).collect()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    fn to_categorical(&self, name: &str) -> Option<Categorical> {
        let index = self.column_index(name)?;
        let mut lookup: IndexMap<&str, usize> = IndexMap::new();
        let mut codes = Vec::with_capacity(self.rows.len());

        for value in self.column_values(index) {
            if DataTable::is_blank(value) {
                codes.push(None);
                continue;
            }
            let next = lookup.len();
            let code = *lookup.entry(value).or_insert(next);
            codes.push(Some(code));
        }

        Some(Categorical {
            categories: lookup.keys().map(|k| k.to_string()).collect(),
            codes,
        })
    }

    fn set_categorical(&mut self, name: &str, categorical: &Categorical) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            if let Some(cell) = row.get_mut(index) {
                match categorical.value(row_idx) {
                    Some(value) => *cell = value.to_string(),
                    None => cell.clear(),
                }
            }
        }
        true
    }
}
