//! Delimited text parser.
//!
//! The delimiter is always configured explicitly; dialect sniffing is not
//! attempted.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::{DataTable, SourceMetadata};
use crate::error::{QubeError, Result};

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses tabular data files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| QubeError::io(path, e))?;
        let size_bytes = file.metadata().map_err(|e| QubeError::io(path, e))?.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| QubeError::io(path, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let table = self.parse_bytes(&contents)?;
        debug!(
            path = %path.display(),
            rows = table.rows.len(),
            columns = table.column_count(),
            "parsed tabular input"
        );

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            table.rows.len(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse bytes directly.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            records.push(result?);
        }

        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            match records.first() {
                Some(record) => (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect(),
                None => return Err(QubeError::EmptyData("No data rows found".to_string())),
            }
        };

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(QubeError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = headers.len();
        let rows = records
            .into_iter()
            .map(|record| {
                let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
                row.resize(expected_cols, String::new());
                row
            })
            .collect();

        Ok(DataTable::new(headers, rows, self.config.delimiter))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
