use log::{debug, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::{RecommenderError, Result};

/// Row-oriented table of string cells as read from disk
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    /// Build a table from string literals, mostly for fixtures
    pub fn from_rows(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    /// Load a `;`-separated file
    pub fn from_path<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RecommenderError::NotFound(format!(
                "table '{}' at {}",
                name,
                path.display()
            )));
        }

        let file = File::open(path).map_err(|e| RecommenderError::io(path, e))?;
        Self::from_reader(name, file)
    }

    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.byte_headers()?.iter().map(decode_field).collect();

        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for record in reader.byte_records() {
            match record {
                Ok(record) if record.len() > headers.len() => {
                    skipped += 1;
                    debug!(
                        "Skipping line {} in '{}': {} fields under {} headers",
                        record.position().map_or(0, |p| p.line()),
                        name,
                        record.len(),
                        headers.len()
                    );
                }
                Ok(record) => rows.push(record.iter().map(decode_field).collect()),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    skipped += 1;
                    debug!("Skipping bad line in '{}': {}", name, e);
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} unreadable lines in table '{}'", skipped, name);
        }

        Ok(Self::new(name, headers, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `column`, `None` when the row is shorter than the header
    pub fn cell(row: &[String], column: usize) -> Option<&str> {
        row.get(column).map(String::as_str)
    }
}

// UTF-8 when valid, Latin-1 otherwise (the Book-Crossing dumps are Latin-1)
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
