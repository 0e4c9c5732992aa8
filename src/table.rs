//! Edited-table import.
//!
//! The table editor hands back the whole reference list as a CSV table with
//! the columns `Title`, `Author` and `Year` (the same layout the CSV export
//! writes). The result replaces the store wholesale.

use tracing::debug;

use crate::import::{ImportError, Importer};
use crate::reference::Reference;

/// Importer for `.csv` reference tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableImporter;

impl Importer for TableImporter {
    /// Reads every row of the table in order. Empty `Year` cells read back
    /// as an absent year; other empty cells stay empty strings.
    fn parse(&self, content: &str) -> Result<Vec<Reference>, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(content.as_bytes());

        let references = reader
            .deserialize::<Reference>()
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rows = references.len(), "parsed reference table");
        Ok(references)
    }
}
