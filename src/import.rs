//! Reference import.
//!
//! Every supported source document is handled by an [`Importer`] that turns
//! the document text into a sequence of [`Reference`]s. Imports are
//! all-or-nothing: an importer either returns every record or an error,
//! never a partial result.

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::bibtex::BibtexImporter;
use crate::reference::Reference;
use crate::ris::RisImporter;
use crate::table::TableImporter;

/// Errors that can occur when importing references.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid BibTeX: {0}")]
    BibtexError(String),

    #[error("Invalid RIS at line {line}: {message}")]
    RisError { line: usize, message: String },

    #[error("Invalid table: {0}")]
    TableError(#[from] csv::Error),

    #[error("Unsupported file format: '{0}' (expected .bib, .ris or .csv)")]
    UnsupportedFormat(String),
}

/// Produces references from the text of a source document.
pub trait Importer {
    fn parse(&self, content: &str) -> Result<Vec<Reference>, ImportError>;
}

/// The document formats accepted for import, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `.bib`
    Bibtex,
    /// `.ris`
    Ris,
    /// `.csv`, an edited reference table
    Table,
}

impl InputFormat {
    /// Picks the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "bib" => Ok(InputFormat::Bibtex),
            "ris" => Ok(InputFormat::Ris),
            "csv" => Ok(InputFormat::Table),
            _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Returns the importer for this format.
    pub fn importer(self) -> Box<dyn Importer> {
        match self {
            InputFormat::Bibtex => Box::new(BibtexImporter),
            InputFormat::Ris => Box::new(RisImporter),
            InputFormat::Table => Box::new(TableImporter),
        }
    }

    pub fn parse(self, content: &str) -> Result<Vec<Reference>, ImportError> {
        self.importer().parse(content)
    }
}

/// Loads references from a file, choosing the importer by extension.
///
/// # Errors
///
/// Returns an error if the extension is not supported, the file cannot be
/// read, or the content does not parse.
pub fn load_references(path: &Path) -> Result<Vec<Reference>, ImportError> {
    let format = InputFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let references = format.parse(&content)?;
    debug!(
        path = %path.display(),
        ?format,
        count = references.len(),
        "loaded references"
    );
    Ok(references)
}
