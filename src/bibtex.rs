//! BibTeX import.
//!
//! Parsing is delegated to the `biblatex` crate. Only the three fields a
//! [`Reference`] carries are read; everything else in an entry is ignored.

use biblatex::{Bibliography, Chunk, Entry, Spanned};
use tracing::debug;

use crate::import::{ImportError, Importer};
use crate::reference::Reference;

/// Importer for `.bib` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct BibtexImporter;

impl Importer for BibtexImporter {
    /// Parses a BibTeX document into one reference per entry, in document
    /// order. Missing `title`, `author` or `year` fields become `"N/A"`.
    fn parse(&self, content: &str) -> Result<Vec<Reference>, ImportError> {
        let bibliography =
            Bibliography::parse(content).map_err(|e| ImportError::BibtexError(e.to_string()))?;

        let references: Vec<Reference> = bibliography.iter().map(entry_to_reference).collect();
        debug!(count = references.len(), "parsed BibTeX document");
        Ok(references)
    }
}

fn entry_to_reference(entry: &Entry) -> Reference {
    Reference::from_fields(
        field(entry, "title"),
        field(entry, "author"),
        field(entry, "year"),
    )
}

fn field(entry: &Entry, name: &str) -> Option<String> {
    entry.get(name).map(chunks_to_string)
}

/// Concatenates field chunks back into plain text, dropping the braces
/// that protected them.
fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|c| match &c.v {
            Chunk::Normal(s) | Chunk::Verbatim(s) | Chunk::Math(s) => s.as_str(),
        })
        .collect()
}
