//! Session context.
//!
//! A [`Session`] owns everything one run of the tool works on: the
//! reference store, the selected citation style and the last formatted
//! output. It starts empty and is simply dropped at the end.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::export::{export_to_dir, ExportError, ExportFormat};
use crate::formatter::format_references;
use crate::import::{load_references, ImportError, InputFormat};
use crate::lookup::{parse_identifiers, LookupReport, MetadataClient, Transport};
use crate::reference::Reference;
use crate::store::ReferenceStore;
use crate::style::CitationStyle;

#[derive(Debug, Default)]
pub struct Session {
    store: ReferenceStore,
    style: CitationStyle,
    last_formatted: Vec<String>,
}

impl Session {
    pub fn new(style: CitationStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    pub fn style(&self) -> CitationStyle {
        self.style
    }

    pub fn set_style(&mut self, style: CitationStyle) {
        self.style = style;
    }

    /// Imports a whole document. Nothing is added unless the entire document
    /// parses. Returns the number of references added.
    pub fn import_document(
        &mut self,
        format: InputFormat,
        content: &str,
    ) -> Result<usize, ImportError> {
        let references = format.parse(content)?;
        let count = references.len();
        self.store.extend(references);
        info!(?format, count, "imported references");
        Ok(count)
    }

    /// Reads a file and imports it with the importer its extension selects.
    pub fn import_file(&mut self, path: &Path) -> Result<usize, ImportError> {
        let references = load_references(path)?;
        let count = references.len();
        self.store.extend(references);
        info!(path = %path.display(), count, "imported references");
        Ok(count)
    }

    /// Adds one manually entered reference, stored exactly as typed.
    pub fn add_manual(&mut self, title: &str, author: &str, year: &str) {
        self.store.append(Reference::new(title, author, Some(year)));
    }

    /// Looks up every identifier in `text` (one per line) and appends each
    /// one that resolves. Failures are returned in the report; they never
    /// stop the batch.
    pub fn fetch_identifiers<T: Transport>(
        &mut self,
        client: &MetadataClient<T>,
        text: &str,
    ) -> LookupReport {
        let identifiers = parse_identifiers(text);
        let report = client.fetch_all(&identifiers);
        self.store.extend(report.references.iter().cloned());
        report
    }

    /// Replaces the store with the rows handed back by the table editor.
    pub fn apply_table_edits(&mut self, records: Vec<Reference>) {
        info!(rows = records.len(), "applying table edits");
        self.store.replace_all(records);
    }

    /// Formats the current store with the session style and remembers the
    /// result.
    pub fn format(&mut self) -> &[String] {
        self.last_formatted = format_references(self.style, self.store.snapshot());
        &self.last_formatted
    }

    /// The output of the most recent [`Session::format`] call.
    pub fn last_formatted(&self) -> &[String] {
        &self.last_formatted
    }

    /// Exports the current state into `dir`.
    ///
    /// The Word export is built from citations formatted at export time, so
    /// it always reflects the current store and style.
    pub fn export(&mut self, format: ExportFormat, dir: &Path) -> Result<PathBuf, ExportError> {
        if format == ExportFormat::Docx {
            self.format();
        }
        export_to_dir(format, dir, self.store.snapshot(), &self.last_formatted)
    }
}
