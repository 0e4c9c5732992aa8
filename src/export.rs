//! Reference export.
//!
//! Each [`ExportFormat`] writes to a fixed file name inside the chosen
//! output directory. An existing export of the same format is overwritten.

use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::docx::write_docx;
use crate::reference::Reference;

/// Errors that can occur when exporting.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to write CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to build document package: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Unbalanced braces in field '{field}' of entry '{key}'")]
    UnbalancedBraces { key: String, field: &'static str },
}

/// Supported export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Bibtex,
    Csv,
    /// Word document built from the formatted citations.
    Docx,
}

const EXPORT_FORMATS: &[(&str, ExportFormat)] = &[
    ("bibtex", ExportFormat::Bibtex),
    ("csv", ExportFormat::Csv),
    ("docx", ExportFormat::Docx),
];

impl ExportFormat {
    /// Returns a format by name (case-insensitive). `bib` and `word` are
    /// accepted as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "bib" => Some(ExportFormat::Bibtex),
            "word" => Some(ExportFormat::Docx),
            other => EXPORT_FORMATS
                .iter()
                .find(|(n, _)| *n == other)
                .map(|(_, format)| *format),
        }
    }

    /// The fixed file name exports of this format are written to.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Bibtex => "exported_references.bib",
            ExportFormat::Csv => "exported_references.csv",
            ExportFormat::Docx => "exported_references.docx",
        }
    }

    /// The label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Bibtex => "BibTeX",
            ExportFormat::Csv => "CSV",
            ExportFormat::Docx => "Word (Rich-Text)",
        }
    }
}

/// Returns the list of export format names.
pub fn export_format_names() -> Vec<&'static str> {
    EXPORT_FORMATS.iter().map(|(n, _)| *n).collect()
}

/// Writes references as BibTeX `@article` entries keyed `ref1`, `ref2`, ...
///
/// Field values are written verbatim; an absent year is left out. A value
/// whose braces do not balance would end its field early, so every entry is
/// checked before anything is written.
pub fn write_bibtex<W: Write>(mut writer: W, references: &[Reference]) -> Result<(), ExportError> {
    let entries = references
        .iter()
        .enumerate()
        .map(|(i, reference)| bibtex_fields(&format!("ref{}", i + 1), reference))
        .collect::<Result<Vec<_>, _>>()?;

    for (i, fields) in entries.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }

        let lines: Vec<String> = fields
            .iter()
            .map(|(name, value)| format!("    {} = {{{}}}", name, value))
            .collect();

        writeln!(writer, "@article{{ref{},", i + 1)?;
        writeln!(writer, "{}", lines.join(",\n"))?;
        writeln!(writer, "}}")?;
    }
    writer.flush()?;
    Ok(())
}

fn bibtex_fields<'a>(
    key: &str,
    reference: &'a Reference,
) -> Result<Vec<(&'static str, &'a str)>, ExportError> {
    let mut fields = vec![
        ("title", reference.title.as_str()),
        ("author", reference.author.as_str()),
    ];
    if let Some(year) = &reference.year {
        fields.push(("year", year.as_str()));
    }

    for (field, value) in &fields {
        if !braces_balanced(value) {
            return Err(ExportError::UnbalancedBraces {
                key: key.to_string(),
                field: *field,
            });
        }
    }
    Ok(fields)
}

/// True when every `}` closes an earlier `{` and none are left open.
fn braces_balanced(value: &str) -> bool {
    let mut depth = 0usize;
    for c in value.chars() {
        match c {
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Writes references as a `Title,Author,Year` table. The header row is
/// always written, even for an empty list.
pub fn write_csv<W: Write>(writer: W, references: &[Reference]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["Title", "Author", "Year"])?;
    for reference in references {
        writer.write_record([
            reference.title.as_str(),
            reference.author.as_str(),
            reference.year.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one export file into `dir` and returns its path.
///
/// `formatted` is only read by [`ExportFormat::Docx`]; the other formats
/// serialize `references` directly.
pub fn export_to_dir(
    format: ExportFormat,
    dir: &Path,
    references: &[Reference],
    formatted: &[String],
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format.file_name());

    // Rendered in memory first so a rejected export leaves the old file alone.
    let mut buf = Cursor::new(Vec::new());
    match format {
        ExportFormat::Bibtex => write_bibtex(&mut buf, references)?,
        ExportFormat::Csv => write_csv(&mut buf, references)?,
        ExportFormat::Docx => write_docx(&mut buf, formatted)?,
    }
    fs::write(&path, buf.into_inner())?;

    info!(path = %path.display(), format = format.label(), "export written");
    Ok(path)
}
