//! RIS import.
//!
//! RIS is a line-oriented tagged format:
//!
//! ```text
//! TY  - JOUR
//! TI  - Example Article
//! AU  - Smith, John
//! PY  - 2023///
//! ER  -
//! ```
//!
//! Each record runs from a `TY` line to the next `ER` line. Untagged lines
//! inside a record continue the previous field.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::import::{ImportError, Importer};
use crate::reference::Reference;

/// `TAG  - value`, with the value optional (`ER  -`).
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][A-Z0-9]) {1,2}-(?: (.*))?$").unwrap());

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}").unwrap());

/// Importer for `.ris` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct RisImporter;

/// Fields collected for the record currently being read.
#[derive(Debug, Default)]
struct RisRecord {
    title: Option<String>,
    authors: Vec<String>,
    year: Option<String>,
    last_tag: Option<String>,
}

impl RisRecord {
    fn set(&mut self, tag: &str, value: &str) {
        match tag {
            "TI" | "T1" if self.title.is_none() && !value.is_empty() => {
                self.title = Some(value.to_string());
            }
            "AU" | "A1" if !value.is_empty() => self.authors.push(value.to_string()),
            "PY" | "Y1" | "DA" if self.year.is_none() && !value.is_empty() => {
                self.year = Some(extract_year(value));
            }
            _ => {}
        }
        self.last_tag = Some(tag.to_string());
    }

    /// Appends a continuation line to the title when the title was the last
    /// field seen. Continuations of other fields are dropped.
    fn continue_last(&mut self, text: &str) {
        if !matches!(self.last_tag.as_deref(), Some("TI") | Some("T1")) {
            return;
        }
        if let Some(title) = self.title.as_mut() {
            title.push(' ');
            title.push_str(text);
        }
    }

    fn into_reference(self) -> Reference {
        let author = if self.authors.is_empty() {
            None
        } else {
            Some(self.authors.join(" and "))
        };
        Reference::from_fields(self.title, author, self.year)
    }
}

/// `PY  - 2023/05/01/` and `DA  - 2023///` both carry the year up front.
fn extract_year(value: &str) -> String {
    YEAR_RE
        .find(value)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| value.to_string())
}

impl Importer for RisImporter {
    fn parse(&self, content: &str) -> Result<Vec<Reference>, ImportError> {
        let mut references = Vec::new();
        let mut current: Option<(usize, RisRecord)> = None;

        for (line_num, raw_line) in content.lines().enumerate() {
            let line_num = line_num + 1;
            let line = raw_line.trim_start_matches('\u{feff}').trim_end();
            if line.trim().is_empty() {
                continue;
            }

            let Some(caps) = TAG_RE.captures(line) else {
                match current.as_mut() {
                    Some((_, record)) => record.continue_last(line.trim()),
                    None => {
                        return Err(ImportError::RisError {
                            line: line_num,
                            message: "text outside of a record".to_string(),
                        })
                    }
                }
                continue;
            };

            let tag = &caps[1];
            let value = caps.get(2).map_or("", |m| m.as_str()).trim();

            match tag {
                "TY" => {
                    if let Some((start, _)) = &current {
                        return Err(ImportError::RisError {
                            line: line_num,
                            message: format!("record starting at line {} has no ER tag", start),
                        });
                    }
                    current = Some((line_num, RisRecord::default()));
                }
                "ER" => match current.take() {
                    Some((_, record)) => references.push(record.into_reference()),
                    None => {
                        return Err(ImportError::RisError {
                            line: line_num,
                            message: "ER tag without a matching TY tag".to_string(),
                        })
                    }
                },
                _ => match current.as_mut() {
                    Some((_, record)) => record.set(tag, value),
                    None => {
                        return Err(ImportError::RisError {
                            line: line_num,
                            message: format!("tag {} outside of a record", tag),
                        })
                    }
                },
            }
        }

        if let Some((start, _)) = &current {
            return Err(ImportError::RisError {
                line: *start,
                message: "record is missing its ER tag".to_string(),
            });
        }

        debug!(count = references.len(), "parsed RIS document");
        Ok(references)
    }
}
