//! The reference record.
//!
//! A [`Reference`] always carries exactly three fields. Importers resolve
//! missing values to sentinels when they build a record, so nothing
//! downstream has to guess at defaults.

use serde::{Deserialize, Serialize};

/// Placeholder stored when a source document has no value for a field.
pub const NOT_AVAILABLE: &str = "N/A";

/// Text rendered for a year that is absent altogether (`year: None`).
pub const MISSING_YEAR: &str = "None";

/// A bibliographic reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author")]
    pub author: String,
    /// Kept as text: sources hand us anything from `2020` to `circa 1850`.
    #[serde(rename = "Year")]
    pub year: Option<String>,
}

impl Reference {
    /// Creates a reference from values that are already resolved.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: Option<impl Into<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: year.map(Into::into),
        }
    }

    /// Creates a reference from optional source fields, substituting
    /// [`NOT_AVAILABLE`] for every field the source did not provide.
    pub fn from_fields(title: Option<String>, author: Option<String>, year: Option<String>) -> Self {
        Self {
            title: title.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            author: author.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            year: Some(year.unwrap_or_else(|| NOT_AVAILABLE.to_string())),
        }
    }

    /// The year as it appears in formatted output.
    pub fn year_display(&self) -> &str {
        self.year.as_deref().unwrap_or(MISSING_YEAR)
    }
}
