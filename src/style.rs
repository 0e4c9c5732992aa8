//! Citation styles.
//!
//! Styles are a closed set of built-in templates, looked up by name.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when selecting a style.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StyleError {
    #[error("unknown citation style '{0}'")]
    Unknown(String),
}

/// A built-in citation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CitationStyle {
    /// `Author (Year). Title.`
    #[default]
    Apa,
    /// `[n] Author, "Title," Year.`
    Ieee,
    /// `Author. "Title" (Year).`
    Mla,
    /// `Author, "Title" (Year).`
    Chicago,
}

/// Single source of truth for builtin styles: (name, style).
const BUILTIN_STYLES: &[(&str, CitationStyle)] = &[
    ("apa", CitationStyle::Apa),
    ("ieee", CitationStyle::Ieee),
    ("mla", CitationStyle::Mla),
    ("chicago", CitationStyle::Chicago),
];

impl CitationStyle {
    /// Returns a built-in style by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTIN_STYLES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(_, style)| *style)
    }

    /// The lowercase name the style is selected by.
    pub fn name(self) -> &'static str {
        BUILTIN_STYLES
            .iter()
            .find(|(_, style)| *style == self)
            .map(|(n, _)| *n)
            .unwrap_or("apa")
    }

    /// The label shown to users (`APA`, `IEEE`, `MLA`, `Chicago`).
    pub fn label(self) -> &'static str {
        match self {
            CitationStyle::Apa => "APA",
            CitationStyle::Ieee => "IEEE",
            CitationStyle::Mla => "MLA",
            CitationStyle::Chicago => "Chicago",
        }
    }
}

impl FromStr for CitationStyle {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CitationStyle::from_name(s).ok_or_else(|| StyleError::Unknown(s.to_string()))
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns the list of available builtin style names.
pub fn style_names() -> Vec<&'static str> {
    BUILTIN_STYLES.iter().map(|(n, _)| *n).collect()
}
