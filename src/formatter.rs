//! Citation formatting.
//!
//! Formatting is plain field substitution into the style's template. Field
//! values are never checked: `N/A` and `None` placeholders show up in the
//! output exactly as stored.

use crate::reference::Reference;
use crate::style::CitationStyle;

/// Formats one reference.
///
/// `position` is the 1-based position of the reference in the list being
/// formatted; only IEEE uses it.
pub fn format_reference(style: CitationStyle, position: usize, reference: &Reference) -> String {
    let Reference { title, author, .. } = reference;
    let year = reference.year_display();

    match style {
        CitationStyle::Apa => format!("{author} ({year}). {title}."),
        CitationStyle::Ieee => format!("[{position}] {author}, \"{title},\" {year}."),
        CitationStyle::Mla => format!("{author}. \"{title}\" ({year})."),
        CitationStyle::Chicago => format!("{author}, \"{title}\" ({year})."),
    }
}

/// Formats every reference in order.
///
/// IEEE numbers are derived from the current order on every call, so
/// reordering the list renumbers it.
pub fn format_references(style: CitationStyle, references: &[Reference]) -> Vec<String> {
    references
        .iter()
        .enumerate()
        .map(|(i, reference)| format_reference(style, i + 1, reference))
        .collect()
}
