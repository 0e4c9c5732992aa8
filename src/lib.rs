//! refkit: collect, format and export bibliographic references.
//!
//! This library provides functionality to:
//! - Import references from BibTeX, RIS and edited CSV tables
//! - Resolve DOIs into references through a Crossref-style endpoint
//! - Format references as APA, IEEE, MLA or Chicago citations
//! - Export references as BibTeX, CSV or a Word document

pub mod bibtex;
pub mod docx;
pub mod export;
pub mod formatter;
pub mod import;
pub mod lookup;
pub mod reference;
pub mod ris;
pub mod session;
pub mod store;
pub mod style;
pub mod table;

pub use export::{export_to_dir, write_bibtex, write_csv, ExportError, ExportFormat};
pub use formatter::{format_reference, format_references};
pub use import::{load_references, ImportError, Importer, InputFormat};
pub use lookup::{parse_identifiers, HttpTransport, LookupFailure, LookupReport, MetadataClient};
pub use reference::Reference;
pub use session::Session;
pub use store::ReferenceStore;
pub use style::{style_names, CitationStyle};
