//! Shared test constants and helpers for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tempfile::NamedTempFile;

/// Two complete BibTeX entries and one with only a title.
pub const SAMPLE_BIB: &str = r#"@article{lecun2015,
    title = {Deep Learning},
    author = {LeCun, Yann and Bengio, Yoshua and Hinton, Geoffrey},
    year = {2015},
    journal = {Nature}
}

@book{knuth1984,
    title = {The {TeX}book},
    author = {Knuth, Donald E.},
    year = 1984
}

@misc{untitled,
    title = {Lecture Notes}
}
"#;

/// One RIS record with two authors.
pub const SAMPLE_RIS: &str = "TY  - JOUR
TI  - Attention Is All You Need
AU  - Vaswani, Ashish
AU  - Shazeer, Noam
PY  - 2017///
ER  - 
";

/// Helper to create a temporary file with content
pub fn create_temp_file(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Reads the text of every paragraph in a `.docx` file, heading included.
pub fn read_docx_paragraphs(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"w:p" => current.clear(),
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::End(e) if e.name().as_ref() == b"w:p" => {
                paragraphs.push(std::mem::take(&mut current))
            }
            Event::Text(e) if in_text => current.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) if in_text => {
                let name: &[u8] = e.as_ref();
                let resolved = match name {
                    b"amp" => "&",
                    b"lt" => "<",
                    b"gt" => ">",
                    b"quot" => "\"",
                    b"apos" => "'",
                    _ => "",
                };
                current.push_str(resolved);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    paragraphs
}
