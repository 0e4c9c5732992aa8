//! Minimal WordprocessingML (`.docx`) writer.
//!
//! The package holds a single document part with a level-1 heading followed
//! by one plain paragraph per line of text, plus the style part that defines
//! the heading.

use std::borrow::Cow;
use std::io::{Seek, Write};

use quick_xml::escape::partial_escape;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::export::ExportError;

/// Heading written at the top of every exported document.
pub const DOCUMENT_HEADING: &str = "Formatted References";

/// Writes a `.docx` package containing the heading and one paragraph per
/// entry of `paragraphs`. An empty slice yields a heading-only document.
pub fn write_docx<W: Write + Seek>(writer: W, paragraphs: &[String]) -> Result<(), ExportError> {
    let mut zip = ZipWriter::new(writer);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS_XML.as_bytes())?;

    zip.start_file("word/_rels/document.xml.rels", options)?;
    zip.write_all(DOCUMENT_RELS_XML.as_bytes())?;

    zip.start_file("word/styles.xml", options)?;
    zip.write_all(STYLES_XML.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml(DOCUMENT_HEADING, paragraphs).as_bytes())?;

    zip.finish()?;
    Ok(())
}

fn document_xml(heading: &str, paragraphs: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
"#,
    );

    xml.push_str(&paragraph_xml(Some("Heading1"), heading));
    for text in paragraphs {
        xml.push_str(&paragraph_xml(None, text));
    }

    xml.push_str("    <w:sectPr/>\n  </w:body>\n</w:document>\n");
    xml
}

fn paragraph_xml(style: Option<&str>, text: &str) -> String {
    let properties = style
        .map(|s| format!("<w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>", s))
        .unwrap_or_default();
    let text = xml_text(text);
    format!(
        "    <w:p>{}<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>\n",
        properties,
        partial_escape(&*text)
    )
}

/// Drops characters XML 1.0 cannot carry (C0 controls other than tab,
/// newline and carriage return, and U+FFFE/U+FFFF).
fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..)
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="480" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="32"/></w:rPr>
  </w:style>
</w:styles>"#;
