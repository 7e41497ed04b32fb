//! Document text extraction — PDF and DOCX only.
//!
//! ARCHITECTURAL RULE: callers reject unsupported uploads *before* the
//! interview core ever sees them. This module fails fast with a typed error
//! for anything that is not `.pdf` or `.docx`.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}. Only .pdf and .docx are supported")]
    UnsupportedFormat(String),

    #[error("Failed to read document: {0}")]
    Read(String),
}

/// Extracts plain text from a PDF or DOCX file, dispatching on extension.
pub fn extract_text(path: &Path) -> Result<String, DocumentError> {
    match extension_of(path).as_deref() {
        Some("pdf") => extract_pdf(path),
        Some("docx") => extract_docx(path),
        other => Err(DocumentError::UnsupportedFormat(
            other.map(str::to_owned).unwrap_or_else(|| "none".to_owned()),
        )),
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn extract_pdf(path: &Path) -> Result<String, DocumentError> {
    pdf_extract::extract_text(path).map_err(|e| DocumentError::Read(e.to_string()))
}

/// A DOCX is a zip archive; the body lives in `word/document.xml`.
/// Text nodes are concatenated, with a newline at each paragraph close.
fn extract_docx(path: &Path) -> Result<String, DocumentError> {
    let file = std::fs::File::open(path).map_err(|e| DocumentError::Read(e.to_string()))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| DocumentError::Read(e.to_string()))?;
    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::Read(e.to_string()))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Read(e.to_string()))?;

    extract_docx_body(&xml)
}

fn extract_docx_body(xml: &str) -> Result<String, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut buf = Vec::new();
    // Only text nodes inside <w:t> are document content; everything else is
    // formatting markup or indentation whitespace.
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::Text(t)) if in_text_run => {
                let chunk = t.unescape().map_err(|e| DocumentError::Read(e.to_string()))?;
                text.push_str(&chunk);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::Read(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = extract_text(Path::new("resume.txt")).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn test_missing_extension_is_rejected() {
        let err = extract_text(Path::new("resume")).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_extension_dispatch_is_case_insensitive() {
        // Dispatch accepts .PDF; the read itself fails because the file is absent.
        let err = extract_text(Path::new("/nonexistent/resume.PDF")).unwrap_err();
        assert!(matches!(err, DocumentError::Read(_)));
    }

    #[test]
    fn test_docx_body_extraction_joins_paragraphs() {
        let xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>John Doe</w:t></w:r></w:p>
                <w:p><w:r><w:t>Senior </w:t></w:r><w:r><w:t>Developer</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;
        let text = extract_docx_body(xml).unwrap();
        assert_eq!(text, "John Doe\nSenior Developer\n");
    }

    #[test]
    fn test_docx_body_unescapes_entities() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
            <w:p><w:r><w:t>C&amp;C++ engineer</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let text = extract_docx_body(xml).unwrap();
        assert!(text.contains("C&C++ engineer"));
    }

    #[test]
    fn test_docx_body_rejects_malformed_xml() {
        assert!(extract_docx_body("<w:document><unclosed").is_err());
    }
}
