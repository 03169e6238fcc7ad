//! DOCX text extraction: reads `word/document.xml` out of the ZIP container and walks it with
//! `quick-xml`.

use super::ExtractionError;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Join the document's body paragraphs with newlines.
pub(super) fn extract(path: &Path) -> Result<String, ExtractionError> {
    let docx_error = |message: String| ExtractionError::Docx {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|error| docx_error(error.to_string()))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|error| docx_error(format!("{DOCUMENT_PART}: {error}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|error| docx_error(format!("{DOCUMENT_PART}: {error}")))?;

    let paragraphs = body_paragraphs(&xml).map_err(docx_error)?;
    Ok(paragraphs.join("\n"))
}

/// Collect the text of top-level body paragraphs in document order.
///
/// Paragraphs inside tables or nested in text boxes are not body paragraphs and are skipped.
fn body_paragraphs(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut paragraph_depth = 0usize;
    let mut table_depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|error| format!("malformed XML at {}: {error}", reader.buffer_position()))?;

        match event {
            Event::Start(ref element) => match element.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 && table_depth == 0 {
                        current = Some(String::new());
                    }
                }
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(ref element) => {
                let collecting = paragraph_depth == 1 && in_run;
                match element.name().as_ref() {
                    b"w:p" if paragraph_depth == 0 && table_depth == 0 => {
                        paragraphs.push(String::new());
                    }
                    b"w:tab" if collecting => push_to(&mut current, "\t"),
                    b"w:br" | b"w:cr" if collecting => push_to(&mut current, "\n"),
                    _ => {}
                }
            }
            Event::End(ref element) => match element.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" => {
                    if paragraph_depth == 1 {
                        if let Some(paragraph) = current.take() {
                            paragraphs.push(paragraph);
                        }
                    }
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                }
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(ref text) if in_text && paragraph_depth == 1 => {
                let unescaped = text
                    .unescape()
                    .map_err(|error| format!("invalid text content: {error}"))?;
                push_to(&mut current, &unescaped);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_to(current: &mut Option<String>, fragment: &str) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(fragment);
    }
}
