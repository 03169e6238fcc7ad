//! PDF text extraction backed by `lopdf`.

use super::ExtractionError;
use lopdf::Document;
use std::path::Path;

/// Concatenate the text of every page in page order.
///
/// A page whose content stream cannot be decoded contributes nothing; only a document that
/// fails to load is an error.
pub(super) fn extract(path: &Path) -> Result<String, ExtractionError> {
    let document = Document::load(path).map_err(|error| ExtractionError::Pdf {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;

    let mut text = String::new();
    for page_number in document.get_pages().into_keys() {
        match document.extract_text(&[page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    page = page_number,
                    %error,
                    "Failed to extract PDF page text; continuing"
                );
            }
        }
    }

    Ok(text)
}
