//! Helpers for normalizing client-supplied filenames before they touch the filesystem.

use unicode_normalization::UnicodeNormalization;

use crate::extraction::DocumentFormat;

/// Reduce a client filename to a safe ASCII basename.
///
/// The name is NFKD-decomposed so accented letters keep their base letter, then path separators
/// become spaces, remaining non-ASCII characters are dropped, whitespace runs collapse to
/// `_`, everything outside `[A-Za-z0-9_.-]` is removed, and leading/trailing `.`/`_` are stripped.
/// The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|ch| if ch == '/' || ch == '\\' { ' ' } else { ch })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(*ch, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|ch: char| ch == '.' || ch == '_')
        .to_string()
}

/// Name under which an accepted upload is stored and reported.
///
/// Falls back to `upload.<ext>` when sanitizing strips the name or its extension.
pub fn stored_filename(filename: &str, format: DocumentFormat) -> String {
    let sanitized = secure_filename(filename);
    if DocumentFormat::from_filename(&sanitized) == Some(format) {
        sanitized
    } else {
        format!("upload.{}", format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_filename_strips_paths_and_symbols() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename(r"C:\Users\me\report.pdf"), "C_Users_me_report.pdf");
        assert_eq!(secure_filename("résumé (final).docx"), "resume_final.docx");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn secure_filename_decomposes_accents_and_compatibility_forms() {
        assert_eq!(secure_filename("Café Crème.txt"), "Cafe_Creme.txt");
        assert_eq!(secure_filename("ﬁnal report.pdf"), "final_report.pdf");
        assert_eq!(secure_filename("Ångström.docx"), "Angstrom.docx");
    }

    #[test]
    fn stored_filename_keeps_allowed_extension() {
        assert_eq!(
            stored_filename("Quarterly Notes.TXT", DocumentFormat::PlainText),
            "Quarterly_Notes.TXT"
        );
        assert_eq!(stored_filename("日本.pdf", DocumentFormat::Pdf), "upload.pdf");
        assert_eq!(stored_filename("..docx", DocumentFormat::Docx), "upload.docx");
    }
}
