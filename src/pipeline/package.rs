//! Response packaging: filename normalization and the success message pair.

use crate::error::Docx2PdfError;
use crate::output::{ConvertedDocument, ToolMessage};
use tracing::debug;

/// Normalize a requested output filename.
///
/// Whitespace is trimmed, a blank name becomes `default`, and `.pdf` is
/// appended unless the name already ends with it (case-insensitively). The
/// name lands in the host's file store, so path separators and NUL bytes are
/// rejected.
pub fn normalize_filename(requested: &str, default: &str) -> Result<String, Docx2PdfError> {
    let name = match requested.trim() {
        "" => default.trim(),
        n => n,
    };

    if name.contains(['/', '\\', '\0']) {
        return Err(Docx2PdfError::PackagingFailed(format!(
            "output filename {name:?} must not contain path separators"
        )));
    }

    if name.to_lowercase().ends_with(".pdf") {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}.pdf"))
    }
}

/// Build the success response: a text acknowledgment, then the attachment.
///
/// The acknowledgment is never empty; some downstream consumers of the
/// message stream mishandle an empty first text.
pub fn package(
    pdf: Vec<u8>,
    requested_filename: &str,
    default_filename: &str,
) -> Result<Vec<ToolMessage>, Docx2PdfError> {
    if pdf.is_empty() {
        return Err(Docx2PdfError::PackagingFailed(
            "converter produced an empty PDF".into(),
        ));
    }
    let filename = normalize_filename(requested_filename, default_filename)?;
    debug!("Output filename: {}", filename);

    Ok(vec![
        ToolMessage::text(format!("Generated file: {filename}")),
        ToolMessage::blob(ConvertedDocument::new(pdf, filename)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BlobMeta;

    #[test]
    fn appends_extension_when_missing() {
        assert_eq!(normalize_filename("report", "converted.pdf").unwrap(), "report.pdf");
        assert_eq!(
            normalize_filename("report.docx", "converted.pdf").unwrap(),
            "report.docx.pdf"
        );
    }

    #[test]
    fn keeps_existing_extension_case_insensitively() {
        assert_eq!(normalize_filename("report.PDF", "converted.pdf").unwrap(), "report.PDF");
        assert_eq!(normalize_filename("report.pdf", "converted.pdf").unwrap(), "report.pdf");
        assert_eq!(normalize_filename("Report.Pdf", "converted.pdf").unwrap(), "Report.Pdf");
    }

    #[test]
    fn blank_name_uses_default() {
        assert_eq!(normalize_filename("  ", "converted.pdf").unwrap(), "converted.pdf");
    }

    #[test]
    fn non_ascii_names_survive() {
        assert_eq!(normalize_filename("竣工报告", "converted.pdf").unwrap(), "竣工报告.pdf");
    }

    #[test]
    fn path_separators_are_rejected() {
        for bad in ["../etc/passwd", "a\\b", "a\0b"] {
            let err = normalize_filename(bad, "converted.pdf").unwrap_err();
            assert_eq!(err.code(), "packaging_failed", "name: {bad:?}");
        }
    }

    #[test]
    fn package_emits_text_then_blob() {
        let messages = package(b"%PDF-1.7".to_vec(), "report", "converted.pdf").unwrap();
        assert_eq!(messages.len(), 2);

        match &messages[0] {
            ToolMessage::Text { text } => {
                assert!(!text.is_empty());
                assert!(text.contains("report.pdf"));
            }
            other => panic!("expected text first, got {other:?}"),
        }
        assert_eq!(
            messages[1],
            ToolMessage::Blob {
                blob: b"%PDF-1.7".to_vec(),
                meta: BlobMeta {
                    mime_type: "application/pdf".into(),
                    filename: "report.pdf".into(),
                },
            }
        );
    }

    #[test]
    fn empty_pdf_is_packaging_failed() {
        let err = package(Vec::new(), "report", "converted.pdf").unwrap_err();
        assert_eq!(err.code(), "packaging_failed");
    }
}
