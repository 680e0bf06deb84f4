//! Resume text extraction. First stage of the analysis pipeline: turns the
//! uploaded PDF into plain text for the parser.

use std::path::Path;

use tracing::{info, warn};

use super::StageError;

/// Extracts plain text from a resume PDF on disk.
///
/// A file that exists but yields no text (scanned image, encrypted, corrupt)
/// is reported as unreadable so the caller can tell the student to re-upload,
/// rather than feeding an empty string into the parser.
pub fn extract_resume_text(path: &Path) -> Result<String, StageError> {
    if !path.exists() {
        return Err(StageError::DocumentMissing);
    }

    let text = pdf_extract::extract_text(path).map_err(|e| {
        warn!("PDF extraction failed for {}: {e}", path.display());
        StageError::DocumentUnreadable
    })?;

    if text.trim().is_empty() {
        warn!("PDF at {} produced no extractable text", path.display());
        return Err(StageError::DocumentUnreadable);
    }

    info!(
        "Extracted {} chars of resume text from {}",
        text.len(),
        path.display()
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_document_missing() {
        let err = extract_resume_text(Path::new("/nonexistent/resume.pdf")).unwrap_err();
        assert!(matches!(err, StageError::DocumentMissing));
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"not a pdf at all").unwrap();
        let err = extract_resume_text(file.path()).unwrap_err();
        assert!(matches!(err, StageError::DocumentUnreadable));
    }
}
