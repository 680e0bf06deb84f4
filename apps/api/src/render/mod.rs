//! Personalized resume rendering: layout, PDF serialization, and the on-disk
//! naming scheme for rendered files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use uuid::Uuid;

use crate::pipeline::personalize::PersonalizedPackage;
use crate::storage;

pub mod layout;
pub mod pdf;

/// Reduces arbitrary user-supplied text to a filesystem-safe token:
/// lowercase alphanumerics with single dashes. Falls back to "student" if
/// nothing survives.
pub fn safe_token(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        "student".to_string()
    } else {
        out
    }
}

/// Where the rendered resume for this student + drive lives. Deterministic so
/// re-renders overwrite and the download endpoint can find it without a
/// database column.
pub fn personalized_resume_path(upload_dir: &str, enrollment_no: &str, drive_id: Uuid) -> PathBuf {
    Path::new(upload_dir)
        .join("resumes")
        .join("personalized")
        .join(format!("{}-drive-{drive_id}.pdf", safe_token(enrollment_no)))
}

/// Renders the personalized resume PDF and writes it atomically.
/// Returns the path the file was written to.
pub fn render_personalized_resume(
    upload_dir: &str,
    enrollment_no: &str,
    drive_id: Uuid,
    pkg: &PersonalizedPackage,
) -> Result<String> {
    let pages = layout::layout_package(pkg);
    let title = format!("{} - Resume", pkg.header.name);
    let bytes = pdf::render_pdf(&pages, &title)?;

    let path = personalized_resume_path(upload_dir, enrollment_no, drive_id);
    storage::write_atomic(&path, &bytes)
        .with_context(|| format!("write rendered resume to {}", path.display()))?;

    info!(
        "Rendered personalized resume: {} ({} pages, {} bytes)",
        path.display(),
        pages.len(),
        bytes.len()
    );
    Ok(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_token_collapses_and_lowercases() {
        assert_eq!(safe_token("EN/2021..001"), "en-2021-001");
        assert_eq!(safe_token("  EN2021001  "), "en2021001");
    }

    #[test]
    fn test_safe_token_fallback() {
        assert_eq!(safe_token("///"), "student");
        assert_eq!(safe_token(""), "student");
    }

    #[test]
    fn test_path_is_deterministic_and_traversal_safe() {
        let drive_id = Uuid::nil();
        let path = personalized_resume_path("uploads", "../../etc/passwd", drive_id);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(
            name,
            format!("etc-passwd-drive-{drive_id}.pdf")
        );
        assert!(path.starts_with("uploads/resumes/personalized"));
    }

    #[test]
    fn test_render_writes_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = PersonalizedPackage {
            professional_summary: "Engineer".to_string(),
            ..PersonalizedPackage::default()
        };
        let path = render_personalized_resume(
            dir.path().to_str().unwrap(),
            "EN2021001",
            Uuid::nil(),
            &pkg,
        )
        .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
