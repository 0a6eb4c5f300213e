//! Client-side file screening.
//!
//! Files are classified before any transfer is attempted; a rejected file
//! never reaches the network. Actual transfer belongs to the submission
//! orchestrator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::OnboardConfig;
use crate::error::RejectReason;

/// Outcome of screening one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Accepted,
    Rejected(RejectReason),
}

/// A file the user offered for upload, with its screening outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCandidate {
    pub file_name: String,
    /// Declared MIME type (from the picker, or guessed from the extension).
    pub mime_type: String,
    pub size_bytes: u64,
    /// Local path, when the file came from disk. Absent for in-memory files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub outcome: UploadOutcome,
}

impl UploadCandidate {
    pub fn is_accepted(&self) -> bool {
        self.outcome == UploadOutcome::Accepted
    }

    /// The rejection reason, if the candidate was rejected.
    pub fn rejection(&self) -> Option<&RejectReason> {
        match &self.outcome {
            UploadOutcome::Rejected(reason) => Some(reason),
            UploadOutcome::Accepted => None,
        }
    }
}

/// Screens files against the configured type, size and count limits.
#[derive(Debug, Clone)]
pub struct FileUploadManager {
    accepted_mime_types: Vec<String>,
    per_file_limit_bytes: u64,
    max_files_per_step: usize,
}

impl FileUploadManager {
    pub fn new(config: &OnboardConfig) -> Self {
        Self {
            accepted_mime_types: config.accepted_mime_types.clone(),
            per_file_limit_bytes: config.per_file_limit_bytes,
            max_files_per_step: config.max_files_per_step,
        }
    }

    /// Classify one offered file. `accepted_count` is how many files the
    /// step already holds; the count check runs first so a full step rejects
    /// everything regardless of type or size.
    pub fn screen(
        &self,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
        accepted_count: usize,
    ) -> UploadCandidate {
        let file_name = file_name.into();
        let mime_type = mime_type.into();

        let outcome = if accepted_count >= self.max_files_per_step {
            UploadOutcome::Rejected(RejectReason::TooManyFiles {
                max: self.max_files_per_step,
            })
        } else if !self.accepted_mime_types.iter().any(|m| m == &mime_type) {
            UploadOutcome::Rejected(RejectReason::UnsupportedType {
                mime: mime_type.clone(),
            })
        } else if size_bytes > self.per_file_limit_bytes {
            UploadOutcome::Rejected(RejectReason::FileTooLarge {
                size: size_bytes,
                limit: self.per_file_limit_bytes,
            })
        } else {
            UploadOutcome::Accepted
        };

        if let UploadOutcome::Rejected(reason) = &outcome {
            tracing::debug!(file = %file_name, code = reason.code(), "File rejected");
        }

        UploadCandidate {
            file_name,
            mime_type,
            size_bytes,
            path: None,
            outcome,
        }
    }

    /// Screen a file on disk, guessing its MIME type from the extension and
    /// reading its size from metadata.
    pub async fn screen_path(
        &self,
        path: &Path,
        accepted_count: usize,
    ) -> std::io::Result<UploadCandidate> {
        let meta = tokio::fs::metadata(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        let mime = mime_for_path(path);
        let mut candidate = self.screen(file_name, mime, meta.len(), accepted_count);
        candidate.path = Some(path.to_path_buf());
        Ok(candidate)
    }
}

/// Guess a MIME type from a file extension. Unknown extensions map to
/// `application/octet-stream`, which the screen step then rejects.
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("doc") => "application/msword",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn manager() -> FileUploadManager {
        FileUploadManager::new(&OnboardConfig::default())
    }

    #[test]
    fn two_mib_pdf_is_accepted() {
        let candidate = manager().screen("deck.pdf", "application/pdf", 2 * MIB, 0);
        assert!(candidate.is_accepted());
    }

    #[test]
    fn twelve_mib_pdf_is_too_large() {
        let candidate = manager().screen("deck.pdf", "application/pdf", 12 * MIB, 0);
        let reason = candidate.rejection().unwrap();
        assert_eq!(reason.code(), "file-too-large");
        assert_eq!(
            *reason,
            RejectReason::FileTooLarge {
                size: 12 * MIB,
                limit: 10 * MIB,
            }
        );
    }

    #[test]
    fn docx_is_unsupported() {
        let mime = mime_for_path(Path::new("cap-table.docx"));
        let candidate = manager().screen("cap-table.docx", mime, MIB, 0);
        assert_eq!(candidate.rejection().unwrap().code(), "unsupported-type");
    }

    #[test]
    fn sixth_file_is_too_many() {
        let m = manager();
        let candidate = m.screen("sixth.pdf", "application/pdf", MIB, 5);
        assert_eq!(candidate.rejection().unwrap().code(), "too-many-files");
        // Count check wins even when the file would also be oversized
        let candidate = m.screen("sixth.pdf", "application/pdf", 12 * MIB, 5);
        assert_eq!(candidate.rejection().unwrap().code(), "too-many-files");
    }

    #[test]
    fn boundary_sizes() {
        let m = manager();
        assert!(m.screen("a.pdf", "application/pdf", 10 * MIB, 0).is_accepted());
        assert!(!m.screen("a.pdf", "application/pdf", 10 * MIB + 1, 0).is_accepted());
        assert!(m.screen("a.pdf", "application/pdf", 0, 4).is_accepted());
    }

    #[test]
    fn mime_guessing() {
        assert_eq!(mime_for_path(Path::new("a.PDF")), "application/pdf");
        assert_eq!(mime_for_path(Path::new("shot.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn screen_path_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pdf");
        tokio::fs::write(&path, vec![0u8; 1024]).await.unwrap();

        let candidate = manager().screen_path(&path, 0).await.unwrap();
        assert!(candidate.is_accepted());
        assert_eq!(candidate.size_bytes, 1024);
        assert_eq!(candidate.mime_type, "application/pdf");
        assert_eq!(candidate.path.as_deref(), Some(path.as_path()));
    }
}
