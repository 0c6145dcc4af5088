//! Per-invocation staging area on disk.
//!
//! LibreOffice only converts files, not byte buffers, and it is a
//! single-instance application: two processes sharing a user profile block on
//! the profile lock or corrupt it. Each invocation therefore gets its own
//! [`TempDir`] holding the input document, a private profile directory and
//! the converter's output. The directory is removed when the
//! [`StagingArea`] is dropped, on every exit path including panics.

use crate::error::Docx2PdfError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Filename the downloaded document is written to.
pub const INPUT_FILENAME: &str = "input.docx";

/// Name of the PDF LibreOffice produces for [`INPUT_FILENAME`].
pub const EXPECTED_OUTPUT_FILENAME: &str = "input.pdf";

/// Name of the isolated converter profile directory.
pub const PROFILE_DIRNAME: &str = "lo_user";

/// An exclusively-owned scratch directory for one conversion.
#[derive(Debug)]
pub struct StagingArea {
    input_path: PathBuf,
    profile_dir: PathBuf,
    dir: TempDir,
}

impl StagingArea {
    /// Create the directory under `root` (or the system temp dir), write
    /// `document` to [`INPUT_FILENAME`] and create the profile directory.
    pub async fn create(root: Option<&Path>, document: &[u8]) -> Result<Self, Docx2PdfError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docx2pdf-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| Docx2PdfError::StagingFailed {
            path: root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir),
            source,
        })?;
        debug!("Staging directory: {}", dir.path().display());

        let input_path = dir.path().join(INPUT_FILENAME);
        tokio::fs::write(&input_path, document)
            .await
            .map_err(|source| Docx2PdfError::StagingFailed {
                path: input_path.clone(),
                source,
            })?;
        debug!("Wrote {} bytes to {}", document.len(), input_path.display());

        let profile_dir = dir.path().join(PROFILE_DIRNAME);
        tokio::fs::create_dir_all(&profile_dir)
            .await
            .map_err(|source| Docx2PdfError::StagingFailed {
                path: profile_dir.clone(),
                source,
            })?;

        Ok(Self {
            input_path,
            profile_dir,
            dir,
        })
    }

    /// The staging directory itself; also the converter's output directory.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// The profile directory as a `file://` URL, the form LibreOffice's
    /// `-env:UserInstallation=` expects.
    pub fn profile_url(&self) -> Result<String, Docx2PdfError> {
        reqwest::Url::from_directory_path(&self.profile_dir)
            .map(|u| u.as_str().trim_end_matches('/').to_string())
            .map_err(|_| {
                Docx2PdfError::Internal(format!(
                    "Profile directory is not absolute: {}",
                    self.profile_dir.display()
                ))
            })
    }

    /// Names of the entries in the staging directory, sorted.
    pub async fn listing(&self) -> Result<Vec<String>, Docx2PdfError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(self.dir())
            .await
            .map_err(|source| self.io_error(source))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| self.io_error(source))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn io_error(&self, source: std::io::Error) -> Docx2PdfError {
        Docx2PdfError::StagingFailed {
            path: self.dir().to_path_buf(),
            source,
        }
    }
}
