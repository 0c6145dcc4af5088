//! Error types for the docx2pdf-tool library.
//!
//! Every failure of an invocation is a [`Docx2PdfError`]. The library-level
//! entry points ([`crate::invoke::convert_url`], [`crate::invoke::convert_bytes`])
//! return it as `Err`, while the plugin-level [`crate::invoke::invoke`] never
//! fails: it logs the error and turns it into exactly one structured error
//! message via [`crate::output::ToolMessage::error`].
//!
//! Each variant has a stable machine-readable [`code`](Docx2PdfError::code) so
//! a host can branch on the failure class without parsing the message text.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docx2pdf-tool library.
#[derive(Debug, Error)]
pub enum Docx2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The file reference, or its `url` attribute, is absent.
    #[error("Missing input: {detail}")]
    MissingInput { detail: String },

    /// Network fault or non-success HTTP status while fetching the document.
    #[error("Failed to download '{url}': {source}")]
    DownloadFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // ── Staging errors ────────────────────────────────────────────────────
    /// Could not create the staging directory or write into it.
    #[error("Failed to stage '{path}': {source}")]
    StagingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter binary could not be started (usually not on `PATH`).
    #[error(
        "Failed to start converter '{program}': {source}\n\
Install LibreOffice or point DOCX2PDF_CONVERTER at the binary."
    )]
    ConverterUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter exited with a non-success status.
    #[error("LibreOffice conversion failed with exit code {exit_code}\nSTDOUT: {stdout}\nSTDERR: {stderr}")]
    ConversionFailed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// The converter exceeded its wall-clock budget and was killed.
    #[error("LibreOffice conversion timed out after {secs}s")]
    ConversionTimeout { secs: u64 },

    /// The converter exited successfully but left no PDF behind.
    #[error("No PDF found after conversion in '{dir}', directory contents: {listing:?}")]
    OutputNotFound { dir: PathBuf, listing: Vec<String> },

    // ── Response errors ───────────────────────────────────────────────────
    /// The response messages could not be built.
    #[error("Failed to package response: {0}")]
    PackagingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Docx2PdfError {
    /// Stable snake_case identifier used in the `error` field of error messages.
    pub fn code(&self) -> &'static str {
        match self {
            Docx2PdfError::MissingInput { .. } => "missing_input",
            Docx2PdfError::DownloadFailed { .. } => "download_failed",
            Docx2PdfError::StagingFailed { .. } => "staging_failed",
            Docx2PdfError::ConverterUnavailable { .. } => "converter_unavailable",
            Docx2PdfError::ConversionFailed { .. } => "conversion_failed",
            Docx2PdfError::ConversionTimeout { .. } => "conversion_timeout",
            Docx2PdfError::OutputNotFound { .. } => "output_not_found",
            Docx2PdfError::PackagingFailed(_) => "packaging_failed",
            Docx2PdfError::InvalidConfig(_) => "invalid_config",
            Docx2PdfError::Internal(_) => "internal",
        }
    }

    pub(crate) fn missing(detail: impl Into<String>) -> Self {
        Docx2PdfError::MissingInput {
            detail: detail.into(),
        }
    }
}
