//! # docx2pdf-tool
//!
//! A plugin action that converts a DOCX document to PDF with LibreOffice.
//!
//! The host passes a file reference (a handle with a `url`) and an optional
//! output filename. The action downloads the document, runs LibreOffice
//! headless in a private scratch directory, and answers with a short text
//! acknowledgment followed by the PDF as a binary attachment. Any failure is
//! answered with exactly one structured error message instead.
//!
//! ## Pipeline Overview
//!
//! ```text
//! request
//!  │
//!  ├─ 1. Params    pick the file reference, join its URL with the base address
//!  ├─ 2. Download  HTTP GET, 30 s timeout, whole body in memory
//!  ├─ 3. Convert   TempDir + private profile, `libreoffice --convert-to pdf`, 120 s timeout
//!  └─ 4. Package   normalize filename, emit text + blob messages
//! ```
//!
//! Invocations share nothing: each has its own staging directory and its own
//! LibreOffice profile, so any number can run at once on one host.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docx2pdf_tool::{invoke, ToolConfig, ToolMessage, ToolParameters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Base address from $URL, falling back to the built-in host
//!     let config = ToolConfig::from_env()?;
//!     let params: ToolParameters = serde_json::from_str(
//!         r#"{"completion_report": [{"url": "/files/tools/report.docx"}]}"#,
//!     )?;
//!     for message in invoke(&params, &config).await {
//!         if let ToolMessage::Blob { blob, meta } = message {
//!             std::fs::write(&meta.filename, blob)?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docx2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Requirements
//!
//! LibreOffice must be installed on the host and reachable on `PATH` as
//! `libreoffice` (or set `DOCX2PDF_CONVERTER`).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod invoke;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ToolConfig, ToolConfigBuilder};
pub use error::Docx2PdfError;
pub use invoke::{convert_bytes, convert_url, invoke, invoke_sync};
pub use output::{BlobMeta, ConvertedDocument, ToolMessage, PDF_MIME_TYPE};
pub use pipeline::params::{FileInput, FileReference, ToolParameters};
pub use progress::{InvocationProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use stream::{invoke_stream, MessageStream};
