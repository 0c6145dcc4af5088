//! Pipeline stages for one DOCX-to-PDF invocation.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own: the downloader against a mock HTTP server, the converter against a
//! stand-in script.
//!
//! ## Data Flow
//!
//! ```text
//! params ──▶ download ──▶ staging ──▶ convert ──▶ package
//! (request)   (HTTP GET)   (TempDir)   (soffice)   (messages)
//! ```
//!
//! 1. [`params`]   — pick the file reference out of the request and build the
//!    absolute download URL
//! 2. [`download`] — buffer the document in memory, bounded by a timeout
//! 3. [`staging`]  — write it into a private temp dir with a private
//!    converter profile
//! 4. [`convert`]  — run LibreOffice headless with a wall-clock timeout and
//!    read back the PDF
//! 5. [`package`]  — normalize the filename and build the text + blob messages

pub mod convert;
pub mod download;
pub mod package;
pub mod params;
pub mod staging;
