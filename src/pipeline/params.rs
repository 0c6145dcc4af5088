//! Parameter resolution: turn the host's invocation mapping into a download
//! URL and an output filename.
//!
//! The host hands us a loosely-typed JSON object. The file parameter may be a
//! single file object or a list holding one, so it is parsed once into
//! [`FileInput`] and collapsed to a single [`FileReference`] here; nothing
//! downstream ever sees the list form.

use crate::config::ToolConfig;
use crate::error::Docx2PdfError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Parameter key holding the source document.
pub const FILE_PARAM: &str = "completion_report";

/// Parameter key holding the requested output filename.
pub const FILENAME_PARAM: &str = "output_filename";

/// The raw invocation request: parameter name → value.
pub type ToolParameters = serde_json::Map<String, Value>;

/// A host-supplied handle to an uploaded file.
///
/// Only `url` is used; the descriptive fields are logged when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// The file parameter as it arrives: one reference or a list of them.
///
/// `List` is tried first: with every field defaulted, `FileReference` would
/// also accept an empty JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileInput {
    List(Vec<FileReference>),
    Single(FileReference),
}

impl FileInput {
    /// Collapse to the first reference, if any.
    pub fn into_first(self) -> Option<FileReference> {
        match self {
            FileInput::Single(file) => Some(file),
            FileInput::List(files) => files.into_iter().next(),
        }
    }
}

/// Everything later stages need from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParameters {
    pub file: FileReference,
    /// Absolute URL to GET.
    pub download_url: String,
    /// Filename as requested (or the configured default), not yet normalized.
    pub output_filename: String,
}

/// Extract and validate the invocation parameters.
pub fn resolve_parameters(
    params: &ToolParameters,
    config: &ToolConfig,
) -> Result<ResolvedParameters, Docx2PdfError> {
    let raw = match params.get(FILE_PARAM) {
        None | Some(Value::Null) => {
            return Err(Docx2PdfError::missing(format!(
                "no file was passed in parameter '{FILE_PARAM}'"
            )))
        }
        Some(v) => v.clone(),
    };

    let file = serde_json::from_value::<FileInput>(raw)
        .map_err(|e| {
            Docx2PdfError::missing(format!(
                "parameter '{FILE_PARAM}' is not a file object: {e}"
            ))
        })?
        .into_first()
        .ok_or_else(|| {
            Docx2PdfError::missing(format!("parameter '{FILE_PARAM}' is an empty list"))
        })?;

    let file_url = match file.url.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => {
            return Err(Docx2PdfError::missing(
                "file parameter has no 'url' attribute",
            ))
        }
    };
    debug!(
        "File reference: url={} filename={:?} mime_type={:?} size={:?}",
        file_url, file.filename, file.mime_type, file.size
    );

    let download_url = join_url(&config.base_url, &file_url);
    info!("Resolved download URL: {}", download_url);

    let output_filename = match params.get(FILENAME_PARAM) {
        None | Some(Value::Null) => config.default_filename.clone(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            warn!(
                "Ignoring non-string '{}' parameter {}; using '{}'",
                FILENAME_PARAM, other, config.default_filename
            );
            config.default_filename.clone()
        }
    };

    Ok(ResolvedParameters {
        file,
        download_url,
        output_filename,
    })
}

/// Check if the input string looks like an absolute HTTP URL. The scheme is
/// case-insensitive.
pub fn is_url(input: &str) -> bool {
    let has_prefix = |prefix: &str| {
        input
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    has_prefix("http://") || has_prefix("https://")
}

/// Join the base address and a host-relative path with exactly one `/`.
///
/// Absolute URLs are returned unchanged.
pub fn join_url(base: &str, path: &str) -> String {
    if is_url(path) {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
