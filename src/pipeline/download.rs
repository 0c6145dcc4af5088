//! Source download: fetch the DOCX into memory.
//!
//! The whole body is buffered. Documents handed to this action are office
//! files of a few megabytes at most, and the converter needs the complete
//! file on disk before it can start anyway, so streaming would buy nothing.

use crate::error::Docx2PdfError;
use std::time::Duration;
use tracing::{debug, info};

/// GET `url` and return the response body.
///
/// Transport faults, timeouts and non-2xx statuses all surface as
/// [`Docx2PdfError::DownloadFailed`] carrying the underlying `reqwest` error.
pub async fn download(url: &str, timeout_secs: u64) -> Result<Vec<u8>, Docx2PdfError> {
    info!("Downloading document from: {}", url);

    let failed = |source: reqwest::Error| Docx2PdfError::DownloadFailed {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(failed)?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(failed)?
        .error_for_status()
        .map_err(failed)?;

    debug!("HTTP {} from {}", response.status(), url);

    let bytes = response.bytes().await.map_err(failed)?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}
