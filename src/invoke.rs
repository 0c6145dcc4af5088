//! Invocation entry points.
//!
//! [`invoke`] is the plugin action: it takes the host's parameter mapping and
//! always returns the response messages, turning any failure into a single
//! structured error message. [`convert_url`] and [`convert_bytes`] expose the
//! same workflow as ordinary fallible functions for library callers.

use crate::config::ToolConfig;
use crate::error::Docx2PdfError;
use crate::output::{ConvertedDocument, ToolMessage};
use crate::pipeline::params::{resolve_parameters, ToolParameters};
use crate::pipeline::{convert, download, package, staging::StagingArea};
use crate::progress::Stage;
use std::future::Future;
use std::time::Instant;
use tracing::{error, info};

/// Run the plugin action for one request.
///
/// Returns either exactly one error message, or a text acknowledgment
/// followed by the PDF attachment. Never panics on bad input and never
/// leaves staging files behind.
///
/// # Example
/// ```rust,no_run
/// use docx2pdf_tool::{invoke, ToolConfig, ToolParameters};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let params: ToolParameters = serde_json::from_str(
///     r#"{"completion_report": {"url": "/files/report.docx"}, "output_filename": "report"}"#,
/// )?;
/// let config = ToolConfig::from_env()?;
/// for message in invoke(&params, &config).await {
///     println!("{}", serde_json::to_string(&message)?);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn invoke(params: &ToolParameters, config: &ToolConfig) -> Vec<ToolMessage> {
    let start = Instant::now();
    info!("=== Starting DOCX to PDF conversion ===");

    let result = run_invocation(params, config).await;
    if let Some(ref cb) = config.progress_callback {
        cb.on_invocation_complete(result.is_ok());
    }

    match result {
        Ok(messages) => {
            info!("Conversion finished in {}ms", start.elapsed().as_millis());
            messages
        }
        Err(e) => {
            error!("Conversion failed [{}]: {}", e.code(), e);
            vec![ToolMessage::error(&e)]
        }
    }
}

/// Synchronous wrapper around [`invoke`].
///
/// Creates a temporary tokio runtime internally. Calling it from inside a
/// runtime, or failing to create one, is reported as an `internal` error
/// message; use [`invoke`] from async code.
pub fn invoke_sync(params: &ToolParameters, config: &ToolConfig) -> Vec<ToolMessage> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return vec![ToolMessage::error(&Docx2PdfError::Internal(
            "invoke_sync called from within an async runtime; use invoke instead".into(),
        ))];
    }
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(invoke(params, config)),
        Err(e) => vec![ToolMessage::error(&Docx2PdfError::Internal(format!(
            "Failed to create tokio runtime: {e}"
        )))],
    }
}

/// Download the document at `url` (relative to `config.base_url` unless
/// absolute) and convert it, returning the PDF under the default filename.
pub async fn convert_url(url: &str, config: &ToolConfig) -> Result<ConvertedDocument, Docx2PdfError> {
    let full_url = crate::pipeline::params::join_url(&config.base_url, url);
    let docx = download::download(&full_url, config.download_timeout_secs).await?;
    let pdf = convert_bytes(&docx, config).await?;
    let filename = package::normalize_filename(&config.default_filename, &config.default_filename)?;
    Ok(ConvertedDocument::new(pdf, filename))
}

/// Convert DOCX bytes already in memory to PDF bytes.
///
/// The staging directory lives only for the duration of this call.
pub async fn convert_bytes(docx: &[u8], config: &ToolConfig) -> Result<Vec<u8>, Docx2PdfError> {
    let staging = StagingArea::create(config.staging_root.as_deref(), docx).await?;
    let pdf = convert::run_converter(&staging, config).await;
    // `staging` is dropped (and the directory removed) here on every path
    drop(staging);
    pdf
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run_invocation(
    params: &ToolParameters,
    config: &ToolConfig,
) -> Result<Vec<ToolMessage>, Docx2PdfError> {
    let resolved = run_stage(config, Stage::ResolveParameters, async {
        let r = resolve_parameters(params, config)?;
        let detail = r.download_url.clone();
        Ok::<_, Docx2PdfError>((r, detail))
    })
    .await?;

    let docx = run_stage(config, Stage::Download, async {
        let bytes = download::download(&resolved.download_url, config.download_timeout_secs).await?;
        let detail = format!("{} bytes", bytes.len());
        Ok::<_, Docx2PdfError>((bytes, detail))
    })
    .await?;

    let pdf = run_stage(config, Stage::Convert, async {
        let pdf = convert_bytes(&docx, config).await?;
        let detail = format!("{} bytes", pdf.len());
        Ok::<_, Docx2PdfError>((pdf, detail))
    })
    .await?;

    run_stage(config, Stage::Package, async {
        let messages = package::package(pdf, &resolved.output_filename, &config.default_filename)?;
        Ok::<_, Docx2PdfError>((messages, resolved.output_filename.clone()))
    })
    .await
}

/// Log and report one stage around `fut`, which yields its value plus a
/// short detail string for the progress callback.
async fn run_stage<T, F>(config: &ToolConfig, stage: Stage, fut: F) -> Result<T, Docx2PdfError>
where
    F: Future<Output = Result<(T, String), Docx2PdfError>>,
{
    info!("{}", stage);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }

    match fut.await {
        Ok((value, detail)) => {
            info!("{} - done: {}", stage, detail);
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_complete(stage, &detail);
            }
            Ok(value)
        }
        Err(e) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_error(stage, &e.to_string());
            }
            Err(e)
        }
    }
}
