//! CLI binary for docx2pdf-tool.
//!
//! A thin shim over the library crate: it builds the invocation parameters
//! from flags (or reads them as JSON), runs the plugin action, and either
//! writes the PDF to disk or prints the response messages as JSON lines.

use anyhow::{Context, Result};
use clap::Parser;
use docx2pdf_tool::{
    invoke, invoke_stream, InvocationProgressCallback, ProgressCallback, Stage, ToolConfig,
    ToolMessage, ToolParameters,
};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner showing the current stage, plus one
/// log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl InvocationProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar
            .set_prefix(format!("[{}/{}]", stage.number(), Stage::COUNT));
        self.bar.set_message(format!("{}…", stage.label()));
    }

    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        self.bar.println(format!(
            "  {} {:<22} {}",
            green("✓"),
            stage.label(),
            dim(detail)
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        // Keep the log line to one row; the full error is printed at exit.
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} {:<22} {}",
            red("✗"),
            stage.label(),
            red(first_line)
        ));
    }

    fn on_invocation_complete(&self, _success: bool) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a host-relative file URL; PDF written to ./converted.pdf
  docx2pdf /files/tools/3f1c/report.docx

  # Choose the output name and directory
  docx2pdf /files/tools/3f1c/report.docx --output-filename report -o out/

  # Absolute URLs bypass the base address
  docx2pdf https://example.com/report.docx -o report.pdf

  # Plugin mode: parameters as JSON on stdin, messages as JSON lines on stdout
  echo '{"completion_report": {"url": "/files/a.docx"}}' | docx2pdf --request - --json

ENVIRONMENT VARIABLES:
  URL                          Base address for relative file URLs
                               (default http://116.205.179.223)
  DOCX2PDF_CONVERTER           Converter binary (default libreoffice)
  DOCX2PDF_DOWNLOAD_TIMEOUT    HTTP timeout in seconds (default 30)
  DOCX2PDF_CONVERSION_TIMEOUT  Converter timeout in seconds (default 120)
  DOCX2PDF_STAGING_DIR         Parent directory for per-run scratch dirs

REQUIREMENTS:
  LibreOffice must be installed and on PATH, e.g.
    apt-get install -y libreoffice-writer
"#;

/// Convert DOCX documents to PDF with LibreOffice.
#[derive(Parser, Debug)]
#[command(
    name = "docx2pdf",
    version,
    about = "Download a DOCX document and convert it to PDF with LibreOffice",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// File URL, relative to --base-url unless absolute.
    #[arg(required_unless_present = "request", conflicts_with = "request")]
    file_url: Option<String>,

    /// Read the invocation parameters as a JSON object from PATH ('-' for stdin).
    #[arg(long, value_name = "PATH")]
    request: Option<String>,

    /// Requested output filename; '.pdf' is appended when missing.
    #[arg(short = 'n', long)]
    output_filename: Option<String>,

    /// Write the PDF to this file, or into this directory if it exists.
    #[arg(short, long, env = "DOCX2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Print response messages as JSON lines instead of writing the PDF.
    #[arg(long)]
    json: bool,

    /// Base address for relative file URLs.
    #[arg(long, env = "URL")]
    base_url: Option<String>,

    /// Converter binary.
    #[arg(long, env = "DOCX2PDF_CONVERTER")]
    converter: Option<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCX2PDF_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// Converter timeout in seconds.
    #[arg(long, env = "DOCX2PDF_CONVERSION_TIMEOUT", default_value_t = 120)]
    conversion_timeout: u64,

    /// Parent directory for the per-run scratch directory.
    #[arg(long, env = "DOCX2PDF_STAGING_DIR")]
    staging_dir: Option<PathBuf>,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCX2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs (includes converter output).
    #[arg(short, long, env = "DOCX2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCX2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO logs; --verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config and request ─────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn InvocationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let params = build_params(&cli)?;

    // ── Plugin mode: JSON lines on stdout ────────────────────────────────
    if cli.json {
        let mut messages = invoke_stream(params, config);
        let stdout = io::stdout();
        let mut failed = false;
        while let Some(message) = messages.next().await {
            failed |= message.is_error();
            let mut handle = stdout.lock();
            serde_json::to_writer(&mut handle, &message).context("Failed to serialise message")?;
            handle.write_all(b"\n").context("Failed to write to stdout")?;
        }
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    // ── File mode ────────────────────────────────────────────────────────
    let messages = invoke(&params, &config).await;
    for message in messages {
        match message {
            ToolMessage::Blob { blob, meta } => {
                let path = output_path(cli.output.as_deref(), &meta.filename);
                write_atomic(&path, &blob).await?;
                if !cli.quiet {
                    eprintln!(
                        "{}  {} bytes  →  {}",
                        green("✔"),
                        blob.len(),
                        bold(&path.display().to_string())
                    );
                }
            }
            ToolMessage::Text { text } => {
                if !cli.quiet && !show_progress {
                    eprintln!("{text}");
                }
            }
            ToolMessage::Json { json } => {
                let reason = json["message"].as_str().unwrap_or("unknown error");
                anyhow::bail!("Conversion failed: {reason}");
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ToolConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ToolConfig> {
    let mut builder = ToolConfig::builder()
        .download_timeout_secs(cli.download_timeout)
        .conversion_timeout_secs(cli.conversion_timeout);

    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(ref converter) = cli.converter {
        builder = builder.converter_program(converter.clone());
    }
    if let Some(ref dir) = cli.staging_dir {
        builder = builder.staging_root(dir.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Build the invocation parameters from `--request` or the positional URL.
fn build_params(cli: &Cli) -> Result<ToolParameters> {
    let mut params: ToolParameters = match cli.request.as_deref() {
        Some("-") => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read request from stdin")?;
            serde_json::from_str(&raw).context("Request must be a JSON object")?
        }
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read request from {path:?}"))?;
            serde_json::from_str(&raw).context("Request must be a JSON object")?
        }
        None => {
            let mut params = ToolParameters::new();
            if let Some(ref url) = cli.file_url {
                params.insert("completion_report".into(), json!({ "url": url }));
            }
            params
        }
    };

    if let Some(ref name) = cli.output_filename {
        params.insert("output_filename".into(), json!(name));
    }
    Ok(params)
}

/// Resolve where to write the PDF: an existing directory, or any path ending
/// in a separator, receives `filename`; any other path is used as-is.
fn output_path(output: Option<&Path>, filename: &str) -> PathBuf {
    match output {
        Some(p) if p.is_dir() || names_directory(p) => p.join(filename),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(filename),
    }
}

fn names_directory(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR)
}

/// Atomic write: write to a sibling temp file, then rename.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}
