//! Converter invocation: run LibreOffice headless against a staged document
//! and read back the PDF it writes.
//!
//! ## Process contract
//!
//! ```text
//! libreoffice --headless --invisible --nologo --nodefault --norestore
//!             -env:UserInstallation=file:///<staging>/lo_user
//!             --convert-to pdf:writer_pdf_Export
//!             <staging>/input.docx
//!             --outdir <staging>
//! ```
//!
//! The private `UserInstallation` profile is what makes concurrent
//! invocations on one host safe; see [`crate::pipeline::staging`].
//!
//! stdout and stderr are captured whole and only logged. LibreOffice exits 0
//! for some load failures and prints nothing useful on stdout, so success is
//! judged by the exit status and then by whether a PDF actually appeared.
//!
//! On unix the converter runs in its own process group. `libreoffice` is a
//! launcher that forks `soffice.bin`, so a timeout kills the whole group and
//! waits for it to go away before the staging directory is removed.

use crate::config::ToolConfig;
use crate::error::Docx2PdfError;
use crate::pipeline::staging::{StagingArea, EXPECTED_OUTPUT_FILENAME};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// LibreOffice filter used for `--convert-to`.
pub const PDF_EXPORT_FILTER: &str = "pdf:writer_pdf_Export";

/// How long to wait for a killed process group to disappear.
#[cfg(unix)]
const GROUP_EXIT_GRACE: Duration = Duration::from_secs(2);

/// Build the argument vector (excluding the program) for one conversion.
pub fn converter_args(config: &ToolConfig, staging: &StagingArea) -> Result<Vec<String>, Docx2PdfError> {
    let mut args = config.converter_leading_args.clone();
    args.extend(
        ["--headless", "--invisible", "--nologo", "--nodefault", "--norestore"]
            .iter()
            .map(|s| s.to_string()),
    );
    args.push(format!("-env:UserInstallation={}", staging.profile_url()?));
    args.push("--convert-to".to_string());
    args.push(PDF_EXPORT_FILTER.to_string());
    args.push(staging.input_path().to_string_lossy().into_owned());
    args.push("--outdir".to_string());
    args.push(staging.dir().to_string_lossy().into_owned());
    Ok(args)
}

/// Run the converter on the staged input and return the PDF bytes.
pub async fn run_converter(
    staging: &StagingArea,
    config: &ToolConfig,
) -> Result<Vec<u8>, Docx2PdfError> {
    let program = &config.converter_program;
    let args = converter_args(config, staging)?;
    info!("Running converter: {} {}", program, args.join(" "));

    let mut command = Command::new(program);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // Own process group, so a timeout can take down soffice.bin and any other
    // helper the launcher forked, not just the launcher itself.
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command
        .spawn()
        .map_err(|source| Docx2PdfError::ConverterUnavailable {
            program: program.clone(),
            source,
        })?;
    let pid = child.id();
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let start = Instant::now();
    let secs = config.conversion_timeout_secs;
    let collect = async {
        tokio::try_join!(child.wait(), read_pipe(stdout_pipe), read_pipe(stderr_pipe))
    };
    let waited = tokio::time::timeout(Duration::from_secs(secs), collect).await;
    let (status, stdout, stderr) = match waited {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            kill_converter(&mut child, pid).await;
            return Err(Docx2PdfError::Internal(format!(
                "Failed to collect converter output: {e}"
            )));
        }
        Err(_) => {
            warn!("Converter exceeded {}s; killing it", secs);
            kill_converter(&mut child, pid).await;
            return Err(Docx2PdfError::ConversionTimeout { secs });
        }
    };

    let stdout = String::from_utf8_lossy(&stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
    debug!("Converter STDOUT: {}", stdout);
    debug!("Converter STDERR: {}", stderr);

    if !status.success() {
        return Err(Docx2PdfError::ConversionFailed {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        });
    }
    info!("Converter finished in {}ms", start.elapsed().as_millis());

    let pdf_path = locate_pdf(staging).await?;
    let bytes = tokio::fs::read(&pdf_path)
        .await
        .map_err(|source| Docx2PdfError::StagingFailed {
            path: pdf_path.clone(),
            source,
        })?;
    info!("Read PDF {} ({} bytes)", pdf_path.display(), bytes.len());

    Ok(bytes)
}

async fn read_pipe<R>(pipe: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kill the converter and everything in its process group, then reap it.
///
/// Returns once the group is gone (or after a short grace period), so the
/// staging directory can be removed without a straggler writing into it.
#[cfg(unix)]
async fn kill_converter(child: &mut Child, pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|p| libc::pid_t::try_from(p).ok()) else {
        let _ = child.start_kill();
        let _ = child.wait().await;
        return;
    };

    // SAFETY: killpg only sends a signal; pgid is the group created for this
    // child by `process_group(0)` and stays reserved while any member lives.
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
        debug!(
            "killpg({}) failed: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
    if let Err(e) = child.wait().await {
        warn!("Failed to reap converter {}: {}", pgid, e);
    }

    let deadline = Instant::now() + GROUP_EXIT_GRACE;
    // SAFETY: signal 0 only probes for existence.
    while unsafe { libc::killpg(pgid, 0) } == 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[cfg(not(unix))]
async fn kill_converter(child: &mut Child, _pid: Option<u32>) {
    let _ = child.start_kill();
    let _ = child.wait().await;
}

/// Find the converter's output: `input.pdf` if present, else the first
/// `*.pdf` in name order.
pub async fn locate_pdf(staging: &StagingArea) -> Result<PathBuf, Docx2PdfError> {
    let expected = staging.dir().join(EXPECTED_OUTPUT_FILENAME);
    if tokio::fs::try_exists(&expected).await.unwrap_or(false) {
        return Ok(expected);
    }

    let listing = staging.listing().await?;
    let candidate = listing.iter().find(|name| {
        std::path::Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    });

    match candidate {
        Some(name) => {
            warn!("Expected {} not found, using {}", EXPECTED_OUTPUT_FILENAME, name);
            Ok(staging.dir().join(name))
        }
        None => Err(Docx2PdfError::OutputNotFound {
            dir: staging.dir().to_path_buf(),
            listing,
        }),
    }
}
