//! Configuration for the DOCX-to-PDF plugin action.
//!
//! All invocation behaviour is controlled through [`ToolConfig`], built via
//! [`ToolConfigBuilder`] or read from the environment with
//! [`ToolConfig::from_env`]. One config is shared by every invocation; nothing
//! in it is mutated once built, so it can be cloned freely across tasks.

use crate::error::Docx2PdfError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Fallback host used to resolve relative file URLs when `URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://116.205.179.223";

/// Environment variable holding the base address for relative file URLs.
pub const BASE_URL_ENV: &str = "URL";

/// Filename used when the caller does not request one.
pub const DEFAULT_OUTPUT_FILENAME: &str = "converted.pdf";

/// Converter binary looked up on `PATH` by default.
pub const DEFAULT_CONVERTER: &str = "libreoffice";

/// Configuration for a DOCX-to-PDF invocation.
///
/// # Example
/// ```rust
/// use docx2pdf_tool::ToolConfig;
///
/// let config = ToolConfig::builder()
///     .base_url("https://files.example.com")
///     .conversion_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.download_timeout_secs, 30);
/// ```
#[derive(Clone)]
pub struct ToolConfig {
    /// Base address joined with relative file URLs. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// HTTP download timeout in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// Wall-clock budget for the converter process in seconds. Default: 120.
    ///
    /// LibreOffice cold-starts in a few seconds with a fresh profile, and large
    /// documents with embedded images can take a minute to lay out. A process
    /// still running after this budget is killed.
    pub conversion_timeout_secs: u64,

    /// Converter program name or path. Default: `libreoffice`.
    pub converter_program: String,

    /// Arguments inserted before the conversion flags, for wrappers such as
    /// `flatpak run org.libreoffice.LibreOffice`. Default: empty.
    pub converter_leading_args: Vec<String>,

    /// Parent directory for per-invocation staging directories.
    /// If None, uses the system temp directory.
    pub staging_root: Option<PathBuf>,

    /// Output filename when the request has none. Default: `converted.pdf`.
    pub default_filename: String,

    /// Optional per-stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            download_timeout_secs: 30,
            conversion_timeout_secs: 120,
            converter_program: DEFAULT_CONVERTER.to_string(),
            converter_leading_args: Vec::new(),
            staging_root: None,
            default_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ToolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolConfig")
            .field("base_url", &self.base_url)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("conversion_timeout_secs", &self.conversion_timeout_secs)
            .field("converter_program", &self.converter_program)
            .field("converter_leading_args", &self.converter_leading_args)
            .field("staging_root", &self.staging_root)
            .field("default_filename", &self.default_filename)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn InvocationProgressCallback>"),
            )
            .finish()
    }
}

impl ToolConfig {
    /// Create a new builder for `ToolConfig`.
    pub fn builder() -> ToolConfigBuilder {
        ToolConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from the process environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `URL` | `base_url` |
    /// | `DOCX2PDF_CONVERTER` | `converter_program` |
    /// | `DOCX2PDF_DOWNLOAD_TIMEOUT` | `download_timeout_secs` |
    /// | `DOCX2PDF_CONVERSION_TIMEOUT` | `conversion_timeout_secs` |
    /// | `DOCX2PDF_STAGING_DIR` | `staging_root` |
    ///
    /// Unset or empty variables keep their defaults; unparsable timeouts are
    /// ignored with a warning.
    pub fn from_env() -> Result<Self, Docx2PdfError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads from an arbitrary lookup,
    /// which keeps tests independent of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Docx2PdfError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_secs = |key: &str| get(key).and_then(|v| parse_secs(key, &v));
        let mut builder = Self::builder();

        if let Some(url) = get(BASE_URL_ENV) {
            builder = builder.base_url(url);
        }
        if let Some(program) = get("DOCX2PDF_CONVERTER") {
            builder = builder.converter_program(program);
        }
        if let Some(secs) = get_secs("DOCX2PDF_DOWNLOAD_TIMEOUT") {
            builder = builder.download_timeout_secs(secs);
        }
        if let Some(secs) = get_secs("DOCX2PDF_CONVERSION_TIMEOUT") {
            builder = builder.conversion_timeout_secs(secs);
        }
        if let Some(dir) = get("DOCX2PDF_STAGING_DIR") {
            builder = builder.staging_root(dir);
        }

        builder.build()
    }
}

fn parse_secs(key: &str, value: &str) -> Option<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a whole number of seconds", key, value);
            None
        }
    }
}

/// Builder for [`ToolConfig`].
#[derive(Debug)]
pub struct ToolConfigBuilder {
    config: ToolConfig,
}

impl ToolConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn conversion_timeout_secs(mut self, secs: u64) -> Self {
        self.config.conversion_timeout_secs = secs;
        self
    }

    pub fn converter_program(mut self, program: impl Into<String>) -> Self {
        self.config.converter_program = program.into();
        self
    }

    pub fn converter_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.converter_leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn staging_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.staging_root = Some(dir.into());
        self
    }

    pub fn default_filename(mut self, name: impl Into<String>) -> Self {
        self.config.default_filename = name.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ToolConfig, Docx2PdfError> {
        let c = &self.config;
        if c.download_timeout_secs == 0 {
            return Err(Docx2PdfError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.conversion_timeout_secs == 0 {
            return Err(Docx2PdfError::InvalidConfig(
                "Conversion timeout must be ≥ 1 second".into(),
            ));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(Docx2PdfError::InvalidConfig(format!(
                "Base URL must be an HTTP/HTTPS address, got '{}'",
                c.base_url
            )));
        }
        if c.converter_program.trim().is_empty() {
            return Err(Docx2PdfError::InvalidConfig(
                "Converter program must not be empty".into(),
            ));
        }
        if c.default_filename.trim().is_empty() {
            return Err(Docx2PdfError::InvalidConfig(
                "Default output filename must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
