//! Progress-callback trait for per-stage invocation events.
//!
//! Inject an [`Arc<dyn InvocationProgressCallback>`] via
//! [`crate::config::ToolConfigBuilder::progress_callback`] to receive events as
//! an invocation moves through its four stages.
//!
//! Callers can forward events to a terminal spinner, a host-side status
//! channel or a log sink without the library knowing how the host
//! communicates. The trait is `Send + Sync` because several invocations may
//! share one callback while running concurrently.
//!
//! # Example
//!
//! ```rust
//! use docx2pdf_tool::{InvocationProgressCallback, Stage, ToolConfig};
//! use std::sync::Arc;
//!
//! struct StderrCallback;
//!
//! impl InvocationProgressCallback for StderrCallback {
//!     fn on_stage_complete(&self, stage: Stage, detail: &str) {
//!         eprintln!("[{}/{}] {}: {}", stage.number(), Stage::COUNT, stage.label(), detail);
//!     }
//! }
//!
//! let config = ToolConfig::builder()
//!     .progress_callback(Arc::new(StderrCallback) as Arc<dyn InvocationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// One step of the linear invocation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Extract the file reference and output filename from the request.
    ResolveParameters,
    /// Fetch the source document over HTTP.
    Download,
    /// Stage the document and run the external converter.
    Convert,
    /// Build the response messages.
    Package,
}

impl Stage {
    /// Number of stages in one invocation.
    pub const COUNT: usize = 4;

    /// 1-based position of the stage in the workflow.
    pub fn number(self) -> usize {
        match self {
            Stage::ResolveParameters => 1,
            Stage::Download => 2,
            Stage::Convert => 3,
            Stage::Package => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::ResolveParameters => "Resolving parameters",
            Stage::Download => "Downloading document",
            Stage::Convert => "Converting to PDF",
            Stage::Package => "Packaging response",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}/{}: {}", self.number(), Stage::COUNT, self.label())
    }
}

/// Called by the invocation workflow as it enters and leaves each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait InvocationProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    ///
    /// `detail` is a short human-readable summary, e.g. the resolved URL or
    /// the size of the downloaded document.
    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        let _ = (stage, detail);
    }

    /// Called when a stage fails. No further stages run afterwards.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once at the end of every invocation.
    fn on_invocation_complete(&self, success: bool) {
        let _ = success;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl InvocationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ToolConfig`].
pub type ProgressCallback = Arc<dyn InvocationProgressCallback>;
