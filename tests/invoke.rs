//! Integration tests for the plugin action's message contract.
//!
//! A wiremock server plays the file host and a small shell script plays
//! LibreOffice (it honours `--outdir` and writes `<input stem>.pdf`), so
//! these run anywhere with `sh` and need no network or office suite.
#![cfg(unix)]

use docx2pdf_tool::{
    invoke, invoke_stream, BlobMeta, InvocationProgressCallback, Stage, ToolConfig, ToolMessage,
    ToolParameters,
};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Converter stand-in. Writes `%PDF-1.7` followed by the input bytes, so each
/// output is traceable to its own input. `CORRUPT` inputs fail, `SILENT`
/// inputs exit 0 without output, and `HANG` inputs fork a helper that keeps
/// writing to the profile the way `soffice.bin` does, then stall.
const FAKE_SOFFICE: &str = r#"outdir=""
input=""
profile=""
while [ $# -gt 0 ]; do
  case "$1" in
    --outdir) outdir="$2"; shift 2 ;;
    --convert-to) shift 2 ;;
    -env:UserInstallation=*) profile="${1#-env:UserInstallation=file://}"; shift ;;
    -*) shift ;;
    *) input="$1"; shift ;;
  esac
done
[ -d "$profile" ] || { echo "profile dir missing: $profile" >&2; exit 2; }
case "$(cat "$input")" in
  *CORRUPT*) echo "Error: source file could not be loaded" >&2; exit 81 ;;
  *SILENT*) exit 0 ;;
  *HANG*)
    ( sleep 2; mkdir -p "$profile/user/config"; echo x > "$profile/user/config/registrymodifications.xcu" ) &
    sleep 30 ;;
esac
out="$outdir/$(basename "$input" .docx).pdf"
printf '%%PDF-1.7\n' > "$out"
cat "$input" >> "$out"
"#;

struct Harness {
    server: MockServer,
    scripts: TempDir,
    staging_root: TempDir,
}

impl Harness {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            scripts: TempDir::new().unwrap(),
            staging_root: TempDir::new().unwrap(),
        }
    }

    async fn serve(&self, route: &str, body: &[u8]) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .mount(&self.server)
            .await;
    }

    fn config(&self) -> ToolConfig {
        let script = self.scripts.path().join("soffice.sh");
        std::fs::write(&script, FAKE_SOFFICE).unwrap();
        ToolConfig::builder()
            .base_url(self.server.uri())
            .converter_program("sh")
            .converter_leading_args([script.to_string_lossy().into_owned()])
            .conversion_timeout_secs(10)
            .download_timeout_secs(5)
            .staging_root(self.staging_root.path())
            .build()
            .unwrap()
    }

    fn staging_is_empty(&self) -> bool {
        std::fs::read_dir(self.staging_root.path()).unwrap().next().is_none()
    }
}

fn params(value: Value) -> ToolParameters {
    serde_json::from_value(value).expect("parameters must be a JSON object")
}

fn single_error(messages: &[ToolMessage]) -> (&str, String) {
    assert_eq!(messages.len(), 1, "expected exactly one message, got {messages:?}");
    match &messages[0] {
        ToolMessage::Json { json } => {
            assert_eq!(json["status"], "error");
            (
                json["error"].as_str().unwrap(),
                json["message"].as_str().unwrap().to_string(),
            )
        }
        other => panic!("expected an error message, got {other:?}"),
    }
}

// ── Success path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn converts_and_emits_text_then_blob() {
    let h = Harness::start().await;
    h.serve("/files/tools/report.docx", b"PK\x03\x04 report body").await;

    let messages = invoke(
        &params(json!({
            "completion_report": [{"url": "/files/tools/report.docx", "filename": "report.docx"}],
            "output_filename": "report"
        })),
        &h.config(),
    )
    .await;

    assert_eq!(messages.len(), 2, "got {messages:?}");
    match &messages[0] {
        ToolMessage::Text { text } => assert!(!text.trim().is_empty()),
        other => panic!("expected text acknowledgment first, got {other:?}"),
    }
    match &messages[1] {
        ToolMessage::Blob { blob, meta } => {
            assert!(blob.starts_with(b"%PDF"));
            assert!(blob.ends_with(b"report body"));
            assert_eq!(
                meta,
                &BlobMeta {
                    mime_type: "application/pdf".into(),
                    filename: "report.pdf".into(),
                }
            );
        }
        other => panic!("expected blob second, got {other:?}"),
    }
    assert!(h.staging_is_empty(), "staging directory left behind");
}

#[tokio::test]
async fn uppercase_extension_is_kept_and_default_applies() {
    let h = Harness::start().await;
    h.serve("/a.docx", b"a").await;
    let config = h.config();

    let named = invoke(
        &params(json!({"completion_report": {"url": "a.docx"}, "output_filename": "report.PDF"})),
        &config,
    )
    .await;
    let ToolMessage::Blob { meta, .. } = &named[1] else {
        panic!("expected blob, got {named:?}");
    };
    assert_eq!(meta.filename, "report.PDF");

    let unnamed = invoke(&params(json!({"completion_report": {"url": "/a.docx"}})), &config).await;
    let ToolMessage::Blob { meta, .. } = &unnamed[1] else {
        panic!("expected blob, got {unnamed:?}");
    };
    assert_eq!(meta.filename, "converted.pdf");
}

// ── Failure paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_file_reference_is_one_missing_input_message() {
    let h = Harness::start().await;
    for request in [
        json!({}),
        json!({"completion_report": null}),
        json!({"completion_report": {"filename": "no-url.docx"}}),
        json!({"completion_report": [{"url": ""}]}),
    ] {
        let messages = invoke(&params(request.clone()), &h.config()).await;
        let (code, _) = single_error(&messages);
        assert_eq!(code, "missing_input", "request: {request}");
    }
    // Nothing was fetched.
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn http_error_is_one_download_failed_message() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&h.server)
        .await;

    let messages = invoke(&params(json!({"completion_report": {"url": "/x.docx"}})), &h.config()).await;
    let (code, message) = single_error(&messages);
    assert_eq!(code, "download_failed");
    assert!(message.contains("403"), "got: {message}");
    assert!(h.staging_is_empty());
}

#[tokio::test]
async fn converter_exit_code_is_reported() {
    let h = Harness::start().await;
    h.serve("/broken.docx", b"CORRUPT").await;

    let messages =
        invoke(&params(json!({"completion_report": {"url": "/broken.docx"}})), &h.config()).await;
    let (code, message) = single_error(&messages);
    assert_eq!(code, "conversion_failed");
    assert!(message.contains("81"), "got: {message}");
    assert!(message.contains("could not be loaded"), "got: {message}");
    assert!(h.staging_is_empty(), "staging directory left behind after failure");
}

#[tokio::test]
async fn missing_converter_binary_is_reported() {
    let h = Harness::start().await;
    h.serve("/a.docx", b"a").await;
    let mut config = h.config();
    config.converter_program = "no-such-office-suite-binary".into();
    config.converter_leading_args.clear();

    let messages = invoke(&params(json!({"completion_report": {"url": "/a.docx"}})), &config).await;
    let (code, _) = single_error(&messages);
    assert_eq!(code, "converter_unavailable");
    assert!(h.staging_is_empty());
}

#[tokio::test]
async fn converter_without_output_is_reported_and_cleaned_up() {
    let h = Harness::start().await;
    h.serve("/quiet.docx", b"SILENT").await;

    let messages =
        invoke(&params(json!({"completion_report": {"url": "/quiet.docx"}})), &h.config()).await;
    let (code, message) = single_error(&messages);
    assert_eq!(code, "output_not_found");
    assert!(message.contains("input.docx"), "got: {message}");
    assert!(h.staging_is_empty(), "staging directory left behind");
}

#[tokio::test]
async fn timed_out_converter_leaves_nothing_behind() {
    let h = Harness::start().await;
    h.serve("/slow.docx", b"HANG").await;
    let mut config = h.config();
    config.conversion_timeout_secs = 1;

    let messages = invoke(&params(json!({"completion_report": {"url": "/slow.docx"}})), &config).await;
    let (code, _) = single_error(&messages);
    assert_eq!(code, "conversion_timeout");
    assert!(h.staging_is_empty(), "staging directory left behind");

    // The forked helper would have written into the profile by now.
    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    assert!(h.staging_is_empty(), "converter helper outlived the timeout");
}

// ── Concurrency ──────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invocations_are_independent() {
    let h = Harness::start().await;
    for i in 0..6 {
        h.serve(&format!("/doc-{i}.docx"), format!("document number {i}").as_bytes())
            .await;
    }
    let config = h.config();

    let runs = (0..6).map(|i| {
        let config = config.clone();
        async move {
            let p = params(json!({
                "completion_report": {"url": format!("/doc-{i}.docx")},
                "output_filename": format!("out-{i}")
            }));
            (i, invoke(&p, &config).await)
        }
    });

    for (i, messages) in futures::future::join_all(runs).await {
        let ToolMessage::Blob { blob, meta } = &messages[1] else {
            panic!("run {i}: expected blob, got {messages:?}");
        };
        assert_eq!(meta.filename, format!("out-{i}.pdf"));
        assert!(blob.ends_with(format!("document number {i}").as_bytes()));
    }
    assert!(h.staging_is_empty());
}

// ── Streaming and progress ───────────────────────────────────────────────────

#[derive(Default)]
struct StageLog(Mutex<Vec<(Stage, bool)>>);

impl InvocationProgressCallback for StageLog {
    fn on_stage_complete(&self, stage: Stage, _detail: &str) {
        self.0.lock().unwrap().push((stage, true));
    }

    fn on_stage_error(&self, stage: Stage, _error: &str) {
        self.0.lock().unwrap().push((stage, false));
    }
}

#[tokio::test]
async fn stream_and_callbacks_follow_the_stages() {
    let h = Harness::start().await;
    h.serve("/a.docx", b"a").await;
    let log = Arc::new(StageLog::default());
    let mut config = h.config();
    config.progress_callback = Some(log.clone());

    let messages: Vec<ToolMessage> =
        invoke_stream(params(json!({"completion_report": {"url": "/a.docx"}})), config)
            .collect()
            .await;

    assert_eq!(messages.len(), 2);
    assert!(matches!(messages[0], ToolMessage::Text { .. }));
    assert!(matches!(messages[1], ToolMessage::Blob { .. }));
    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            (Stage::ResolveParameters, true),
            (Stage::Download, true),
            (Stage::Convert, true),
            (Stage::Package, true),
        ]
    );
}

#[tokio::test]
async fn failing_stage_stops_the_pipeline() {
    let h = Harness::start().await;
    let log = Arc::new(StageLog::default());
    let mut config = h.config();
    config.progress_callback = Some(log.clone());

    // No mock mounted: wiremock answers 404.
    invoke(&params(json!({"completion_report": {"url": "/gone.docx"}})), &config).await;

    assert_eq!(
        *log.0.lock().unwrap(),
        vec![(Stage::ResolveParameters, true), (Stage::Download, false)]
    );
}
