//! Output types: the converted document and the response messages sent to
//! the host.
//!
//! A host consumes an invocation as an ordered sequence of [`ToolMessage`]s.
//! On success that is one [`ToolMessage::Text`] acknowledgment followed by one
//! [`ToolMessage::Blob`]; on failure it is a single [`ToolMessage::Json`]
//! error object. The JSON form (`serde_json::to_string`) is what the CLI
//! writes in `--json` mode, one message per line, with blob bytes base64
//! encoded.

use crate::error::Docx2PdfError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// MIME type attached to every converted document.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A converted PDF held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// Raw PDF bytes, starting with `%PDF`.
    pub bytes: Vec<u8>,
    /// Normalized filename, always ending in `.pdf`.
    pub filename: String,
    /// Always [`PDF_MIME_TYPE`].
    pub mime_type: String,
}

impl ConvertedDocument {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime_type: PDF_MIME_TYPE.to_string(),
        }
    }
}

/// Metadata carried alongside a binary attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    pub mime_type: String,
    pub filename: String,
}

/// One message in the response stream sent back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolMessage {
    /// Short human-readable text.
    Text { text: String },
    /// Structured JSON payload; used for error reports.
    Json { json: serde_json::Value },
    /// Binary attachment.
    Blob {
        #[serde(serialize_with = "encode_blob", deserialize_with = "decode_blob")]
        blob: Vec<u8>,
        meta: BlobMeta,
    },
}

impl ToolMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ToolMessage::Text { text: text.into() }
    }

    /// Build the single structured error message for a failed invocation.
    pub fn error(err: &Docx2PdfError) -> Self {
        ToolMessage::Json {
            json: serde_json::json!({
                "status": "error",
                "error": err.code(),
                "message": err.to_string(),
            }),
        }
    }

    /// Attachment message for a converted document.
    pub fn blob(doc: ConvertedDocument) -> Self {
        ToolMessage::Blob {
            blob: doc.bytes,
            meta: BlobMeta {
                mime_type: doc.mime_type,
                filename: doc.filename,
            },
        }
    }

    /// Error code if this is an error message.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            ToolMessage::Json { json } if json["status"] == "error" => json["error"].as_str(),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_code().is_some()
    }
}

fn encode_blob<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn decode_blob<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    STANDARD.decode(s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_shape() {
        let msg = ToolMessage::error(&Docx2PdfError::ConversionTimeout { secs: 120 });
        let ToolMessage::Json { json } = &msg else {
            panic!("expected json message, got {msg:?}");
        };
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "conversion_timeout");
        assert!(json["message"].as_str().unwrap().contains("120s"));
        assert_eq!(msg.error_code(), Some("conversion_timeout"));
    }

    #[test]
    fn text_message_is_not_an_error() {
        assert!(!ToolMessage::text("Generated file: a.pdf").is_error());
    }

    #[test]
    fn blob_serializes_as_base64_with_type_tag() {
        let msg = ToolMessage::blob(ConvertedDocument::new(b"%PDF-1.7".to_vec(), "report.pdf"));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "blob");
        assert_eq!(value["blob"], "JVBERi0xLjc=");
        assert_eq!(value["meta"]["mime_type"], "application/pdf");
        assert_eq!(value["meta"]["filename"], "report.pdf");

        let back: ToolMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, msg);
    }
}
