//! Wire types for the `/process` endpoint.
//!
//! The request is a multipart form; the reply is JSON. Both shapes are
//! fixed by the server, so field names here are the server's field names.

use serde::{Deserialize, Serialize};

/// Multipart field holding the primary API key.
pub const FIELD_API_KEY: &str = "api_key";
/// Multipart field holding the secondary API key.
pub const FIELD_OPENAI_API_KEY: &str = "openai_api_key";
/// Multipart field holding the `"true"` / `"false"` toggle.
pub const FIELD_USE_OPENAI: &str = "use_openai";
/// Multipart field repeated once per uploaded file.
pub const FIELD_PDF_FILES: &str = "pdf_files";

/// One selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming the part after the file name.
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        Ok(Self { name, bytes })
    }
}

/// Everything sent in one `/process` request.
///
/// Built fresh for every submission and dropped once the reply arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub files: Vec<UploadFile>,
    pub api_key: String,
    pub openai_api_key: String,
    pub use_openai: bool,
}

impl SubmissionRequest {
    /// The scalar form fields in the order they are appended.
    ///
    /// `use_openai` is encoded as the string the server compares against.
    pub fn text_fields(&self) -> [(&'static str, String); 3] {
        [
            (FIELD_API_KEY, self.api_key.clone()),
            (FIELD_OPENAI_API_KEY, self.openai_api_key.clone()),
            (FIELD_USE_OPENAI, encode_flag(self.use_openai).to_string()),
        ]
    }
}

/// Encode a boolean the way the server's form parser expects it.
pub fn encode_flag(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

/// Preview data for one converted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// Markdown with `![[filename]]` image placeholders.
    #[serde(default)]
    pub markdown: String,
    /// Directory name the server stores this file's images under.
    #[serde(default)]
    pub pdf_base: String,
    /// Extracted image file names, in page order.
    #[serde(default)]
    pub images: Vec<String>,
}

/// One processed input: its download and optional preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub zip_filename: String,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
    /// Name of the uploaded file before the server sanitised it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
}

/// A well-formed success reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSuccess {
    pub session_id: String,
    pub results: Vec<ResultItem>,
    /// Non-fatal warnings (skipped or failed files in a partial success).
    pub warnings: Vec<String>,
}

/// HTTP status and body of a `/process` reply, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    /// Canonical reason phrase, e.g. `Internal Server Error`. May be empty.
    pub reason: String,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
