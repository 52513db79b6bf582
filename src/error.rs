//! Error types for the pdf-ocr-web library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SubmitError`] — **Fatal** for one submission: nothing was selected,
//!   the server refused the request, or its reply could not be understood.
//!   Returned as `Err(SubmitError)` from [`crate::Frontend::submit`] after it
//!   has already been written to the status log and the error panel.
//!
//! * [`RenderIssue`] — **Non-fatal**: the markdown renderer is missing or a
//!   single thumbnail failed to load. Recorded next to the affected preview
//!   and never interrupts sibling results.

use thiserror::Error;

/// Errors that end a submission.
///
/// The `Display` text of every variant is exactly what the error panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    // ── Local errors ──────────────────────────────────────────────────────
    /// The file selection was empty; no request was sent.
    #[error("최소 하나의 PDF 파일이 필요합니다.")]
    Validation,

    // ── Server errors ─────────────────────────────────────────────────────
    /// Non-success HTTP status, or a payload carrying an explicit `error`.
    ///
    /// `details` holds the optional per-file failure lines the server sends
    /// when every file in the batch failed.
    #[error("{message}")]
    Server {
        message: String,
        status: Option<u16>,
        details: Vec<String>,
    },

    /// A success status whose payload lacks the expected success markers.
    #[error("{0}")]
    Protocol(String),

    // ── Transport errors ──────────────────────────────────────────────────
    /// The request could not be sent or its body could not be read.
    #[error("{0}")]
    Transport(String),
}

impl SubmitError {
    /// Build a [`SubmitError::Server`] without details.
    pub fn server(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Server {
            message: message.into(),
            status,
            details: Vec::new(),
        }
    }

    /// The message shown in the error panel.
    pub fn panel_message(&self) -> String {
        self.to_string()
    }
}

/// A non-fatal rendering problem attached to one preview.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderIssue {
    /// No markdown renderer is registered; the preview shows raw text.
    #[error("마크다운 렌더러를 찾을 수 없어 원본 마크다운으로 표시합니다.")]
    RendererMissing,

    /// One thumbnail could not be loaded.
    #[error("Could not load: {filename}")]
    ImageLoadFailed { filename: String, reason: String },
}

/// Builder validation errors for [`crate::ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The base URL could not be parsed or is not HTTP(S).
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The process path must be absolute.
    #[error("Process path must start with '/', got '{0}'")]
    InvalidProcessPath(String),
}

/// Errors raised while reading persisted API keys.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("Failed to read key store '{path}': {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Key store '{path}' is not a JSON object of strings: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
