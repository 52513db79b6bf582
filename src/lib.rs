//! # pdf-ocr-web
//!
//! Headless front end for a PDF-to-OCR web service.
//!
//! The service takes a batch of PDFs plus API keys on `POST /process`, runs
//! OCR, and replies with one downloadable archive per file and a markdown
//! preview whose images live under `/view_image/{session}/{pdf_base}/…`.
//! This crate is everything on the client side of that exchange: it owns the
//! upload page's display state, runs the submission flow, and renders the
//! returned previews without a browser.
//!
//! ## Flow
//!
//! ```text
//! UiEvent::Submit
//!  │
//!  ├─ 1. Reset     clear log, results, previews, error panel
//!  ├─ 2. Validate  at least one file selected
//!  ├─ 3. Upload    multipart POST (files + 2 keys + use_openai flag)
//!  ├─ 4. Interpret success / server error / unexpected reply
//!  └─ 5. Render    download links, placeholder rewrite, markdown → HTML
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_ocr_web::{ClientConfig, Frontend, HttpTransport, MemoryKeyStore, UiEvent, UploadFile};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder().base_url("http://127.0.0.1:5001").build()?;
//!     let keys = MemoryKeyStore::new().with("mistral_api_key", "...");
//!     let mut frontend = Frontend::new(HttpTransport::new(config)?, Arc::new(keys));
//!
//!     let file = UploadFile::from_path("scan.pdf").await?;
//!     frontend.handle(UiEvent::SelectFiles(vec![file])).await;
//!     frontend.handle(UiEvent::Submit).await;
//!
//!     for link in frontend.page().downloads() {
//!         println!("{} → {}", link.label, link.href);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr-web` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod frontend;
pub mod keys;
pub mod messages;
pub mod observer;
pub mod page;
pub mod protocol;
pub mod render;
pub mod submit;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ConfigError, KeyStoreError, RenderIssue, SubmitError};
pub use frontend::{EventOutcome, Frontend, ImageProbe, UiEvent};
pub use keys::{FileKeyStore, KeyStore, MemoryKeyStore};
pub use observer::{NoopObserver, PageObserver, SharedObserver};
pub use page::{DownloadLink, Page};
pub use protocol::{Preview, ProcessSuccess, ResultItem, SubmissionRequest, UploadFile};
pub use render::{CommonMarkRenderer, MarkdownRenderer, PreviewBody, PreviewPanel, Thumbnail};
pub use submit::{interpret_response, SubmissionOutcome};
pub use transport::{HttpTransport, Transport};
