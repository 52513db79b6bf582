//! Observer trait for live display updates.
//!
//! The [`crate::Page`] is the source of truth for what the upload page shows.
//! Hosts that draw it somewhere live (a terminal, a web socket) register an
//! [`Arc<dyn PageObserver>`] with [`crate::Frontend`] and get told about each
//! change as it happens, which is how the status log "scrolls" in a terminal.
//!
//! # Example
//!
//! ```rust
//! use pdf_ocr_web::PageObserver;
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Collect(Mutex<Vec<String>>);
//!
//! impl PageObserver for Collect {
//!     fn on_status_line(&self, line: &str) {
//!         self.0.lock().unwrap().push(line.to_string());
//!     }
//! }
//!
//! let observer: Arc<dyn PageObserver> = Arc::new(Collect::default());
//! observer.on_status_line("PDF 처리 시작...");
//! ```

use std::sync::Arc;

/// Receives display changes as they are applied to the page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait PageObserver: Send + Sync {
    /// A line was appended to the status log.
    fn on_status_line(&self, line: &str) {
        let _ = line;
    }

    /// The error panel now shows `message`.
    fn on_error(&self, message: &str) {
        let _ = message;
    }

    /// The loading indicator was shown (`true`) or hidden (`false`).
    fn on_loader(&self, visible: bool) {
        let _ = visible;
    }

    /// The page was reset for a new submission.
    fn on_reset(&self) {}
}

/// Observer that ignores everything. The default.
pub struct NoopObserver;

impl PageObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::Frontend`].
pub type SharedObserver = Arc<dyn PageObserver>;
