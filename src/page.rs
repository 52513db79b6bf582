//! Display state of the upload page.
//!
//! [`Page`] holds everything the user can see: the status log, the download
//! list, the preview panels, the error panel and the state of the form
//! controls. It is mutated only by [`crate::Frontend`] on a single logical
//! thread, and every change is forwarded to the registered
//! [`PageObserver`](crate::PageObserver).
//!
//! Visibility mirrors the page: the results list, preview area and error
//! panel are hidden until they have something to show.

use crate::messages;
use crate::observer::{NoopObserver, SharedObserver};
use crate::protocol::ResultItem;
use crate::render::{escape_html, PreviewPanel};
use std::fmt;
use std::path::{Component, Path};
use std::sync::Arc;
use tracing::{info, warn};

/// One entry of the download list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub label: String,
    pub href: String,
    pub zip_filename: String,
    pub original_filename: Option<String>,
}

impl DownloadLink {
    pub fn from_item(item: &ResultItem) -> Self {
        Self {
            label: messages::download_label(&item.zip_filename),
            href: item.download_url.clone(),
            zip_filename: item.zip_filename.clone(),
            original_filename: item.original_filename.clone(),
        }
    }

    /// The archive name reduced to a single plain path component, for saving
    /// under a local directory.
    ///
    /// `None` when the server-supplied name has no such component (`..`,
    /// `/`, empty) or is not a bare file name (`../x.zip`, `/etc/x`).
    pub fn local_file_name(&self) -> Option<&str> {
        let path = Path::new(&self.zip_filename);
        let mut components = path.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name.to_str(),
            _ => None,
        }
    }
}

/// The upload page's visible state.
pub struct Page {
    log: Vec<String>,
    results_visible: bool,
    downloads: Vec<DownloadLink>,
    preview_visible: bool,
    previews: Vec<PreviewPanel>,
    error_visible: bool,
    error_message: String,
    submit_enabled: bool,
    loader_visible: bool,
    observer: SharedObserver,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Arc::new(NoopObserver))
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("log", &self.log)
            .field("results_visible", &self.results_visible)
            .field("downloads", &self.downloads)
            .field("preview_visible", &self.preview_visible)
            .field("previews", &self.previews.len())
            .field("error_visible", &self.error_visible)
            .field("error_message", &self.error_message)
            .field("submit_enabled", &self.submit_enabled)
            .field("loader_visible", &self.loader_visible)
            .finish()
    }
}

impl Page {
    /// A freshly loaded page, already in its reset state.
    pub fn new(observer: SharedObserver) -> Self {
        Self {
            log: vec![messages::READY_PROMPT.to_string()],
            results_visible: false,
            downloads: Vec::new(),
            preview_visible: false,
            previews: Vec::new(),
            error_visible: false,
            error_message: String::new(),
            submit_enabled: true,
            loader_visible: false,
            observer,
        }
    }

    // ── Resetter ─────────────────────────────────────────────────────────

    /// Clear all transient state before a new submission.
    pub fn reset(&mut self) {
        self.log.clear();
        self.log.push(messages::READY_PROMPT.to_string());
        self.results_visible = false;
        self.downloads.clear();
        self.preview_visible = false;
        self.previews.clear();
        self.error_visible = false;
        self.error_message.clear();
        self.submit_enabled = true;
        self.loader_visible = false;
        self.observer.on_reset();
    }

    // ── Status / error reporting ─────────────────────────────────────────

    /// Append a line to the status log.
    pub fn log_status(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!("{}", line.trim_matches('\n'));
        self.observer.on_status_line(&line);
        self.log.push(line);
    }

    /// Show `message` in the error panel, replacing any earlier one.
    pub fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("Error panel: {}", message);
        self.observer.on_error(&message);
        self.error_message = message;
        self.error_visible = true;
    }

    // ── Form controls ────────────────────────────────────────────────────

    pub fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    pub fn set_loader_visible(&mut self, visible: bool) {
        if self.loader_visible != visible {
            self.observer.on_loader(visible);
        }
        self.loader_visible = visible;
    }

    // ── Results ──────────────────────────────────────────────────────────

    /// Append a download entry and reveal the results list.
    pub fn add_download(&mut self, link: DownloadLink) {
        self.downloads.push(link);
        self.results_visible = true;
    }

    pub fn add_preview(&mut self, panel: PreviewPanel) {
        self.previews.push(panel);
    }

    /// Reveal the preview area iff it has content.
    pub fn settle_previews(&mut self) {
        self.preview_visible = !self.previews.is_empty();
    }

    /// Flip the collapsed state of preview `index`.
    ///
    /// Returns the new collapsed state, or `None` if there is no such preview.
    pub fn toggle_preview(&mut self, index: usize) -> Option<bool> {
        let panel = self.previews.get_mut(index)?;
        panel.toggle();
        Some(panel.collapsed)
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// The log as one block of text, one entry per line.
    pub fn log_text(&self) -> String {
        self.log.join("\n")
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn downloads(&self) -> &[DownloadLink] {
        &self.downloads
    }

    pub fn preview_visible(&self) -> bool {
        self.preview_visible
    }

    pub fn previews(&self) -> &[PreviewPanel] {
        &self.previews
    }

    pub fn previews_mut(&mut self) -> &mut [PreviewPanel] {
        &mut self.previews
    }

    pub fn error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn loader_visible(&self) -> bool {
        self.loader_visible
    }

    // ── Snapshot ─────────────────────────────────────────────────────────

    /// Render the page as a self-contained HTML document.
    ///
    /// `base_href` is emitted as `<base href>` so the relative `/view_image`
    /// links resolve against the server that produced them.
    pub fn to_html(&self, base_href: Option<&str>) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
        if let Some(base) = base_href {
            out.push_str(&format!(r#"<base href="{}">"#, escape_html(base)));
        }
        out.push_str("<title>PDF OCR</title><style>");
        out.push_str(SNAPSHOT_CSS);
        out.push_str("</style></head><body>\n");

        out.push_str(&format!(
            "<pre id=\"status-log\">{}</pre>\n",
            escape_html(&self.log_text())
        ));

        out.push_str(&format!(
            "<div id=\"error-area\"{}><p id=\"error-message\">{}</p></div>\n",
            hidden(self.error_visible),
            escape_html(&self.error_message)
        ));

        out.push_str(&format!(
            "<div id=\"results-area\"{}><ul id=\"download-links\">",
            hidden(self.results_visible)
        ));
        for link in &self.downloads {
            out.push_str(&format!(
                r#"<li><a href="{}">{}</a></li>"#,
                escape_html(&link.href),
                escape_html(&link.label)
            ));
        }
        out.push_str("</ul></div>\n");

        out.push_str(&format!(
            "<div id=\"preview-area\"{}><div id=\"preview-content\">",
            hidden(self.preview_visible)
        ));
        for panel in &self.previews {
            out.push_str(&panel.to_html());
        }
        out.push_str("</div></div>\n");

        out.push_str(SNAPSHOT_SCRIPT);
        out.push_str("</body></html>\n");
        out
    }
}

fn hidden(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        r#" style="display: none""#
    }
}

const SNAPSHOT_CSS: &str = ".preview-item.collapsed .preview-content-inner{display:none}\
.preview-toggle{cursor:pointer;font-weight:bold}\
#status-log{white-space:pre-wrap}";

// Collapse toggling in the saved report works like on the live page.
const SNAPSHOT_SCRIPT: &str = "<script>document.querySelectorAll('.preview-toggle')\
.forEach(t=>t.addEventListener('click',()=>t.parentElement.classList.toggle('collapsed')));</script>\n";
