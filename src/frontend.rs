//! The front-end context and its command handlers.
//!
//! [`Frontend`] is built once at startup and owns everything the upload page
//! works with: the display state, the key store, the markdown capability,
//! the current file selection and the transport. Input arrives as
//! [`UiEvent`]s dispatched through [`Frontend::handle`], so each handler can
//! be driven directly with a synthetic event.
//!
//! Handlers take `&mut self`; a second submission cannot begin until the
//! first has finished.

use crate::error::{RenderIssue, SubmitError};
use crate::keys::KeyStore;
use crate::observer::SharedObserver;
use crate::page::Page;
use crate::protocol::UploadFile;
use crate::render::{CommonMarkRenderer, MarkdownRenderer};
use crate::submit::SubmissionOutcome;
use crate::transport::{HttpTransport, Transport};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// A user action on the upload page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The file input's selection changed.
    SelectFiles(Vec<UploadFile>),
    /// The "use OpenAI" checkbox changed.
    SetUseOpenAi(bool),
    /// The form was submitted.
    Submit,
    /// The collapse control of preview `index` was clicked.
    TogglePreview(usize),
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Form state changed; nothing else happened.
    Updated,
    /// A submission ran to completion (successfully or not).
    Submitted(Result<SubmissionOutcome, SubmitError>),
    /// A preview was toggled; `collapsed` is its new state.
    Toggled { index: usize, collapsed: bool },
    /// The event referred to something that does not exist.
    Ignored,
}

/// Checks whether an image URL can be loaded.
pub trait ImageProbe {
    fn probe(&self, url: &str) -> impl std::future::Future<Output = Result<(), String>> + Send;
}

impl ImageProbe for HttpTransport {
    async fn probe(&self, url: &str) -> Result<(), String> {
        self.fetch(url).await.map(|_| ())
    }
}

/// The upload page's context object.
pub struct Frontend<T> {
    pub(crate) page: Page,
    pub(crate) transport: T,
    pub(crate) keys: Arc<dyn KeyStore>,
    pub(crate) renderer: Option<Arc<dyn MarkdownRenderer>>,
    pub(crate) selection: Vec<UploadFile>,
    pub(crate) use_openai: bool,
    pub(crate) session_id: Option<String>,
}

impl<T: Transport> Frontend<T> {
    /// Build a front end with the CommonMark renderer and no observer.
    pub fn new(transport: T, keys: Arc<dyn KeyStore>) -> Self {
        Self {
            page: Page::default(),
            transport,
            keys,
            renderer: Some(Arc::new(CommonMarkRenderer)),
            selection: Vec::new(),
            use_openai: false,
            session_id: None,
        }
    }

    /// Replace the markdown capability. `None` makes previews fall back to
    /// raw text.
    pub fn with_renderer(mut self, renderer: Option<Arc<dyn MarkdownRenderer>>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Forward display changes to `observer`.
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.page = Page::new(observer);
        self
    }

    /// Dispatch one UI event.
    pub async fn handle(&mut self, event: UiEvent) -> EventOutcome {
        match event {
            UiEvent::SelectFiles(files) => {
                debug!("Selection changed: {} file(s)", files.len());
                self.selection = files;
                EventOutcome::Updated
            }
            // The toggle is read at submit time; changing it has no other effect.
            UiEvent::SetUseOpenAi(v) => {
                self.use_openai = v;
                EventOutcome::Updated
            }
            UiEvent::Submit => EventOutcome::Submitted(self.submit().await),
            UiEvent::TogglePreview(index) => match self.page.toggle_preview(index) {
                Some(collapsed) => EventOutcome::Toggled { index, collapsed },
                None => EventOutcome::Ignored,
            },
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn selection(&self) -> &[UploadFile] {
        &self.selection
    }

    pub fn use_openai(&self) -> bool {
        self.use_openai
    }

    /// Session of the batch currently on display, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

impl<T: Transport + ImageProbe + Sync> Frontend<T> {
    /// Try to load every thumbnail on display and flag the ones that fail.
    ///
    /// Probes run concurrently and independently; a failure only marks its
    /// own thumbnail. Returns the issues raised, in display order.
    pub async fn check_thumbnails(&mut self) -> Vec<RenderIssue> {
        let urls: Vec<String> = self
            .page
            .previews()
            .iter()
            .flat_map(|p| p.thumbnails.iter().map(|t| t.url.clone()))
            .collect();
        if urls.is_empty() {
            return Vec::new();
        }

        let transport = &self.transport;
        let mut outcomes = join_all(urls.iter().map(|u| transport.probe(u)))
            .await
            .into_iter();

        let mut issues = Vec::new();
        for panel in self.page.previews_mut() {
            for thumb in panel.thumbnails.iter_mut() {
                if let Some(Err(reason)) = outcomes.next() {
                    warn!("Thumbnail {} failed to load: {}", thumb.url, reason);
                    let issue = thumb.mark_load_failed(reason);
                    panel.issues.push(issue.clone());
                    issues.push(issue);
                }
            }
        }
        issues
    }
}
