//! HTTP transport: the only stage with network I/O.
//!
//! [`Transport`] is the seam between the submission flow and the network.
//! [`HttpTransport`] is the real implementation over `reqwest`; tests plug in
//! scripted transports to drive the flow without a server.

use crate::config::ClientConfig;
use crate::error::SubmitError;
use crate::protocol::{HttpReply, SubmissionRequest, FIELD_PDF_FILES};
use futures::future::join_all;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Sends one `/process` request.
pub trait Transport {
    /// POST `request` as a multipart form and return the raw reply.
    ///
    /// Only failures to complete the exchange are errors; any HTTP status is
    /// a successful return.
    fn post_process(
        &self,
        request: &SubmissionRequest,
    ) -> impl Future<Output = Result<HttpReply, SubmitError>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, SubmitError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SubmitError::Transport(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the multipart body: the three scalar fields first, then one
    /// `pdf_files` part per file in selection order.
    fn build_form(request: &SubmissionRequest) -> Result<Form, SubmitError> {
        let mut form = Form::new();
        for (name, value) in request.text_fields() {
            form = form.text(name, value);
        }
        for file in &request.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str("application/pdf")
                .map_err(|e| SubmitError::Transport(e.to_string()))?;
            form = form.part(FIELD_PDF_FILES, part);
        }
        Ok(form)
    }

    /// GET a URL from a server reply and return its body.
    ///
    /// Relative URLs resolve against the configured base URL.
    pub async fn fetch(&self, link: &str) -> Result<Vec<u8>, String> {
        let url = self.config.resolve(link);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        debug!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }

    /// Fetch every link concurrently, returning one result per link in order.
    ///
    /// Each fetch is independent: one failure never cancels the others.
    pub async fn fetch_all(&self, links: &[String]) -> Vec<Result<Vec<u8>, String>> {
        join_all(links.iter().map(|l| self.fetch(l))).await
    }
}

impl Transport for HttpTransport {
    async fn post_process(&self, request: &SubmissionRequest) -> Result<HttpReply, SubmitError> {
        let url = self.config.process_url();
        let form = Self::build_form(request)?;
        info!("POST {} with {} file(s)", url, request.files.len());

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SubmitError::Transport(format!("요청 시간이 초과되었습니다: {e}"))
                } else {
                    SubmitError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        debug!("Reply {} ({} bytes)", status, body.len());

        Ok(HttpReply {
            status: status.as_u16(),
            reason,
            body: body.to_vec(),
        })
    }
}
