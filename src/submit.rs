//! The submission flow and reply interpretation.
//!
//! ```text
//! reset ─▶ validate ─▶ log files ─▶ POST /process ─▶ interpret ─▶ render
//!              │                          │               │
//!              └── ValidationError        └── Transport   └── Server / Protocol
//!                                               └───────────────┴─▶ error panel
//! ```
//!
//! Once the request phase starts, every exit path ends the same way: the
//! submit control is re-enabled, the loader hidden and a ready line logged.

use crate::error::{RenderIssue, SubmitError};
use crate::frontend::Frontend;
use crate::keys::{MISTRAL_KEY, OPENAI_KEY};
use crate::messages;
use crate::page::DownloadLink;
use crate::protocol::{HttpReply, ProcessSuccess, ResultItem, SubmissionRequest};
use crate::render::render_preview;
use crate::transport::Transport;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

/// Summary of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub session_id: String,
    /// Download entries added, in reply order.
    pub downloads: usize,
    /// Preview panels added.
    pub previews: usize,
    /// Non-fatal warnings from the reply's `errors` array.
    pub warnings: Vec<String>,
}

/// Classify a `/process` reply.
///
/// * non-2xx → [`SubmitError::Server`] with the body's `error` text, or a
///   message built from the status when the body has none
/// * 2xx with `success: true`, a `results` array and a non-empty
///   `session_id` → [`ProcessSuccess`]
/// * 2xx with an `error` text → [`SubmitError::Server`]
/// * anything else → [`SubmitError::Protocol`]
pub fn interpret_response(reply: &HttpReply) -> Result<ProcessSuccess, SubmitError> {
    if !reply.is_success() {
        return Err(server_failure(reply));
    }

    let value: Value = serde_json::from_slice(&reply.body)
        .map_err(|e| SubmitError::Protocol(messages::malformed_reply(&e.to_string())))?;

    let succeeded = value.get("success").and_then(Value::as_bool) == Some(true);
    let session_id = value
        .get("session_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    let results = value.get("results").filter(|r| r.is_array());
    if let (true, Some(session_id), Some(results)) = (succeeded, session_id, results) {
        let results: Vec<ResultItem> = serde_json::from_value(results.clone())
            .map_err(|e| SubmitError::Protocol(messages::malformed_reply(&e.to_string())))?;
        return Ok(ProcessSuccess {
            session_id: session_id.to_string(),
            results,
            warnings: string_list(value.get("errors")),
        });
    }

    match error_text(&value) {
        Some(message) => Err(SubmitError::Server {
            message,
            status: Some(reply.status),
            details: string_list(value.get("details")),
        }),
        None => Err(SubmitError::Protocol(messages::UNEXPECTED_RESPONSE.to_string())),
    }
}

/// The body's non-empty `error` text, if any.
fn error_text(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Strings from an array field; a lone string counts as one entry and
/// anything else as none.
fn string_list(field: Option<&Value>) -> Vec<String> {
    match field {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Build the error for a non-success status.
fn server_failure(reply: &HttpReply) -> SubmitError {
    let Ok(value) = serde_json::from_slice::<Value>(&reply.body) else {
        return SubmitError::server(
            messages::server_status_with_reason(reply.status, &reply.reason),
            Some(reply.status),
        );
    };

    let message = error_text(&value).unwrap_or_else(|| messages::server_status(reply.status));
    let details = string_list(value.get("details"));

    SubmitError::Server {
        message,
        status: Some(reply.status),
        details,
    }
}

impl<T: Transport> Frontend<T> {
    /// Run one submission with the current selection, keys and toggle.
    ///
    /// The page is updated as the flow progresses. Failures are reported to
    /// the status log and error panel before being returned.
    pub async fn submit(&mut self) -> Result<SubmissionOutcome, SubmitError> {
        self.page.reset();
        self.session_id = None;

        let api_key = self.keys.get_or_empty(MISTRAL_KEY);
        let openai_api_key = self.keys.get_or_empty(OPENAI_KEY);

        if self.selection.is_empty() {
            let err = SubmitError::Validation;
            self.page
                .log_status(format!("{}{}", messages::VALIDATION_LOG_PREFIX, err));
            self.page.show_error(err.panel_message());
            return Err(err);
        }

        self.page.set_submit_enabled(false);
        self.page.set_loader_visible(true);
        self.page.log_status(messages::PROCESSING_STARTED);

        let request = SubmissionRequest {
            files: self.selection.clone(),
            api_key,
            openai_api_key,
            use_openai: self.use_openai,
        };
        for file in &request.files {
            self.page.log_status(messages::adding_file(&file.name));
        }

        let result = self.exchange(&request).await;
        if let Err(ref e) = result {
            self.report_failure(e);
        }

        self.page.set_submit_enabled(true);
        self.page.set_loader_visible(false);
        self.page.log_status(messages::READY_FOR_NEXT);
        result
    }

    async fn exchange(
        &mut self,
        request: &SubmissionRequest,
    ) -> Result<SubmissionOutcome, SubmitError> {
        self.page.log_status(messages::UPLOADING);
        let reply = self.transport.post_process(request).await?;
        let success = interpret_response(&reply)?;
        Ok(self.render_results(success))
    }

    /// Populate the download list and previews for one reply batch.
    fn render_results(&mut self, success: ProcessSuccess) -> SubmissionOutcome {
        self.page.log_status(messages::PROCESSING_DONE);
        let ProcessSuccess {
            session_id,
            results,
            warnings,
        } = success;

        if results.is_empty() {
            self.page.log_status(messages::NO_RESULTS);
        }

        for item in &results {
            self.page.add_download(DownloadLink::from_item(item));

            let Some(preview) = &item.preview else {
                continue;
            };
            let panel = render_preview(
                &item.zip_filename,
                preview,
                &session_id,
                self.renderer.as_deref(),
            );
            if panel.issues.contains(&RenderIssue::RendererMissing) {
                warn!("No markdown renderer registered; showing raw text");
                self.page.log_status(messages::RENDERER_MISSING);
            }
            self.page.add_preview(panel);
        }
        self.page.settle_previews();

        if !warnings.is_empty() {
            self.page.log_status(messages::WARNINGS_HEADER);
            for w in &warnings {
                self.page.log_status(messages::bullet(w));
            }
            self.page.log_status(messages::WARNINGS_FOOTER);
        }

        info!(
            "Session {}: {} result(s), {} preview(s), {} warning(s)",
            session_id,
            results.len(),
            self.page.previews().len(),
            warnings.len()
        );

        let outcome = SubmissionOutcome {
            session_id: session_id.clone(),
            downloads: results.len(),
            previews: self.page.previews().len(),
            warnings,
        };
        self.session_id = Some(session_id);
        outcome
    }

    fn report_failure(&mut self, err: &SubmitError) {
        let message = err.panel_message();
        error!("Submission failed: {}", message);
        self.page.log_status(messages::failure(&message));
        if let SubmitError::Server { details, .. } = err {
            for d in details {
                self.page.log_status(messages::bullet(d));
            }
        }
        self.page.show_error(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, reason: &str, body: &str) -> HttpReply {
        HttpReply {
            status,
            reason: reason.into(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn non_success_with_json_error_uses_it_verbatim() {
        let err = interpret_response(&reply(400, "Bad Request", r#"{"error":"X"}"#)).unwrap_err();
        assert_eq!(err.panel_message(), "X");
    }

    #[test]
    fn non_success_with_unparseable_body_mentions_status() {
        let err = interpret_response(&reply(500, "Internal Server Error", "<html>oops")).unwrap_err();
        let msg = err.panel_message();
        assert!(msg.contains("500"), "got: {msg}");
        assert!(msg.contains("Internal Server Error"));
    }

    #[test]
    fn non_success_json_without_error_falls_back_to_status() {
        let err = interpret_response(&reply(502, "Bad Gateway", r#"{"oops":true}"#)).unwrap_err();
        assert_eq!(err.panel_message(), messages::server_status(502));
    }

    #[test]
    fn non_success_carries_details() {
        let body = r#"{"error":"모든 PDF 처리 시도가 실패했습니다.","details":["a.pdf: 처리 오류 - x"]}"#;
        match interpret_response(&reply(500, "", body)).unwrap_err() {
            SubmitError::Server {
                details, status, ..
            } => {
                assert_eq!(status, Some(500));
                assert_eq!(details, vec!["a.pdf: 처리 오류 - x".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn success_payload_is_accepted() {
        let body = r#"{"success":true,"session_id":"s1","results":[{"zip_filename":"a.zip","download_url":"/d/a.zip"}],"errors":["w"]}"#;
        let ok = interpret_response(&reply(200, "OK", body)).unwrap();
        assert_eq!(ok.session_id, "s1");
        assert_eq!(ok.results.len(), 1);
        assert_eq!(ok.warnings, vec!["w".to_string()]);
    }

    #[test]
    fn empty_results_array_is_still_success() {
        let body = r#"{"success":true,"session_id":"s1","results":[]}"#;
        assert!(interpret_response(&reply(200, "OK", body)).is_ok());
    }

    #[test]
    fn ok_status_with_error_field_is_server_error() {
        let err = interpret_response(&reply(200, "OK", r#"{"error":"키 없음"}"#)).unwrap_err();
        assert!(matches!(err, SubmitError::Server { .. }));
        assert_eq!(err.panel_message(), "키 없음");
    }

    #[test]
    fn ok_status_error_survives_oddly_typed_siblings() {
        let body = r#"{"error":"X","details":"a.pdf failed","results":"none","success":"yes"}"#;
        match interpret_response(&reply(200, "OK", body)).unwrap_err() {
            SubmitError::Server { message, details, .. } => {
                assert_eq!(message, "X");
                assert_eq!(details, vec!["a.pdf failed".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn success_ignores_oddly_typed_warnings() {
        let body = r#"{"success":true,"session_id":"s1","results":[],"errors":{"a":1}}"#;
        let ok = interpret_response(&reply(200, "OK", body)).unwrap();
        assert!(ok.warnings.is_empty());
    }

    #[test]
    fn ok_status_without_markers_is_protocol_error() {
        for body in [
            r#"{}"#,
            r#"{"success":false}"#,
            r#"{"success":true,"results":[]}"#,
            r#"{"success":true,"session_id":"","results":[]}"#,
            r#"{"error":""}"#,
        ] {
            let err = interpret_response(&reply(200, "OK", body)).unwrap_err();
            assert_eq!(
                err,
                SubmitError::Protocol(messages::UNEXPECTED_RESPONSE.to_string()),
                "body: {body}"
            );
        }
    }

    #[test]
    fn ok_status_with_non_json_body_is_protocol_error() {
        let err = interpret_response(&reply(200, "OK", "not json")).unwrap_err();
        assert!(matches!(err, SubmitError::Protocol(_)));
    }
}
