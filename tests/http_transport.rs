//! `HttpTransport` against a local axum server standing in for the OCR
//! service.

use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pdf_ocr_web::keys::{MISTRAL_KEY, OPENAI_KEY};
use pdf_ocr_web::{
    ClientConfig, EventOutcome, Frontend, HttpTransport, MemoryKeyStore, SubmitError, UiEvent,
    UploadFile,
};
use serde_json::json;
use std::sync::Arc;

// ── Mock server ──────────────────────────────────────────────────────────────

/// Echo every multipart field back as a warning line so the test can see
/// exactly what was sent.
async fn process(mut multipart: Multipart) -> impl IntoResponse {
    let mut echoed = Vec::new();
    let mut results = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap_or_default();
        match file_name {
            Some(file) => {
                echoed.push(format!(
                    "{name}: {file} ({} bytes, {})",
                    data.len(),
                    content_type.unwrap_or_default()
                ));
                let base = file.trim_end_matches(".pdf").to_string();
                results.push(json!({
                    "original_filename": file,
                    "zip_filename": format!("{base}_output.zip"),
                    "download_url": format!("/download/sess/{base}_output.zip"),
                    "preview": {
                        "markdown": format!("# {base}\n\n![[{base}_p1_img1.png]]\n"),
                        "pdf_base": base,
                        "images": [format!("{base}_p1_img1.png"), "missing.png"],
                    }
                }));
            }
            None => echoed.push(format!("{name}={}", String::from_utf8_lossy(&data))),
        }
    }
    Json(json!({
        "success": true,
        "session_id": "sess",
        "results": results,
        "errors": echoed,
    }))
}

async fn view_image(Path((session, base, file)): Path<(String, String, String)>) -> impl IntoResponse {
    if session == "sess" && file != "missing.png" && file.starts_with(&base) {
        (StatusCode::OK, vec![0x89u8, b'P', b'N', b'G'])
    } else {
        (StatusCode::NOT_FOUND, Vec::new())
    }
}

async fn download(Path((_session, file)): Path<(String, String)>) -> impl IntoResponse {
    (StatusCode::OK, format!("zip:{file}"))
}

async fn fail() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn fail_json() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "Mistral API 키가 필요합니다"})),
    )
}

async fn start_server() -> String {
    let app = Router::new()
        .route("/process", post(process))
        .route("/fail", post(fail))
        .route("/fail_json", post(fail_json))
        .route("/view_image/:session/:base/:file", get(view_image))
        .route("/download/:session/:file", get(download));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn frontend(base_url: &str, process_path: &str) -> Frontend<HttpTransport> {
    let config = ClientConfig::builder()
        .base_url(base_url)
        .process_path(process_path)
        .request_timeout_secs(10)
        .build()
        .unwrap();
    let keys = MemoryKeyStore::new()
        .with(MISTRAL_KEY, "m-key")
        .with(OPENAI_KEY, "o-key");
    Frontend::new(HttpTransport::new(config).unwrap(), Arc::new(keys))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn multipart_fields_reach_the_server() {
    let base = start_server().await;
    let mut fe = frontend(&base, "/process");
    fe.handle(UiEvent::SelectFiles(vec![
        UploadFile::new("one.pdf", b"%PDF-1".to_vec()),
        UploadFile::new("two.pdf", b"%PDF-22".to_vec()),
    ]))
    .await;
    fe.handle(UiEvent::SetUseOpenAi(true)).await;

    let EventOutcome::Submitted(Ok(outcome)) = fe.handle(UiEvent::Submit).await else {
        panic!("submission failed: {}", fe.page().error_message());
    };

    assert_eq!(
        outcome.warnings,
        vec![
            "api_key=m-key".to_string(),
            "openai_api_key=o-key".to_string(),
            "use_openai=true".to_string(),
            "pdf_files: one.pdf (6 bytes, application/pdf)".to_string(),
            "pdf_files: two.pdf (7 bytes, application/pdf)".to_string(),
        ]
    );
    assert_eq!(outcome.downloads, 2);
    assert_eq!(fe.page().downloads()[0].label, "one_output.zip 다운로드");
    assert_eq!(
        fe.page().downloads()[1].original_filename.as_deref(),
        Some("two.pdf")
    );

    let html = fe.page().previews()[0].body.text();
    assert!(html.contains("/view_image/sess/one/one_p1_img1.png"), "got: {html}");
}

#[tokio::test]
async fn thumbnails_are_probed_against_the_server() {
    let base = start_server().await;
    let mut fe = frontend(&base, "/process");
    fe.handle(UiEvent::SelectFiles(vec![UploadFile::new("doc.pdf", b"%PDF".to_vec())]))
        .await;
    fe.handle(UiEvent::Submit).await;

    let issues = fe.check_thumbnails().await;
    assert_eq!(issues.len(), 1);
    let thumbs = &fe.page().previews()[0].thumbnails;
    assert!(!thumbs[0].load_failed);
    assert!(thumbs[1].load_failed);
}

#[tokio::test]
async fn downloads_can_be_fetched() {
    let base = start_server().await;
    let mut fe = frontend(&base, "/process");
    fe.handle(UiEvent::SelectFiles(vec![UploadFile::new("doc.pdf", b"%PDF".to_vec())]))
        .await;
    fe.handle(UiEvent::Submit).await;

    let links: Vec<String> = fe.page().downloads().iter().map(|d| d.href.clone()).collect();
    let bodies = fe.transport().fetch_all(&links).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].as_deref().unwrap(), b"zip:doc_output.zip");
}

#[tokio::test]
async fn plain_text_500_reports_status() {
    let base = start_server().await;
    let mut fe = frontend(&base, "/fail");
    fe.handle(UiEvent::SelectFiles(vec![UploadFile::new("a.pdf", b"%PDF".to_vec())]))
        .await;
    let EventOutcome::Submitted(Err(err)) = fe.handle(UiEvent::Submit).await else {
        panic!("expected failure");
    };
    assert!(matches!(err, SubmitError::Server { status: Some(500), .. }));
    assert_eq!(
        fe.page().error_message(),
        "서버 오류: 500 Internal Server Error"
    );
}

#[tokio::test]
async fn json_400_reports_server_message() {
    let base = start_server().await;
    let mut fe = frontend(&base, "/fail_json");
    fe.handle(UiEvent::SelectFiles(vec![UploadFile::new("a.pdf", b"%PDF".to_vec())]))
        .await;
    fe.handle(UiEvent::Submit).await;
    assert_eq!(fe.page().error_message(), "Mistral API 키가 필요합니다");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut fe = frontend(&format!("http://{addr}"), "/process");
    fe.handle(UiEvent::SelectFiles(vec![UploadFile::new("a.pdf", b"%PDF".to_vec())]))
        .await;
    let EventOutcome::Submitted(result) = fe.handle(UiEvent::Submit).await else {
        panic!("expected Submitted");
    };
    assert!(matches!(result, Err(SubmitError::Transport(_))));
    assert!(fe.page().error_visible());
    assert!(fe.page().submit_enabled());
}
