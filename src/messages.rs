//! User-facing status and error strings.
//!
//! Every line the page shows comes from here, so tests can assert on the
//! exact text without repeating literals.

/// Log text right after a reset.
pub const READY_PROMPT: &str = "준비 완료. 파일을 선택하고 \"PDF 변환\"을 클릭하세요.";

/// Log prefix of the validation failure.
pub const VALIDATION_LOG_PREFIX: &str = "오류: ";

pub const PROCESSING_STARTED: &str = "PDF 처리 시작...";
pub const UPLOADING: &str = "파일 업로드 및 서버 요청 중...";
pub const PROCESSING_DONE: &str = "처리 완료!";
pub const NO_RESULTS: &str = "처리가 완료되었지만 다운로드하거나 미리볼 수 있는 결과가 없습니다.";
pub const WARNINGS_HEADER: &str = "\n--- 경고/부분 오류 ---";
pub const WARNINGS_FOOTER: &str = "-------------------------------\n";
pub const READY_FOR_NEXT: &str = "다음 작업을 위해 준비되었습니다.";
pub const UNEXPECTED_RESPONSE: &str = "서버로부터 예상치 못한 응답을 받았습니다.";
pub const RENDERER_MISSING: &str =
    "경고: 마크다운 렌더러를 찾을 수 없습니다. 원본 마크다운으로 미리보기를 표시합니다.";

/// Log line for one attached file.
pub fn adding_file(name: &str) -> String {
    format!("파일 추가 중: {name}")
}

/// Log line for a failed submission.
pub fn failure(message: &str) -> String {
    format!("오류 발생: {message}")
}

/// Log line for one warning or error detail.
pub fn bullet(item: &str) -> String {
    format!("- {item}")
}

/// Visible text of a download link.
pub fn download_label(zip_filename: &str) -> String {
    format!("{zip_filename} 다운로드")
}

/// Panel message when a non-success reply carried no usable error text.
pub fn server_status(status: u16) -> String {
    format!("서버 오류: {status}")
}

/// Panel message when a non-success reply body was not JSON.
pub fn server_status_with_reason(status: u16, reason: &str) -> String {
    if reason.is_empty() {
        server_status(status)
    } else {
        format!("서버 오류: {status} {reason}")
    }
}

/// Panel message when a success-status body was not JSON.
pub fn malformed_reply(detail: &str) -> String {
    format!("{UNEXPECTED_RESPONSE} ({detail})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_label_appends_suffix() {
        assert_eq!(download_label("a.zip"), "a.zip 다운로드");
    }

    #[test]
    fn server_status_contains_code() {
        assert!(server_status(500).contains("500"));
        assert_eq!(
            server_status_with_reason(500, "Internal Server Error"),
            "서버 오류: 500 Internal Server Error"
        );
        assert_eq!(server_status_with_reason(599, ""), "서버 오류: 599");
    }
}
