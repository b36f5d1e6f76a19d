//! Error conversions
//!
//! Problem-document and HTTP rendering of [`AppError`].

use super::app_error::AppError;

/// RFC 7807 problem document for an error
pub fn problem_details(err: &AppError) -> serde_json::Value {
    serde_json::json!({
        "type": format!("https://httpstatuses.io/{}", err.status_code()),
        "title": err.kind().as_str(),
        "status": err.status_code(),
        "detail": err.message(),
        "action": err.action(),
    })
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(problem_details(&self))).into_response()
    }
}
