use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::views;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No page at {0}")]
    NotFound(String),

    #[error("Malformed form submission: {0}")]
    MalformedForm(String),

    /// Failure inside an `/api` handler; answered as JSON.
    #[error("{0}")]
    Api(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Api(message) => {
                error!("❌ API failure: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "ok": false, "message": message })),
                )
                    .into_response()
            }
            other => {
                let status = match other {
                    AppError::NotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::BAD_REQUEST,
                };
                warn!("⚠️  {} ({})", other, status);
                (status, Html(views::error_page(status, &other.to_string()))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("/x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::MalformedForm("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Api("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
