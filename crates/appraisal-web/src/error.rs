//! Handler error handling.

use appraisal_client::{ClientError, UserContext};
use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::views::{Chrome, Link, NoticePage};

/// Handler-level error type.
///
/// Page loads never fail with this; they render an inline banner instead.
/// It covers what a page cannot recover from: bad path parameters and
/// template rendering failures.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

/// Renders the notice page; plain text if even that fails to render.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let heading = status.canonical_reason().unwrap_or("Error");
        let page = NoticePage {
            chrome: Chrome::new(heading, &UserContext::anonymous())
                .with_error(Some(self.message().to_string())),
            heading: heading.to_string(),
            back: Link::new("Back to overview", "/"),
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("notice page render error: {}", e);
                (status, self.message().to_string()).into_response()
            }
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err.status() {
            Some(404) => ApiError::NotFound(err.to_string()),
            Some(400 | 422) => ApiError::BadRequest(err.to_string()),
            Some(401) => ApiError::Unauthorized(err.to_string()),
            Some(403) => ApiError::Forbidden(err.to_string()),
            Some(409) => ApiError::Conflict(err.to_string()),
            _ => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        ApiError::Internal(format!("Template error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_status_mapping() {
        let err = |status| ClientError::Status {
            status,
            message: "nope".to_string(),
        };
        assert_eq!(ApiError::from(err(404)).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(err(422)).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(err(403)).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(err(500)).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::from(ClientError::Transport("refused".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_error_renders_notice_page() {
        let response = ApiError::Internal("Template error: missing field".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            response
                .headers()
                .get(axum::http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("text/html"))
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("Template error: missing field"));
        assert!(body.contains("Back to overview"));
    }
}
