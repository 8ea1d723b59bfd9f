//! Client error types.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Build a status error from a response body.
    ///
    /// The backend reports `{"message": "..."}` or `{"message": ["...", ...]}`;
    /// anything else falls back to the raw text or the status code.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| match value.get("message")? {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Array(items) => Some(
                    items
                        .iter()
                        .filter_map(|item| item.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                _ => None,
            })
            .filter(|m| !m.trim().is_empty())
            .or_else(|| {
                let text = body.trim();
                (!text.is_empty() && text.len() < 300 && !text.starts_with('<'))
                    .then(|| text.to_string())
            })
            .unwrap_or_else(|| format!("Request failed with status {status}"));

        ClientError::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 or 403.
    pub fn is_forbidden(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// 404, or a message saying nothing was found.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::Status { status: 404, .. } => true,
            ClientError::Status { message, .. } => message.to_lowercase().contains("not found"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_string_and_list() {
        let err = ClientError::from_response(400, r#"{"message": "Cycle name is taken"}"#);
        assert_eq!(err.to_string(), "Cycle name is taken");

        let err = ClientError::from_response(
            400,
            r#"{"message": ["name must be a string", "startDate is required"], "statusCode": 400}"#,
        );
        assert_eq!(err.to_string(), "name must be a string, startDate is required");
    }

    #[test]
    fn test_fallback_message() {
        let err = ClientError::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "Request failed with status 502");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_classification() {
        assert!(ClientError::from_response(403, "").is_forbidden());
        assert!(ClientError::from_response(404, "").is_not_found());
        assert!(
            ClientError::from_response(400, r#"{"message": "Manager profile not found"}"#)
                .is_not_found()
        );
        assert!(!ClientError::Transport("connection refused".to_string()).is_not_found());
    }
}
