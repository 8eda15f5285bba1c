use reqwest::StatusCode;
use vocatrack_core::http_status::error_message;
use vocatrack_core::scan_rejection::ScanRejection;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (connect, DNS, reset).
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// No response arrived within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
        reason: Option<ScanRejection>,
    },

    /// The response did not match the expected schema.
    #[error("Unexpected response from {endpoint}: {message}")]
    Schema { endpoint: String, message: String },

    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}

impl ClientError {
    /// Whether a retry could reach a different outcome.
    ///
    /// Transport failures, timeouts and gateway-class statuses leave the
    /// result unknown; anything else is the server's final answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Api { status, .. } => {
                matches!(status.as_u16(), 502..=504) || *status == StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Schema { .. } | Self::InvalidBaseUrl(_) => false,
        }
    }

    /// Sentence to show the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                reason: Some(reason),
                ..
            } => reason.user_message().to_string(),
            Self::Api { status, .. } => error_message(status.as_u16(), "Request failed"),
            Self::Timeout => error_message(504, "Request failed"),
            Self::Transport(_) => error_message(502, "Request failed"),
            Self::Schema { .. } | Self::InvalidBaseUrl(_) => error_message(500, "Request failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, reason: Option<ScanRejection>) -> ClientError {
        ClientError::Api {
            status: StatusCode::from_u16(status).unwrap(),
            code: None,
            message: "x".into(),
            reason,
        }
    }

    #[test]
    fn gateway_statuses_are_retryable() {
        assert!(api(502, None).is_retryable());
        assert!(api(503, None).is_retryable());
        assert!(ClientError::Timeout.is_retryable());
    }

    #[test]
    fn final_answers_are_not_retryable() {
        assert!(!api(409, Some(ScanRejection::AlreadyScanned)).is_retryable());
        assert!(!api(403, None).is_retryable());
    }

    #[test]
    fn rejection_reason_drives_the_message() {
        let err = api(422, Some(ScanRejection::WrongGroup));
        assert_eq!(err.user_message(), ScanRejection::WrongGroup.user_message());
        assert_eq!(api(404, None).user_message(), error_message(404, "Request failed"));
    }
}
