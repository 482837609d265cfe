//! One internal error type for every endpoint, whatever shape its failure
//! body takes on the wire.

use shared::error::{ApiError, ErrorCode, ErrorEnvelope};
use thiserror::Error;

use crate::endpoint::ErrorBody;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {endpoint} failed: {detail}")]
    Network {
        endpoint: &'static str,
        detail: String,
    },
    #[error("{endpoint} answered {status}: {message}")]
    Server {
        endpoint: &'static str,
        status: u16,
        message: String,
    },
    #[error("{endpoint} answered {status} with an unreadable error body")]
    MalformedErrorBody {
        endpoint: &'static str,
        status: u16,
        raw: String,
    },
    #[error("cannot build request url for {endpoint}: {detail}")]
    InvalidUrl {
        endpoint: &'static str,
        detail: String,
    },
    #[error("{endpoint} expects a {expected} payload")]
    PayloadMismatch {
        endpoint: &'static str,
        expected: &'static str,
    },
}

impl TransportError {
    /// Text shown in the error surface of the page. Never empty.
    pub fn display_message(&self) -> String {
        let text = match self {
            Self::Server { message, .. } => message.trim().to_string(),
            Self::MalformedErrorBody { raw, .. } => raw.trim().to_string(),
            Self::Network { detail, .. } | Self::InvalidUrl { detail, .. } => {
                detail.trim().to_string()
            }
            Self::PayloadMismatch { .. } => String::new(),
        };
        if text.is_empty() {
            self.fallback_message()
        } else {
            text
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::MalformedErrorBody { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        let code = match self {
            Self::Server { status, .. } | Self::MalformedErrorBody { status, .. } => {
                ErrorCode::from_status(*status)
            }
            Self::Network { .. } => ErrorCode::Transport,
            Self::InvalidUrl { .. } | Self::PayloadMismatch { .. } => ErrorCode::Validation,
        };
        ApiError::new(code, self.display_message())
    }

    fn fallback_message(&self) -> String {
        match self.status() {
            Some(status) => format!("HTTP {status}"),
            None => self.to_string(),
        }
    }
}

/// Adapts a failing response body into the internal error type according to
/// the shape its endpoint declares.
pub fn decode_error_body(
    shape: ErrorBody,
    endpoint: &'static str,
    status: u16,
    body: String,
) -> TransportError {
    match shape {
        ErrorBody::RawText => TransportError::Server {
            endpoint,
            status,
            message: body,
        },
        ErrorBody::JsonMessage => match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => TransportError::Server {
                endpoint,
                status,
                message: envelope.message,
            },
            Err(_) => TransportError::MalformedErrorBody {
                endpoint,
                status,
                raw: body,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_endpoint_extracts_message() {
        let err = decode_error_body(
            ErrorBody::JsonMessage,
            "konnektor/speichern",
            500,
            r#"{"status":500,"message":"IP fehlt"}"#.to_string(),
        );
        assert_eq!(err.display_message(), "IP fehlt");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn json_endpoint_with_html_body_is_flagged_not_dropped() {
        let err = decode_error_body(
            ErrorBody::JsonMessage,
            "konfiguration/speichern",
            502,
            "<html>Bad Gateway</html>".to_string(),
        );
        assert!(matches!(err, TransportError::MalformedErrorBody { .. }));
        assert_eq!(err.display_message(), "<html>Bad Gateway</html>");
    }

    #[test]
    fn raw_endpoint_keeps_markup() {
        let err = decode_error_body(
            ErrorBody::RawText,
            "dashboard/uebersicht",
            500,
            "<div class=\"alert\">kaputt</div>".to_string(),
        );
        assert_eq!(err.display_message(), "<div class=\"alert\">kaputt</div>");
    }

    #[test]
    fn empty_bodies_fall_back_to_status() {
        let raw = decode_error_body(ErrorBody::RawText, "ntp/testen", 503, String::new());
        let json = decode_error_body(
            ErrorBody::JsonMessage,
            "user/changePwd",
            400,
            r#"{"message":""}"#.to_string(),
        );
        assert_eq!(raw.display_message(), "HTTP 503");
        assert_eq!(json.display_message(), "HTTP 400");
    }

    #[test]
    fn maps_status_to_api_error_code() {
        let err = decode_error_body(ErrorBody::RawText, "login", 403, "denied".to_string());
        assert_eq!(err.to_api_error().code, ErrorCode::Forbidden);
        let network = TransportError::Network {
            endpoint: "login",
            detail: "connection refused".to_string(),
        };
        assert_eq!(network.to_api_error().code, ErrorCode::Transport);
    }
}
