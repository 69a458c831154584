//! Error types for meeting operations.
//!
//! Every failure of the translation layer ends up as a `MeetingError`. Nothing
//! here is fatal to the process: handlers log the error and map it to an HTTP
//! status via [`MeetingError::status_code`].

use axum::http::StatusCode;
use thiserror::Error;

use crate::transport::TransportError;

/// Failure of a create, edit, delete or list call.
#[derive(Debug, Error)]
pub enum MeetingError {
    /// A required input was not supplied. No request was sent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The start date did not parse under the strict meeting date format.
    #[error("Invalid start date '{0}'. Date format should be MM/dd/yyyy HH:mm:ss")]
    InvalidStartDate(String),

    /// The meeting password violates the length policy.
    #[error("Invalid meeting password. Password length must be greater than {min} and at most {max} characters")]
    InvalidPassword { min: usize, max: usize },

    /// The XML request could not be written.
    #[error("Failed to build XML request: {0}")]
    RequestBuild(String),

    /// Network or HTTP failure talking to the WebEx site.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be percent-decoded.
    #[error("Failed to decode WebEx response: {0}")]
    Decode(String),

    /// The response was received but does not report SUCCESS.
    #[error("WebEx reported a failure for {operation}")]
    VendorFailure { operation: &'static str },

    /// The response reported SUCCESS but an expected field is missing.
    #[error("WebEx response is missing {0}")]
    MalformedResponse(&'static str),
}

impl MeetingError {
    /// True for failures detected before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MeetingError::MissingField(_)
                | MeetingError::InvalidStartDate(_)
                | MeetingError::InvalidPassword { .. }
        )
    }

    /// HTTP status used by the REST handlers.
    pub fn status_code(&self) -> StatusCode {
        match self {
            MeetingError::MissingField(_)
            | MeetingError::InvalidStartDate(_)
            | MeetingError::InvalidPassword { .. } => StatusCode::BAD_REQUEST,
            MeetingError::RequestBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MeetingError::Transport(_)
            | MeetingError::Decode(_)
            | MeetingError::VendorFailure { .. }
            | MeetingError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        let errors = [
            MeetingError::MissingField("startDate"),
            MeetingError::InvalidStartDate("02/30/2000 11:22:30".to_string()),
            MeetingError::InvalidPassword { min: 4, max: 256 },
        ];

        for err in errors {
            assert!(err.is_validation());
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_remote_errors_map_to_bad_gateway() {
        let err = MeetingError::VendorFailure { operation: "DelMeeting" };
        assert!(!err.is_validation());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err = MeetingError::from(TransportError::Status(500));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "WebEx site returned HTTP 500");
    }
}
