use serde::Serialize;

use crate::models::meeting::MeetingSchedule;

// Response body shared by every meeting endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<MeetingSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiResponse {
    pub fn with_meeting(message: &str, meeting: MeetingSchedule) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            meeting: Some(meeting),
            details: None,
        }
    }

    pub fn with_details(message: &str, details: String) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            meeting: None,
            details: Some(details),
        }
    }

    pub fn failure(message: &str, reason: String) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            meeting: None,
            details: Some(reason),
        }
    }
}
