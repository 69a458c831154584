use serde::{Deserialize, Serialize};
use std::fmt;

use crate::response_parser::ScheduledMeeting;

/// A WebEx meeting as accepted from and returned to callers.
///
/// Input payloads only need the scheduling fields; the key and URLs are set by
/// the service after a successful create or edit. The password is accepted but
/// never serialized back out.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing)]
    pub meeting_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitee_list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_key: Option<String>,
    #[serde(
        default,
        rename = "hostMeetingURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub host_meeting_url: Option<String>,
    #[serde(
        default,
        rename = "attendeeMeetingURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub attendee_meeting_url: Option<String>,
}

impl MeetingSchedule {
    /// Scheduling request with no key or URLs yet
    pub fn request(
        start_date: &str,
        meeting_password: &str,
        meeting_title: &str,
        invitee_list: &str,
    ) -> Self {
        Self {
            start_date: Some(start_date.to_string()),
            meeting_password: Some(meeting_password.to_string()),
            meeting_title: Some(meeting_title.to_string()),
            invitee_list: Some(invitee_list.to_string()),
            ..Self::default()
        }
    }

    /// Fully populated schedule for a meeting the vendor accepted
    pub fn scheduled(
        host: &str,
        title: &str,
        start_date: &str,
        invitee_list: &str,
        meeting_password: &str,
        vendor: ScheduledMeeting,
    ) -> Self {
        Self {
            meeting_host: Some(host.to_string()),
            meeting_title: Some(title.to_string()),
            start_date: Some(start_date.to_string()),
            meeting_password: Some(meeting_password.to_string()),
            invitee_list: Some(invitee_list.to_string()),
            meeting_key: Some(vendor.meeting_key),
            host_meeting_url: Some(vendor.host_meeting_url),
            attendee_meeting_url: Some(vendor.attendee_meeting_url),
        }
    }
}

impl fmt::Debug for MeetingSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeetingSchedule")
            .field("meeting_host", &self.meeting_host)
            .field("meeting_title", &self.meeting_title)
            .field("start_date", &self.start_date)
            .field(
                "meeting_password",
                &self.meeting_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("invitee_list", &self.invitee_list)
            .field("meeting_key", &self.meeting_key)
            .field("host_meeting_url", &self.host_meeting_url)
            .field("attendee_meeting_url", &self.attendee_meeting_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_camel_case_fields() {
        let meeting: MeetingSchedule = serde_json::from_value(json!({
            "startDate": "01/31/2030 11:22:30",
            "meetingPassword": "pw123456",
            "meetingTitle": "scrum standup",
            "inviteeList": "ok@example.com"
        }))
        .unwrap();

        assert_eq!(meeting.start_date.as_deref(), Some("01/31/2030 11:22:30"));
        assert_eq!(meeting.meeting_password.as_deref(), Some("pw123456"));
        assert_eq!(meeting.meeting_title.as_deref(), Some("scrum standup"));
        assert_eq!(meeting.invitee_list.as_deref(), Some("ok@example.com"));
        assert!(meeting.meeting_key.is_none());
    }

    #[test]
    fn test_serialize_omits_password() {
        let meeting = MeetingSchedule::scheduled(
            "host@acme.com",
            "scrum standup",
            "01/31/2030 11:22:30",
            "ok@example.com",
            "pw123456",
            ScheduledMeeting {
                meeting_key: "803716279".to_string(),
                host_meeting_url: "https://acme.webex.com/host".to_string(),
                attendee_meeting_url: "https://acme.webex.com/join".to_string(),
            },
        );

        let value = serde_json::to_value(&meeting).unwrap();
        assert!(value.get("meetingPassword").is_none());
        assert_eq!(value["meetingKey"], "803716279");
        assert_eq!(value["hostMeetingURL"], "https://acme.webex.com/host");
        assert_eq!(value["attendeeMeetingURL"], "https://acme.webex.com/join");
        assert_eq!(value["meetingHost"], "host@acme.com");

        assert!(!format!("{:?}", meeting).contains("pw123456"));
    }
}
