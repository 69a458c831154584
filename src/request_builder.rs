//! XML request documents for the WebEx meeting API.
//!
//! Every request is an XML declaration, a `serv:message` envelope, a
//! `header/securityContext` block with the service account credentials, and a
//! `body/bodyContent` block whose `xsi:type` names the operation. Documents are
//! written with quick-xml, so caller-supplied text is always escaped.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::WebExConfig;
use crate::error::MeetingError;
use crate::validator::is_valid_email_address;

/// Largest list the service will ever request.
pub const MAX_MEETING_LIST_SIZE: u32 = 100;

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SERVICE_NAMESPACE: &str = "http://www.webex.com/schemas/2002/06/service";
const BINDING_PREFIX: &str = "java:com.webex.service.binding.meeting.";
const INVITEE_SEPARATOR: char = ',';

/// Fixed list ordering: host, then conference name, then start time.
const LIST_ORDER: [(&str, &str); 3] = [
    ("HOSTWEBEXID", "ASC"),
    ("CONFNAME", "ASC"),
    ("STARTTIME", "ASC"),
];

/// The four WebEx meeting operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingOperation {
    Create,
    Edit,
    Delete,
    List,
}

impl MeetingOperation {
    /// Vendor operation name, used as the `bodyContent` type.
    pub fn vendor_name(&self) -> &'static str {
        match self {
            MeetingOperation::Create => "CreateMeeting",
            MeetingOperation::Edit => "SetMeeting",
            MeetingOperation::Delete => "DelMeeting",
            MeetingOperation::List => "LstsummaryMeeting",
        }
    }

    fn body_type(&self) -> String {
        format!("{}{}", BINDING_PREFIX, self.vendor_name())
    }
}

impl fmt::Display for MeetingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vendor_name())
    }
}

/// Validated scheduling data shared by create and edit requests.
#[derive(Debug, Clone, Copy)]
pub struct MeetingDetails<'a> {
    pub start_date: &'a str,
    pub password: &'a str,
    pub title: &'a str,
    pub invitees: Option<&'a str>,
}

/// Clamp a requested list size to [`MAX_MEETING_LIST_SIZE`].
pub fn clamp_list_size(requested: u32) -> u32 {
    requested.min(MAX_MEETING_LIST_SIZE)
}

/// Split a comma-separated invitee list, keeping only valid addresses.
///
/// An absent list is treated as empty and logged; invalid entries are logged
/// and skipped.
pub fn valid_invitees(invitees: Option<&str>, operation: MeetingOperation) -> Vec<String> {
    let Some(invitees) = invitees else {
        debug!(
            "Invitee list is missing while building {} request. Please verify the caller.",
            operation
        );
        return Vec::new();
    };

    if invitees.is_empty() {
        return Vec::new();
    }

    invitees
        .split(INVITEE_SEPARATOR)
        .map(str::trim)
        .filter(|candidate| {
            let valid = is_valid_email_address(candidate);
            if !valid {
                info!("Email address is invalid and will be skipped: '{}'", candidate);
            }
            valid
        })
        .map(str::to_string)
        .collect()
}

/// Build a `CreateMeeting` request.
pub fn build_create_request(
    config: &WebExConfig,
    details: &MeetingDetails<'_>,
) -> Result<String, MeetingError> {
    build_schedule_request(config, MeetingOperation::Create, details, None)
}

/// Build a `SetMeeting` request for an existing meeting.
pub fn build_edit_request(
    config: &WebExConfig,
    meeting_key: &str,
    details: &MeetingDetails<'_>,
) -> Result<String, MeetingError> {
    build_schedule_request(config, MeetingOperation::Edit, details, Some(meeting_key))
}

/// Build a `DelMeeting` request.
pub fn build_delete_request(config: &WebExConfig, meeting_key: &str) -> Result<String, MeetingError> {
    let mut doc = XmlDocument::begin(config, MeetingOperation::Delete)?;
    doc.leaf("meetingKey", meeting_key)?;
    doc.finish()
}

/// Build a `LstsummaryMeeting` request. The size is clamped to
/// [`MAX_MEETING_LIST_SIZE`].
pub fn build_list_request(config: &WebExConfig, requested_size: u32) -> Result<String, MeetingError> {
    let maximum_num = clamp_list_size(requested_size);
    if maximum_num < requested_size {
        warn!(
            "Requested list size {} exceeds maximum, using {}",
            requested_size, maximum_num
        );
    }

    let mut doc = XmlDocument::begin(config, MeetingOperation::List)?;

    doc.open("listControl")?;
    doc.leaf("startFrom", "1")?;
    doc.leaf("maximumNum", &maximum_num.to_string())?;
    doc.leaf("listMethod", "OR")?;
    doc.close("listControl")?;

    doc.open("order")?;
    for (order_by, order_ad) in LIST_ORDER {
        doc.leaf("orderBy", order_by)?;
        doc.leaf("orderAD", order_ad)?;
    }
    doc.close("order")?;

    doc.finish()
}

fn build_schedule_request(
    config: &WebExConfig,
    operation: MeetingOperation,
    details: &MeetingDetails<'_>,
    meeting_key: Option<&str>,
) -> Result<String, MeetingError> {
    let invitees = valid_invitees(details.invitees, operation);
    let mut doc = XmlDocument::begin(config, operation)?;

    doc.open("accessControl")?;
    doc.leaf("meetingPassword", details.password)?;
    doc.close("accessControl")?;

    doc.open("metaData")?;
    doc.leaf("confName", details.title)?;
    doc.close("metaData")?;

    doc.open("participants")?;
    doc.open("attendees")?;
    for email in &invitees {
        doc.open("attendee")?;
        doc.open("person")?;
        doc.leaf("name", email)?;
        doc.leaf("email", email)?;
        doc.close("person")?;
        doc.close("attendee")?;
    }
    doc.close("attendees")?;
    doc.close("participants")?;

    doc.open("schedule")?;
    doc.leaf("startDate", details.start_date)?;
    doc.close("schedule")?;

    // Reminder emails go to the same invitees, independently of the attendee list
    doc.open("remind")?;
    doc.open("enableReminder")?;
    doc.open("emails")?;
    for email in &invitees {
        doc.leaf("email", email)?;
    }
    doc.close("emails")?;
    doc.close("enableReminder")?;
    doc.close("remind")?;

    doc.open("attendeeOptions")?;
    doc.leaf("emailInvitations", "TRUE")?;
    doc.close("attendeeOptions")?;

    if let Some(key) = meeting_key {
        doc.leaf("meetingkey", key)?;
    }

    doc.finish()
}

/// Thin wrapper over a quick-xml writer that writes the envelope on creation
/// and closes it on `finish`.
struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    fn begin(config: &WebExConfig, operation: MeetingOperation) -> Result<Self, MeetingError> {
        let mut doc = Self {
            writer: Writer::new(Vec::new()),
        };

        doc.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        doc.write(Event::Start(BytesStart::new("serv:message").with_attributes([
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xmlns:serv", SERVICE_NAMESPACE),
            ("xsi:schemaLocation", SERVICE_NAMESPACE),
        ])))?;

        doc.open("header")?;
        doc.open("securityContext")?;
        doc.leaf("webExID", &config.host_account)?;
        doc.leaf("password", &config.host_password)?;
        doc.leaf("siteName", &config.site_name)?;
        doc.close("securityContext")?;
        doc.close("header")?;

        if config.site_name.trim().is_empty() {
            warn!("WebEx site name is empty. Please verify the configuration.");
        }

        let body_type = operation.body_type();
        doc.open("body")?;
        doc.write(Event::Start(
            BytesStart::new("bodyContent").with_attributes([("xsi:type", body_type.as_str())]),
        ))?;

        Ok(doc)
    }

    fn finish(mut self) -> Result<String, MeetingError> {
        self.close("bodyContent")?;
        self.close("body")?;
        self.close("serv:message")?;

        String::from_utf8(self.writer.into_inner())
            .map_err(|e| MeetingError::RequestBuild(e.to_string()))
    }

    fn open(&mut self, name: &str) -> Result<(), MeetingError> {
        self.write(Event::Start(BytesStart::new(name)))
    }

    fn close(&mut self, name: &str) -> Result<(), MeetingError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<(), MeetingError> {
        self.open(name)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), MeetingError> {
        self.writer
            .write_event(event)
            .map_err(|e| MeetingError::RequestBuild(e.to_string()))
    }
}
