//! Response scraping for the WebEx XML API.
//!
//! Responses are percent-decoded and then searched for fixed markers. The
//! string-returning `extract_*` functions yield [`FAILURE_SENTINEL`] when the
//! call was not successful; the `parse_*` functions return typed errors and are
//! what the meeting service uses.

use tracing::{info, warn};

use crate::error::MeetingError;
use crate::request_builder::MeetingOperation;

/// Out-of-band value signalling an unsuccessful operation.
pub const FAILURE_SENTINEL: &str = "-1";

const SUCCESS_TOKEN: &str = "SUCCESS";
const MEETING_KEY_MARKERS: (&str, &str) = ("<meet:meetingkey>", "</meet:meetingkey>");
const HOST_URL_MARKERS: (&str, &str) = ("<serv:host>", "</serv:host>");
const ATTENDEE_URL_MARKERS: (&str, &str) = ("<serv:attendee>", "</serv:attendee>");

/// Meeting fields scraped from a successful create or edit response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMeeting {
    pub meeting_key: String,
    pub host_meeting_url: String,
    pub attendee_meeting_url: String,
}

/// Decode `application/x-www-form-urlencoded` text: `+` becomes a space and
/// `%XX` becomes the byte `XX`. A truncated or non-hex escape, or bytes that
/// are not valid UTF-8, is an error.
pub fn url_decode(input: &str) -> Result<String, MeetingError> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|pair| std::str::from_utf8(pair).ok())
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or_else(|| {
                        MeetingError::Decode(format!("malformed escape sequence at offset {}", i))
                    })?;
                decoded.push(hex);
                i += 3;
            }
            byte => {
                decoded.push(byte);
                i += 1;
            }
        }
    }

    String::from_utf8(decoded).map_err(|e| MeetingError::Decode(e.to_string()))
}

fn success_in(decoded: &str) -> bool {
    // A token at offset 0 does not count
    matches!(decoded.find(SUCCESS_TOKEN), Some(offset) if offset > 0)
}

fn between<'a>(text: &'a str, (open, close): (&str, &str)) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let end = start + text[start..].find(close)?;
    Some(&text[start..end])
}

/// True iff the decoded response contains `SUCCESS` at a strictly positive offset.
pub fn is_successful(response: &str) -> bool {
    match url_decode(response) {
        Ok(decoded) => success_in(&decoded),
        Err(e) => {
            info!("WebEx response could not be decoded: {}", e);
            false
        }
    }
}

fn extract_or_sentinel(response: &str, markers: (&str, &str)) -> String {
    let Ok(decoded) = url_decode(response) else {
        return FAILURE_SENTINEL.to_string();
    };

    if !success_in(&decoded) {
        return FAILURE_SENTINEL.to_string();
    }

    between(&decoded, markers)
        .map(str::to_string)
        .unwrap_or_else(|| FAILURE_SENTINEL.to_string())
}

/// Meeting key of a successful response, or [`FAILURE_SENTINEL`].
pub fn extract_meeting_key(response: &str) -> String {
    extract_or_sentinel(response, MEETING_KEY_MARKERS)
}

/// Host meeting URL of a successful response, or [`FAILURE_SENTINEL`].
pub fn extract_host_url(response: &str) -> String {
    extract_or_sentinel(response, HOST_URL_MARKERS)
}

/// Attendee meeting URL of a successful response, or [`FAILURE_SENTINEL`].
pub fn extract_attendee_url(response: &str) -> String {
    extract_or_sentinel(response, ATTENDEE_URL_MARKERS)
}

/// Decode a response and require the success token.
fn decode_successful(response: &str, operation: MeetingOperation) -> Result<String, MeetingError> {
    let decoded = url_decode(response)?;
    if success_in(&decoded) {
        Ok(decoded)
    } else {
        warn!("WebEx {} call was not successful", operation);
        Err(MeetingError::VendorFailure {
            operation: operation.vendor_name(),
        })
    }
}

fn required_field(
    decoded: &str,
    markers: (&str, &str),
    field: &'static str,
) -> Result<String, MeetingError> {
    match between(decoded, markers) {
        Some(value) if !value.is_empty() && value != FAILURE_SENTINEL => Ok(value.to_string()),
        _ => Err(MeetingError::MalformedResponse(field)),
    }
}

/// Parse a `CreateMeeting` response into its key and meeting URLs.
pub fn parse_created_meeting(response: &str) -> Result<ScheduledMeeting, MeetingError> {
    let decoded = decode_successful(response, MeetingOperation::Create)?;

    Ok(ScheduledMeeting {
        meeting_key: required_field(&decoded, MEETING_KEY_MARKERS, "meeting key")?,
        host_meeting_url: required_field(&decoded, HOST_URL_MARKERS, "host meeting URL")?,
        attendee_meeting_url: required_field(&decoded, ATTENDEE_URL_MARKERS, "attendee meeting URL")?,
    })
}

/// Parse a `SetMeeting` response. The vendor does not echo the key back, so
/// the caller's key is carried into the result.
pub fn parse_edited_meeting(response: &str, meeting_key: &str) -> Result<ScheduledMeeting, MeetingError> {
    let decoded = decode_successful(response, MeetingOperation::Edit)?;

    Ok(ScheduledMeeting {
        meeting_key: meeting_key.to_string(),
        host_meeting_url: required_field(&decoded, HOST_URL_MARKERS, "host meeting URL")?,
        attendee_meeting_url: required_field(&decoded, ATTENDEE_URL_MARKERS, "attendee meeting URL")?,
    })
}

/// Check a delete or list response, returning the raw response text on success.
pub fn parse_status(response: &str, operation: MeetingOperation) -> Result<String, MeetingError> {
    decode_successful(response, operation)?;
    Ok(response.to_string())
}
