use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::WebExConfig;
use crate::error::MeetingError;
use crate::models::meeting::MeetingSchedule;
use crate::request_builder::{
    build_create_request, build_delete_request, build_edit_request, build_list_request,
    clamp_list_size, MeetingDetails, MeetingOperation,
};
use crate::response_parser::{parse_created_meeting, parse_edited_meeting, parse_status};
use crate::transport::Transport;
use crate::validator::{
    is_valid_date, is_valid_password, sanitize_markup, MAX_PASSWORD_LENGTH, MEETING_DATE_FORMAT,
    MIN_PASSWORD_LENGTH,
};

/// Stages every call passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStage {
    Validating,
    Building,
    Sending,
    Parsing,
    Done,
}

impl fmt::Display for CallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallStage::Validating => "validating",
            CallStage::Building => "building",
            CallStage::Sending => "sending",
            CallStage::Parsing => "parsing",
            CallStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Schedules, edits, deletes and lists WebEx meetings.
///
/// Each call runs validate → build → send → parse and keeps no state between
/// calls. The configuration is shared read-only.
pub struct MeetingService<T: Transport> {
    config: Arc<WebExConfig>,
    transport: T,
}

impl<T: Transport> MeetingService<T> {
    pub fn new(config: Arc<WebExConfig>, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &WebExConfig {
        &self.config
    }

    /// Create a meeting hosted by the configured service account.
    ///
    /// A missing start date or password, or one that fails validation, is
    /// rejected before any request is sent. A missing title or invitee list is
    /// treated as empty.
    pub async fn create_meeting(
        &self,
        start_date: Option<&str>,
        password: Option<&str>,
        title: Option<&str>,
        invitees: Option<&str>,
    ) -> Result<MeetingSchedule, MeetingError> {
        let operation = MeetingOperation::Create;
        enter(operation, CallStage::Validating);

        let (start_date, password) = require_schedule(operation, start_date, password)?;
        let title = sanitize_markup(title.unwrap_or_default());

        enter(operation, CallStage::Building);
        let details = MeetingDetails {
            start_date,
            password,
            title: &title,
            invitees,
        };
        let request = build_create_request(&self.config, &details)?;

        let response = self.exchange(operation, &request).await?;
        let scheduled = parse_created_meeting(&response).map_err(|e| log_failure(operation, e))?;

        info!(
            "WebEx XML API Response - meetingKey={} createMeeting()",
            scheduled.meeting_key
        );
        enter(operation, CallStage::Done);

        Ok(MeetingSchedule::scheduled(
            &self.config.host_account,
            &title,
            start_date,
            invitees.unwrap_or_default(),
            password,
            scheduled,
        ))
    }

    /// Replace the schedule of an existing meeting.
    ///
    /// Uses the same validation as [`Self::create_meeting`] and additionally
    /// requires the meeting key. On success the returned key is the key passed
    /// in.
    pub async fn edit_meeting(
        &self,
        meeting_key: Option<&str>,
        meeting: &MeetingSchedule,
    ) -> Result<MeetingSchedule, MeetingError> {
        let operation = MeetingOperation::Edit;
        enter(operation, CallStage::Validating);

        let meeting_key = require_key(operation, meeting_key)?;
        let (start_date, password) = require_schedule(
            operation,
            meeting.start_date.as_deref(),
            meeting.meeting_password.as_deref(),
        )?;
        let title = sanitize_markup(meeting.meeting_title.as_deref().unwrap_or_default());
        let invitees = meeting.invitee_list.as_deref();

        enter(operation, CallStage::Building);
        let details = MeetingDetails {
            start_date,
            password,
            title: &title,
            invitees,
        };
        let request = build_edit_request(&self.config, meeting_key, &details)?;

        let response = self.exchange(operation, &request).await?;
        let scheduled =
            parse_edited_meeting(&response, meeting_key).map_err(|e| log_failure(operation, e))?;

        info!(
            "WebEx XML API Response - meetingKey={} setMeeting()",
            scheduled.meeting_key
        );
        enter(operation, CallStage::Done);

        Ok(MeetingSchedule::scheduled(
            &self.config.host_account,
            &title,
            start_date,
            invitees.unwrap_or_default(),
            password,
            scheduled,
        ))
    }

    /// Delete a meeting. Returns the raw vendor response on success.
    pub async fn delete_meeting(&self, meeting_key: Option<&str>) -> Result<String, MeetingError> {
        let operation = MeetingOperation::Delete;
        enter(operation, CallStage::Validating);
        let meeting_key = require_key(operation, meeting_key)?;

        enter(operation, CallStage::Building);
        let request = build_delete_request(&self.config, meeting_key)?;

        let response = self.exchange(operation, &request).await?;
        let status = parse_status(&response, operation).map_err(|e| log_failure(operation, e))?;

        info!("WebEx XML API Response - meetingKey={} deleteMeeting()", meeting_key);
        enter(operation, CallStage::Done);
        Ok(status)
    }

    /// List meetings hosted by the service account, at most 100. Returns the
    /// raw vendor response on success.
    pub async fn list_meetings(&self, meeting_list_size: u32) -> Result<String, MeetingError> {
        let operation = MeetingOperation::List;
        enter(operation, CallStage::Validating);
        let size = clamp_list_size(meeting_list_size);

        enter(operation, CallStage::Building);
        let request = build_list_request(&self.config, size)?;

        let response = self.exchange(operation, &request).await?;
        let status = parse_status(&response, operation).map_err(|e| log_failure(operation, e))?;

        info!("WebEx XML API Response - LstsummaryMeeting() returned {} bytes", status.len());
        enter(operation, CallStage::Done);
        Ok(status)
    }

    async fn exchange(&self, operation: MeetingOperation, request: &str) -> Result<String, MeetingError> {
        enter(operation, CallStage::Sending);
        debug!("XML Request for {} POSTed to {}", operation, self.config.site_url());

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| log_failure(operation, MeetingError::from(e)))?;

        enter(operation, CallStage::Parsing);
        debug!("WebEx XML API Response for {}: {}", operation, response);
        Ok(response)
    }
}

fn enter(operation: MeetingOperation, stage: CallStage) {
    debug!("{} call: {}", operation, stage);
}

fn log_failure(operation: MeetingOperation, err: MeetingError) -> MeetingError {
    error!("{} failed: {}", operation, err);
    err
}

fn require_key(operation: MeetingOperation, meeting_key: Option<&str>) -> Result<&str, MeetingError> {
    match meeting_key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => {
            info!("Cannot run {} without a meeting key", operation);
            Err(MeetingError::MissingField("meetingKey"))
        }
    }
}

/// Presence and validity of the start date and password.
fn require_schedule<'a>(
    operation: MeetingOperation,
    start_date: Option<&'a str>,
    password: Option<&'a str>,
) -> Result<(&'a str, &'a str), MeetingError> {
    let (Some(start_date), Some(password)) = (start_date, password) else {
        let missing = if start_date.is_none() {
            "startDate"
        } else {
            "meetingPassword"
        };
        info!("Cannot run {} without {}", operation, missing);
        return Err(MeetingError::MissingField(missing));
    };

    let valid_date = is_valid_date(Some(start_date), MEETING_DATE_FORMAT);
    let valid_password = is_valid_password(Some(password), MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH);

    if !valid_date {
        info!(
            "Cannot run {} due to invalid start date. Date format should be MM/dd/yyyy HH:mm:ss.",
            operation
        );
    }
    if !valid_password {
        info!(
            "Cannot run {} due to invalid password. Meeting password policy requires more than {} characters.",
            operation, MIN_PASSWORD_LENGTH
        );
    }

    if !valid_date {
        return Err(MeetingError::InvalidStartDate(start_date.to_string()));
    }
    if !valid_password {
        return Err(MeetingError::InvalidPassword {
            min: MIN_PASSWORD_LENGTH,
            max: MAX_PASSWORD_LENGTH,
        });
    }

    Ok((start_date, password))
}
