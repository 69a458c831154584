use axum::{
    extract::{Json as ExtractJson, Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Duration, Local};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::MeetingError;
use crate::models::common::ApiResponse;
use crate::models::meeting::MeetingSchedule;
use crate::services::meeting_service::MeetingService;
use crate::transport::{HttpTransport, Transport};
use crate::validator::MEETING_DATE_FORMAT;

// Fixed data for the smoke-test endpoint
const MOCK_MEETING_PASSWORD: &str = "123456789";
const MOCK_MEETING_TITLE: &str = "scrum standup";
const MOCK_MEETING_DAYS_AHEAD: i64 = 3;

// AppState struct containing shared resources
pub struct AppState<T: Transport = HttpTransport> {
    pub service: MeetingService<T>,
}

type ApiResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

fn failure(message: &str, err: MeetingError) -> (StatusCode, Json<ApiResponse>) {
    error!("{}: {}", message, err);
    (
        err.status_code(),
        Json(ApiResponse::failure(message, err.to_string())),
    )
}

fn meeting_start(offset: Duration) -> String {
    (Local::now() + offset).format(MEETING_DATE_FORMAT).to_string()
}

// Create meeting endpoint
pub async fn create_meeting<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    ExtractJson(meeting): ExtractJson<MeetingSchedule>,
) -> ApiResult {
    info!(
        "Received request to create meeting: {}",
        meeting.meeting_title.as_deref().unwrap_or_default()
    );

    match state
        .service
        .create_meeting(
            meeting.start_date.as_deref(),
            meeting.meeting_password.as_deref(),
            meeting.meeting_title.as_deref(),
            meeting.invitee_list.as_deref(),
        )
        .await
    {
        Ok(created) => {
            info!(
                "Successfully created meeting {}",
                created.meeting_key.as_deref().unwrap_or_default()
            );
            Ok(Json(ApiResponse::with_meeting("Meeting created", created)))
        }
        Err(err) => Err(failure("Failed to create meeting", err)),
    }
}

// Create a meeting starting now from path parameters
pub async fn create_simple_meeting<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    Path((meeting_title, meeting_password, invitees)): Path<(String, String, String)>,
) -> ApiResult {
    info!("Received request to create simple meeting: {}", meeting_title);
    let start_date = meeting_start(Duration::zero());

    match state
        .service
        .create_meeting(
            Some(start_date.as_str()),
            Some(meeting_password.as_str()),
            Some(meeting_title.as_str()),
            Some(invitees.as_str()),
        )
        .await
    {
        Ok(created) => Ok(Json(ApiResponse::with_meeting("Meeting created", created))),
        Err(err) => Err(failure("Failed to create meeting", err)),
    }
}

// Edit meeting endpoint
pub async fn edit_meeting<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    Path(meeting_key): Path<String>,
    ExtractJson(meeting): ExtractJson<MeetingSchedule>,
) -> ApiResult {
    info!("Received request to edit meeting: {}", meeting_key);

    match state.service.edit_meeting(Some(meeting_key.as_str()), &meeting).await {
        Ok(edited) => {
            info!("Successfully edited meeting {}", meeting_key);
            Ok(Json(ApiResponse::with_meeting("Meeting updated", edited)))
        }
        Err(err) => Err(failure("Failed to edit meeting", err)),
    }
}

// Delete meeting endpoint
pub async fn delete_meeting<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    Path(meeting_key): Path<String>,
) -> ApiResult {
    info!("Received request to delete meeting: {}", meeting_key);

    match state.service.delete_meeting(Some(meeting_key.as_str())).await {
        Ok(status) => {
            info!("Successfully deleted meeting {}", meeting_key);
            Ok(Json(ApiResponse::with_details("Meeting deleted", status)))
        }
        Err(err) => Err(failure("Failed to delete meeting", err)),
    }
}

// List meetings endpoint
pub async fn list_meetings<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    Path(meeting_list_size): Path<u32>,
) -> ApiResult {
    info!(
        "Received request to list meetings with meeting_list_size={}",
        meeting_list_size
    );

    match state.service.list_meetings(meeting_list_size).await {
        Ok(listing) => Ok(Json(ApiResponse::with_details("Meetings listed", listing))),
        Err(err) => Err(failure("Failed to list meetings", err)),
    }
}

// Smoke test: schedule a fixed meeting a few days out
pub async fn mock_create_meeting<T: Transport + 'static>(
    State(state): State<Arc<AppState<T>>>,
) -> ApiResult {
    let start_date = meeting_start(Duration::days(MOCK_MEETING_DAYS_AHEAD));
    info!("Creating mock meeting starting {}", start_date);

    match state
        .service
        .create_meeting(
            Some(start_date.as_str()),
            Some(MOCK_MEETING_PASSWORD),
            Some(MOCK_MEETING_TITLE),
            Some(""),
        )
        .await
    {
        Ok(created) => Ok(Json(ApiResponse::with_meeting("Mock meeting created", created))),
        Err(err) => Err(failure("Failed to create mock meeting", err)),
    }
}
