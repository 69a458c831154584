use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::handlers::api::{
    create_meeting, create_simple_meeting, delete_meeting, edit_meeting, list_meetings,
    mock_create_meeting, AppState,
};
use crate::handlers::health::{health_check, verify_me};
use crate::transport::Transport;

pub fn create_router<T: Transport + 'static>(app_state: Arc<AppState<T>>, is_production: bool) -> Router {
    let mut router = Router::new();

    // Health checks are always available
    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/verifyMe", get(verify_me));
    router = router.merge(health_routes);

    let meeting_routes = Router::new()
        .route("/meetings", post(create_meeting::<T>))
        .route(
            "/meetings/simple/:meeting_title/:meeting_password/:invitees",
            post(create_simple_meeting::<T>),
        )
        .route(
            "/meetings/update/:meeting_key",
            post(edit_meeting::<T>).delete(delete_meeting::<T>),
        )
        .route("/meetings/list/:meeting_list_size", get(list_meetings::<T>));
    router = router.merge(meeting_routes);

    // The smoke-test endpoint creates a real meeting, so keep it out of production
    if !is_production {
        let mock_routes = Router::new().route("/meetings/mocktest", get(mock_create_meeting::<T>));
        router = router.merge(mock_routes);

        info!("Mock test route enabled - server running in development mode");
    } else {
        info!("Running in production mode - mock test route not exposed");
    }

    router.with_state(app_state)
}

// Error handler
async fn handle_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::load_shed::error::Overloaded>() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service is overloaded, try again later".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        )
    }
}

/// Router with the middleware stack the server runs.
///
/// No request timeout is applied, so a vendor call always runs to completion.
pub fn create_app<T: Transport + 'static>(app_state: Arc<AppState<T>>, is_production: bool) -> Router {
    create_router(app_state, is_production).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .load_shed()
            .concurrency_limit(64)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any)),
    )
}
