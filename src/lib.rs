//! WebEx Meeting Service
//!
//! This library translates meeting requests into calls against the WebEx XML
//! API and exposes them as a small REST service. Each call validates its input,
//! builds the XML request, posts it to the configured site and scrapes the
//! result out of the response.
//!
//! # Modules
//!
//! - `validator`: email, date and password checks
//! - `request_builder`: XML payloads for create, edit, delete and list
//! - `transport`: HTTPS exchange with the WebEx site
//! - `response_parser`: success detection and field extraction
//! - `services::meeting_service`: the `MeetingService` orchestrator
//!
//! # Authentication
//!
//! Every request carries the credentials of a single configured service
//! account (`WebExConfig`); callers are not authenticated.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod request_builder;
pub mod response_parser;
pub mod routes;
pub mod services;
pub mod transport;
pub mod validator;

#[cfg(test)]
mod transport_mock;


// Re-export the main API types for ease of use
pub use config::{ServerConfig, WebExConfig};
pub use error::MeetingError;
pub use handlers::api::AppState;
pub use models::meeting::MeetingSchedule;
pub use routes::{create_app, create_router};
pub use services::meeting_service::MeetingService;
pub use transport::{HttpTransport, Transport, TransportError};
