use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use webex_meeting_service::{
    create_app, AppState, HttpTransport, MeetingService, ServerConfig, WebExConfig,
};

#[cfg(feature = "sentry-monitoring")]
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;
    info!("Sentry error tracking enabled");
    Some(sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received interrupt signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    #[cfg(feature = "sentry-monitoring")]
    let _sentry = init_sentry();

    // Load the WebEx service account
    let webex_config = WebExConfig::from_env().map_err(|err| {
        error!("Failed to load WebEx configuration: {}", err);
        err
    })?;
    info!(
        "Using WebEx site {} with host account {}",
        webex_config.site_url(),
        webex_config.host_account
    );

    let server_config = ServerConfig::from_env().map_err(|err| {
        error!("Failed to load server configuration: {}", err);
        err
    })?;

    if server_config.is_production {
        info!("Running in PRODUCTION mode - restricting available endpoints");
    } else {
        warn!("Running in DEVELOPMENT mode - /meetings/mocktest will create real meetings");
    }

    let transport = HttpTransport::new(&webex_config)?;
    info!("WebEx transport posting to {}", transport.endpoint());

    // Create shared application state
    let app_state = Arc::new(AppState {
        service: MeetingService::new(Arc::new(webex_config), transport),
    });

    // Create router with appropriate routes based on environment
    let app = create_app(app_state, server_config.is_production);

    let addr: SocketAddr = server_config.bind_address.parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Start server with graceful shutdown
    info!("Server is ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has been gracefully shut down");
    Ok(())
}
