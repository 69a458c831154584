// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

// Liveness message for load balancers and monitors
pub async fn verify_me() -> &'static str {
    "WebEx Conferencing service is alive!"
}
