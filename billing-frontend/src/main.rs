use billing_frontend::config::get_configuration;
use billing_frontend::services::api_client::BillingApiClient;
use billing_frontend::startup::build_router;
use billing_frontend::AppState;
use dotenvy::dotenv;
use service_core::observability::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "billing-frontend",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    billing_frontend::services::metrics::init_metrics();

    let api = BillingApiClient::new(&configuration.backend)
        .map_err(|e| anyhow::anyhow!("Failed to create backend client: {}", e))?;
    info!(backend = %configuration.backend.base_url, "billing backend configured");

    let state = AppState::new(Arc::new(api), Arc::new(configuration.seller.clone()));
    let app = build_router(state, &configuration.server.static_dir);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting billing-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
