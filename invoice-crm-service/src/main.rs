use invoice_crm_service::config::{CrmConfig, DeploymentMode};
use invoice_crm_service::services::init_metrics;
use invoice_crm_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = CrmConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "invoice-crm-service",
        &config.telemetry.log_level,
        config.telemetry.otlp_endpoint.as_deref(),
    )
    .map_err(|e| std::io::Error::other(format!("Tracing initialization error: {}", e)))?;

    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        std::io::Error::other(format!("Metrics initialization error: {}", e))
    })?;

    if config.mode != DeploymentMode::Server {
        tracing::error!(
            mode = %config.mode,
            "This binary only serves in server mode; embed the library to use handler mode"
        );
        return Err(std::io::Error::other(format!(
            "Configuration error: DEPLOYMENT_MODE={} is not supported by the standalone binary",
            config.mode
        )));
    }

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
