use secrecy::ExposeSecret;
use service_core::observability::{init_tracing, shutdown_tracing};
use tokio::signal;
use vision_service::config::VisionConfig;
use vision_service::services::init_metrics;
use vision_service::startup::Application;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Loads `.env` as a side effect, so it runs before tracing reads RUST_LOG.
    let config = VisionConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "vision-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );

    if config.gemini.api_key.expose_secret().is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; provider calls will be rejected upstream");
    }

    init_metrics().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        std::io::Error::other(format!("Metrics error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    let result = app.run_with_shutdown(shutdown_signal()).await;
    shutdown_tracing();
    result
}
