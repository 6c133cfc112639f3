use financial_web_analyst::{
    analyst::FinancialAnalyst,
    api::{start_server, ApiState},
    config::Settings,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables (before tracing so RUST_LOG from .env applies)
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    info!("🚀 Financial Web Analyst - API Server");
    info!("📍 Address: {}", settings.bind_address());

    // The server stays up without an agent; /api/analyze then reports 500.
    let analyst = match FinancialAnalyst::from_settings(&settings) {
        Ok(analyst) => {
            info!("✅ Financial Analyst Agent initialized successfully.");
            Some(Arc::new(analyst))
        }
        Err(e) => {
            error!("🔥 Failed to initialize Financial Analyst Agent: {}", e);
            None
        }
    };

    info!("📡 Starting API server...");

    start_server(ApiState::new(analyst), &settings.bind_address()).await?;

    Ok(())
}
