use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file when present; production
    // deployments set the variables directly.
    let _ = dotenvy::dotenv();

    // Global layer stays quiet about cortex-client events; the scoped
    // telemetry layer renders those with timestamps and span durations.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cortex_client=off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(filter))
        .with(cortex_client::telemetry::layer())
        .init();

    tracing::info!("starting companion backend");

    api::start().await?;

    Ok(())
}
