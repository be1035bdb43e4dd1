mod config;
mod error;
mod l3out;
mod mso;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use l3out::ReconcileRequest;
use mso::MsoClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ndo_reconcile=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let request_path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: ndo-reconcile <request.json>"))?;
    let request: ReconcileRequest = serde_json::from_str(&std::fs::read_to_string(&request_path)?)?;

    // Load configuration
    let cfg = Config::load();
    if cfg.mso_token.is_empty() {
        tracing::warn!("MSO_TOKEN not set - requests will be unauthenticated");
    }
    tracing::info!("NDO endpoint: {}", cfg.mso_url);
    tracing::info!("Template: {} (state: {:?})", request.template, request.state);

    let client = MsoClient::new(cfg.mso_url.clone(), cfg.mso_token.clone(), cfg.timeout_secs)?;
    if !client.test_connection().await {
        tracing::warn!("NDO endpoint {} is not reachable", cfg.mso_url);
    }

    let outcome = l3out::reconcile(&client, &request).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
