use std::sync::Arc;

use htb_core::{config::Config, inference::InferencePort};
use htb_health::{HealthHandle, HealthServer};
use htb_hf::HfInferenceClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    htb_core::logging::init("htb")?;

    let cfg = Arc::new(Config::load()?);

    let inference: Arc<dyn InferencePort> = Arc::new(HfInferenceClient::from_config(&cfg)?);
    tracing::info!(
        endpoint = %cfg.inference_url,
        timeout_secs = cfg.inference_timeout.as_secs(),
        "inference client ready"
    );

    let health = start_health(&cfg).await;

    // The relay keeps polling even if the liveness endpoint dies.
    htb_health::supervise(
        htb_telegram::router::run_polling(cfg.clone(), inference),
        health,
    )
    .await
}

async fn start_health(cfg: &Config) -> Option<HealthHandle> {
    let addr = cfg.health_addr();
    match HealthServer::bind(addr).await {
        Ok(server) => {
            tracing::info!(%addr, "liveness endpoint listening");
            Some(server.spawn())
        }
        Err(e) => {
            tracing::error!(%addr, "liveness endpoint failed to bind: {e}");
            None
        }
    }
}
