use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod catalog;
mod clients;
mod config;
mod error;
mod game_finder;
mod models;
mod sampler;
mod server;
mod traits;

use config::Config;
use game_finder::GameFinder;
use server::{AppState, UpstreamSlot};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting game roulette proxy");

    let config = Config::from_env()?;
    let http = clients::http_client(config.http_timeout)?;

    let state = AppState {
        giantbomb: UpstreamSlot::from_result(GameFinder::giantbomb(http.clone(), &config)),
        rawg: UpstreamSlot::from_result(GameFinder::rawg(http, &config)),
    };

    info!(
        "Sampling with a budget of {} attempts ({} upstream calls at most), {:?} per attempt",
        config.retry_budget.attempts(),
        config.retry_budget.max_upstream_calls(),
        config.attempt_timeout
    );
    server::run_server(state, &config.bind_addr).await
}
