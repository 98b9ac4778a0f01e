//! HTTP clients for the upstream game catalogs

pub mod giantbomb;
pub mod rawg;

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{ProxyError, ProxyResult};

pub use giantbomb::GiantBombClient;
pub use rawg::RawgClient;

const USER_AGENT: &str = concat!("game-roulette-proxy/", env!("CARGO_PKG_VERSION"));

/// Safety limit when walking a paginated platform listing
pub(crate) const MAX_PLATFORM_PAGES: u32 = 10;

/// Shared connection pool for all upstream calls
pub fn http_client(timeout: Duration) -> ProxyResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Reads a response body, mapping non-success statuses to transport errors
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> ProxyResult<T> {
    let status = response.status();
    let body = response.text().await.map_err(network)?;

    if !status.is_success() {
        return Err(ProxyError::UpstreamTransport {
            status: status.as_u16(),
            body,
        });
    }

    parse_body(&body)
}

/// Wraps a reqwest failure without its URL, which can carry a query-string key
pub(crate) fn network(error: reqwest::Error) -> ProxyError {
    ProxyError::Network(error.without_url())
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> ProxyResult<T> {
    serde_json::from_str(body).map_err(|e| ProxyError::UpstreamMalformed(e.to_string()))
}

/// Trims a display field, dropping it when nothing is left
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
